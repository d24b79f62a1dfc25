//! 命令行入口
//!
//! ```text
//! my-website build --output _build
//! my-website serve --port 8000
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::Client;
use crate::route::RouteTable;
use crate::ssg::{
    AssetCollector, BuildOptions, BuildReport, DEFAULT_BUILD_DIR, DEFAULT_REDIRECT_MESSAGE,
    DEFAULT_REDIRECT_NOSCRIPT, DEFAULT_REDIRECT_STYLE, RedirectContext, build_static,
};
use crate::{SsgError, SsgResult};

/// 站点注册表：命名路由表与静态资源
///
/// 第一个注册的路由表是默认路由表。
#[derive(Default, Clone)]
pub struct Site {
    tables: Vec<(String, Arc<RouteTable>)>,
    assets: Option<Arc<dyn AssetCollector>>,
}

impl Site {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_routes(mut self, name: &str, table: RouteTable) -> Self {
        self.tables.push((name.to_string(), Arc::new(table)));
        self
    }

    pub fn with_assets(mut self, assets: impl AssetCollector + 'static) -> Self {
        self.assets = Some(Arc::new(assets));
        self
    }

    /// 按名称取路由表，`None` 取默认路由表
    pub fn routes(&self, name: Option<&str>) -> SsgResult<Arc<RouteTable>> {
        let found = match name {
            Some(name) => self.tables.iter().find(|(n, _)| n == name),
            None => self.tables.first(),
        };
        match (found, name) {
            (Some((_, table)), _) => Ok(Arc::clone(table)),
            (None, Some(name)) => Err(SsgError::RouteTableNotFound(name.to_string())),
            (None, None) => Err(SsgError::config_error("no route table registered")),
        }
    }

    pub fn assets(&self) -> Option<&dyn AssetCollector> {
        self.assets.as_deref()
    }
}

#[derive(Debug, Parser)]
#[command(version, about = "Build a static site from a silent route table")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 生成静态站点
    Build(BuildArgs),
    /// 本地预览生成结果
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// 输出目录
    #[arg(long, env = "SILENT_SSG_BUILD_DIR", default_value = DEFAULT_BUILD_DIR)]
    pub output: PathBuf,
    /// 构建前不清空输出目录
    #[arg(long)]
    pub output_noclear: bool,
    /// 使用的路由表名称
    #[arg(long)]
    pub routes: Option<String>,
    #[arg(long, env = "SILENT_SSG_REDIRECT_STYLE", default_value = DEFAULT_REDIRECT_STYLE)]
    pub redirect_style: String,
    #[arg(long, env = "SILENT_SSG_REDIRECT_MESSAGE", default_value = DEFAULT_REDIRECT_MESSAGE)]
    pub redirect_message: String,
    #[arg(long, env = "SILENT_SSG_REDIRECT_NOSCRIPT", default_value = DEFAULT_REDIRECT_NOSCRIPT)]
    pub redirect_noscript: String,
    /// 忽略的静态资源（glob），可重复
    #[arg(long = "staticfiles-ignore")]
    pub staticfiles_ignore: Vec<String>,
}

impl BuildArgs {
    pub fn options(&self) -> BuildOptions {
        let redirect = RedirectContext::default()
            .with_style(&self.redirect_style)
            .with_message(&self.redirect_message)
            .with_noscript(&self.redirect_noscript);
        self.staticfiles_ignore.iter().fold(
            BuildOptions::default()
                .with_output_dir(&self.output)
                .with_output_clear(!self.output_noclear)
                .with_redirect(redirect),
            |options, pattern| options.with_staticfiles_ignore(pattern),
        )
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// 直接提供已生成的目录，不再构建
    #[arg(long)]
    pub directory: Option<PathBuf>,
    #[arg(long, env = "SILENT_SSG_SERVE_HOST", default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, env = "SILENT_SSG_SERVE_PORT", default_value_t = 8000)]
    pub port: u16,
    /// 使用的路由表名称
    #[arg(long)]
    pub routes: Option<String>,
}

/// 解析进程参数并执行
pub async fn run(site: Site) -> SsgResult<()> {
    execute(&site, Cli::parse()).await
}

pub async fn execute(site: &Site, cli: Cli) -> SsgResult<()> {
    match cli.command {
        Command::Build(args) => build(site, &args).await.map(|_| ()),
        Command::Serve(args) => serve(site, &args).await,
    }
}

pub async fn build(site: &Site, args: &BuildArgs) -> SsgResult<BuildReport> {
    let options = args.options();
    build_with(site, args.routes.as_deref(), &options).await
}

async fn build_with(
    site: &Site,
    routes: Option<&str>,
    options: &BuildOptions,
) -> SsgResult<BuildReport> {
    let table = site.routes(routes)?;
    let client = Client::new(Arc::clone(&table));
    build_static(&table, &client, site.assets(), options).await
}

pub async fn serve(site: &Site, args: &ServeArgs) -> SsgResult<()> {
    let addr = tokio::net::lookup_host((args.host.as_str(), args.port))
        .await?
        .next()
        .ok_or_else(|| {
            SsgError::config_error(format!("cannot resolve {}:{}", args.host, args.port))
        })?;
    match &args.directory {
        Some(directory) => crate::serve::serve(directory, addr).await,
        None => {
            let tmp = tempfile::TempDir::new()?;
            info!(output = %tmp.path().display(), "building into a temporary directory");
            let options = BuildOptions::default().with_output_dir(tmp.path());
            build_with(site, args.routes.as_deref(), &options).await?;
            crate::serve::serve(tmp.path(), addr).await
        }
    }
}
