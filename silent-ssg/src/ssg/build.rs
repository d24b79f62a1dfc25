use std::fmt;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::assets::{AssetCollector, IgnorePatterns};
use super::output::output_file;
use super::redirect::{RedirectContext, RedirectPage};
use super::render::render_url;
use super::walker::static_urls;
use crate::client::Transport;
use crate::core::res_body::ResBody;
use crate::route::RouteTable;
use crate::{SsgError, SsgResult};

pub const DEFAULT_BUILD_DIR: &str = "_build";

/// 构建阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Init,
    Clearing,
    Rendering,
    CollectingAssets,
    Done,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuildStage::Init => "init",
            BuildStage::Clearing => "clearing",
            BuildStage::Rendering => "rendering",
            BuildStage::CollectingAssets => "collecting assets",
            BuildStage::Done => "done",
        })
    }
}

/// 构建选项
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub output_dir: PathBuf,
    /// 构建前是否清空输出目录
    pub output_clear: bool,
    pub redirect: RedirectContext,
    /// 静态资源忽略规则
    pub staticfiles_ignore: Vec<String>,
    /// 自定义重定向页面模板
    pub redirect_template: Option<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            output_clear: true,
            redirect: RedirectContext::default(),
            staticfiles_ignore: Vec::new(),
            redirect_template: None,
        }
    }
}

impl BuildOptions {
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_output_clear(mut self, output_clear: bool) -> Self {
        self.output_clear = output_clear;
        self
    }

    pub fn with_redirect(mut self, redirect: RedirectContext) -> Self {
        self.redirect = redirect;
        self
    }

    pub fn with_staticfiles_ignore(mut self, pattern: impl Into<String>) -> Self {
        self.staticfiles_ignore.push(pattern.into());
        self
    }

    pub fn with_redirect_template(mut self, template: impl Into<String>) -> Self {
        self.redirect_template = Some(template.into());
        self
    }
}

/// 构建结果
#[derive(Debug, Default)]
pub struct BuildReport {
    /// 写出的页面文件
    pub pages: Vec<PathBuf>,
    /// 复制的静态资源
    pub assets: Vec<PathBuf>,
}

/// 将路由表中所有参与静态生成的页面写入输出目录
///
/// 顺序执行；任何错误都会中止构建，已写出的文件保留。
pub async fn build_static<T>(
    table: &RouteTable,
    transport: &T,
    assets: Option<&dyn AssetCollector>,
    options: &BuildOptions,
) -> SsgResult<BuildReport>
where
    T: Transport + ?Sized,
{
    let out_dir = options.output_dir.as_path();
    log_stage(BuildStage::Init, out_dir);
    if out_dir.as_os_str().is_empty() {
        return Err(SsgError::config_error("output directory is empty"));
    }
    let redirect_page = match &options.redirect_template {
        Some(template) => RedirectPage::with_template(options.redirect.clone(), template)?,
        None => RedirectPage::new(options.redirect.clone())?,
    };
    let ignore = IgnorePatterns::new(options.staticfiles_ignore.iter().cloned())?;
    if let Some(assets) = assets {
        assets.validate()?;
    }

    if options.output_clear {
        log_stage(BuildStage::Clearing, out_dir);
        clear_dir(out_dir).await?;
    } else {
        tokio::fs::create_dir_all(out_dir).await?;
    }

    log_stage(BuildStage::Rendering, out_dir);
    let mut report = BuildReport::default();
    for url in static_urls(table) {
        let url = url?;
        let artifact = render_url(transport, &redirect_page, &url.url).await?;
        let file = output_file(out_dir, &artifact.path)?;
        write_content(&file, artifact.content).await?;
        report.pages.push(file);
    }

    if let Some(assets) = assets {
        log_stage(BuildStage::CollectingAssets, out_dir);
        report.assets = assets.collect(out_dir, &ignore).await?;
    }

    log_stage(BuildStage::Done, out_dir);
    info!(
        pages = report.pages.len(),
        assets = report.assets.len(),
        "static site built"
    );
    Ok(report)
}

fn log_stage(stage: BuildStage, out_dir: &Path) {
    info!(%stage, output = %out_dir.display(), "build stage");
}

/// 清空目录内容，保留目录本身
async fn clear_dir(dir: &Path) -> SsgResult<()> {
    tokio::fs::create_dir_all(dir).await?;
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(&path).await?;
        } else {
            tokio::fs::remove_file(&path).await?;
        }
        debug!(path = %path.display(), "removed");
    }
    Ok(())
}

/// 逐块写出内容
async fn write_content(file: &Path, mut content: ResBody) -> SsgResult<()> {
    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut out = tokio::fs::File::create(file).await?;
    while let Some(chunk) = content.next().await {
        let chunk = chunk.map_err(SsgError::BodyError)?;
        out.write_all(&chunk).await?;
    }
    out.flush().await?;
    Ok(())
}
