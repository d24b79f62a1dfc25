//! 静态站点生成
//!
//! 遍历路由表得到所有需要生成的 URL，逐个以进程内请求渲染，并写入输出目录；
//! 重定向响应会被替换为带 `meta refresh` 的 HTML 页面。

mod assets;
mod build;
mod output;
mod redirect;
mod render;
mod walker;

pub use assets::{AssetCollector, IgnorePatterns, StaticFiles};
pub use build::{BuildOptions, BuildReport, BuildStage, DEFAULT_BUILD_DIR, build_static};
pub use output::{is_html_content_type, output_file, resolve_path};
pub use redirect::{
    DEFAULT_REDIRECT_MESSAGE, DEFAULT_REDIRECT_NOSCRIPT, DEFAULT_REDIRECT_STYLE, RedirectContext,
    RedirectPage, parse_redirect_target,
};
pub use render::{ArtifactKind, RenderedArtifact, render_url};
pub use walker::{ConcreteUrl, StaticUrls, UrlVariant, static_urls};
