use std::fmt;

use tracing::info;

use super::output::{is_html_content_type, resolve_path};
use super::redirect::RedirectPage;
use crate::client::Transport;
use crate::core::res_body::{ResBody, full};
use crate::{SsgResult, StatusCode};

/// 产物类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// 301/302 重定向，内容为生成的重定向页面
    Redirect,
    /// 流式响应，原样透传
    Streamed,
    /// 普通响应
    Fixed,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArtifactKind::Redirect => "redirect",
            ArtifactKind::Streamed => "streamed",
            ArtifactKind::Fixed => "fixed",
        })
    }
}

/// 单个 URL 的渲染结果，内容只能读取一次
pub struct RenderedArtifact {
    pub url: String,
    /// 输出目录下的相对路径，以 `/` 开头
    pub path: String,
    pub kind: ArtifactKind,
    pub content: ResBody,
}

impl fmt::Debug for RenderedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedArtifact")
            .field("url", &self.url)
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish()
    }
}

/// 请求一个 URL 并归类其响应
///
/// 不校验状态码：非 2xx 响应同样会被写出。
pub async fn render_url<T>(
    transport: &T,
    redirect: &RedirectPage,
    url: &str,
) -> SsgResult<RenderedArtifact>
where
    T: Transport + ?Sized,
{
    let mut res = transport.get(url).await?;
    res.render()?;

    let is_redirect = matches!(res.status(), StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND);
    let artifact = if is_redirect && let Some(location) = res.location() {
        RenderedArtifact {
            url: url.to_string(),
            path: resolve_path(url, true),
            kind: ArtifactKind::Redirect,
            content: full(redirect.render(location)?),
        }
    } else {
        let path = resolve_path(url, is_html_content_type(res.content_type()));
        let kind = if res.is_streaming() {
            ArtifactKind::Streamed
        } else {
            ArtifactKind::Fixed
        };
        RenderedArtifact {
            url: url.to_string(),
            path,
            kind,
            content: res.take_body(),
        }
    };
    info!(url, path = %artifact.path, kind = %artifact.kind, "rendered");
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::res_body::stream_body;
    use crate::route::{Group, Leaf, RouteSettings, RouteTable};
    use crate::ssg::redirect::{RedirectContext, parse_redirect_target};
    use crate::{Client, Request, Response, SsgError};
    use bytes::Bytes;
    use futures_util::{StreamExt, stream};
    use std::sync::Arc;

    async fn collect(body: ResBody) -> String {
        let chunks: Vec<_> = body.collect().await;
        let mut out = Vec::new();
        for chunk in chunks {
            out.extend_from_slice(&chunk.unwrap());
        }
        String::from_utf8(out).unwrap()
    }

    fn client() -> Client {
        let table = RouteTable::new()
            .with_settings(RouteSettings::default())
            .append(Group::i18n().append(Leaf::new("about/", |_req: Request| async {
                Ok::<_, SsgError>("<h1>About</h1>")
            }).name("about")))
            .append(Leaf::new("robots.txt", |_req: Request| async {
                Ok::<_, SsgError>(Response::text("User-agent: *"))
            }).name("robots"))
            .append(Leaf::new("feed", |_req: Request| async {
                let chunks = stream::iter(vec![
                    Ok::<_, SsgError>(Bytes::from("a")),
                    Ok(Bytes::from("b")),
                ]);
                Ok::<_, SsgError>(Response::empty().with_body(stream_body(chunks)))
            }).name("feed"))
            .append(Leaf::new("gone/", |_req: Request| async {
                Ok::<_, SsgError>(Response::html("gone").with_status(StatusCode::GONE))
            }).name("gone"));
        Client::new(Arc::new(table))
    }

    fn page() -> RedirectPage {
        RedirectPage::new(RedirectContext::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fixed_html() {
        let artifact = render_url(&client(), &page(), "/en/about/").await.unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Fixed);
        assert_eq!(artifact.path, "/en/about/index.html");
        assert_eq!(collect(artifact.content).await, "<h1>About</h1>");
    }

    #[tokio::test]
    async fn test_redirect_becomes_html_page() {
        let artifact = render_url(&client(), &page(), "/en/about").await.unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Redirect);
        assert_eq!(artifact.path, "/en/about.html");
        let html = collect(artifact.content).await;
        assert_eq!(parse_redirect_target(&html).as_deref(), Some("/en/about/"));

        let artifact = render_url(&client(), &page(), "/about").await.unwrap();
        assert_eq!(artifact.path, "/about.html");
    }

    #[tokio::test]
    async fn test_non_html_keeps_url_path() {
        let artifact = render_url(&client(), &page(), "/robots.txt").await.unwrap();
        assert_eq!(artifact.path, "/robots.txt");
        assert_eq!(collect(artifact.content).await, "User-agent: *");
    }

    #[tokio::test]
    async fn test_streamed_passthrough() {
        let artifact = render_url(&client(), &page(), "/feed").await.unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Streamed);
        assert_eq!(artifact.path, "/feed");
        assert_eq!(collect(artifact.content).await, "ab");
    }

    #[tokio::test]
    async fn test_status_not_validated() {
        let artifact = render_url(&client(), &page(), "/gone/").await.unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Fixed);
        assert_eq!(collect(artifact.content).await, "gone");
    }
}
