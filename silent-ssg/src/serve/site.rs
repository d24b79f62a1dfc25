use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use mime::CHARSET;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::core::res_body::stream_body;
use crate::headers::{ContentLength, ContentType};
use crate::{Method, Response, StatusCode};

/// 已生成的静态站点目录
///
/// 查找顺序：以 `/` 结尾的路径追加 `index.html`，然后依次尝试原路径与 `路径.html`，
/// 都不存在时返回 404。
#[derive(Debug, Clone)]
pub struct StaticSite {
    root: PathBuf,
}

impl StaticSite {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 查找请求路径对应的文件
    pub async fn locate(&self, path: &str) -> Option<PathBuf> {
        let decoded = urlencoding::decode(path).ok()?;
        let mut file = self.root.clone();
        for component in Path::new(decoded.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => file.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if decoded.ends_with('/') || decoded.is_empty() {
            file.push("index.html");
        }
        if is_file(&file).await {
            return Some(file);
        }
        let mut html = file.into_os_string();
        html.push(".html");
        let html = PathBuf::from(html);
        is_file(&html).await.then_some(html)
    }

    /// 生成请求路径的响应
    pub async fn respond(&self, method: &Method, path: &str) -> Response {
        if method != Method::GET && method != Method::HEAD {
            return Response::text("Unsupported method")
                .with_status(StatusCode::NOT_IMPLEMENTED);
        }
        let Some(file_path) = self.locate(path).await else {
            return Response::not_found(path);
        };
        let (file, meta) = match tokio::fs::File::open(&file_path).await {
            Ok(file) => match file.metadata().await {
                Ok(meta) => (file, meta),
                Err(_) => return Response::not_found(path),
            },
            Err(_) => return Response::not_found(path),
        };
        let mut res = Response::empty();
        res.set_typed_header(normalize_content_type(
            mime_guess::from_path(&file_path).first(),
        ));
        res.set_typed_header(ContentLength(meta.len()));
        res.set_body(stream_body(to_stream(file)));
        res
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

fn to_stream<R>(reader: R) -> BoxStream<'static, Result<Bytes, std::io::Error>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    const CHUNK_SIZE: usize = 16 * 1024;
    let buf = vec![0u8; CHUNK_SIZE];
    stream::try_unfold((reader, buf), |(mut reader, mut buf)| async move {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            Ok(None)
        } else {
            let bytes = Bytes::copy_from_slice(&buf[..n]);
            Ok(Some((bytes, (reader, buf))))
        }
    })
    .boxed()
}

fn normalize_content_type(mime: Option<mime::Mime>) -> ContentType {
    match mime {
        Some(value) => {
            if value.type_() == mime::TEXT && value.get_param(CHARSET).is_none() {
                let raw = format!("{}/{}; charset=utf-8", value.type_(), value.subtype());
                mime::Mime::from_str(&raw)
                    .map(ContentType::from)
                    .unwrap_or_else(|_| ContentType::text_utf8())
            } else {
                ContentType::from(value)
            }
        }
        None => ContentType::octet_stream(),
    }
}
