use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::route::RouteTable;
use crate::{Request, Response, SsgError, SsgResult, StatusCode};

/// 发起 GET 请求并返回完整响应的传输层，不跟随重定向
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> SsgResult<Response>;
}

/// 进程内客户端
///
/// 不经过网络，直接在路由表上分发请求，并复现线上服务的两类重定向：
/// 补全尾部 `/`（301）与补全默认语言前缀（302）。
#[derive(Clone)]
pub struct Client {
    table: Arc<RouteTable>,
}

impl Client {
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// 分发一次请求，处理器的错误会被转换为错误响应
    pub async fn dispatch(&self, url: &str) -> SsgResult<Response> {
        let url = url.split_once('#').map_or(url, |(u, _)| u);
        let (raw_path, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        };
        let Ok(path) = urlencoding::decode(raw_path) else {
            return Ok(Response::not_found(raw_path));
        };

        if let Some(resolved) = self.table.resolve(&path) {
            debug!(url, route = ?resolved.name, "dispatch");
            let mut req = Request::get(url.parse().map_err(|e| {
                SsgError::business_error(
                    StatusCode::BAD_REQUEST,
                    format!("invalid url `{url}`: {e}"),
                )
            })?);
            req.extend_path_params(resolved.params);
            req.set_locale(resolved.locale);
            req.set_route_name(resolved.name);
            let handler = Arc::clone(&resolved.leaf.handler);
            return Ok(match handler.call(req).await {
                Ok(res) => res,
                Err(err) => err.into(),
            });
        }

        if let Some((status, location)) = self.fallback_redirect(&path, raw_path) {
            let location = match query {
                Some(query) => format!("{location}?{query}"),
                None => location,
            };
            debug!(url, location = %location, %status, "redirect");
            return if status == StatusCode::MOVED_PERMANENTLY {
                Response::redirect(&location)
            } else {
                Response::redirect_found(&location)
            };
        }

        debug!(url, "not found");
        Ok(Response::not_found(&path))
    }

    /// 未匹配路径的重定向目标：先补全 `/`（301），再补全默认语言前缀（302）
    fn fallback_redirect(&self, path: &str, raw_path: &str) -> Option<(StatusCode, String)> {
        let settings = self.table.settings();
        if settings.append_slash
            && !path.ends_with('/')
            && self.table.is_valid_path(&format!("{path}/"))
        {
            return Some((StatusCode::MOVED_PERMANENTLY, format!("{raw_path}/")));
        }
        if !self.table.prefixes_default_language() || self.table.language_from_path(path).is_some() {
            return None;
        }
        let language_path = format!("/{}{raw_path}", settings.language_code);
        if self.table.is_valid_path(&format!("/{}{path}", settings.language_code)) {
            return Some((StatusCode::FOUND, language_path));
        }
        (settings.append_slash
            && !path.ends_with('/')
            && self
                .table
                .is_valid_path(&format!("/{}{path}/", settings.language_code)))
        .then(|| (StatusCode::FOUND, format!("{language_path}/")))
    }
}

#[async_trait]
impl Transport for Client {
    async fn get(&self, url: &str) -> SsgResult<Response> {
        self.dispatch(url).await
    }
}
