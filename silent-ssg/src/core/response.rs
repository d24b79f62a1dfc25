use std::fmt;
use std::fmt::{Display, Formatter};

use crate::core::res_body::{ResBody, full};
use crate::core::template::DeferredRender;
use crate::headers::{ContentType, Header, HeaderMap, HeaderMapExt};
use crate::{SsgError, SsgResult, StatusCode, header};

/// 响应体
/// ```
/// use silent_ssg::Response;
/// let res = Response::empty();
/// assert_eq!(res.status(), silent_ssg::StatusCode::OK);
/// ```
pub struct Response {
    /// The HTTP status code.
    pub(crate) status: StatusCode,
    /// The HTTP headers.
    pub(crate) headers: HeaderMap,
    pub(crate) body: ResBody,
    /// 延迟渲染的响应体，需调用 [`Response::render`] 后才可读取
    pub(crate) deferred: Option<Box<dyn DeferredRender>>,
}

impl fmt::Debug for Response {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "{}\n{:?}", self.status, self.headers)
    }
}

impl Display for Response {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Response {
    /// 创建空响应体
    pub fn empty() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: ResBody::None,
            deferred: None,
        }
    }
    /// 生成文本响应
    #[inline]
    pub fn text(text: &str) -> Self {
        let mut res = Self::empty();
        res.set_typed_header(ContentType::text_utf8());
        res.set_body(full(text.as_bytes().to_vec()));
        res
    }
    /// 生成html响应
    #[inline]
    pub fn html(html: &str) -> Self {
        let mut res = Self::empty();
        res.set_typed_header(html_utf8());
        res.set_body(full(html.as_bytes().to_vec()));
        res
    }
    /// 生成永久重定向响应（301）
    #[inline]
    pub fn redirect(url: &str) -> SsgResult<Self> {
        Self::redirect_with_status(url, StatusCode::MOVED_PERMANENTLY)
    }
    /// 生成临时重定向响应（302）
    #[inline]
    pub fn redirect_found(url: &str) -> SsgResult<Self> {
        Self::redirect_with_status(url, StatusCode::FOUND)
    }
    fn redirect_with_status(url: &str, status: StatusCode) -> SsgResult<Self> {
        let mut res = Self::empty();
        res.status = status;
        res.set_typed_header(html_utf8());
        res.headers.insert(
            header::LOCATION,
            url.parse().map_err(|e| {
                SsgError::business_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("redirect error: {e}"),
                )
            })?,
        );
        Ok(res)
    }
    /// 生成 404 响应
    pub fn not_found(path: &str) -> Self {
        let mut res = Self::html(&format!(
            "<!DOCTYPE html>\n<html><head><title>Not Found</title></head>\
             <body><h1>Not Found</h1><p>The requested resource was not found on this server: {}</p></body></html>\n",
            tera::escape_html(path)
        ));
        res.set_status(StatusCode::NOT_FOUND);
        res
    }
    /// 生成延迟渲染的响应，读取响应体前需调用 [`Response::render`]
    pub fn deferred(view: impl DeferredRender + 'static) -> Self {
        let mut res = Self::empty();
        res.set_typed_header(html_utf8());
        res.deferred = Some(Box::new(view));
        res
    }

    /// 获取响应状态码
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }
    /// 设置响应状态
    #[inline]
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }
    /// 包含响应状态
    #[inline]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
    /// 设置响应body
    #[inline]
    pub fn set_body(&mut self, body: ResBody) {
        self.body = body;
    }
    /// 包含响应body
    #[inline]
    pub fn with_body(mut self, body: ResBody) -> Self {
        self.body = body;
        self
    }
    /// 获取响应体
    #[inline]
    pub fn body(&self) -> &ResBody {
        &self.body
    }
    /// 取出响应体（将内部body置为空）
    #[inline]
    pub fn take_body(&mut self) -> ResBody {
        std::mem::replace(&mut self.body, ResBody::None)
    }
    /// 获取响应header
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
    /// 获取可变响应header
    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
    /// 设置响应header
    #[inline]
    pub fn set_header(&mut self, key: header::HeaderName, value: header::HeaderValue) {
        self.headers.insert(key, value);
    }
    /// 设置响应header
    #[inline]
    pub fn set_typed_header<H>(&mut self, header: H)
    where
        H: Header,
    {
        self.headers.typed_insert(header);
    }
    /// 包含响应header
    #[inline]
    pub fn with_typed_header<H>(mut self, header: H) -> Self
    where
        H: Header,
    {
        self.headers.typed_insert(header);
        self
    }
    /// Content-Type 原始值
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
    /// Location 原始值
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    }
    /// 是否为流式响应
    #[inline]
    pub fn is_streaming(&self) -> bool {
        self.body.is_stream()
    }
    /// 是否仍有未渲染的延迟响应体
    #[inline]
    pub fn needs_render(&self) -> bool {
        self.deferred.is_some()
    }
    /// 渲染延迟响应体；重复调用无副作用
    pub fn render(&mut self) -> SsgResult<()> {
        if let Some(view) = self.deferred.take() {
            let rendered = view.render()?;
            self.body = ResBody::Once(rendered);
        }
        Ok(())
    }
}

impl From<Response> for http::Response<ResBody> {
    fn from(value: Response) -> Self {
        let Response {
            status,
            headers,
            body,
            ..
        } = value;
        let mut res = http::Response::new(body);
        *res.status_mut() = status;
        *res.headers_mut() = headers;
        res
    }
}

/// `text/html; charset=utf-8`
pub(crate) fn html_utf8() -> ContentType {
    ContentType::from(mime::TEXT_HTML_UTF_8)
}

impl From<String> for Response {
    fn from(value: String) -> Self {
        Response::html(&value)
    }
}

impl From<&'static str> for Response {
    fn from(value: &'static str) -> Self {
        Response::html(value)
    }
}
