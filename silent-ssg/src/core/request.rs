use std::collections::HashMap;

use http::request::Parts;
use http::{HeaderMap, Method, Uri};

use crate::core::path_param::{Params, PathParam};
use crate::{SsgError, SsgResult};

/// 请求体
///
/// 模拟请求只需要请求头部分：方法、URI、请求头，再加上路由匹配得到的
/// 路径参数、语言以及路由名。
/// ```
/// use silent_ssg::Request;
/// let req = Request::empty();
/// assert_eq!(req.uri().path(), "/");
/// ```
#[derive(Debug)]
pub struct Request {
    parts: Parts,
    path_params: HashMap<String, PathParam>,
    locale: Option<String>,
    route_name: Option<String>,
}

impl Default for Request {
    fn default() -> Self {
        Self::empty()
    }
}

impl Request {
    /// 创建空请求
    pub fn empty() -> Self {
        let (parts, _) = http::Request::new(()).into_parts();
        Self {
            parts,
            path_params: HashMap::new(),
            locale: None,
            route_name: None,
        }
    }

    /// 创建指定 URI 的 GET 请求
    pub fn get(uri: Uri) -> Self {
        let mut req = Self::empty();
        req.parts.uri = uri;
        req
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.parts.method
    }
    #[inline]
    pub fn method_mut(&mut self) -> &mut Method {
        &mut self.parts.method
    }
    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }
    #[inline]
    pub fn uri_mut(&mut self) -> &mut Uri {
        &mut self.parts.uri
    }
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }
    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.parts.headers
    }

    /// 当前请求所属语言
    ///
    /// 由语言分组匹配时写入；非多语言路由为 `None`。
    #[inline]
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
    #[inline]
    pub(crate) fn set_locale(&mut self, locale: Option<String>) {
        self.locale = locale;
    }

    /// 命中路由的完整名称（含命名空间）
    #[inline]
    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }
    #[inline]
    pub(crate) fn set_route_name(&mut self, name: Option<String>) {
        self.route_name = name;
    }

    /// 设置路径参数
    pub(crate) fn set_path_params(&mut self, key: String, value: PathParam) {
        self.path_params.insert(key, value);
    }
    pub(crate) fn extend_path_params(&mut self, params: Params) {
        for (key, value) in params {
            self.set_path_params(key, value);
        }
    }

    /// 获取路径参数集合
    pub fn path_params(&self) -> &HashMap<String, PathParam> {
        &self.path_params
    }

    /// 获取路径参数
    pub fn get_path_params<'a, T>(&'a self, key: &str) -> SsgResult<T>
    where
        T: TryFrom<&'a PathParam, Error = SsgError>,
    {
        match self.path_params.get(key) {
            Some(value) => value.try_into(),
            None => Err(SsgError::ParamsNotFound),
        }
    }
}
