use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::core::path_param::Params;
use crate::handler::{Handler, HandlerWrapper};
use crate::{Request, Response, SsgResult};

mod locale;
mod marker;
mod route_table;
mod template;

pub use locale::LocaleContext;
pub use marker::{LazyParams, ParamSets, StaticMarker};
pub use route_table::{ResolvedRoute, RouteSettings, RouteTable};
pub use template::PathTemplate;

pub trait RouterAdapt {
    fn into_entry(self) -> RouteEntry;
}

/// 路由表中的一项：分组或叶子
#[derive(Clone)]
pub enum RouteEntry {
    Group(Group),
    Leaf(Leaf),
}

impl RouterAdapt for RouteEntry {
    fn into_entry(self) -> RouteEntry {
        self
    }
}

/// 语言前缀分组设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalePrefix {
    /// 默认语言是否也带前缀
    pub prefix_default_language: bool,
}

impl Default for LocalePrefix {
    fn default() -> Self {
        Self {
            prefix_default_language: true,
        }
    }
}

/// 路由分组
///
/// 分组的路径模板作为子路由的公共前缀；带 [`LocalePrefix`] 的分组会先匹配语言前缀
/// `{lang}/`，再匹配自身模板。
#[derive(Clone, Default)]
pub struct Group {
    pub path: PathTemplate,
    pub namespace: Option<String>,
    pub locale: Option<LocalePrefix>,
    pub children: Vec<RouteEntry>,
}

impl RouterAdapt for Group {
    fn into_entry(self) -> RouteEntry {
        RouteEntry::Group(self)
    }
}

impl Group {
    pub fn new(path: &str) -> Self {
        Self {
            path: PathTemplate::parse(path),
            ..Default::default()
        }
    }

    /// 按语言分发的分组，所有子路由都带 `{lang}/` 前缀
    pub fn i18n() -> Self {
        Self {
            locale: Some(LocalePrefix::default()),
            ..Default::default()
        }
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    /// 设置默认语言是否带前缀，同时将分组标记为语言分组
    pub fn prefix_default_language(mut self, prefix: bool) -> Self {
        self.locale = Some(LocalePrefix {
            prefix_default_language: prefix,
        });
        self
    }

    pub fn append<R: RouterAdapt>(mut self, route: R) -> Self {
        self.children.push(route.into_entry());
        self
    }

    pub fn extend<R, I>(mut self, routes: I) -> Self
    where
        R: RouterAdapt,
        I: IntoIterator<Item = R>,
    {
        self.children
            .extend(routes.into_iter().map(RouterAdapt::into_entry));
        self
    }
}

/// 叶子路由：路径模板、路由名、处理器与静态生成标记
#[derive(Clone)]
pub struct Leaf {
    pub path: PathTemplate,
    pub name: Option<String>,
    pub handler: Arc<dyn Handler>,
    pub marker: Option<StaticMarker>,
}

impl RouterAdapt for Leaf {
    fn into_entry(self) -> RouteEntry {
        RouteEntry::Leaf(self)
    }
}

impl Leaf {
    pub fn new<F, T, Fut>(path: &str, handler: F) -> Self
    where
        Fut: Future<Output = SsgResult<T>> + Send + 'static,
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        T: Into<Response>,
    {
        Self::with_handler(path, HandlerWrapper::new(handler).arc())
    }

    pub fn with_handler(path: &str, handler: Arc<dyn Handler>) -> Self {
        Self {
            path: PathTemplate::parse(path),
            name: None,
            handler,
            marker: None,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// 以默认参数（一组空绑定）参与静态生成
    pub fn include_in_ssg(mut self) -> Self {
        self.marker = Some(StaticMarker::default());
        self
    }

    /// 以固定的参数绑定参与静态生成
    pub fn ssg_params<I>(mut self, sets: I) -> Self
    where
        I: IntoIterator<Item = Params>,
    {
        self.marker = Some(StaticMarker::new(ParamSets::Fixed(
            sets.into_iter().collect(),
        )));
        self
    }

    /// 以延迟求值的参数绑定参与静态生成
    pub fn ssg_params_with<F>(mut self, sets: F) -> Self
    where
        F: Fn() -> Vec<Params> + Send + Sync + 'static,
    {
        self.marker = Some(StaticMarker::new(ParamSets::Lazy(Arc::new(sets))));
        self
    }

    pub fn is_static(&self) -> bool {
        self.marker.is_some()
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn get_route_str(pre_fix: &str, route: &RouteEntry) -> String {
            match route {
                RouteEntry::Leaf(leaf) => {
                    let name = leaf
                        .name
                        .as_deref()
                        .map(|n| format!("({n})"))
                        .unwrap_or_default();
                    let marker = if leaf.is_static() { " *" } else { "" };
                    format!("{pre_fix}/{}{name}{marker}", leaf.path)
                }
                RouteEntry::Group(group) => {
                    let space_pre_fix = format!("    {pre_fix}");
                    let namespace = group
                        .namespace
                        .as_deref()
                        .map(|n| format!("[{n}]"))
                        .unwrap_or_default();
                    let locale = match group.locale {
                        Some(l) if l.prefix_default_language => "<lang>",
                        Some(_) => "<lang?>",
                        None => "",
                    };
                    let mut route_strs: Vec<String> = group
                        .children
                        .iter()
                        .map(|r| get_route_str(&space_pre_fix, r))
                        .collect();
                    route_strs.insert(0, format!("{pre_fix}/{locale}{}{namespace}", group.path));
                    route_strs.join("\n")
                }
            }
        }
        write!(f, "{}", get_route_str("", self))
    }
}
