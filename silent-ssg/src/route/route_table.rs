use std::fmt;

use tracing::debug;

use super::{Group, Leaf, LocaleContext, RouteEntry, RouterAdapt};
use crate::core::path_param::Params;
use crate::{SsgError, SsgResult};

/// 路由表全局设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSettings {
    /// 未匹配且不以 `/` 结尾的路径是否重定向到带 `/` 的版本
    pub append_slash: bool,
    /// 默认语言
    pub language_code: String,
    /// 已配置的语言（有序）
    pub languages: Vec<String>,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            append_slash: true,
            language_code: "en".to_string(),
            languages: vec!["en".to_string()],
        }
    }
}

impl RouteSettings {
    pub fn with_append_slash(mut self, append_slash: bool) -> Self {
        self.append_slash = append_slash;
        self
    }

    pub fn with_language_code(mut self, language_code: &str) -> Self {
        self.language_code = language_code.to_string();
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// 语言分组中某个语言对应的前缀（不含前导 `/`，含尾部 `/`）
    pub(crate) fn language_prefix(&self, lang: &str, prefix_default_language: bool) -> String {
        if !prefix_default_language && lang == self.language_code {
            String::new()
        } else {
            format!("{lang}/")
        }
    }
}

/// 路由匹配结果
pub struct ResolvedRoute<'a> {
    pub leaf: &'a Leaf,
    pub params: Params,
    /// 匹配到的语言前缀对应的语言
    pub locale: Option<String>,
    /// 含命名空间的路由名
    pub name: Option<String>,
}

impl fmt::Debug for ResolvedRoute<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedRoute")
            .field("path", &self.leaf.path)
            .field("params", &self.params)
            .field("locale", &self.locale)
            .field("name", &self.name)
            .finish()
    }
}

/// 匹配时的作用域
#[derive(Clone, Default)]
struct Scope {
    namespaces: Vec<String>,
    locale: Option<String>,
}

impl Scope {
    fn qualify(&self, name: &str) -> String {
        let mut parts = self.namespaces.clone();
        parts.push(name.to_string());
        parts.join(".")
    }
}

/// 路由表：有序的路由项与全局设置，构建完成后只读
#[derive(Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    settings: RouteSettings,
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routes: Vec<String> = self.entries.iter().map(|r| format!("{r:?}")).collect();
        write!(f, "{}", routes.join("\n"))
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: RouteSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn append<R: RouterAdapt>(mut self, route: R) -> Self {
        self.entries.push(route.into_entry());
        self
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn settings(&self) -> &RouteSettings {
        &self.settings
    }

    /// 匹配以 `/` 开头的已解码路径
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute<'_>> {
        let input = path.strip_prefix('/').unwrap_or(path);
        let mut params = Params::new();
        let resolved = self.resolve_entries(&self.entries, input, &mut params, &Scope::default());
        debug!(path, matched = resolved.is_some(), "resolve");
        resolved
    }

    pub fn is_valid_path(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    fn resolve_entries<'a>(
        &'a self,
        entries: &'a [RouteEntry],
        input: &str,
        params: &mut Params,
        scope: &Scope,
    ) -> Option<ResolvedRoute<'a>> {
        entries.iter().find_map(|entry| match entry {
            RouteEntry::Leaf(leaf) => leaf.path.match_with(input, params, &mut |rest, params| {
                rest.is_empty().then(|| ResolvedRoute {
                    leaf,
                    params: params.clone(),
                    locale: scope.locale.clone(),
                    name: leaf.name.as_deref().map(|n| scope.qualify(n)),
                })
            }),
            RouteEntry::Group(group) => self.resolve_group(group, input, params, scope),
        })
    }

    fn resolve_group<'a>(
        &'a self,
        group: &'a Group,
        input: &str,
        params: &mut Params,
        scope: &Scope,
    ) -> Option<ResolvedRoute<'a>> {
        let mut child_scope = scope.clone();
        if let Some(ns) = &group.namespace {
            child_scope.namespaces.push(ns.clone());
        }
        let Some(locale) = group.locale else {
            return group.path.match_with(input, params, &mut |rest, params| {
                self.resolve_entries(&group.children, rest, params, &child_scope)
            });
        };
        self.settings.languages.iter().find_map(|lang| {
            let prefix = self
                .settings
                .language_prefix(lang, locale.prefix_default_language);
            let rest = input.strip_prefix(prefix.as_str())?;
            let mut lang_scope = child_scope.clone();
            lang_scope.locale = Some(lang.clone());
            group.path.match_with(rest, params, &mut |rest, params| {
                self.resolve_entries(&group.children, rest, params, &lang_scope)
            })
        })
    }

    /// 反向解析：按含命名空间的路由名与参数生成以 `/` 开头的 URL
    pub fn reverse(&self, name: &str, params: &Params, locale: &LocaleContext) -> SsgResult<String> {
        let mut reasons = Vec::new();
        let found = self.reverse_entries(
            &self.entries,
            name,
            params,
            locale,
            &Reversing::default(),
            &mut reasons,
        );
        match found {
            Some(url) => Ok(url),
            None => Err(SsgError::NoReverseMatch {
                name: name.to_string(),
                reason: if reasons.is_empty() {
                    "no route with this name is registered".to_string()
                } else {
                    reasons.join("; ")
                },
            }),
        }
    }

    fn reverse_entries(
        &self,
        entries: &[RouteEntry],
        name: &str,
        params: &Params,
        locale: &LocaleContext,
        state: &Reversing,
        reasons: &mut Vec<String>,
    ) -> Option<String> {
        entries.iter().find_map(|entry| match entry {
            RouteEntry::Leaf(leaf) => {
                let leaf_name = leaf.name.as_deref()?;
                if state.scope.qualify(leaf_name) != name {
                    return None;
                }
                let mut url = state.url.clone();
                let mut expected = state.expected.clone();
                expected.extend(leaf.path.param_names().map(str::to_string));
                if let Some(extra) = params.keys().find(|k| !expected.contains(k)) {
                    reasons.push(format!("unexpected parameter `{extra}`"));
                    return None;
                }
                match leaf.path.render_into(params, &mut url) {
                    Ok(()) => Some(url),
                    Err(reason) => {
                        reasons.push(reason);
                        None
                    }
                }
            }
            RouteEntry::Group(group) => {
                let mut next = state.clone();
                if let Some(ns) = &group.namespace {
                    next.scope.namespaces.push(ns.clone());
                }
                if let Some(prefix) = group.locale {
                    let lang = locale.language(&self.settings.language_code);
                    next.url.push_str(
                        &self
                            .settings
                            .language_prefix(lang, prefix.prefix_default_language),
                    );
                }
                if !name.starts_with(&next.scope.qualify("")) {
                    return None;
                }
                next.expected
                    .extend(group.path.param_names().map(str::to_string));
                if let Err(reason) = group.path.render_into(params, &mut next.url) {
                    reasons.push(reason);
                    return None;
                }
                self.reverse_entries(&group.children, name, params, locale, &next, reasons)
            }
        })
    }

    /// 是否存在要求默认语言也带前缀的语言分组
    pub fn prefixes_default_language(&self) -> bool {
        fn walk(entries: &[RouteEntry]) -> bool {
            entries.iter().any(|entry| match entry {
                RouteEntry::Leaf(_) => false,
                RouteEntry::Group(group) => {
                    group.locale.is_some_and(|l| l.prefix_default_language)
                        || walk(&group.children)
                }
            })
        }
        walk(&self.entries)
    }

    /// 路径开头的已配置语言，`/nl/about/` 与 `/nl` 均返回 `nl`
    pub fn language_from_path<'a>(&'a self, path: &str) -> Option<&'a str> {
        let first = path.strip_prefix('/')?.split('/').next()?;
        self.settings
            .languages
            .iter()
            .find(|lang| lang.as_str() == first)
            .map(String::as_str)
    }
}

/// 反向解析时沿路径累积的状态
#[derive(Clone)]
struct Reversing {
    scope: Scope,
    url: String,
    expected: Vec<String>,
}

impl Default for Reversing {
    fn default() -> Self {
        Self {
            scope: Scope::default(),
            url: "/".to_string(),
            expected: Vec::new(),
        }
    }
}
