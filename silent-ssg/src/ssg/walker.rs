use std::collections::{HashMap, VecDeque};
use std::slice;

use tracing::debug;

use crate::core::path_param::Params;
use crate::route::{Leaf, LocaleContext, ParamSets, RouteEntry, RouteTable};
use crate::{SsgError, SsgResult};

/// URL 的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlVariant {
    /// 反向解析得到的规范 URL
    Canonical,
    /// 去掉默认语言前缀后的 URL，用于捕获语言重定向
    BareLocale,
    /// 去掉尾部 `/` 的规范 URL，用于捕获补 `/` 重定向
    NoSlash,
    /// 同时去掉语言前缀与尾部 `/`
    BareLocaleNoSlash,
}

impl UrlVariant {
    fn without_slash(self) -> Self {
        match self {
            UrlVariant::Canonical | UrlVariant::NoSlash => UrlVariant::NoSlash,
            UrlVariant::BareLocale | UrlVariant::BareLocaleNoSlash => UrlVariant::BareLocaleNoSlash,
        }
    }
}

/// 需要生成静态文件的具体 URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcreteUrl {
    /// 以 `/` 开头的站内 URL
    pub url: String,
    /// 含命名空间的路由名
    pub route_name: String,
    pub params: Params,
    /// 遍历时激活的语言
    pub locale: Option<String>,
    pub variant: UrlVariant,
}

struct Frame<'a> {
    entries: slice::Iter<'a, RouteEntry>,
    namespaces: Vec<String>,
    locale: LocaleContext,
}

/// 路由表遍历器，按声明顺序深度优先产出所有需要生成的 URL
///
/// 反向解析失败时产出一次错误，随后结束。
pub struct StaticUrls<'a> {
    table: &'a RouteTable,
    stack: Vec<Frame<'a>>,
    pending: VecDeque<ConcreteUrl>,
    lazy_params: HashMap<usize, Vec<Params>>,
    finished: bool,
}

/// 遍历路由表，返回可重新调用的 URL 迭代器
pub fn static_urls(table: &RouteTable) -> StaticUrls<'_> {
    StaticUrls {
        table,
        stack: vec![Frame {
            entries: table.entries().iter(),
            namespaces: Vec::new(),
            locale: LocaleContext::new(),
        }],
        pending: VecDeque::new(),
        lazy_params: HashMap::new(),
        finished: false,
    }
}

impl<'a> Iterator for StaticUrls<'a> {
    type Item = SsgResult<ConcreteUrl>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(url) = self.pending.pop_front() {
                return Some(Ok(url));
            }
            if self.finished {
                return None;
            }
            let Some(frame) = self.stack.last_mut() else {
                self.finished = true;
                return None;
            };
            let Some(entry) = frame.entries.next() else {
                self.stack.pop();
                continue;
            };
            let namespaces = frame.namespaces.clone();
            let locale = frame.locale.clone();
            match entry {
                RouteEntry::Group(group) => {
                    let mut namespaces = namespaces;
                    if let Some(ns) = &group.namespace {
                        namespaces.push(ns.clone());
                    }
                    match group.locale {
                        None => self.stack.push(Frame {
                            entries: group.children.iter(),
                            namespaces,
                            locale,
                        }),
                        Some(prefix) => {
                            let settings = self.table.settings();
                            // 逆序入栈，保证按语言配置顺序出栈
                            for lang in settings.languages.iter().rev() {
                                self.stack.push(Frame {
                                    entries: group.children.iter(),
                                    namespaces: namespaces.clone(),
                                    locale: locale.enter(
                                        lang,
                                        prefix.prefix_default_language,
                                        &settings.language_code,
                                    ),
                                });
                            }
                        }
                    }
                }
                RouteEntry::Leaf(leaf) => {
                    if leaf.marker.is_none() {
                        continue;
                    }
                    match self.expand(leaf, &namespaces, &locale) {
                        Ok(urls) => self.pending.extend(urls),
                        Err(err) => {
                            self.finished = true;
                            self.stack.clear();
                            return Some(Err(err));
                        }
                    }
                }
            }
        }
    }
}

impl StaticUrls<'_> {
    fn bindings(&mut self, leaf: &Leaf) -> Vec<Params> {
        match leaf.marker.as_ref().map(|m| &m.params) {
            None => Vec::new(),
            Some(ParamSets::Fixed(sets)) => sets.clone(),
            Some(ParamSets::Lazy(f)) => self
                .lazy_params
                .entry(std::ptr::from_ref(leaf) as usize)
                .or_insert_with(|| f())
                .clone(),
        }
    }

    fn expand(
        &mut self,
        leaf: &Leaf,
        namespaces: &[String],
        locale: &LocaleContext,
    ) -> SsgResult<Vec<ConcreteUrl>> {
        let name = leaf.name.as_deref().ok_or_else(|| {
            SsgError::config_error(format!(
                "route `{}` is included in the static build but has no name",
                leaf.path
            ))
        })?;
        let route_name = namespaces
            .iter()
            .map(String::as_str)
            .chain([name])
            .collect::<Vec<_>>()
            .join(".");
        let table = self.table;
        let settings = table.settings();
        let mut urls = Vec::new();
        for params in self.bindings(leaf) {
            let canonical = table.reverse(&route_name, &params, locale)?;
            let mut page_urls = vec![(canonical.clone(), UrlVariant::Canonical)];
            if locale.force_bare_fallback {
                let bare = strip_language_prefix(&canonical, &settings.language_code);
                if bare != canonical {
                    page_urls.push((bare, UrlVariant::BareLocale));
                }
            }
            if settings.append_slash && canonical.ends_with('/') {
                let stripped: Vec<_> = page_urls
                    .iter()
                    .filter_map(|(url, variant)| {
                        let url = url.strip_suffix('/').unwrap_or(url);
                        (!url.is_empty()).then(|| (url.to_string(), variant.without_slash()))
                    })
                    .collect();
                page_urls.extend(stripped);
            }
            debug!(route = %route_name, count = page_urls.len(), "expand");
            urls.extend(page_urls.into_iter().map(|(url, variant)| ConcreteUrl {
                url,
                route_name: route_name.clone(),
                params: params.clone(),
                locale: locale.active.clone(),
                variant,
            }));
        }
        Ok(urls)
    }
}

/// 去掉 `/{lang}` 前缀，仅在路径段边界处生效；结果为空时返回 `/`
pub(crate) fn strip_language_prefix(url: &str, lang: &str) -> String {
    let prefix = format!("/{lang}");
    match url.strip_prefix(prefix.as_str()) {
        Some("") => "/".to_string(),
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{Group, RouteSettings};
    use crate::{Request, params};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn page(_req: Request) -> SsgResult<&'static str> {
        Ok("page")
    }

    fn settings() -> RouteSettings {
        RouteSettings::default().with_languages(["en", "nl"])
    }

    fn urls(table: &RouteTable) -> Vec<String> {
        static_urls(table).map(|u| u.unwrap().url).collect()
    }

    // ==================== 遍历顺序测试 ====================

    #[test]
    fn test_about_variants_per_locale() {
        let table = RouteTable::new().with_settings(settings()).append(
            Group::i18n().append(Leaf::new("about/", page).name("about").include_in_ssg()),
        );
        assert_eq!(
            urls(&table),
            vec!["/en/about/", "/about/", "/en/about", "/about", "/nl/about/", "/nl/about"]
        );
        let variants: Vec<_> = static_urls(&table).map(|u| u.unwrap().variant).collect();
        assert_eq!(
            &variants[..4],
            &[
                UrlVariant::Canonical,
                UrlVariant::BareLocale,
                UrlVariant::NoSlash,
                UrlVariant::BareLocaleNoSlash
            ]
        );
    }

    #[test]
    fn test_landing_skips_empty_bare_noslash() {
        let table = RouteTable::new()
            .with_settings(RouteSettings::default())
            .append(Group::i18n().append(Leaf::new("", page).name("landing").include_in_ssg()));
        assert_eq!(urls(&table), vec!["/en/", "/", "/en"]);
    }

    #[test]
    fn test_without_default_prefix_has_no_bare_urls() {
        let table = RouteTable::new().with_settings(settings()).append(
            Group::i18n()
                .prefix_default_language(false)
                .append(Leaf::new("about/", page).name("about").include_in_ssg()),
        );
        assert_eq!(urls(&table), vec!["/about/", "/about", "/nl/about/", "/nl/about"]);
    }

    #[test]
    fn test_append_slash_disabled() {
        let table = RouteTable::new()
            .with_settings(RouteSettings::default().with_append_slash(false))
            .append(Leaf::new("non-i18n/", page).name("non_i18n").include_in_ssg());
        assert_eq!(urls(&table), vec!["/non-i18n/"]);
    }

    #[test]
    fn test_unmarked_leaf_is_invisible() {
        let table = RouteTable::new()
            .append(Leaf::new("not-included/", page).name("not_included"))
            .append(Leaf::new("robots.txt", page).name("robots").include_in_ssg());
        assert_eq!(urls(&table), vec!["/robots.txt"]);
    }

    // ==================== 参数绑定测试 ====================

    #[test]
    fn test_one_url_per_binding_in_order() {
        let table = RouteTable::new()
            .with_settings(RouteSettings::default().with_append_slash(false))
            .append(
                Group::new("blog/").namespace("blog").append(
                    Leaf::new("<slug>/", page).name("entry").ssg_params([
                        params([("slug", "first-entry")]),
                        params([("slug", "second-entry")]),
                        params([("slug", "third-entry")]),
                    ]),
                ),
            );
        let found: Vec<_> = static_urls(&table).map(|u| u.unwrap()).collect();
        assert_eq!(found.len(), 3);
        assert_eq!(found[1].url, "/blog/second-entry/");
        assert_eq!(found[1].route_name, "blog.entry");
        assert_eq!(found[1].params, params([("slug", "second-entry")]));
    }

    #[test]
    fn test_lazy_params_evaluated_once_across_locales() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let table = RouteTable::new().with_settings(settings()).append(
            Group::i18n().append(Leaf::new("blog/<slug>/", page).name("entry").ssg_params_with(
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    vec![params([("slug", "a")])]
                },
            )),
        );
        assert_eq!(urls(&table).len(), 6);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // 重新遍历会重新求值
        assert_eq!(urls(&table).len(), 6);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_bindings_yield_nothing() {
        let table = RouteTable::new()
            .append(Leaf::new("<slug>/", page).name("entry").ssg_params(Vec::new()));
        assert!(urls(&table).is_empty());
    }

    // ==================== 错误测试 ====================

    #[test]
    fn test_reverse_error_yielded_once() {
        let table = RouteTable::new()
            .append(Leaf::new("blog/<slug>/", page).name("entry").include_in_ssg())
            .append(Leaf::new("about/", page).name("about").include_in_ssg());
        let mut iter = static_urls(&table);
        assert!(matches!(iter.next(), Some(Err(SsgError::NoReverseMatch { .. }))));
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_unnamed_marked_leaf_is_config_error() {
        let table = RouteTable::new().append(Leaf::new("about/", page).include_in_ssg());
        let first = static_urls(&table).next();
        assert!(matches!(first, Some(Err(SsgError::ConfigError(_)))));
    }

    #[test]
    fn test_strip_language_prefix_at_segment_boundary() {
        assert_eq!(strip_language_prefix("/en/", "en"), "/");
        assert_eq!(strip_language_prefix("/en", "en"), "/");
        assert_eq!(strip_language_prefix("/en/about/", "en"), "/about/");
        assert_eq!(strip_language_prefix("/english/", "en"), "/english/");
    }
}
