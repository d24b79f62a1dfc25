//! 多语言辅助函数
//!
//! 基于当前路径得到同一页面在其它语言下的 URL，也可注册为 tera 过滤器在模板中使用：
//!
//! ```text
//! <a href="{{ path | language_url(lang='nl') }}">Nederlands</a>
//! {% for lang in path | alt_languages %}{{ lang }}{% endfor %}
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use tera::{Tera, Value};

use crate::route::{LocaleContext, RouteTable};
use crate::{SsgError, SsgResult};

/// 匹配 `path` 并以同样的路由与参数在 `lang` 下反向解析，查询串会被丢弃
pub fn language_url(table: &RouteTable, path: &str, lang: &str) -> SsgResult<String> {
    let path = decode_path(path)?;
    let path = path.as_ref();
    let resolved = table
        .resolve(path)
        .ok_or_else(|| SsgError::NoRouteMatch(path.to_string()))?;
    let name = resolved.name.as_deref().ok_or_else(|| SsgError::NoReverseMatch {
        name: String::new(),
        reason: format!("route for `{path}` has no name"),
    })?;
    table.reverse(name, &resolved.params, &LocaleContext::new().with_active(lang))
}

/// 页面 URL 与当前语言不同的已配置语言
pub fn alt_languages(table: &RouteTable, path: &str) -> SsgResult<Vec<String>> {
    let resolved = table
        .resolve(&decode_path(path)?)
        .ok_or_else(|| SsgError::NoRouteMatch(path.to_string()))?;
    let current_lang = resolved
        .locale
        .clone()
        .unwrap_or_else(|| table.settings().language_code.clone());
    let current = language_url(table, path, &current_lang)?;
    let mut languages = Vec::new();
    for lang in &table.settings().languages {
        if language_url(table, path, lang)? != current {
            languages.push(lang.clone());
        }
    }
    Ok(languages)
}

/// 去掉查询串与片段并解码，与请求分发时的匹配路径一致
fn decode_path(path: &str) -> SsgResult<Cow<'_, str>> {
    let path = path.split_once(['?', '#']).map_or(path, |(p, _)| p);
    urlencoding::decode(path).map_err(|_| SsgError::NoRouteMatch(path.to_string()))
}

/// 注册 `language_url(lang=...)` 与 `alt_languages` 两个过滤器
pub fn register_filters(tera: &mut Tera, table: Arc<RouteTable>) {
    let routes = Arc::clone(&table);
    tera.register_filter(
        "language_url",
        move |value: &Value, args: &HashMap<String, Value>| {
            let path = value
                .as_str()
                .ok_or_else(|| tera::Error::msg("language_url expects a path string"))?;
            let lang = args
                .get("lang")
                .and_then(Value::as_str)
                .ok_or_else(|| tera::Error::msg("language_url requires a `lang` argument"))?;
            language_url(&routes, path, lang)
                .map(Value::String)
                .map_err(|e| tera::Error::msg(e.to_string()))
        },
    );
    tera.register_filter(
        "alt_languages",
        move |value: &Value, _: &HashMap<String, Value>| {
            let path = value
                .as_str()
                .ok_or_else(|| tera::Error::msg("alt_languages expects a path string"))?;
            let languages =
                alt_languages(&table, path).map_err(|e| tera::Error::msg(e.to_string()))?;
            Ok(Value::Array(languages.into_iter().map(Value::String).collect()))
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{Group, Leaf, RouteSettings};
    use crate::Request;
    use tera::Context;

    async fn page(_req: Request) -> SsgResult<&'static str> {
        Ok("page")
    }

    fn table() -> RouteTable {
        RouteTable::new()
            .with_settings(RouteSettings::default().with_languages(["en", "nl"]))
            .append(
                Group::i18n()
                    .append(Leaf::new("about/", page).name("about"))
                    .append(Leaf::new("blog/<slug>/", page).name("blog_entry")),
            )
            .append(Leaf::new("non-i18n/", page).name("non_i18n"))
    }

    #[test]
    fn test_language_url() {
        let table = table();
        assert_eq!(language_url(&table, "/en/about/", "nl").unwrap(), "/nl/about/");
        assert_eq!(
            language_url(&table, "/nl/blog/first-entry/?page=2", "en").unwrap(),
            "/en/blog/first-entry/"
        );
        assert!(matches!(
            language_url(&table, "/missing/", "nl"),
            Err(SsgError::NoRouteMatch(_))
        ));
    }

    #[test]
    fn test_language_url_decodes_path() {
        let table = table();
        assert_eq!(
            language_url(&table, "/en/blog/a%20b/", "nl").unwrap(),
            "/nl/blog/a%20b/"
        );
        assert_eq!(alt_languages(&table, "/nl/blog/a%20b/").unwrap(), vec!["en"]);
        assert!(matches!(
            language_url(&table, "/en/blog/%FF/", "nl"),
            Err(SsgError::NoRouteMatch(_))
        ));
    }

    #[test]
    fn test_alt_languages() {
        let table = table();
        assert_eq!(alt_languages(&table, "/en/about/").unwrap(), vec!["nl"]);
        assert_eq!(alt_languages(&table, "/nl/about/").unwrap(), vec!["en"]);
        assert!(alt_languages(&table, "/non-i18n/").unwrap().is_empty());
    }

    #[test]
    fn test_tera_filters() {
        let mut tera = Tera::default();
        register_filters(&mut tera, Arc::new(table()));
        tera.add_raw_template(
            "links.txt",
            "{{ path | language_url(lang='nl') }}|{% for l in path | alt_languages %}{{ l }}{% endfor %}",
        )
        .unwrap();
        let mut ctx = Context::new();
        ctx.insert("path", "/en/blog/second-entry/");
        assert_eq!(
            tera.render("links.txt", &ctx).unwrap(),
            "/nl/blog/second-entry/|nl"
        );
    }
}
