use serde::{Deserialize, Serialize};
use tera::{Context, Tera};

use crate::{SsgError, SsgResult};

pub const DEFAULT_REDIRECT_STYLE: &str =
    "html { background-color: black; color: white; } a { color: white; }";
pub const DEFAULT_REDIRECT_MESSAGE: &str = "Redirecting...";
pub const DEFAULT_REDIRECT_NOSCRIPT: &str =
    "If you are not redirected automatically, follow this link:";

const TEMPLATE_NAME: &str = "ssg/redirect.html";

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{ redirect_message }}</title>
<meta http-equiv="refresh" content="0; url={{ redirect_url }}">
<link rel="canonical" href="{{ redirect_url }}">
<style>{{ redirect_style | safe }}</style>
<script>window.location.replace(document.querySelector('link[rel="canonical"]').href);</script>
</head>
<body>
<p>{{ redirect_message }}</p>
<noscript><p>{{ redirect_noscript }} <a href="{{ redirect_url }}">{{ redirect_url }}</a></p></noscript>
</body>
</html>
"#;

/// 重定向页面的文案与样式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectContext {
    #[serde(rename = "redirect_style")]
    pub style: String,
    #[serde(rename = "redirect_message")]
    pub message: String,
    #[serde(rename = "redirect_noscript")]
    pub noscript: String,
}

impl Default for RedirectContext {
    fn default() -> Self {
        Self {
            style: DEFAULT_REDIRECT_STYLE.to_string(),
            message: DEFAULT_REDIRECT_MESSAGE.to_string(),
            noscript: DEFAULT_REDIRECT_NOSCRIPT.to_string(),
        }
    }
}

impl RedirectContext {
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_noscript(mut self, noscript: impl Into<String>) -> Self {
        self.noscript = noscript.into();
        self
    }
}

/// 已编译的重定向页面模板，每次构建编译一次
pub struct RedirectPage {
    tera: Tera,
    context: RedirectContext,
}

impl RedirectPage {
    pub fn new(context: RedirectContext) -> SsgResult<Self> {
        Self::with_template(context, DEFAULT_TEMPLATE)
    }

    /// 使用自定义模板，可用变量：`redirect_url`、`redirect_style`、
    /// `redirect_message`、`redirect_noscript`
    pub fn with_template(context: RedirectContext, template: &str) -> SsgResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, template)
            .map_err(|e| SsgError::config_error(format!("invalid redirect template: {e}")))?;
        Ok(Self { tera, context })
    }

    pub fn context(&self) -> &RedirectContext {
        &self.context
    }

    /// 渲染指向 `location` 的重定向页面
    pub fn render(&self, location: &str) -> SsgResult<String> {
        let mut ctx = Context::from_serialize(&self.context)?;
        ctx.insert("redirect_url", location);
        Ok(self.tera.render(TEMPLATE_NAME, &ctx)?)
    }
}

/// 从重定向页面中取出跳转目标
pub fn parse_redirect_target(html: &str) -> Option<String> {
    const MARKER: &str = "http-equiv=\"refresh\"";
    let meta = &html[html.find(MARKER)?..];
    let content = &meta[meta.find("content=\"")? + "content=\"".len()..];
    let content = &content[..content.find('"')?];
    let (_, url) = content.split_once("url=")?;
    Some(unescape_html(url.trim()))
}

fn unescape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let entity = rest.find(';').map(|end| (&rest[..=end], end));
        let decoded = entity.and_then(|(entity, end)| {
            let ch = match entity {
                "&amp;" => '&',
                "&lt;" => '<',
                "&gt;" => '>',
                "&quot;" => '"',
                "&#x27;" | "&#39;" => '\'',
                "&#x2F;" | "&#47;" => '/',
                _ => return None,
            };
            Some((ch, end))
        });
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
