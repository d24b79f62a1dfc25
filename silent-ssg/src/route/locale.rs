/// 遍历与反向解析时的语言上下文
///
/// 以值的形式向下传递，离开作用域即恢复外层状态。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleContext {
    /// 当前激活的语言，None 表示使用默认语言
    pub active: Option<String>,
    /// 是否需要额外生成去掉默认语言前缀的 URL
    pub force_bare_fallback: bool,
}

impl LocaleContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定激活语言
    pub fn with_active(mut self, lang: impl Into<String>) -> Self {
        self.active = Some(lang.into());
        self
    }

    /// 进入语言分组后的子作用域
    pub(crate) fn enter(&self, lang: &str, prefix_default_language: bool, language_code: &str) -> Self {
        Self {
            active: Some(lang.to_string()),
            force_bare_fallback: self.force_bare_fallback
                || (prefix_default_language && lang == language_code),
        }
    }

    /// 当前生效的语言
    pub fn language<'a>(&'a self, language_code: &'a str) -> &'a str {
        self.active.as_deref().unwrap_or(language_code)
    }
}
