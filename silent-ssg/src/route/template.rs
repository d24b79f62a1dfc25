use std::fmt;
use std::iter;

use uuid::Uuid;

use crate::core::path_param::{Params, PathParam};

/// 特殊路径段 `<key:type>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SpecialPath {
    String(String),
    Int(String),
    I64(String),
    I32(String),
    U64(String),
    U32(String),
    Uuid(String),
    Path(String),
    FullPath(String),
}

impl From<&str> for SpecialPath {
    fn from(value: &str) -> Self {
        // 去除首尾的尖括号
        let value = value
            .strip_prefix('<')
            .and_then(|v| v.strip_suffix('>'))
            .unwrap_or(value);
        let mut type_str = value.splitn(2, ':');
        let key = type_str.next().unwrap_or("").to_string();
        let path_type = type_str.next().unwrap_or("");
        match path_type {
            "**" | "full_path" => SpecialPath::FullPath(key),
            "*" | "path" => SpecialPath::Path(key),
            "int" => SpecialPath::Int(key),
            "i64" => SpecialPath::I64(key),
            "i32" => SpecialPath::I32(key),
            "u64" => SpecialPath::U64(key),
            "u32" => SpecialPath::U32(key),
            "uuid" => SpecialPath::Uuid(key),
            _ => SpecialPath::String(key),
        }
    }
}

impl SpecialPath {
    pub(crate) fn key(&self) -> &str {
        match self {
            SpecialPath::String(key)
            | SpecialPath::Int(key)
            | SpecialPath::I64(key)
            | SpecialPath::I32(key)
            | SpecialPath::U64(key)
            | SpecialPath::U32(key)
            | SpecialPath::Uuid(key)
            | SpecialPath::Path(key)
            | SpecialPath::FullPath(key) => key,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            SpecialPath::String(_) => "str",
            SpecialPath::Int(_) => "int",
            SpecialPath::I64(_) => "i64",
            SpecialPath::I32(_) => "i32",
            SpecialPath::U64(_) => "u64",
            SpecialPath::U32(_) => "u32",
            SpecialPath::Uuid(_) => "uuid",
            SpecialPath::Path(_) => "path",
            SpecialPath::FullPath(_) => "full_path",
        }
    }

    /// 将一段已解码的路径解析为参数值
    fn parse(&self, raw: &str) -> Option<PathParam> {
        if raw.is_empty() {
            return None;
        }
        match self {
            SpecialPath::String(_) => Some(PathParam::Str(raw.to_string())),
            SpecialPath::Int(_) | SpecialPath::I64(_) => raw.parse::<i64>().ok().map(Into::into),
            SpecialPath::I32(_) => raw.parse::<i32>().ok().map(Into::into),
            SpecialPath::U64(_) => raw.parse::<u64>().ok().map(Into::into),
            SpecialPath::U32(_) => raw.parse::<u32>().ok().map(Into::into),
            SpecialPath::Uuid(_) => raw.parse::<Uuid>().ok().map(Into::into),
            SpecialPath::Path(_) | SpecialPath::FullPath(_) => {
                Some(PathParam::Path(raw.to_string()))
            }
        }
    }

    /// 将参数值渲染为 URL 片段，类型不符时返回 None
    fn render(&self, value: &PathParam) -> Option<String> {
        let rendered = match (self, value) {
            (SpecialPath::String(_), PathParam::Str(v)) if !v.is_empty() && !v.contains('/') => {
                urlencoding::encode(v).into_owned()
            }
            (SpecialPath::Int(_) | SpecialPath::I64(_), PathParam::Int(v)) => v.to_string(),
            (SpecialPath::Int(_) | SpecialPath::I64(_), PathParam::UInt(v)) => {
                i64::try_from(*v).ok()?.to_string()
            }
            (SpecialPath::I32(_), PathParam::Int(v)) => i32::try_from(*v).ok()?.to_string(),
            (SpecialPath::I32(_), PathParam::UInt(v)) => i32::try_from(*v).ok()?.to_string(),
            (SpecialPath::U64(_), PathParam::UInt(v)) => v.to_string(),
            (SpecialPath::U64(_), PathParam::Int(v)) => u64::try_from(*v).ok()?.to_string(),
            (SpecialPath::U32(_), PathParam::UInt(v)) => u32::try_from(*v).ok()?.to_string(),
            (SpecialPath::U32(_), PathParam::Int(v)) => u32::try_from(*v).ok()?.to_string(),
            (SpecialPath::Uuid(_), PathParam::Uuid(v)) => v.to_string(),
            (SpecialPath::Uuid(_), PathParam::Str(v)) => v.parse::<Uuid>().ok()?.to_string(),
            (SpecialPath::Path(_), PathParam::Str(v) | PathParam::Path(v))
                if !v.is_empty() && !v.contains('/') =>
            {
                urlencoding::encode(v).into_owned()
            }
            (SpecialPath::FullPath(_), PathParam::Str(v) | PathParam::Path(v))
                if !v.is_empty() =>
            {
                v.split('/')
                    .map(urlencoding::encode)
                    .collect::<Vec<_>>()
                    .join("/")
            }
            _ => return None,
        };
        Some(rendered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Param(SpecialPath),
}

/// 路径模板
///
/// 模板是相对路径（不以 `/` 开头），由字面量与 `<key:type>` 参数段组成，
/// 例如 `blog/<slug>/`。父级分组的模板作为前缀匹配，叶子的模板需完整匹配。
#[derive(Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    tokens: Vec<Token>,
}

impl fmt::Debug for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Default for PathTemplate {
    fn default() -> Self {
        PathTemplate::parse("")
    }
}

impl From<&str> for PathTemplate {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl PathTemplate {
    pub fn parse(template: &str) -> Self {
        let raw = template.trim_start_matches('/').to_string();
        let mut tokens = Vec::new();
        let mut rest = raw.as_str();
        while !rest.is_empty() {
            let param = rest
                .find('<')
                .and_then(|start| rest[start..].find('>').map(|len| (start, start + len)));
            match param {
                Some((start, end)) => {
                    if start > 0 {
                        tokens.push(Token::Literal(rest[..start].to_string()));
                    }
                    tokens.push(Token::Param(SpecialPath::from(&rest[start..=end])));
                    rest = &rest[end + 1..];
                }
                None => {
                    tokens.push(Token::Literal(rest.to_string()));
                    rest = "";
                }
            }
        }
        Self { raw, tokens }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// 模板声明的参数名
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Param(special) => Some(special.key()),
            Token::Literal(_) => None,
        })
    }

    /// 以前缀方式匹配 `input`，匹配成功后以剩余路径调用 `next`。
    ///
    /// `next` 返回 None 时回溯，尝试 `<key:**>` 的其它切分方式。
    pub(crate) fn match_with<R>(
        &self,
        input: &str,
        params: &mut Params,
        next: &mut dyn FnMut(&str, &mut Params) -> Option<R>,
    ) -> Option<R> {
        self.match_from(0, input, params, next)
    }

    fn match_from<R>(
        &self,
        idx: usize,
        input: &str,
        params: &mut Params,
        next: &mut dyn FnMut(&str, &mut Params) -> Option<R>,
    ) -> Option<R> {
        let Some(token) = self.tokens.get(idx) else {
            return next(input, params);
        };
        match token {
            Token::Literal(literal) => {
                let rest = input.strip_prefix(literal.as_str())?;
                self.match_from(idx + 1, rest, params, next)
            }
            Token::Param(special @ SpecialPath::FullPath(_)) => {
                let ends: Vec<usize> = input
                    .char_indices()
                    .map(|(i, _)| i)
                    .skip(1)
                    .chain(iter::once(input.len()))
                    .collect();
                ends.into_iter().rev().find_map(|end| {
                    self.try_param(special, idx, &input[..end], &input[end..], params, next)
                })
            }
            Token::Param(special) => {
                let end = input.find('/').unwrap_or(input.len());
                self.try_param(special, idx, &input[..end], &input[end..], params, next)
            }
        }
    }

    fn try_param<R>(
        &self,
        special: &SpecialPath,
        idx: usize,
        raw: &str,
        rest: &str,
        params: &mut Params,
        next: &mut dyn FnMut(&str, &mut Params) -> Option<R>,
    ) -> Option<R> {
        let value = special.parse(raw)?;
        let key = special.key().to_string();
        let previous = params.insert(key.clone(), value);
        let result = self.match_from(idx + 1, rest, params, next);
        if result.is_none() {
            match previous {
                Some(previous) => params.insert(key, previous),
                None => params.remove(&key),
            };
        }
        result
    }

    /// 以参数渲染模板并追加到 `out`，失败时返回原因
    pub(crate) fn render_into(&self, params: &Params, out: &mut String) -> Result<(), String> {
        for token in &self.tokens {
            match token {
                Token::Literal(literal) => out.push_str(literal),
                Token::Param(special) => {
                    let value = params
                        .get(special.key())
                        .ok_or_else(|| format!("missing parameter `{}`", special.key()))?;
                    let rendered = special.render(value).ok_or_else(|| {
                        format!(
                            "parameter `{}` = `{value}` does not fit `{}`",
                            special.key(),
                            special.type_name()
                        )
                    })?;
                    out.push_str(&rendered);
                }
            }
        }
        Ok(())
    }
}
