use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use crate::SsgError;

/// 一组路径参数绑定（反向解析的输入、路由匹配的输出）。
///
/// 使用有序表保证遍历顺序稳定，从而保证生成结果可复现。
pub type Params = BTreeMap<String, PathParam>;

/// 路径参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathParam {
    /// 普通字符串参数 `<key>` / `<key:str>`
    Str(String),
    /// 有符号整型参数 `<key:int>` / `<key:i64>` / `<key:i32>`
    Int(i64),
    /// 无符号整型参数 `<key:u64>` / `<key:u32>`
    UInt(u64),
    /// Uuid 参数
    Uuid(Uuid),
    /// 通配路径参数 `<key:path>` / `<key:*>` / `<key:**>`
    Path(String),
}

impl fmt::Display for PathParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathParam::Str(value) | PathParam::Path(value) => f.write_str(value),
            PathParam::Int(value) => write!(f, "{value}"),
            PathParam::UInt(value) => write!(f, "{value}"),
            PathParam::Uuid(value) => write!(f, "{value}"),
        }
    }
}

impl From<String> for PathParam {
    fn from(value: String) -> Self {
        PathParam::Str(value)
    }
}

impl From<&str> for PathParam {
    fn from(value: &str) -> Self {
        PathParam::Str(value.to_string())
    }
}

impl From<i32> for PathParam {
    fn from(value: i32) -> Self {
        PathParam::Int(value.into())
    }
}

impl From<i64> for PathParam {
    fn from(value: i64) -> Self {
        PathParam::Int(value)
    }
}

impl From<u32> for PathParam {
    fn from(value: u32) -> Self {
        PathParam::UInt(value.into())
    }
}

impl From<u64> for PathParam {
    fn from(value: u64) -> Self {
        PathParam::UInt(value)
    }
}

impl From<usize> for PathParam {
    fn from(value: usize) -> Self {
        PathParam::UInt(value as u64)
    }
}

impl From<Uuid> for PathParam {
    fn from(value: Uuid) -> Self {
        PathParam::Uuid(value)
    }
}

impl TryFrom<&PathParam> for String {
    type Error = SsgError;

    fn try_from(value: &PathParam) -> Result<Self, Self::Error> {
        Ok(value.to_string())
    }
}

impl TryFrom<&PathParam> for i64 {
    type Error = SsgError;

    fn try_from(value: &PathParam) -> Result<Self, Self::Error> {
        match value {
            PathParam::Int(v) => Ok(*v),
            PathParam::UInt(v) => {
                i64::try_from(*v).map_err(|_| SsgError::ParamsTypeError(v.to_string()))
            }
            other => Err(SsgError::ParamsTypeError(other.to_string())),
        }
    }
}

impl TryFrom<&PathParam> for u64 {
    type Error = SsgError;

    fn try_from(value: &PathParam) -> Result<Self, Self::Error> {
        match value {
            PathParam::UInt(v) => Ok(*v),
            PathParam::Int(v) => {
                u64::try_from(*v).map_err(|_| SsgError::ParamsTypeError(v.to_string()))
            }
            other => Err(SsgError::ParamsTypeError(other.to_string())),
        }
    }
}

impl TryFrom<&PathParam> for Uuid {
    type Error = SsgError;

    fn try_from(value: &PathParam) -> Result<Self, Self::Error> {
        match value {
            PathParam::Uuid(v) => Ok(*v),
            other => Err(SsgError::ParamsTypeError(other.to_string())),
        }
    }
}

/// 由键值对构造一组参数绑定
///
/// ```
/// use silent_ssg::{PathParam, params};
/// let p = params([("slug", "first-entry")]);
/// assert_eq!(p.get("slug"), Some(&PathParam::Str("first-entry".into())));
/// ```
pub fn params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<PathParam>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
