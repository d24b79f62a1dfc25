use std::fmt;
use std::sync::Arc;

use crate::core::path_param::Params;

/// 延迟求值的参数集合
pub type LazyParams = Arc<dyn Fn() -> Vec<Params> + Send + Sync>;

/// 静态生成时使用的参数绑定集合
#[derive(Clone)]
pub enum ParamSets {
    /// 固定的参数绑定
    Fixed(Vec<Params>),
    /// 在遍历时才求值，单次遍历内最多求值一次
    Lazy(LazyParams),
}

impl Default for ParamSets {
    fn default() -> Self {
        ParamSets::Fixed(vec![Params::new()])
    }
}

impl fmt::Debug for ParamSets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSets::Fixed(sets) => f.debug_tuple("Fixed").field(sets).finish(),
            ParamSets::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl ParamSets {
    /// 求值参数绑定
    pub fn evaluate(&self) -> Vec<Params> {
        match self {
            ParamSets::Fixed(sets) => sets.clone(),
            ParamSets::Lazy(f) => f(),
        }
    }
}

/// 标记路由参与静态生成
#[derive(Debug, Clone, Default)]
pub struct StaticMarker {
    pub params: ParamSets,
}

impl StaticMarker {
    pub fn new(params: ParamSets) -> Self {
        Self { params }
    }
}
