use crate::{Response, StatusCode};
use std::io;
use thiserror::Error;

/// BoxedError
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// SsgError is the error type for the `silent-ssg` library.
#[derive(Error, Debug)]
pub enum SsgError {
    /// IO 错误
    #[error("io error: {0}")]
    IOError(#[from] io::Error),
    /// 模板渲染错误
    #[error("template error: {0}")]
    TemplateError(#[from] tera::Error),
    /// 忽略规则 glob 编译错误
    #[error("invalid glob pattern: {0}")]
    GlobError(#[from] globset::Error),
    /// 静态资源目录遍历错误
    #[error("walk dir error: {0}")]
    WalkDirError(#[from] walkdir::Error),
    /// 预览服务连接错误
    #[error("connection error: {0}")]
    ConnectionError(BoxedError),
    /// 响应体读取错误
    #[error("body error: {0}")]
    BodyError(BoxedError),
    /// 配置错误（输出目录、路由表、模板等），在写入任何文件前报告
    #[error("configuration error: {0}")]
    ConfigError(String),
    /// 未注册的路由表
    #[error("route table `{0}` is not registered")]
    RouteTableNotFound(String),
    /// 反向解析失败
    #[error("reverse for `{name}` not found: {reason}")]
    NoReverseMatch {
        /// 路由名（含命名空间）
        name: String,
        /// 失败原因
        reason: String,
    },
    /// 路径无法匹配任何路由
    #[error("no route matches `{0}`")]
    NoRouteMatch(String),
    /// Params 类型错误
    #[error("param `{0}` has an unexpected type")]
    ParamsTypeError(String),
    /// Params 不存在
    #[error("params not found")]
    ParamsNotFound,
    /// anyhow错误
    #[error("{0}")]
    AnyhowError(#[from] anyhow::Error),
    /// 业务错误
    #[error("business error: {msg} ({code})")]
    BusinessError {
        /// 错误码
        code: StatusCode,
        /// 错误信息
        msg: String,
    },
}

pub type SsgResult<T> = Result<T, SsgError>;

impl From<(StatusCode, String)> for SsgError {
    fn from(value: (StatusCode, String)) -> Self {
        Self::business_error(value.0, value.1)
    }
}

impl From<String> for SsgError {
    fn from(value: String) -> Self {
        Self::business_error(StatusCode::INTERNAL_SERVER_ERROR, value)
    }
}

impl SsgError {
    pub fn business_error<T: Into<String>>(code: StatusCode, msg: T) -> Self {
        Self::BusinessError {
            code,
            msg: msg.into(),
        }
    }
    pub fn config_error<T: Into<String>>(msg: T) -> Self {
        Self::ConfigError(msg.into())
    }
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BusinessError { code, .. } => *code,
            Self::NoRouteMatch(_) => StatusCode::NOT_FOUND,
            Self::ParamsNotFound | Self::ParamsTypeError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
    pub fn message(&self) -> String {
        match self {
            Self::BusinessError { msg, .. } => msg.clone(),
            _ => self.to_string(),
        }
    }
}

impl From<SsgError> for Response {
    fn from(value: SsgError) -> Self {
        let mut res = Response::empty();
        res.set_status(value.status());
        res.set_typed_header(crate::core::response::html_utf8());
        res.set_body(value.message().into());
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    // ==================== From trait 测试 ====================

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: SsgError = io_err.into();
        assert!(matches!(err, SsgError::IOError(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_tuple() {
        let err: SsgError = (StatusCode::NOT_FOUND, "missing".to_string()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "missing");
    }

    #[test]
    fn test_no_reverse_match_message() {
        let err = SsgError::NoReverseMatch {
            name: "blog.entry".to_string(),
            reason: "missing param `slug`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "reverse for `blog.entry` not found: missing param `slug`"
        );
    }

    // ==================== Response 转换测试 ====================

    #[tokio::test]
    async fn test_error_into_response_keeps_status_and_body() {
        let err = SsgError::business_error(StatusCode::FORBIDDEN, "nope");
        let mut res: Response = err.into();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body = res.take_body().next().await.unwrap().unwrap();
        assert_eq!(body, bytes::Bytes::from("nope"));
    }
}
