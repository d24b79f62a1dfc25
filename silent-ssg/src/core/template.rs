use std::sync::Arc;

use bytes::Bytes;
use tera::{Context, Tera};

use crate::SsgResult;

/// 延迟渲染的响应体
///
/// 处理器可以先返回响应，由调用方在读取响应体前统一渲染。
pub trait DeferredRender: Send + Sync {
    fn render(&self) -> SsgResult<Bytes>;
}

/// 基于 tera 的模板视图
pub struct TemplateView {
    tera: Arc<Tera>,
    name: String,
    context: Context,
}

impl TemplateView {
    pub fn new(tera: Arc<Tera>, name: impl Into<String>, context: Context) -> Self {
        Self {
            tera,
            name: name.into(),
            context,
        }
    }
}

impl DeferredRender for TemplateView {
    fn render(&self) -> SsgResult<Bytes> {
        let html = self.tera.render(&self.name, &self.context)?;
        Ok(Bytes::from(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Response, SsgError};

    fn tera() -> Arc<Tera> {
        let mut tera = Tera::default();
        tera.add_raw_template("hello.html", "<h1>{{ name }}</h1>")
            .unwrap();
        Arc::new(tera)
    }

    #[test]
    fn test_template_view_render() {
        let mut ctx = Context::new();
        ctx.insert("name", "<silent>");
        let view = TemplateView::new(tera(), "hello.html", ctx);
        assert_eq!(view.render().unwrap(), Bytes::from("<h1>&lt;silent&gt;</h1>"));
    }

    #[test]
    fn test_missing_template_fails_on_render() {
        let mut res = Response::deferred(TemplateView::new(tera(), "nope.html", Context::new()));
        assert!(matches!(res.render(), Err(SsgError::TemplateError(_))));
    }
}
