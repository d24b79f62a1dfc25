use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::{Handler, Request, Response, SsgResult};

/// 处理函数包装器：将 `Fn(Request) -> Future<Output = SsgResult<T>>` 适配为 [`Handler`]。
pub struct HandlerWrapper<F> {
    handler: F,
}

impl<F> HandlerWrapper<F> {
    pub fn new(handler: F) -> Self {
        Self { handler }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl<F, T, Fut> Handler for HandlerWrapper<F>
where
    Fut: Future<Output = SsgResult<T>> + Send + 'static,
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    T: Into<Response>,
{
    async fn call(&self, req: Request) -> SsgResult<Response> {
        let res = (self.handler)(req).await?;
        Ok(res.into())
    }
}
