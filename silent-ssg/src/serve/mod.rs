//! 本地预览服务
//!
//! 只读地提供已生成目录中的文件，不做任何渲染。

mod site;

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinSet;

pub use site::StaticSite;

use crate::core::res_body::ResBody;
use crate::{SsgError, SsgResult};

/// 在 `addr` 上提供 `root` 目录，直到收到 Ctrl-C 或 SIGTERM
pub async fn serve(root: impl Into<PathBuf>, addr: SocketAddr) -> SsgResult<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_with_shutdown(listener, root, shutdown_signal()).await
}

/// 使用已绑定的监听器提供服务，`shutdown` 完成后停止
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    root: impl Into<PathBuf>,
    shutdown: F,
) -> SsgResult<()>
where
    F: Future<Output = ()> + Send,
{
    let site = Arc::new(StaticSite::new(root));
    let local = listener.local_addr()?;
    tracing::info!(
        root = %site.root().display(),
        "serving on http://{local}/"
    );

    let mut join_set = JoinSet::new();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("shutdown signal received");
                break;
            }
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        let site = Arc::clone(&site);
                        join_set.spawn(async move {
                            if let Err(err) = serve_connection(stream, site).await {
                                tracing::warn!(peer = %peer_addr, "failed to serve connection: {:?}", err);
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = ?e, "accept connection failed");
                    }
                }
            }
            Some(join_result) = join_set.join_next() => {
                if let Err(err) = join_result {
                    tracing::error!(error = ?err, "connection task panicked");
                }
            }
        }
    }

    join_set.abort_all();
    while let Some(join_result) = join_set.join_next().await {
        if let Err(err) = join_result
            && err.is_panic()
        {
            tracing::error!(error = ?err, "connection task panicked during shutdown");
        }
    }
    Ok(())
}

async fn serve_connection(stream: tokio::net::TcpStream, site: Arc<StaticSite>) -> SsgResult<()> {
    let io = TokioIo::new(stream);
    let service = service_fn(move |req: hyper::Request<Incoming>| {
        let site = Arc::clone(&site);
        async move {
            let res = site.respond(req.method(), req.uri().path()).await;
            tracing::info!(
                method = %req.method(),
                path = %req.uri().path(),
                status = res.status().as_u16(),
                "request"
            );
            Ok::<_, Infallible>(http::Response::<ResBody>::from(res))
        }
    });
    Builder::new(TokioExecutor::new())
        .serve_connection(io, service)
        .await
        .map_err(SsgError::ConnectionError)
}

/// Ctrl-C 或 SIGTERM
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = signal::ctrl_c() => (),
                    _ = term.recv() => (),
                }
            }
            Err(e) => {
                tracing::warn!(error = ?e, "failed to install SIGTERM handler");
                let _ = signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
    }
}
