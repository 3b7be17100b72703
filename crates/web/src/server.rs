//! HTTP/1 accept loop.

use std::convert::Infallible;
use std::net::SocketAddr;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use nodes::Newsdesk;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::routes;

/// The server could not start.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("could not listen on {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The bound socket could not be inspected.
    #[error("listener I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Binds `addr` for [`serve`].
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serves the newsdesk on `listener` until `shutdown` is cancelled.
///
/// Each connection runs on its own task. On shutdown the accept loop stops
/// and open connections are asked to finish their current request and close.
pub async fn serve(
    listener: TcpListener,
    desk: Newsdesk,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let local = listener.local_addr()?;
    info!(addr = %local, "newsdesk listening");

    loop {
        let (stream, peer) = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(pair) => pair,
                Err(err) => {
                    warn!(error = %err, "accept failed");
                    continue;
                }
            },
        };

        let desk = desk.clone();
        let shutdown = shutdown.clone();
        let span = info_span!("connection", %peer);
        tokio::spawn(
            async move {
                let service = service_fn(move |request: Request<Incoming>| {
                    let desk = desk.clone();
                    async move { Ok::<_, Infallible>(routes::handle(&desk, request).await) }
                });
                let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
                tokio::pin!(connection);

                let stopping = tokio::select! {
                    result = connection.as_mut() => {
                        if let Err(err) = result {
                            debug!(error = %err, "connection closed with error");
                        }
                        false
                    }
                    _ = shutdown.cancelled() => true,
                };

                if stopping {
                    connection.as_mut().graceful_shutdown();
                    if let Err(err) = connection.as_mut().await {
                        debug!(error = %err, "connection closed with error during shutdown");
                    }
                }
            }
            .instrument(span),
        );
    }

    info!(addr = %local, "newsdesk stopped accepting connections");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use newsroom::{
        ArticleText, ClickLog, ClickLogEntry, ClickLogError, CredentialChecker, GenerationError,
        GenerationGateway, Instruction,
    };
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    struct NoGateway;

    #[async_trait::async_trait]
    impl GenerationGateway for NoGateway {
        async fn generate(
            &self,
            _instruction: &Instruction,
            _cancel: CancellationToken,
        ) -> Result<ArticleText, GenerationError> {
            Err(GenerationError::Cancelled)
        }
    }

    struct NoLog;

    impl ClickLog for NoLog {
        fn append(&self, _entry: &ClickLogEntry) -> Result<(), ClickLogError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn serves_health_checks_until_shut_down() {
        let listener = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let desk = Newsdesk::new(CredentialChecker::new(None, None), Arc::new(NoGateway), Arc::new(NoLog));
        let shutdown = CancellationToken::new();
        let server = tokio::spawn(serve(listener, desk, shutdown.clone()));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        assert!(raw.starts_with("HTTP/1.1 200 OK"), "{raw}");
        assert!(raw.ends_with("ok"), "{raw}");

        shutdown.cancel();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn binding_a_taken_port_is_reported() {
        let taken = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = taken.local_addr().unwrap();
        let err = bind(addr).await.unwrap_err();
        assert!(matches!(err, ServerError::Bind { addr: a, .. } if a == addr));
    }
}
