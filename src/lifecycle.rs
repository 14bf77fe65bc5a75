//! Process lifecycle: ordered startup, signal wait, ordered drain.
//!
//! Startup is strictly sequential so the HTTP front door never answers
//! before the gRPC listener it forwards to is accepting:
//!
//! 1. bind the gRPC listener
//! 2. serve gRPC on a background task
//! 3. dial the loopback bridge
//! 4. register the gateway routes
//! 5. bind and serve HTTP on a background task
//!
//! Shutdown runs in reverse: HTTP drains first (bounded), then gRPC
//! (bounded; aborted if the deadline passes).

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::{error, info, warn};

use crate::front_door;
use crate::gateway::{Bridge, ServeMux, services};
use crate::handler::Handlers;
use crate::server::config::Config;
use crate::server::rpc_routes;
use crate::{GatehouseError, Result};

/// Startup steps, in the order they complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Bind,
    ServeRpc,
    BridgeDial,
    Register,
    ServeHttp,
}

/// How one server's drain ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    Completed,
    Failed(String),
    TimedOut,
}

/// Drain results for both servers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub http: DrainOutcome,
    pub rpc: DrainOutcome,
}

/// Owns startup and shutdown ordering for one process.
pub struct Lifecycle {
    config: Config,
    handlers: Handlers,
}

impl Lifecycle {
    pub fn new(config: Config, handlers: Handlers) -> Self {
        Self { config, handlers }
    }

    /// Run startup, wait for `signal`, then drain.
    pub async fn run(self, signal: impl Future<Output = ()>) -> Result<ShutdownReport> {
        self.start().await?.serve_until(signal).await
    }

    /// Run every startup step and return the running servers.
    pub async fn start(self) -> Result<Running> {
        let rpc_addr = self.config.rpc_addr()?;
        let http_addr = self.config.http_addr()?;
        let mut phases = Vec::with_capacity(5);

        // 1. Bind
        let rpc_listener = bind(rpc_addr).await?;
        let rpc_addr = local_addr(&rpc_listener, rpc_addr)?;
        phases.push(Phase::Bind);

        // 2. Serve (RPC)
        let (rpc_stop, rpc_stopped) = oneshot::channel::<()>();
        let routes = rpc_routes(&self.handlers);
        let rpc_task = tokio::spawn(async move {
            Server::builder()
                .add_routes(routes)
                .serve_with_incoming_shutdown(TcpListenerStream::new(rpc_listener), async move {
                    let _ = rpc_stopped.await;
                })
                .await
                .map_err(|e| GatehouseError::Serve(format!("gRPC server: {e}")))
        });
        info!(addr = %rpc_addr, "serving gRPC");
        phases.push(Phase::ServeRpc);

        // Tear the RPC task down if a later step fails.
        let abort_rpc = |err: GatehouseError, task: &JoinHandle<Result<()>>| {
            task.abort();
            err
        };

        // 3. Bridge-dial
        let bridge = match Bridge::dial(rpc_addr, self.config.dial_timeout()).await {
            Ok(bridge) => bridge,
            Err(e) => return Err(abort_rpc(e, &rpc_task)),
        };
        phases.push(Phase::BridgeDial);

        // 4. Register
        let channel = bridge.channel();
        let mut mux = ServeMux::new();
        if let Err(e) = services::register_all(&mut mux, &channel) {
            return Err(abort_rpc(e, &rpc_task));
        }
        if let Some(path) = self.config.gateway.healthz_path() {
            mux = mux.with_health_endpoint(path, channel.clone());
        }
        phases.push(Phase::Register);

        // 5. Serve (HTTP)
        let http_listener = match bind(http_addr).await {
            Ok(listener) => listener,
            Err(e) => return Err(abort_rpc(e, &rpc_task)),
        };
        let http_addr = match local_addr(&http_listener, http_addr) {
            Ok(addr) => addr,
            Err(e) => return Err(abort_rpc(e, &rpc_task)),
        };
        let app = front_door::router(mux, &self.config.docs);
        let (http_stop, http_stopped) = oneshot::channel::<()>();
        let http_task = tokio::spawn(async move {
            axum::serve(http_listener, app)
                .with_graceful_shutdown(async move {
                    let _ = http_stopped.await;
                })
                .await
                .map_err(|e| GatehouseError::Serve(format!("HTTP server: {e}")))
        });
        info!(addr = %http_addr, "serving HTTP gateway");
        phases.push(Phase::ServeHttp);

        Ok(Running {
            rpc_addr,
            http_addr,
            phases,
            rpc: ServerTask::new(rpc_stop, rpc_task),
            http: ServerTask::new(http_stop, http_task),
            http_grace: self.config.server.shutdown.http_grace(),
            rpc_grace: self.config.server.shutdown.rpc_grace(),
        })
    }
}

async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| GatehouseError::Bind { addr, source })
}

fn local_addr(listener: &TcpListener, requested: SocketAddr) -> Result<SocketAddr> {
    listener.local_addr().map_err(|source| GatehouseError::Bind {
        addr: requested,
        source,
    })
}

struct ServerTask {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl ServerTask {
    fn new(stop: oneshot::Sender<()>, task: JoinHandle<Result<()>>) -> Self {
        Self {
            stop: Some(stop),
            task,
        }
    }

    /// Signal shutdown and wait up to `grace` for the task to finish.
    async fn drain(mut self, name: &'static str, grace: Duration) -> DrainOutcome {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }

        match tokio::time::timeout(grace, &mut self.task).await {
            Ok(Ok(Ok(()))) => {
                info!(server = name, "drained");
                DrainOutcome::Completed
            }
            Ok(Ok(Err(e))) => {
                warn!(server = name, error = %e, "drain failed");
                DrainOutcome::Failed(e.to_string())
            }
            Ok(Err(e)) => {
                warn!(server = name, error = %e, "server task ended abnormally");
                DrainOutcome::Failed(e.to_string())
            }
            Err(_) => {
                warn!(server = name, ?grace, "drain timed out, forcing close");
                self.task.abort();
                DrainOutcome::TimedOut
            }
        }
    }
}

/// Both servers up and accepting.
pub struct Running {
    rpc_addr: SocketAddr,
    http_addr: SocketAddr,
    phases: Vec<Phase>,
    rpc: ServerTask,
    http: ServerTask,
    http_grace: Duration,
    rpc_grace: Duration,
}

impl Running {
    /// Address the gRPC listener is bound to.
    pub fn rpc_addr(&self) -> SocketAddr {
        self.rpc_addr
    }

    /// Address the HTTP front door is bound to.
    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    /// Completed startup phases, in order.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Wait for `signal` or for either server to stop on its own, then drain.
    ///
    /// A server that exits before the signal is a fatal serve error; the
    /// other server is still drained before the error is returned.
    pub async fn serve_until(mut self, signal: impl Future<Output = ()>) -> Result<ShutdownReport> {
        let failure = tokio::select! {
            _ = signal => {
                info!("shutdown signal received, draining");
                None
            }
            result = &mut self.rpc.task => Some(("gRPC", result)),
            result = &mut self.http.task => Some(("HTTP", result)),
        };

        let Some((name, result)) = failure else {
            return Ok(self.shutdown().await);
        };

        let err = match result {
            Ok(Ok(())) => GatehouseError::Serve(format!("{name} server stopped unexpectedly")),
            Ok(Err(e)) => e,
            Err(e) => GatehouseError::Serve(format!("{name} server task failed: {e}")),
        };
        error!(error = %err, "server exited, shutting down");

        // The finished task can't be joined twice; only drain the survivor.
        let Running {
            rpc,
            http,
            http_grace,
            rpc_grace,
            ..
        } = self;
        if name == "gRPC" {
            http.drain("http", http_grace).await;
        } else {
            rpc.drain("grpc", rpc_grace).await;
        }
        Err(err)
    }

    /// Drain HTTP, then gRPC.
    pub async fn shutdown(self) -> ShutdownReport {
        let http = self.http.drain("http", self.http_grace).await;
        let rpc = self.rpc.drain("grpc", self.rpc_grace).await;
        info!("server gracefully stopped");
        ShutdownReport { http, rpc }
    }
}
