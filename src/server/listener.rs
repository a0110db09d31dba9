//! TCP front end: accepts connections and runs one [`Session`] task each.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::Context as _;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

use super::session::{Session, SessionId};
use crate::command::{run_command, CommandRegistry};
use crate::config::ServerConfig;
use crate::utils::guard::OnDrop;

/// Sent to a peer that connects while the server is at `max_clients`.
pub const TOO_MANY_CLIENTS: &str = "Too many clients, try again later\r\n";

/// Pause after a failed accept so a persistent error does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

type LiveSessions = Arc<Mutex<HashMap<SessionId, SocketAddr>>>;

pub struct Server {
    config: ServerConfig,
    registry: Arc<CommandRegistry>,
    sessions: LiveSessions,
    next_id: AtomicU64,
}

impl Server {
    /// Create a server around a finished command table. The registry is
    /// frozen from here on and shared read-only by every session.
    pub fn new(config: ServerConfig, registry: CommandRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Run one command line outside any session, e.g. from an HTTP handler.
    pub fn run_command(&self, line: &str) -> String {
        run_command(&self.registry, line)
    }

    /// Currently connected sessions, ordered by id.
    pub fn live_sessions(&self) -> Vec<(SessionId, SocketAddr)> {
        let mut live: Vec<_> = self.live().iter().map(|(id, peer)| (*id, *peer)).collect();
        live.sort_by_key(|(id, _)| *id);
        live
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> anyhow::Result<TcpListener> {
        let addr = self.config.socket_addr();
        TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to start console server on {}", addr))
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    /// Accept connections on `listener` until `shutdown` resolves.
    ///
    /// Stopping closes the listener only. Sessions already running continue
    /// until their peer leaves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        let local = listener
            .local_addr()
            .context("Failed to read console listener address")?;
        info!(addr = %local, max_clients = self.config.max_clients, "console server listening");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(addr = %local, "console server stopping");
                    break;
                }
                res = listener.accept() => {
                    match res {
                        Ok((stream, peer)) => self.admit(stream, peer),
                        Err(e) => {
                            error!(error = %e, "console accept failed");
                            tokio::time::sleep(ACCEPT_BACKOFF).await;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn admit(&self, stream: TcpStream, peer: SocketAddr) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut live = self.live();
            if !self.config.admits(live.len()) {
                drop(live);
                warn!(peer = %peer, limit = self.config.max_clients, "rejecting console client");
                tokio::spawn(reject(stream, peer));
                return;
            }
            live.insert(id, peer);
        }

        let sessions = self.sessions.clone();
        let release = OnDrop::new(move || {
            lock(&sessions).remove(&id);
        });
        let session = Session::new(id, stream, self.registry.clone());

        info!(session = id, peer = %peer, "console session opened");
        tokio::spawn(async move {
            let _release = release;
            match session.run().await {
                Ok(()) => info!(session = id, "console session closed"),
                Err(e) if e.is_disconnect() => info!(session = id, "console peer disconnected"),
                Err(e) => warn!(session = id, error = %e, "console session ended with error"),
            }
        });
    }

    fn live(&self) -> MutexGuard<'_, HashMap<SessionId, SocketAddr>> {
        lock(&self.sessions)
    }
}

fn lock(sessions: &LiveSessions) -> MutexGuard<'_, HashMap<SessionId, SocketAddr>> {
    // Entries are plain data, so a poisoned map is still consistent.
    sessions.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn reject(mut stream: TcpStream, peer: SocketAddr) {
    if let Err(e) = stream.write_all(TOO_MANY_CLIENTS.as_bytes()).await {
        warn!(peer = %peer, error = %e, "failed to notify rejected client");
        return;
    }
    if let Err(e) = stream.shutdown().await {
        warn!(peer = %peer, error = %e, "failed to close rejected client");
    }
}
