//! `UnoforgeServer` builder and server loop.
//!
//! This is the entry point for running a unoforge server. It ties together
//! all the layers: transport → protocol → room registry → engine.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use unoforge_engine::GameConfig;
use unoforge_protocol::{Codec, JsonCodec};
use unoforge_room::{GraceExpired, RegistryConfig, RoomRegistry};
use unoforge_transport::{Transport, WebSocketTransport};

use crate::UnoforgeError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The registry
/// lock is only held to look rooms up or change membership; game commands
/// go to a cloned room handle after the lock is released.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a unoforge server.
///
/// # Example
///
/// ```rust,ignore
/// let server = UnoforgeServer::builder()
///     .bind("0.0.0.0:3000")
///     .game_config(GameConfig { challenge_enabled: true, ..GameConfig::default() })
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct UnoforgeServerBuilder {
    bind_addr: String,
    registry_config: RegistryConfig,
    game_config: GameConfig,
}

impl UnoforgeServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            registry_config: RegistryConfig::default(),
            game_config: GameConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the grace period, room-code length and mailbox size.
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    /// Sets the rules every new room starts with.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<UnoforgeServer<JsonCodec>, UnoforgeError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let (registry, expired) = RoomRegistry::new(self.registry_config, self.game_config);

        let state = Arc::new(ServerState {
            registry: Mutex::new(registry),
            codec: JsonCodec,
        });

        Ok(UnoforgeServer {
            transport,
            state,
            expired,
        })
    }
}

impl Default for UnoforgeServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound unoforge server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct UnoforgeServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    expired: mpsc::UnboundedReceiver<GraceExpired>,
}

impl UnoforgeServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> UnoforgeServerBuilder {
        UnoforgeServerBuilder::new()
    }
}

impl<C: Codec> UnoforgeServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, UnoforgeError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection, plus one task
    /// that applies expired disconnect grace periods. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), UnoforgeError> {
        tracing::info!("unoforge server running");

        let state = Arc::clone(&self.state);
        let mut expired = self.expired;
        tokio::spawn(async move {
            while let Some(report) = expired.recv().await {
                state.registry.lock().await.expire(report).await;
            }
        });

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
