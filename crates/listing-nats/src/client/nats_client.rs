//! NATS client wrapper and connection management.
//!
//! The underlying `async-nats` client multiplexes every subscription over a
//! single TCP connection and reconnects on its own. Cloning a [`NatsClient`]
//! is cheap and shares that connection.

use std::sync::Arc;

use async_nats::{Client, ConnectOptions};
use tokio::time::timeout;

use super::nats_config::NatsConfig;
use super::transport::TransportErrors;
use crate::{Error, Result, TRACING_TARGET_CLIENT, TRACING_TARGET_CONNECTION};

/// NATS client wrapper with connection management.
#[derive(Debug, Clone)]
pub struct NatsClient {
    inner: Arc<NatsClientInner>,
}

#[derive(Debug)]
struct NatsClientInner {
    client: Client,
    config: NatsConfig,
    transport_errors: TransportErrors,
}

impl NatsClient {
    /// Create a new NATS client and connect.
    #[tracing::instrument(skip(config), target = TRACING_TARGET_CLIENT)]
    pub async fn connect(config: NatsConfig) -> Result<Self> {
        config.validate().map_err(Error::invalid_config)?;
        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            servers = ?config.servers(),
            name = config.name(),
            "Connecting to NATS"
        );

        let transport_errors = TransportErrors::default();
        let events = transport_errors.clone();
        let backoff = config.clone();

        let mut connect_opts = ConnectOptions::new()
            .name(config.name())
            .ping_interval(config.ping_interval())
            .token(config.nats_token.clone())
            .connection_timeout(config.connect_timeout())
            .reconnect_delay_callback(move |attempts| backoff.reconnect_delay(attempts))
            .event_callback(move |event| {
                let events = events.clone();
                async move { events.on_event(event) }
            });

        if let Some(max_reconnects) = config.max_reconnects_option() {
            connect_opts = connect_opts.max_reconnects(max_reconnects);
        }

        let connect_timeout = config.connect_timeout();
        let client = timeout(
            connect_timeout,
            async_nats::connect_with_options(&config.nats_url, connect_opts),
        )
        .await
        .map_err(|_| Error::timeout(connect_timeout))?
        .map_err(|e| Error::Connection(Box::new(e)))?;

        let server_info = client.server_info();
        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            server_host = %server_info.host,
            server_version = %server_info.version,
            server_id = %server_info.server_id,
            "Successfully connected to NATS"
        );

        Ok(Self {
            inner: Arc::new(NatsClientInner {
                client,
                config,
                transport_errors,
            }),
        })
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &NatsConfig {
        &self.inner.config
    }

    /// Get the underlying client
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.inner.client
    }

    /// Handlers notified of connection-level failures.
    #[must_use]
    pub fn transport_errors(&self) -> &TransportErrors {
        &self.inner.transport_errors
    }

    /// Check if the client is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(
            self.inner.client.connection_state(),
            async_nats::connection::State::Connected
        )
    }
}
