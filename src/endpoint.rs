// src/endpoint.rs
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::cache::Cache;
use crate::client::Transport;
use crate::error::Result;
use crate::server::{Server, ServerInfo};

/// Entry point of the client: the API root holding the server cache.
///
/// The server listing is fetched once and never invalidated; servers do
/// not come and go through this API.
#[derive(Clone)]
pub struct PdnsEndpoint {
    transport: Arc<dyn Transport>,
    servers: Cache<Vec<Server>>,
}

impl PdnsEndpoint {
    pub fn new(transport: impl Transport + 'static) -> Self {
        PdnsEndpoint {
            transport: Arc::new(transport),
            servers: Cache::default(),
        }
    }

    /// The PowerDNS servers behind this endpoint.
    pub async fn servers(&mut self) -> Result<Vec<Server>> {
        if let Some(servers) = self.servers.get() {
            info!("{} server(s) listed", servers.len());
            return Ok(servers.clone());
        }
        info!("getting available servers from API");
        let data: Value = self.transport.get("/servers").await?;
        let infos: Vec<ServerInfo> = serde_json::from_value(data)?;
        let servers: Vec<Server> = infos
            .into_iter()
            .map(|info| Server::new(self.transport.clone(), info))
            .collect();
        info!("{} server(s) listed", servers.len());
        self.servers.populate(servers.clone());
        Ok(servers)
    }
}
