// src/server.rs
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::cache::Cache;
use crate::client::{Transport, is_empty_response};
use crate::error::{Error, Result};
use crate::models::RRSet;
use crate::zone::{Zone, ZoneInfo};

/// One element of the `/servers` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub id: String, // usually "localhost"
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub daemon_type: String, // "authoritative" or "recursor"
}

/// Payload for zone creation and update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ZoneCreate {
    pub name: String, // "example.com."
    pub kind: String, // "Native", "Master", "Slave"
    pub nameservers: Vec<String>,
    pub masters: Vec<String>,
    /// Forwarded-to servers, recursor only.
    pub servers: Vec<String>,
    pub rrsets: Vec<RRSet>,
}

/// Handle on one PowerDNS server instance behind the endpoint.
#[derive(Clone)]
pub struct Server {
    transport: Arc<dyn Transport>,
    pub id: String,
    pub version: String,
    pub daemon_type: String,
    pub url: String, // "/servers/{sid}"
    config: Cache<Value>,
    zones: Cache<Vec<Zone>>,
}

impl Server {
    pub(crate) fn new(transport: Arc<dyn Transport>, info: ServerInfo) -> Self {
        let url = format!("/servers/{}", info.id);
        Server {
            transport,
            id: info.id,
            version: info.version,
            daemon_type: info.daemon_type,
            url,
            config: Cache::default(),
            zones: Cache::default(),
        }
    }

    /// Server configuration, fetched once and cached.
    pub async fn config(&mut self) -> Result<Value> {
        if let Some(config) = self.config.get() {
            return Ok(config.clone());
        }
        info!("getting server configuration");
        let config = self.transport.get(&format!("{}/config", self.url)).await?;
        self.config.populate(config.clone());
        Ok(config)
    }

    /// Zones of this server, fetched once and cached. The cache is reset
    /// by zone creation, deletion, and restoration.
    pub async fn zones(&mut self) -> Result<Vec<Zone>> {
        if let Some(zones) = self.zones.get() {
            info!("{} zone(s) listed", zones.len());
            return Ok(zones.clone());
        }
        info!("getting available zones from API");
        let data = self.transport.get(&format!("{}/zones", self.url)).await?;
        let infos: Vec<ZoneInfo> = serde_json::from_value(data)?;
        let zones: Vec<Zone> = infos
            .into_iter()
            .map(|info| Zone::new(self.transport.clone(), &self.url, info))
            .collect();
        info!("{} zone(s) listed", zones.len());
        self.zones.populate(zones.clone());
        Ok(zones)
    }

    /// Query the search endpoint. Results are never cached.
    pub async fn search(&self, search_term: &str, max_result: usize) -> Result<Vec<Value>> {
        info!("API search terms: {}", search_term);
        let data = self
            .transport
            .get(&format!(
                "{}/search-data?q={}&max={}",
                self.url, search_term, max_result
            ))
            .await?;
        let results: Vec<Value> = serde_json::from_value(data)?;
        info!("{} search result(s)", results.len());
        Ok(results)
    }

    /// Zone with exactly this canonical name, or `None`.
    pub async fn get_zone(&mut self, name: &str) -> Result<Option<Zone>> {
        info!("getting zone: {}", name);
        let zones = self.zones().await?;
        Ok(zones.into_iter().find(|zone| zone.name == name))
    }

    /// Most specific existing zone for a canonical record name: among the
    /// zones whose name suffixes `r_name`, the one with the longest name
    /// wins, first encountered on ties.
    pub async fn suggest_zone(&mut self, r_name: &str) -> Result<Option<Zone>> {
        info!("suggesting zone for: {}", r_name);
        if !r_name.ends_with('.') {
            return Err(Error::canonical(r_name));
        }
        let mut best: Option<Zone> = None;
        for zone in self.zones().await? {
            if !r_name.ends_with(&zone.name) {
                continue;
            }
            if best.as_ref().is_none_or(|b| zone.name.len() > b.name.len()) {
                best = Some(zone);
            }
        }
        Ok(best)
    }

    /// Create a zone, or update an existing one when `update` is set.
    ///
    /// An update is addressed by the id of the zone resolved through
    /// [`Server::get_zone`]; when that zone does not exist, `None` comes
    /// back without any request being made. An empty API response also
    /// yields `None`; otherwise the zone cache is reset and the new zone
    /// returned.
    pub async fn create_zone(&mut self, zone: &ZoneCreate, update: bool) -> Result<Option<Zone>> {
        let payload = serde_json::to_value(zone)?;
        let data = if update {
            info!("updating zone: {}", zone.name);
            let Some(existing) = self.get_zone(&zone.name).await? else {
                warn!("zone {} not found, cannot update", zone.name);
                return Ok(None);
            };
            self.transport
                .patch(&format!("{}/zones/{}", self.url, existing.id), Some(payload))
                .await?
        } else {
            info!("creating zone: {}", zone.name);
            self.transport
                .post(&format!("{}/zones", self.url), Some(payload))
                .await?
        };

        if is_empty_response(&data) {
            return Ok(None);
        }
        self.zones.invalidate();
        info!("zone {} successfully processed", zone.name);
        let info: ZoneInfo = serde_json::from_value(data)?;
        Ok(Some(Zone::new(self.transport.clone(), &self.url, info)))
    }

    /// Delete a zone. The zone cache is reset before the request goes
    /// out, so a failed deletion still forces a fresh listing.
    pub async fn delete_zone(&mut self, name: &str) -> Result<Value> {
        self.zones.invalidate();
        info!("deleting zone: {}", name);
        self.transport
            .delete(&format!("{}/zones/{}", self.url, name), None)
            .await
    }

    /// Restore a zone from a backup file written by [`Zone::backup`].
    ///
    /// Nameservers are stripped from the blob since the API reassigns
    /// them. A failed creation is not an error here: it is logged and
    /// answered with `None`, unlike every other mutation.
    pub async fn restore_zone(&mut self, json_file: impl AsRef<Path>) -> Result<Option<Zone>> {
        let raw = fs::read_to_string(json_file)?;
        let mut data: Value = serde_json::from_str(&raw)?;
        let Some(zone_name) = data.get("name").and_then(Value::as_str).map(str::to_string) else {
            return Err(Error::validation("backup file has no zone name"));
        };
        data["nameservers"] = json!([]);
        self.zones.invalidate();
        info!("restoring zone: {}", zone_name);
        match self.transport.post(&format!("{}/zones", self.url), Some(data)).await {
            Ok(response) if !is_empty_response(&response) => {
                let info: ZoneInfo = serde_json::from_value(response)?;
                info!("zone successfully restored: {}", info.name);
                Ok(Some(Zone::new(self.transport.clone(), &self.url, info)))
            }
            Ok(_) => {
                info!("{} zone restoration failed", zone_name);
                Ok(None)
            }
            Err(err) => {
                warn!("{} zone restoration failed: {}", zone_name, err);
                Ok(None)
            }
        }
    }
}
