// src/zone.rs
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::cache::Cache;
use crate::client::Transport;
use crate::error::{Error, Result};
use crate::models::{Changetype, RRSet};

/// One element of a zone listing; the detail blob is fetched lazily.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneInfo {
    pub name: String, // "example.com."
    #[serde(default)]
    pub id: Option<String>,
}

/// The zone detail blob as served by `GET .../zones/{name}`.
///
/// Fields beyond the modelled ones (serial, masters, dnssec, ...) are kept
/// in `extra` so a backup file carries the full server response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDetails {
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>, // "Native", "Master", ...
    #[serde(default)]
    pub rrsets: Vec<RRSet>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Handle on one zone of one server.
///
/// The detail blob is fetched on first use and invalidated by the record
/// mutations below; zone-level mutations live on [`crate::server::Server`].
#[derive(Clone)]
pub struct Zone {
    transport: Arc<dyn Transport>,
    pub name: String,
    /// Zone id used for updates; the API uses the canonical name.
    pub id: String,
    pub url: String, // "/servers/{sid}/zones/{name}"
    details: Cache<ZoneDetails>,
}

impl std::fmt::Debug for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zone")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl Zone {
    pub(crate) fn new(transport: Arc<dyn Transport>, server_url: &str, info: ZoneInfo) -> Self {
        let url = format!("{}/zones/{}", server_url, info.name);
        let id = info.id.unwrap_or_else(|| info.name.clone());
        Zone {
            transport,
            name: info.name,
            id,
            url,
            details: Cache::default(),
        }
    }

    /// Zone detail blob, fetched once and cached.
    pub async fn details(&mut self) -> Result<ZoneDetails> {
        if let Some(details) = self.details.get() {
            return Ok(details.clone());
        }
        info!("getting {} zone details from API", self.name);
        let data = self.transport.get(&self.url).await?;
        let details: ZoneDetails = serde_json::from_value(data)?;
        self.details.populate(details.clone());
        Ok(details)
    }

    /// All RRSets of the zone.
    pub async fn records(&mut self) -> Result<Vec<RRSet>> {
        Ok(self.details().await?.rrsets)
    }

    /// RRSets whose name matches exactly. An unknown name is not an
    /// error; the result is just empty.
    pub async fn get_record(&mut self, name: &str) -> Result<Vec<RRSet>> {
        info!("getting zone record: {}", name);
        let mut rrsets = self.records().await?;
        rrsets.retain(|rrset| rrset.name == name);
        Ok(rrsets)
    }

    /// Create (upsert) record sets in this zone with one batched PATCH.
    ///
    /// Every RRSet is canonicalized against the zone name first. An RRSet
    /// the caller already marked DELETE is rejected rather than silently
    /// re-tagged.
    pub async fn create_records(&mut self, rrsets: Vec<RRSet>) -> Result<Value> {
        info!("creating {} record set(s) in {}", rrsets.len(), self.name);
        self.patch_records(rrsets, Changetype::Replace).await
    }

    /// Delete record sets from this zone with one batched PATCH.
    pub async fn delete_records(&mut self, rrsets: Vec<RRSet>) -> Result<Value> {
        info!("deleting {} record set(s) from {}", rrsets.len(), self.name);
        self.patch_records(rrsets, Changetype::Delete).await
    }

    async fn patch_records(
        &mut self,
        mut rrsets: Vec<RRSet>,
        changetype: Changetype,
    ) -> Result<Value> {
        for rrset in &mut rrsets {
            rrset.ensure_canonical(&self.name)?;
            if changetype == Changetype::Replace && rrset.changetype == Changetype::Delete {
                return Err(Error::validation(format!(
                    "rrset {} is marked DELETE and cannot be created",
                    rrset.name
                )));
            }
            rrset.changetype = changetype;
        }
        self.details.invalidate();
        let body = json!({ "rrsets": rrsets });
        self.transport.patch(&self.url, Some(body)).await
    }

    /// Write the zone detail blob to `<directory>/<filename>` and return
    /// the path. The default filename is the zone name without its
    /// trailing dot plus `.json`. Pretty mode indents with two spaces and
    /// sorts keys; compact mode writes fields in declaration order.
    pub async fn backup(
        &mut self,
        directory: impl AsRef<Path>,
        filename: Option<&str>,
        pretty_json: bool,
    ) -> Result<PathBuf> {
        info!("backing up zone: {}", self.name);
        let details = self.details().await?;
        let filename = match filename {
            Some(name) => name.to_string(),
            None => format!("{}.json", self.name.trim_end_matches('.')),
        };
        let path = directory.as_ref().join(filename);
        debug!("backup file is {}", path.display());
        let file = File::create(&path)?;
        if pretty_json {
            // a Value round trip sorts object keys at every level
            serde_json::to_writer_pretty(file, &serde_json::to_value(&details)?)?;
        } else {
            serde_json::to_writer(file, &details)?;
        }
        info!("zone {} successfully saved", self.name);
        Ok(path)
    }

    /// Ask the server to notify slaves of zone updates.
    pub async fn notify(&self) -> Result<Value> {
        info!("notifying of zone: {}", self.name);
        self.transport.put(&format!("{}/notify", self.url), None).await
    }
}
