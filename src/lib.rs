//! Typed async client for the PowerDNS management HTTP API.
//!
//! The entity hierarchy mirrors the API: [`PdnsEndpoint`] lists
//! [`Server`]s, a server lists [`Zone`]s, and a zone holds its
//! [`RRSet`]s. Each layer lazily fetches and caches its children and
//! resets the affected cache on mutation.
//!
//! ```no_run
//! use powerdns_client::{PdnsClient, PdnsEndpoint, RRSet};
//!
//! # async fn run() -> powerdns_client::Result<()> {
//! let client = PdnsClient::new("http://127.0.0.1:8081/api/v1", "secret");
//! let mut api = PdnsEndpoint::new(client);
//!
//! let mut server = api.servers().await?.remove(0);
//! if let Some(mut zone) = server.get_zone("example.com.").await? {
//!     let rrset = RRSet::new("www", "A", ["192.0.2.1"])?;
//!     zone.create_records(vec![rrset]).await?;
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod server;
pub mod zone;

pub use client::{Method, PdnsClient, Transport};
pub use endpoint::PdnsEndpoint;
pub use error::{Error, Result};
pub use models::{Changetype, Comment, RRSet, Record, RecordInput};
pub use server::{Server, ServerInfo, ZoneCreate};
pub use zone::{Zone, ZoneDetails, ZoneInfo};
