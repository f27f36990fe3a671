//! DNS Resolution Module
//!
//! Client-side lookups backing the API. Each request issues two queries:
//!
//! - SRV `_xmpp-client._tcp.<domain>`: XMPP client servers
//! - TXT `_xmppconnect.<domain>`: alternative connection methods (XEP-0156)
//!
//! Every lookup ends as found, not-found or a resolution error. Any
//! resolution error aborts the request; not-found only empties its list.

mod hickory;
mod lookup;

#[cfg(test)]
pub(crate) mod testing;

pub use hickory::HickorySource;
pub use lookup::{resolve_domain, Resolution};

use async_trait::async_trait;
use std::fmt;

use crate::types::ServerRecord;

/// SRV service name for XMPP clients
pub const XMPP_CLIENT_SERVICE: &str = "xmpp-client";

/// SRV protocol label
pub const XMPP_CLIENT_PROTOCOL: &str = "tcp";

/// Label prepended to the domain for the TXT lookup
pub const XMPP_CONNECT_LABEL: &str = "_xmppconnect";

/// Kind of record a lookup asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Srv,
    Txt,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Srv => f.write_str("SRV"),
            RecordKind::Txt => f.write_str("TXT"),
        }
    }
}

/// Successful outcome of a single lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome<T> {
    /// The resolver answered with records
    Found(Vec<T>),

    /// The resolver reported that no such records exist
    NotFound,
}

impl<T> LookupOutcome<T> {
    /// Records of the answer, empty when not found
    pub fn into_records(self) -> Vec<T> {
        match self {
            LookupOutcome::Found(records) => records,
            LookupOutcome::NotFound => Vec::new(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupOutcome::NotFound)
    }
}

/// Any DNS failure other than "no such records"
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} lookup for {name:?} failed: {message}")]
pub struct LookupError {
    pub kind: RecordKind,
    pub name: String,
    pub message: String,
}

impl LookupError {
    pub fn new(kind: RecordKind, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            message: message.into(),
        }
    }
}

/// DNS collaborator used by the API
///
/// Implementations classify "name/records do not exist" as
/// [`LookupOutcome::NotFound`] and every other failure as [`LookupError`].
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Look up `_<service>._<protocol>.<domain>` SRV records
    async fn lookup_srv(
        &self,
        service: &str,
        protocol: &str,
        domain: &str,
    ) -> Result<LookupOutcome<ServerRecord>, LookupError>;

    /// Look up TXT records at `name`, one string per record
    async fn lookup_txt(&self, name: &str) -> Result<LookupOutcome<String>, LookupError>;
}
