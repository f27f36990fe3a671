//! Core types for the XMPP resolution API
//!
//! These types define the JSON envelope returned to clients, the records
//! carried inside it and the fixed error bodies.
//! Record lists are always sorted before encoding so the body (and its ETag)
//! only depends on record contents, never on DNS answer order.

use crc::{Crc, CRC_64_GO_ISO};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::LazyLock;

/// Version tag carried by every envelope
pub const API_VERSION: &str = "1.0";

/// Case-insensitive key prefix of relevant `_xmppconnect` TXT entries
pub const ALTERNATIVE_PREFIX: &str = "_xmpp-client-";

/// CRC-64 with the ISO polynomial, used for ETags
const CRC64_ISO: Crc<u64> = Crc::<u64>::new(&CRC_64_GO_ISO);

// =============================================================================
// RECORDS
// =============================================================================

/// One `_xmpp-client._tcp` SRV answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerRecord {
    /// Target hostname
    pub target: String,

    /// Port the XMPP service listens on
    pub port: u16,

    /// Lower values are tried first
    pub priority: u16,

    /// Relative weight among records of equal priority
    pub weight: u16,
}

impl ServerRecord {
    pub fn new(target: impl Into<String>, port: u16, priority: u16, weight: u16) -> Self {
        Self {
            target: target.into(),
            port,
            priority,
            weight,
        }
    }
}

// Priority, weight, target, port: the first differing field decides.
impl Ord for ServerRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.priority, self.weight, &self.target, self.port)
            .cmp(&(other.priority, other.weight, &other.target, other.port))
    }
}

impl PartialOrd for ServerRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Alternative connection method advertised in a `_xmppconnect` TXT record
///
/// Ordered by name, then value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct AlternativeRecord {
    /// Key with the `_xmpp-client-` prefix stripped (e.g. `websocket`)
    pub name: String,

    /// Everything after the first `=`
    pub value: String,
}

/// A TXT entry whose key carries the prefix but has no value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("TXT entry {entry:?} has no '=' separator")]
pub struct TxtParseError {
    pub entry: String,
}

impl AlternativeRecord {
    /// Parse one raw TXT string.
    ///
    /// Returns `Ok(None)` for entries that do not carry the
    /// `_xmpp-client-` prefix (compared ASCII case-insensitively).
    pub fn parse(raw: &str) -> Result<Option<Self>, TxtParseError> {
        let (key, value) = match raw.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (raw, None),
        };

        let has_prefix = key
            .get(..ALTERNATIVE_PREFIX.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(ALTERNATIVE_PREFIX));
        if !has_prefix {
            return Ok(None);
        }

        let value = value.ok_or_else(|| TxtParseError {
            entry: raw.to_string(),
        })?;

        Ok(Some(Self {
            name: key[ALTERNATIVE_PREFIX.len()..].to_string(),
            value: value.to_string(),
        }))
    }
}

/// Sorted server and alternative lists for one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSet {
    pub servers: Vec<ServerRecord>,
    pub alternatives: Vec<AlternativeRecord>,
}

impl RecordSet {
    /// Build a record set, sorting both lists
    pub fn new(mut servers: Vec<ServerRecord>, mut alternatives: Vec<AlternativeRecord>) -> Self {
        servers.sort();
        alternatives.sort();
        Self {
            servers,
            alternatives,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty() && self.alternatives.is_empty()
    }
}

// =============================================================================
// ENVELOPE
// =============================================================================

/// Error payload of a failed lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

/// Either the resolved records or an error, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeBody {
    Data(RecordSet),
    Error(ErrorBody),
}

/// Top-level JSON document returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "apiVersion")]
    pub api_version: &'static str,

    #[serde(flatten)]
    pub body: EnvelopeBody,
}

impl ResponseEnvelope {
    pub fn data(records: RecordSet) -> Self {
        Self {
            api_version: API_VERSION,
            body: EnvelopeBody::Data(records),
        }
    }

    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            api_version: API_VERSION,
            body: EnvelopeBody::Error(ErrorBody {
                code,
                message: message.into(),
            }),
        }
    }
}

fn encode_fixed(envelope: &ResponseEnvelope) -> String {
    serde_json::to_string(envelope).expect("fixed error envelope must serialize")
}

/// Body of every 500 response
pub static INTERNAL_ERROR_BODY: LazyLock<String> = LazyLock::new(|| {
    encode_fixed(&ResponseEnvelope::error(
        500,
        "An internal server error has occured.",
    ))
});

/// Body of every 404 response
pub static NOT_FOUND_BODY: LazyLock<String> = LazyLock::new(|| {
    encode_fixed(&ResponseEnvelope::error(
        404,
        "The given domain name does not contain any relevant records.",
    ))
});

/// Quoted lowercase-hex CRC-64 of an encoded body
pub fn compute_etag(body: &[u8]) -> String {
    format!("\"{:x}\"", CRC64_ISO.checksum(body))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_ordering() {
        let mut servers = vec![
            ServerRecord::new("b.example.com", 5222, 10, 5),
            ServerRecord::new("a.example.com", 5223, 10, 5),
            ServerRecord::new("a.example.com", 5222, 10, 5),
            ServerRecord::new("z.example.com", 5222, 10, 1),
            ServerRecord::new("c.example.com", 5222, 0, 100),
        ];
        servers.sort();

        let order: Vec<_> = servers.iter().map(|s| (s.target.as_str(), s.port)).collect();
        assert_eq!(
            order,
            vec![
                ("c.example.com", 5222),
                ("z.example.com", 5222),
                ("a.example.com", 5222),
                ("a.example.com", 5223),
                ("b.example.com", 5222),
            ]
        );
    }

    #[test]
    fn test_alternative_ordering() {
        let set = RecordSet::new(
            vec![],
            vec![
                AlternativeRecord { name: "xbosh".into(), value: "https://b".into() },
                AlternativeRecord { name: "websocket".into(), value: "wss://b".into() },
                AlternativeRecord { name: "websocket".into(), value: "wss://a".into() },
            ],
        );

        assert_eq!(set.alternatives[0].value, "wss://a");
        assert_eq!(set.alternatives[1].value, "wss://b");
        assert_eq!(set.alternatives[2].name, "xbosh");
    }

    #[test]
    fn test_parse_alternative() {
        let alt = AlternativeRecord::parse("_xmpp-client-websocket=wss://example.com/ws")
            .unwrap()
            .unwrap();
        assert_eq!(alt.name, "websocket");
        assert_eq!(alt.value, "wss://example.com/ws");

        // Only the first '=' splits
        let alt = AlternativeRecord::parse("_XMPP-Client-xbosh=https://x/?a=b").unwrap().unwrap();
        assert_eq!(alt.name, "xbosh");
        assert_eq!(alt.value, "https://x/?a=b");
    }

    #[test]
    fn test_parse_alternative_skips_unrelated() {
        assert_eq!(AlternativeRecord::parse("v=spf1 -all").unwrap(), None);
        assert_eq!(AlternativeRecord::parse("_xmpp-server-foo=bar").unwrap(), None);
        assert_eq!(AlternativeRecord::parse("no separator at all").unwrap(), None);
        assert_eq!(AlternativeRecord::parse("").unwrap(), None);
    }

    #[test]
    fn test_parse_alternative_missing_separator() {
        let err = AlternativeRecord::parse("_xmpp-client-websocket").unwrap_err();
        assert_eq!(err.entry, "_xmpp-client-websocket");
    }

    #[test]
    fn test_data_envelope_json() {
        let envelope = ResponseEnvelope::data(RecordSet::new(
            vec![ServerRecord::new("xmpp.example.com", 5222, 10, 5)],
            vec![AlternativeRecord {
                name: "websocket".into(),
                value: "wss://example.com/ws".into(),
            }],
        ));

        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"apiVersion":"1.0","data":{"servers":[{"target":"xmpp.example.com","port":5222,"priority":10,"weight":5}],"alternatives":[{"name":"websocket","value":"wss://example.com/ws"}]}}"#
        );
    }

    #[test]
    fn test_empty_lists_serialize_as_arrays() {
        let envelope = ResponseEnvelope::data(RecordSet::new(
            vec![ServerRecord::new("xmpp.example.com", 5222, 0, 0)],
            vec![],
        ));
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains(r#""alternatives":[]"#));
    }

    #[test]
    fn test_fixed_error_bodies() {
        assert_eq!(
            INTERNAL_ERROR_BODY.as_str(),
            r#"{"apiVersion":"1.0","error":{"code":500,"message":"An internal server error has occured."}}"#
        );
        assert_eq!(
            NOT_FOUND_BODY.as_str(),
            r#"{"apiVersion":"1.0","error":{"code":404,"message":"The given domain name does not contain any relevant records."}}"#
        );
    }

    #[test]
    fn test_etag_format() {
        // CRC-64/GO-ISO check value
        assert_eq!(compute_etag(b"123456789"), "\"b90956c775a41001\"");
        // No zero padding
        assert_eq!(compute_etag(b""), "\"0\"");
    }
}
