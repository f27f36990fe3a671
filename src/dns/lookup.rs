//! Per-request resolution
//!
//! Runs both lookups, joins them and turns the raw answers into a sorted
//! [`RecordSet`].

use tracing::{debug, warn};

use super::{
    LookupError, RecordSource, XMPP_CLIENT_PROTOCOL, XMPP_CLIENT_SERVICE, XMPP_CONNECT_LABEL,
};
use crate::types::{AlternativeRecord, RecordSet};

/// Result of resolving one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// At least one relevant record, lists sorted
    Found(RecordSet),

    /// Neither lookup produced a relevant record
    NotFound,
}

/// Resolve the XMPP client records of `domain`.
///
/// Both lookups are issued concurrently and the decision is taken once both
/// have completed. If both fail, the SRV error is returned.
pub async fn resolve_domain(
    source: &dyn RecordSource,
    domain: &str,
) -> Result<Resolution, LookupError> {
    let txt_name = format!("{}.{}", XMPP_CONNECT_LABEL, domain);

    let (srv, txt) = tokio::join!(
        source.lookup_srv(XMPP_CLIENT_SERVICE, XMPP_CLIENT_PROTOCOL, domain),
        source.lookup_txt(&txt_name),
    );
    let srv = srv?;
    let txt = txt?;

    if srv.is_not_found() && txt.is_not_found() {
        debug!(domain = %domain, "No SRV or TXT records exist");
        return Ok(Resolution::NotFound);
    }

    let servers = srv.into_records();
    let alternatives = collect_alternatives(domain, &txt.into_records());

    let records = RecordSet::new(servers, alternatives);
    if records.is_empty() {
        debug!(domain = %domain, "No relevant records after filtering");
        return Ok(Resolution::NotFound);
    }

    Ok(Resolution::Found(records))
}

/// Keep only prefixed TXT entries; malformed ones are logged and skipped
fn collect_alternatives(domain: &str, raw: &[String]) -> Vec<AlternativeRecord> {
    raw.iter()
        .filter_map(|entry| match AlternativeRecord::parse(entry) {
            Ok(alt) => alt,
            Err(e) => {
                warn!(domain = %domain, "Skipping malformed TXT entry: {}", e);
                None
            }
        })
        .collect()
}
