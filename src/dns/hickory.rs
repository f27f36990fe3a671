//! Hickory-backed Record Source
//!
//! Talks to the configured upstream resolvers through hickory-resolver.

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::rdata::SRV;
use hickory_resolver::proto::ProtoErrorKind;
use hickory_resolver::{ResolveError, ResolveErrorKind, Resolver};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{LookupError, LookupOutcome, RecordKind, RecordSource};
use crate::config::ResolvConfig;
use crate::types::ServerRecord;

/// [`RecordSource`] resolving through hickory
pub struct HickorySource {
    resolver: Resolver<TokioConnectionProvider>,
}

impl HickorySource {
    /// Build a resolver from the service configuration
    pub fn from_config(config: &ResolvConfig) -> Self {
        let (resolver_config, opts) = if config.use_system_resolver {
            match hickory_resolver::system_conf::read_system_conf() {
                Ok(system) => {
                    info!("🔎 Using system DNS configuration");
                    system
                }
                Err(e) => {
                    warn!("Could not read system DNS configuration ({}), using defaults", e);
                    (ResolverConfig::default(), ResolverOpts::default())
                }
            }
        } else {
            info!("🔎 Using default upstream DNS servers");
            (ResolverConfig::default(), ResolverOpts::default())
        };

        let resolver = Resolver::builder_with_config(resolver_config, TokioConnectionProvider::default())
            .with_options(resolver_opts(config, opts))
            .build();

        Self { resolver }
    }
}

/// Apply the configured limits to `opts`; answers are never cached
fn resolver_opts(config: &ResolvConfig, mut opts: ResolverOpts) -> ResolverOpts {
    opts.timeout = Duration::from_secs(config.lookup_timeout_secs);
    opts.attempts = config.lookup_attempts;
    opts.cache_size = 0;
    opts
}

/// Target is kept in its wire (ASCII) form
fn server_record(srv: &SRV) -> ServerRecord {
    ServerRecord::new(srv.target().to_ascii(), srv.port(), srv.priority(), srv.weight())
}

#[async_trait]
impl RecordSource for HickorySource {
    async fn lookup_srv(
        &self,
        service: &str,
        protocol: &str,
        domain: &str,
    ) -> Result<LookupOutcome<ServerRecord>, LookupError> {
        let name = format!("_{}._{}.{}", service, protocol, domain);

        match self.resolver.srv_lookup(name.as_str()).await {
            Ok(lookup) => {
                let records: Vec<ServerRecord> = lookup.iter().map(server_record).collect();
                debug!(name = %name, count = records.len(), "SRV answer");
                Ok(LookupOutcome::Found(records))
            }
            Err(e) if is_no_records_error(&e) => Ok(LookupOutcome::NotFound),
            Err(e) => Err(LookupError::new(RecordKind::Srv, name, e.to_string())),
        }
    }

    async fn lookup_txt(&self, name: &str) -> Result<LookupOutcome<String>, LookupError> {
        match self.resolver.txt_lookup(name).await {
            Ok(lookup) => {
                // Character-strings of one record form a single entry
                let records: Vec<String> = lookup
                    .iter()
                    .map(|txt| {
                        let bytes: Vec<u8> = txt
                            .txt_data()
                            .iter()
                            .flat_map(|part| part.iter().copied())
                            .collect();
                        String::from_utf8_lossy(&bytes).into_owned()
                    })
                    .collect();
                debug!(name = %name, count = records.len(), "TXT answer");
                Ok(LookupOutcome::Found(records))
            }
            Err(e) if is_no_records_error(&e) => Ok(LookupOutcome::NotFound),
            Err(e) => Err(LookupError::new(RecordKind::Txt, name, e.to_string())),
        }
    }
}

/// NXDOMAIN and empty NOERROR answers both surface as `NoRecordsFound`
fn is_no_records_error(error: &ResolveError) -> bool {
    if let ResolveErrorKind::Proto(proto_error) = error.kind() {
        matches!(proto_error.kind(), ProtoErrorKind::NoRecordsFound { .. })
    } else {
        false
    }
}
