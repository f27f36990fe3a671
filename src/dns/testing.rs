//! In-memory [`RecordSource`] for tests

use async_trait::async_trait;
use std::sync::Mutex;

use super::{LookupError, LookupOutcome, RecordKind, RecordSource};
use crate::types::ServerRecord;

/// Canned answers; lookups without an answer report not-found
#[derive(Default)]
pub struct StaticSource {
    srv: Option<Result<Vec<ServerRecord>, String>>,
    txt: Option<Result<Vec<String>, String>>,
    queries: Mutex<Vec<String>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_srv(mut self, records: Vec<ServerRecord>) -> Self {
        self.srv = Some(Ok(records));
        self
    }

    pub fn with_txt(mut self, records: Vec<&str>) -> Self {
        self.txt = Some(Ok(records.into_iter().map(str::to_string).collect()));
        self
    }

    pub fn srv_not_found(mut self) -> Self {
        self.srv = None;
        self
    }

    pub fn txt_not_found(mut self) -> Self {
        self.txt = None;
        self
    }

    pub fn srv_error(mut self, message: &str) -> Self {
        self.srv = Some(Err(message.to_string()));
        self
    }

    pub fn txt_error(mut self, message: &str) -> Self {
        self.txt = Some(Err(message.to_string()));
        self
    }

    /// Names queried so far
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn record_query(&self, name: &str) {
        self.queries.lock().unwrap().push(name.to_string());
    }
}

fn answer<T: Clone>(
    kind: RecordKind,
    name: &str,
    canned: &Option<Result<Vec<T>, String>>,
) -> Result<LookupOutcome<T>, LookupError> {
    match canned {
        Some(Ok(records)) => Ok(LookupOutcome::Found(records.clone())),
        Some(Err(message)) => Err(LookupError::new(kind, name, message.clone())),
        None => Ok(LookupOutcome::NotFound),
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn lookup_srv(
        &self,
        service: &str,
        protocol: &str,
        domain: &str,
    ) -> Result<LookupOutcome<ServerRecord>, LookupError> {
        let name = format!("_{}._{}.{}", service, protocol, domain);
        self.record_query(&name);
        answer(RecordKind::Srv, &name, &self.srv)
    }

    async fn lookup_txt(&self, name: &str) -> Result<LookupOutcome<String>, LookupError> {
        self.record_query(name);
        answer(RecordKind::Txt, name, &self.txt)
    }
}
