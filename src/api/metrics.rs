//! Metrics Collection
//!
//! Request counters for monitoring the resolution API.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics collector for the lookup endpoint
#[derive(Default)]
pub struct Metrics {
    /// Start time for uptime calculation
    start_time: Option<Instant>,

    /// Total requests received
    pub requests: AtomicU64,

    /// Requests rejected for their method
    pub rejected_methods: AtomicU64,

    /// Paths that did not decode to a domain
    pub bad_requests: AtomicU64,

    /// 200 responses
    pub responses_ok: AtomicU64,

    /// 304 responses
    pub responses_not_modified: AtomicU64,

    /// 404 responses
    pub responses_not_found: AtomicU64,

    /// 500 responses caused by DNS failures
    pub resolution_errors: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0)
    }

    pub fn inc_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected_methods(&self) {
        self.rejected_methods.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_bad_requests(&self) {
        self.bad_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_ok(&self) {
        self.responses_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_not_modified(&self) {
        self.responses_not_modified.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_not_found(&self) {
        self.responses_not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_resolution_errors(&self) {
        self.resolution_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Export metrics in Prometheus format
    pub fn to_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "# HELP xmpp_resolv_uptime_seconds Service uptime in seconds\n\
             # TYPE xmpp_resolv_uptime_seconds gauge\n\
             xmpp_resolv_uptime_seconds {}\n\n",
            self.uptime_secs()
        ));

        let counters: [(&str, &str, &AtomicU64); 7] = [
            ("requests_total", "Lookup requests received", &self.requests),
            ("rejected_methods_total", "Requests rejected for their method", &self.rejected_methods),
            ("bad_requests_total", "Request paths that are not a domain", &self.bad_requests),
            ("responses_ok_total", "Successful lookups", &self.responses_ok),
            ("responses_not_modified_total", "Conditional requests answered with 304", &self.responses_not_modified),
            ("responses_not_found_total", "Domains without relevant records", &self.responses_not_found),
            ("resolution_errors_total", "DNS failures answered with 500", &self.resolution_errors),
        ];

        for (name, help, counter) in counters {
            output.push_str(&format!(
                "# HELP xmpp_resolv_{name} {help}\n\
                 # TYPE xmpp_resolv_{name} counter\n\
                 xmpp_resolv_{name} {}\n\n",
                counter.load(Ordering::Relaxed)
            ));
        }

        output
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "uptime_secs": self.uptime_secs(),
            "requests": {
                "total": self.requests.load(Ordering::Relaxed),
                "rejected_methods": self.rejected_methods.load(Ordering::Relaxed),
                "bad_requests": self.bad_requests.load(Ordering::Relaxed),
            },
            "responses": {
                "ok": self.responses_ok.load(Ordering::Relaxed),
                "not_modified": self.responses_not_modified.load(Ordering::Relaxed),
                "not_found": self.responses_not_found.load(Ordering::Relaxed),
            },
            "resolution_errors": self.resolution_errors.load(Ordering::Relaxed),
        })
    }
}
