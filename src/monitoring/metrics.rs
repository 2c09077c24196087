use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::{debug, info};

/// Process-wide counters for runs, probes and readiness changes.
pub static METRICS: Lazy<Metrics> = Lazy::new(Metrics::default);

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs()
}

#[derive(Default)]
struct MetricsInner {
    links_processed: AtomicU64,
    probes_online: AtomicU64,
    probes_offline: AtomicU64,
    status_changes: AtomicU64,
    last_event_ts: AtomicU64,
}

/// Lightweight metrics handle backed by atomics so it can be cloned cheaply.
#[derive(Clone, Default)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

impl Metrics {
    fn touch(&self) {
        self.inner
            .last_event_ts
            .store(now_unix_secs(), Ordering::Relaxed);
    }

    pub fn record_link_processed(&self, link: Option<&str>) {
        let total = self.inner.links_processed.fetch_add(1, Ordering::Relaxed) + 1;
        self.touch();

        debug!(
            target: "metrics",
            event = "link_processed",
            link = link.unwrap_or("-"),
            total_links = total,
            "link processed"
        );
    }

    pub fn record_probe(&self, online: bool) {
        let counter = if online {
            &self.inner.probes_online
        } else {
            &self.inner.probes_offline
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.touch();

        debug!(target: "metrics", event = "probe", online, "connectivity probed");
    }

    pub fn record_status_change(&self, ready: bool) {
        let total = self.inner.status_changes.fetch_add(1, Ordering::Relaxed) + 1;
        self.touch();

        info!(
            target: "metrics",
            event = "status_change",
            ready,
            total_changes = total,
            "readiness changed"
        );
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            links_processed: self.inner.links_processed.load(Ordering::Relaxed),
            probes_online: self.inner.probes_online.load(Ordering::Relaxed),
            probes_offline: self.inner.probes_offline.load(Ordering::Relaxed),
            status_changes: self.inner.status_changes.load(Ordering::Relaxed),
            last_event_ts: self.inner.last_event_ts.load(Ordering::Relaxed),
        }
    }
}

/// Serializable view of current metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub links_processed: u64,
    pub probes_online: u64,
    pub probes_offline: u64,
    pub status_changes: u64,
    pub last_event_ts: u64,
}

pub fn log_metrics_snapshot(snapshot: &MetricsSnapshot) {
    info!(
        target: "metrics",
        event = "metrics_snapshot",
        links_processed = snapshot.links_processed,
        probes_online = snapshot.probes_online,
        probes_offline = snapshot.probes_offline,
        status_changes = snapshot.status_changes,
        last_event_ts = snapshot.last_event_ts,
        "metrics snapshot"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = Metrics::default();
        metrics.record_link_processed(Some("https://example.com/bt/1"));
        metrics.record_link_processed(None);
        metrics.record_probe(true);
        metrics.record_probe(false);
        metrics.record_probe(false);
        metrics.record_status_change(true);

        let snap = metrics.snapshot();
        assert_eq!(snap.links_processed, 2);
        assert_eq!(snap.probes_online, 1);
        assert_eq!(snap.probes_offline, 2);
        assert_eq!(snap.status_changes, 1);
        assert!(snap.last_event_ts > 0);
    }
}
