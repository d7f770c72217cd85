use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// process counters exposed on /metrics
#[derive(Debug, Default)]
pub struct Metrics {
    pub requests: AtomicU64,
    pub rate_limited: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    pub runs_created: AtomicU64,
    pub runs_failed: AtomicU64,
    pub sims_completed: AtomicU64,
    pub upstream_errors: AtomicU64,
}

impl Metrics {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU64, amount: u64) {
        counter.fetch_add(amount, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        BTreeMap::from([
            ("requests", self.requests.load(Ordering::Relaxed)),
            ("rate_limited", self.rate_limited.load(Ordering::Relaxed)),
            ("cache_hits", self.cache_hits.load(Ordering::Relaxed)),
            ("cache_misses", self.cache_misses.load(Ordering::Relaxed)),
            ("runs_created", self.runs_created.load(Ordering::Relaxed)),
            ("runs_failed", self.runs_failed.load(Ordering::Relaxed)),
            ("sims_completed", self.sims_completed.load(Ordering::Relaxed)),
            ("upstream_errors", self.upstream_errors.load(Ordering::Relaxed)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = Metrics::default();
        Metrics::bump(&metrics.requests);
        Metrics::bump(&metrics.requests);
        Metrics::add(&metrics.sims_completed, 1_000);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot["requests"], 2);
        assert_eq!(snapshot["sims_completed"], 1_000);
        assert_eq!(snapshot["rate_limited"], 0);
    }
}
