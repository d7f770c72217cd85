use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

/// token bucket per source address. refill is continuous at the
/// configured rate; burst is the bucket depth.
pub struct RateLimiter {
    buckets: Mutex<HashMap<IpAddr, Bucket>>,
    per_second: f64,
    burst: f64,
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    refreshed: Instant,
}

impl RateLimiter {
    pub fn new(requests: u32, window: Duration, burst: u32) -> Self {
        let per_second = requests as f64 / window.as_secs_f64().max(1e-9);
        Self {
            buckets: Mutex::new(HashMap::new()),
            per_second,
            burst: burst.max(1) as f64,
        }
    }

    /// take one token, or report how many seconds until one is available
    pub fn try_acquire(&self, source: IpAddr) -> Result<(), u64> {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().expect("limiter lock");
        let bucket = buckets
            .entry(source)
            .or_insert(Bucket { tokens: self.burst, refreshed: now });
        let elapsed = now.duration_since(bucket.refreshed).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.per_second).min(self.burst);
        bucket.refreshed = now;
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            let wait = (1.0 - bucket.tokens) / self.per_second;
            Err(wait.ceil() as u64)
        }
    }

    /// drop buckets that have fully refilled; they carry no state
    pub fn sweep(&self) {
        let now = Instant::now();
        let idle = Duration::from_secs_f64(self.burst / self.per_second.max(1e-9));
        self.buckets
            .lock()
            .expect("limiter lock")
            .retain(|_, bucket| now.duration_since(bucket.refreshed) < idle);
    }
}
