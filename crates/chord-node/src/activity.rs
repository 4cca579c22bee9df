//! Optional idle-shutdown watchdog. Operator-configurable, not a product
//! requirement (spec §9): a node that never stops serving never trips it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct ActivityTimer {
    start: Instant,
    last_ms: Arc<AtomicU64>,
    idle_limit: Duration,
}

impl ActivityTimer {
    pub fn new(idle_limit_mins: u64) -> Self {
        ActivityTimer {
            start: Instant::now(),
            last_ms: Arc::new(AtomicU64::new(0)),
            idle_limit: Duration::from_secs(idle_limit_mins * 60),
        }
    }

    pub fn touch(&self) {
        let ms = self.start.elapsed().as_millis() as u64;
        self.last_ms.store(ms, Ordering::Relaxed);
    }

    pub fn is_idle(&self) -> bool {
        let now = self.start.elapsed().as_millis() as u64;
        let last = self.last_ms.load(Ordering::Relaxed);
        let idle_ms = now.saturating_sub(last) as u128;
        idle_ms >= self.idle_limit.as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_timer_is_not_idle() {
        let timer = ActivityTimer::new(15);
        timer.touch();
        assert!(!timer.is_idle());
    }

    #[test]
    fn zero_minute_limit_is_immediately_idle() {
        let timer = ActivityTimer::new(0);
        timer.touch();
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.is_idle());
    }
}
