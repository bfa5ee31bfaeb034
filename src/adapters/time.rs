//! Monotonic clock adapter.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` (µs since
//!   boot).
//! - **`not(target_os = "espidf")`**: `std::time::Instant`.
//!
//! The loop works in wrapping `u32` milliseconds (~49.7 days per lap);
//! [`IntervalGate`](crate::interval::IntervalGate) handles the rollover.

/// Time source for adapters that schedule their own retries.
pub trait Clock {
    /// Wrapping milliseconds since boot.
    fn now_ms(&self) -> u32;

    /// Seconds since the Unix epoch, 0 until the wall clock is set (SNTP).
    fn unix_time_secs(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}

pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot.
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: read of the free-running high-resolution timer.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Clock for MonotonicClock {
    /// Milliseconds since boot, truncated to `u32` (wraps).
    fn now_ms(&self) -> u32 {
        (self.uptime_us() / 1_000) as u32
    }
}
