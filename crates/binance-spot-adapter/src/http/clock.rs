/*
[INPUT]:  Server time samples and local wall-clock readings
[OUTPUT]: Clock offset state and adjusted timestamps for signed requests
[POS]:    HTTP layer - server clock synchronization
[UPDATE]: When changing the offset model or sync trigger policy
*/

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use chrono::Utc;

/// Offset between local wall-clock time and the exchange's server time.
///
/// The offset is only ever written by a successful sync. Two signed calls
/// racing before the first sync completes may both run a sync; the stores are
/// independent and last-writer-wins, which is harmless since both samples
/// observe the same server clock.
#[derive(Debug, Default)]
pub struct ServerClock {
    offset_ms: AtomicI64,
    synced: AtomicBool,
}

impl ServerClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a successful sync has happened.
    pub fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    /// Current offset in milliseconds; zero until the first sync.
    pub fn offset_ms(&self) -> i64 {
        self.offset_ms.load(Ordering::Acquire)
    }

    /// Record one round trip to the server's time endpoint.
    ///
    /// `local_before`/`local_after` are the local millisecond readings taken
    /// around the call. Half the round trip approximates the one-way latency,
    /// so the server sample is aligned to the midpoint of the window.
    pub fn record_sync(&self, server_time_ms: i64, local_before_ms: i64, local_after_ms: i64) {
        let round_trip = local_after_ms - local_before_ms;
        let offset = (server_time_ms - local_before_ms) - round_trip / 2;
        self.offset_ms.store(offset, Ordering::Release);
        self.synced.store(true, Ordering::Release);
    }

    /// Local time adjusted by the learned offset, or raw local time before
    /// the first sync.
    pub fn now_millis(&self) -> i64 {
        let local = local_millis();
        if self.is_synced() {
            local + self.offset_ms()
        } else {
            local
        }
    }
}

/// Raw local wall-clock milliseconds since the epoch.
pub fn local_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock_is_unsynced() {
        let clock = ServerClock::new();
        assert!(!clock.is_synced());
        assert_eq!(clock.offset_ms(), 0);
    }

    #[test]
    fn test_unsynced_now_is_local_time() {
        let clock = ServerClock::new();
        let before = local_millis();
        let now = clock.now_millis();
        let after = local_millis();
        assert!(now >= before && now <= after);
    }

    #[test]
    fn test_record_sync_midpoint_correction() {
        let clock = ServerClock::new();
        // Server is 10s ahead, observed through a 200ms round trip.
        clock.record_sync(1_010_000, 1_000_000, 1_000_200);
        assert!(clock.is_synced());
        assert_eq!(clock.offset_ms(), 10_000 - 100);
    }

    #[test]
    fn test_record_sync_negative_offset() {
        let clock = ServerClock::new();
        clock.record_sync(995_000, 1_000_000, 1_000_000);
        assert_eq!(clock.offset_ms(), -5_000);
    }

    #[test]
    fn test_resync_overwrites_offset() {
        let clock = ServerClock::new();
        clock.record_sync(1_005_000, 1_000_000, 1_000_000);
        assert_eq!(clock.offset_ms(), 5_000);
        clock.record_sync(2_001_000, 2_000_000, 2_000_000);
        assert_eq!(clock.offset_ms(), 1_000);
    }

    #[test]
    fn test_synced_now_applies_offset() {
        let clock = ServerClock::new();
        let local = local_millis();
        clock.record_sync(local + 60_000, local, local);
        let now = clock.now_millis();
        // Within a generous bound for test scheduling jitter.
        assert!((now - (local + 60_000)).abs() < 5_000);
    }
}
