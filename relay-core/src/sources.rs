//! Injectable time and identifier sources.
//!
//! Snapshot construction needs the current wall-clock time and a fresh
//! state id. Both are injected as capabilities so tests can supply
//! deterministic values instead of reaching for globals.

use relay_types::StateId;

/// A source of seconds-resolution wall-clock time.
pub trait Clock: Send + Sync {
    /// Current Unix time in seconds.
    fn now_unix(&self) -> u64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// A source of fresh snapshot state ids.
pub trait StateIdSource: Send + Sync {
    /// Generate a new unique state id.
    fn next_state_id(&self) -> StateId;
}

/// Random UUID v4 state ids, the production source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl StateIdSource for RandomIds {
    fn next_state_id(&self) -> StateId {
        StateId::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_recent() {
        let now = SystemClock.now_unix();
        // After 2024-01-01, before 2100.
        assert!(now > 1_704_000_000);
        assert!(now < 4_102_444_800);
    }

    #[test]
    fn random_ids_are_unique() {
        let ids = RandomIds;
        assert_ne!(ids.next_state_id(), ids.next_state_id());
    }
}
