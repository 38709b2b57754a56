//! Configuration for the state relay.

use relay_types::AppContext;

/// Recognized tuning options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOptions {
    /// Command time-to-live in seconds. Reserved for the command protocol;
    /// snapshot logic does not consult it.
    pub ttl: u32,
    /// Publish retry count, delegated to the transport pool.
    pub retries: u32,
    /// Maximum encoded snapshot size in bytes, enforced before encryption.
    pub max_snapshot_bytes: usize,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            ttl: 300,
            retries: 3,
            max_snapshot_bytes: 65536,
        }
    }
}

/// Endpoint sets for publishing and reading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayEndpoints {
    /// Endpoints snapshots are published to.
    pub publish: Vec<String>,
    /// Endpoints queried and subscribed for snapshots.
    pub read: Vec<String>,
}

/// Configuration for a [`StateRelay`](crate::StateRelay).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Which stream this instance writes to, and as whom.
    pub app: AppContext,
    /// Transport endpoints.
    pub endpoints: RelayEndpoints,
    /// Tuning options.
    pub options: RelayOptions,
}

impl RelayConfig {
    /// Create a configuration with default options.
    pub fn new(app: AppContext, endpoints: RelayEndpoints) -> Self {
        Self {
            app,
            endpoints,
            options: RelayOptions::default(),
        }
    }

    /// Set the command time-to-live.
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.options.ttl = ttl;
        self
    }

    /// Set the publish retry count.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.options.retries = retries;
        self
    }

    /// Set the maximum encoded snapshot size.
    pub fn with_max_snapshot_bytes(mut self, max: usize) -> Self {
        self.options.max_snapshot_bytes = max;
        self
    }
}
