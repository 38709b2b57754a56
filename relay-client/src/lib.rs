//! # relay-client
//!
//! Client library for the state-relay snapshot sync protocol.
//!
//! Multiple application instances ("devices") keep a shared, versioned
//! piece of state in sync by publishing encrypted snapshot messages over a
//! decentralized publish/subscribe transport. Concurrent writes resolve
//! deterministically: highest revision wins, then newest transport
//! timestamp, then the lexicographically smallest device id.
//!
//! ## Features
//!
//! - **Opaque snapshots**: payloads are self-encrypted via a pluggable
//!   [`Identity`] provider; the transport only sees tags
//! - **Cheap winner selection**: conflicts resolve on message tags, so only
//!   one candidate is ever decrypted
//! - **Transport Abstraction**: pluggable pool ([`RelayPool`], mock included)
//! - **Pure Core**: construction and conflict logic live in relay-core
//!
//! ## Example
//!
//! ```ignore
//! use state_relay_client::{MockPool, RelayConfig, StateRelay};
//!
//! let relay = StateRelay::new(config, pool, identity);
//!
//! relay.publish_snapshot(serde_json::json!({"doors": "locked"}), 1).await?;
//! let latest = relay.fetch_latest_snapshot().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod events;
pub mod identity;
pub mod pool;
pub mod relay;
pub mod snapshot;

pub use config::{RelayConfig, RelayEndpoints, RelayOptions};
pub use events::{EventListeners, PublishedSnapshot, RelayEvent};
pub use identity::{CallCounters, Identity, IdentityError, MockIdentity};
pub use pool::{
    EndpointOutcome, MessageFilter, MockPool, PoolError, RelayPool, Subscription,
    SubscriptionHandlers,
};
pub use relay::{ClientError, RelayStatus, StateRelay};
pub use snapshot::{SnapshotCodec, SnapshotError};
