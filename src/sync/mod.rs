//! Replication of the progression state to a companion device.
//!
//! The producer pushes snapshots through a [`ReplicationHandle`]; one
//! sender task debounces them and delivers the latest through a
//! [`Transport`]. The companion applies them with a [`CompanionReceiver`].
//!
//! Build with the `web` feature for the WebSocket transport and server:
//! ```sh
//! cargo build --features web
//! ./target/debug/cultivation serve 3000
//! ./target/debug/cultivation run --companion ws://localhost:3000
//! ```

pub mod protocol;
pub mod receiver;
pub mod replicator;

#[cfg(feature = "web")]
mod ws;

pub use protocol::{Envelope, LeaderboardEntry, SyncError, TimeScope};
pub use receiver::{CompanionReceiver, Received};
pub use replicator::{
    spawn_replicator, ChannelTransport, ReplicationHandle, ReplicatorStats, Transport,
};

#[cfg(feature = "web")]
pub use ws::{start_companion_server, WsTransport};
