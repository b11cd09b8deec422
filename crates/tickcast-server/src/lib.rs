//! tickcast-server: fixed-rate counter broadcast over WebSocket.
//!
//! A background task advances a wrapping counter every tick, stamps it with
//! the local time and pushes the JSON message to every connected subscriber.
//! Connection tasks register and deregister themselves in a shared
//! [`Registry`]; the broadcast loop only ever iterates a snapshot of it.

pub mod broadcast;
pub mod clock;
pub mod connection;
pub mod generator;
pub mod lifecycle;
pub mod registry;
pub mod server;

pub use broadcast::{
    spawn_broadcast, BroadcastLoop, BroadcastReport, BroadcastTask, Liveness, StopReason,
    TickOutcome,
};
pub use clock::{Clock, FixedClock, LocalClock};
pub use generator::ValueGenerator;
pub use lifecycle::Lifecycle;
pub use registry::{Registry, Subscriber};
pub use server::Server;
