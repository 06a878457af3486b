//! Network Module
//!
//! TCP listener and connection handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Bounded worker pool; a full queue means 503 and close
//! - One request per connection, routed through the `Router`

mod server;
mod connection;
mod pool;
pub mod client;

pub use server::Server;
pub use connection::{reject, Connection, ConnectionLimits};
pub use pool::WorkerPool;
