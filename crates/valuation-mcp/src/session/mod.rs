//! Per-connection session state and the listener's table of live sessions.

pub mod manager;
pub mod table;

pub use manager::{InFlight, Session};
pub use table::{ActiveSessions, SessionInfo};
