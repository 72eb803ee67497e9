//! Read entities definitions.

pub mod favorite;
pub mod movie;
pub mod server;
pub mod watch;
pub mod watch_history;
