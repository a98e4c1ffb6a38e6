//! Domain types for a single payment session: money, statuses, the session
//! record threaded through the host, signatures, and the gateway port.

pub mod money;
pub mod ports;
pub mod session;
pub mod signature;
pub mod status;
