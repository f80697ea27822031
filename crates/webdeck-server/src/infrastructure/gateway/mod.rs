//! Network gateways: the REST configuration endpoint and the real-time
//! WebSocket listener.
//!
//! Both speak JSON over the wire and both funnel into the same `SyncHub`, so
//! an edit arriving over REST reaches every WebSocket viewer in one hop.

pub mod realtime;
pub mod rest;
