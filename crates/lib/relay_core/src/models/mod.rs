//! Wire models shared by the relay, the backend and the client.
//!
//! Field names are serialized as-is; the browser widget and the upstream
//! backend both speak this exact shape.

pub mod chat;
pub mod envelope;
