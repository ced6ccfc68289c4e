//! Client side of the Redis-style broker: RESP codec, request/reply
//! client, and the pub/sub subscriber.

/// Request/reply client and pub/sub subscriber.
pub mod client;
/// RESP protocol codec.
pub mod resp;
