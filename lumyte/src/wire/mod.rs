//! The FPGA receiver's Layer-2 protocol: packet layouts and the raw
//! socket that carries them.

pub mod packet;
pub mod socket;

pub use socket::{LinkTx, RawLink};
