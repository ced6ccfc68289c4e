//! FPGA receiver packet layouts.
//!
//! Two payloads drive the display: a row packet per scanline and a commit
//! packet per frame. The layouts were reverse-engineered from the
//! receiver card; every offset below is load-bearing.

use crate::foundation::core::BYTES_PER_PIXEL;
use crate::foundation::error::{LumyteError, LumyteResult};

/// EtherType of row data packets.
pub const ROW_ETHER_TYPE: u16 = 0x5500;
/// EtherType of frame commit packets.
pub const COMMIT_ETHER_TYPE: u16 = 0x0107;
/// The FPGA receiver's default MAC address.
pub const DEST_MAC: [u8; 6] = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66];

/// Row header length in bytes.
pub const ROW_HEADER_LEN: usize = 7;
/// Commit packet payload length in bytes.
pub const COMMIT_LEN: usize = 98;

// Offsets into the commit payload. Byte 22 is a gamma-correction flag the
// receiver expects to be the constant 5.
const COMMIT_BRIGHTNESS: usize = 21;
const COMMIT_GAMMA_FLAG: usize = 22;
const COMMIT_BRIGHTNESS_R: usize = 24;
const COMMIT_BRIGHTNESS_G: usize = 25;
const COMMIT_BRIGHTNESS_B: usize = 26;
const GAMMA_FLAG: u8 = 5;

/// Payload length of a row packet for a sign `width` pixels wide.
pub fn row_packet_len(width: u32) -> usize {
    ROW_HEADER_LEN + width as usize * 3
}

/// Fill `buf` with one row packet: the 7-byte header followed by the
/// row's pixels reordered from canvas BGRA to wire RGB (alpha dropped,
/// no premultiplication).
///
/// `buf` must be exactly [`row_packet_len`] bytes and `row_bgra` exactly
/// `width · 4`; the caller owns the buffer so the hot loop never
/// allocates.
pub fn fill_row_packet(
    buf: &mut [u8],
    row: u8,
    width: u32,
    row_bgra: &[u8],
) -> LumyteResult<()> {
    if buf.len() != row_packet_len(width) {
        return Err(LumyteError::protocol(format!(
            "row buffer is {} bytes, want {}",
            buf.len(),
            row_packet_len(width)
        )));
    }
    if row_bgra.len() != width as usize * BYTES_PER_PIXEL {
        return Err(LumyteError::protocol(format!(
            "row pixel data is {} bytes, want {}",
            row_bgra.len(),
            width as usize * BYTES_PER_PIXEL
        )));
    }

    let [width_hi, width_lo] = (width as u16).to_be_bytes();
    buf[0] = row;
    buf[1] = 0;
    buf[2] = 0;
    buf[3] = width_hi;
    buf[4] = width_lo;
    buf[5] = 0x08;
    buf[6] = 0x88;

    for (dst, src) in buf[ROW_HEADER_LEN..]
        .chunks_exact_mut(3)
        .zip(row_bgra.chunks_exact(BYTES_PER_PIXEL))
    {
        dst[0] = src[2];
        dst[1] = src[1];
        dst[2] = src[0];
    }
    Ok(())
}

/// Build the commit payload: 98 zero bytes with the hardware brightness
/// at its global and per-channel offsets and the gamma flag set.
pub fn commit_packet(brightness: u8) -> [u8; COMMIT_LEN] {
    let mut payload = [0u8; COMMIT_LEN];
    payload[COMMIT_BRIGHTNESS] = brightness;
    payload[COMMIT_GAMMA_FLAG] = GAMMA_FLAG;
    payload[COMMIT_BRIGHTNESS_R] = brightness;
    payload[COMMIT_BRIGHTNESS_G] = brightness;
    payload[COMMIT_BRIGHTNESS_B] = brightness;
    payload
}

#[cfg(test)]
#[path = "../../tests/unit/wire/packet.rs"]
mod tests;
