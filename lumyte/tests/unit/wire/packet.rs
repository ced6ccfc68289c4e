use super::*;

#[test]
fn row_header_layout_matches_the_receiver() {
    let width = 320u32;
    let mut buf = vec![0u8; row_packet_len(width)];
    let pixels = vec![0u8; width as usize * 4];

    fill_row_packet(&mut buf, 37, width, &pixels).unwrap();

    assert_eq!(buf[0], 37);
    assert_eq!(&buf[1..3], &[0, 0]);
    assert_eq!(&buf[3..5], &320u16.to_be_bytes());
    assert_eq!(&buf[5..7], &[0x08, 0x88]);
    assert_eq!(buf.len(), 7 + 320 * 3);
}

#[test]
fn pixels_reorder_bgra_to_rgb() {
    let width = 2u32;
    let mut buf = vec![0u8; row_packet_len(width)];
    let pixels = [0x11, 0x22, 0x33, 0xff, 0xaa, 0xbb, 0xcc, 0x00];

    fill_row_packet(&mut buf, 0, width, &pixels).unwrap();

    // BGRA in memory becomes packed RGB on the wire; alpha is dropped.
    assert_eq!(&buf[7..13], &[0x33, 0x22, 0x11, 0xcc, 0xbb, 0xaa]);
}

#[test]
fn rejects_mismatched_buffer_or_pixel_lengths() {
    let mut short_buf = vec![0u8; row_packet_len(320) - 1];
    assert!(fill_row_packet(&mut short_buf, 0, 320, &vec![0u8; 320 * 4]).is_err());

    let mut buf = vec![0u8; row_packet_len(320)];
    assert!(fill_row_packet(&mut buf, 0, 320, &vec![0u8; 319 * 4]).is_err());
}

#[test]
fn commit_packet_embeds_brightness_at_known_offsets() {
    for brightness in [0u8, 42, 255] {
        let payload = commit_packet(brightness);
        assert_eq!(payload.len(), 98);
        assert_eq!(payload[21], brightness);
        assert_eq!(payload[22], 5);
        assert_eq!(payload[24], brightness);
        assert_eq!(payload[25], brightness);
        assert_eq!(payload[26], brightness);
        for (i, &byte) in payload.iter().enumerate() {
            if ![21, 22, 24, 25, 26].contains(&i) {
                assert_eq!(byte, 0, "byte {i} should be zero");
            }
        }
    }
}

#[test]
fn commit_zero_brightness_still_sets_gamma_flag() {
    let payload = commit_packet(0);
    assert_eq!(payload[22], 5);
    assert_eq!(payload.iter().filter(|&&b| b != 0).count(), 1);
}
