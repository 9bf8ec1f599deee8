//! Wire frames for the VTTOUCHW wall panel.
//!
//! Captured from the bus with a USB-to-RS485 sniffer. Each frame starts
//! with `0x01`, ends with `0x04` and already carries the panel's checksum;
//! nothing here is computed.

use super::mode::Mode;

/// Frame footer.
pub const FRAME_END: u8 = 0x04;

/// Frame header.
pub const FRAME_START: u8 = 0x01;

/// The panel's reply to any accepted control frame.
pub const ACK_FRAME: [u8; 12] = [
    0x01, 0x12, 0x10, 0x01, 0x05, 0x41, 0x08, 0x20, 0x00, 0x20, 0x4f, 0x04,
];

pub const COMMAND_FRAME_LEN: usize = 16;

type CommandFrame = [u8; COMMAND_FRAME_LEN];

// Only byte 9 (the mode code) and byte 14 (checksum) differ between modes.
const STANDBY: CommandFrame = [
    0x01, 0x10, 0x12, 0x01, 0x09, 0x40, 0x00, 0x20, 0x01, 0x01, 0x08, 0x20, 0x01, 0x00, 0x49, 0x04,
];
const SMART: CommandFrame = [
    0x01, 0x10, 0x12, 0x01, 0x09, 0x40, 0x00, 0x20, 0x01, 0x11, 0x08, 0x20, 0x01, 0x00, 0x39, 0x04,
];
const MIN: CommandFrame = [
    0x01, 0x10, 0x12, 0x01, 0x09, 0x40, 0x00, 0x20, 0x01, 0x09, 0x08, 0x20, 0x01, 0x00, 0x41, 0x04,
];
const MED: CommandFrame = [
    0x01, 0x10, 0x12, 0x01, 0x09, 0x40, 0x00, 0x20, 0x01, 0x0b, 0x08, 0x20, 0x01, 0x00, 0x3f, 0x04,
];
const MAX: CommandFrame = [
    0x01, 0x10, 0x12, 0x01, 0x09, 0x40, 0x00, 0x20, 0x01, 0x0a, 0x08, 0x20, 0x01, 0x00, 0x40, 0x04,
];
const RECIRC_MIN: CommandFrame = [
    0x01, 0x10, 0x12, 0x01, 0x09, 0x40, 0x00, 0x20, 0x01, 0x05, 0x08, 0x20, 0x01, 0x00, 0x45, 0x04,
];
const RECIRC_MED: CommandFrame = [
    0x01, 0x10, 0x12, 0x01, 0x09, 0x40, 0x00, 0x20, 0x01, 0x07, 0x08, 0x20, 0x01, 0x00, 0x43, 0x04,
];
const RECIRC_MAX: CommandFrame = [
    0x01, 0x10, 0x12, 0x01, 0x09, 0x40, 0x00, 0x20, 0x01, 0x06, 0x08, 0x20, 0x01, 0x00, 0x44, 0x04,
];
const AWAY: CommandFrame = [
    0x01, 0x10, 0x12, 0x01, 0x09, 0x40, 0x00, 0x20, 0x01, 0x0f, 0x08, 0x20, 0x01, 0x00, 0x3b, 0x04,
];

/// Transmit frame for `mode`.
pub const fn command_frame(mode: Mode) -> &'static [u8] {
    match mode {
        Mode::Standby => &STANDBY,
        Mode::Smart => &SMART,
        Mode::Away => &AWAY,
        Mode::Min => &MIN,
        Mode::Med => &MED,
        Mode::Max => &MAX,
        Mode::RecircMin => &RECIRC_MIN,
        Mode::RecircMed => &RECIRC_MED,
        Mode::RecircMax => &RECIRC_MAX,
    }
}

/// True if `needle` occurs as a contiguous run anywhere in `haystack`.
pub fn contains_frame(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Lowercase hex rendering of a frame, no separators.
pub struct Hex<'a>(pub &'a [u8]);

impl core::fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{:02x}", b))
    }
}

/// A bus frame worth showing: starts with the header byte.
pub fn is_frame(bytes: &[u8]) -> bool {
    bytes.first() == Some(&FRAME_START)
}

/// Frames the panel and the ERV repeat on their own: polls, status
/// reports, the idle heartbeat. None of them carry a control command.
pub const BACKGROUND_FRAMES: &[&[u8]] = &[
    &[0x01, 0x10, 0x12, 0x01, 0x01, 0x04],
    &[0x01, 0x12, 0x10, 0x01, 0x01, 0x05, 0xd7, 0x04],
    &[0x01, 0x12, 0x10, 0x01, 0x01, 0x04],
    &[0x01, 0x10, 0x12, 0x01, 0x01, 0x05, 0xd7, 0x04],
    &[0x01, 0x12, 0x10, 0x01, 0x23, 0x21, 0x04],
    &[0x01, 0x10, 0x12, 0x01, 0x0b, 0x20, 0x04],
    &[
        0x01, 0x10, 0x12, 0x01, 0x0b, 0x20, 0x08, 0x30, 0x09, 0x30, 0x19, 0x50, 0x20, 0x50, 0x21,
        0x50, 0xf7, 0x04,
    ],
    &[
        0x01, 0x12, 0x10, 0x01, 0x1b, 0x21, 0x21, 0x50, 0x01, 0x01, 0x20, 0x50, 0x01, 0x01, 0x19,
        0x50, 0x01, 0x00, 0x09, 0x30, 0x04,
    ],
    &[0x01, 0x12, 0x10, 0x01, 0x14, 0x21, 0x09, 0x50, 0x04],
    &[
        0x01, 0x10, 0x12, 0x01, 0x0b, 0x20, 0x02, 0x22, 0x03, 0x22, 0x0a, 0x22, 0x0c, 0x22, 0x0e,
        0x22, 0xdf, 0x04,
    ],
    &[0x01, 0x12, 0x10, 0x01, 0x1e, 0x21, 0x0c, 0x22, 0x04],
    &[
        0x01, 0x10, 0x12, 0x01, 0x09, 0x20, 0x0c, 0x21, 0x0d, 0x21, 0x08, 0x50, 0x09, 0x50, 0xa8,
        0x04,
    ],
    &[
        0x01, 0x12, 0x10, 0x01, 0x09, 0x21, 0x02, 0x30, 0x01, 0x01, 0x00, 0x30, 0x01, 0x00, 0x4e,
        0x04,
    ],
    &[0x01, 0x10, 0x12, 0x01, 0x07, 0x20, 0x12, 0x50, 0x13, 0x50, 0x14, 0x50, 0x8d, 0x04],
    &[
        0x01, 0x12, 0x10, 0x01, 0x0d, 0x21, 0x14, 0x50, 0x01, 0x00, 0x13, 0x50, 0x01, 0x01, 0x12,
        0x50, 0x01, 0x02, 0x80, 0x04,
    ],
    &[
        0x01, 0x10, 0x12, 0x01, 0x09, 0x20, 0x12, 0x00, 0x1a, 0x00, 0x01, 0xe0, 0x0a, 0xf0, 0xad,
        0x04,
    ],
    &[0x01, 0x10, 0x12, 0x01, 0x05, 0x20, 0x00, 0x30, 0x02, 0x30, 0x56, 0x04],
    &[
        0x01, 0x12, 0x10, 0x01, 0x15, 0x21, 0x10, 0x22, 0x01, 0x00, 0x0f, 0x22, 0x01, 0x00, 0x06,
        0x21, 0x01, 0x01, 0x05, 0x21, 0x01, 0x01, 0x04,
    ],
    &[
        0x01, 0x10, 0x12, 0x01, 0x0f, 0x20, 0x00, 0x20, 0x02, 0x20, 0x06, 0x20, 0x07, 0x20, 0x08,
        0x20, 0x03, 0x30, 0x04,
    ],
    &[0x01, 0x10, 0x12, 0x01, 0x0f, 0x40, 0x04],
    &[0x01, 0x12, 0x10, 0x01, 0x03, 0x41, 0x00, 0x50, 0x49, 0x04],
    &[0x01, 0x10, 0x12, 0x01, 0x04],
    &[0x01, 0x12, 0x10, 0x01, 0x08, 0x21, 0x14, 0x00, 0x04],
    &[0x01, 0x12, 0x10, 0x01, 0x05, 0x41, 0x05, 0x50, 0x04],
    &[0x01, 0x10, 0x12, 0x01, 0x03, 0x20, 0x14, 0x00, 0xa6, 0x04],
    &[
        0x01, 0x12, 0x10, 0x01, 0x91, 0x21, 0x0a, 0xf0, 0x78, 0x01, 0x00, 0x00, 0x00, 0xa8, 0x16,
        0x1f, 0x0a, 0x0e, 0x8b, 0x1f, 0x0a, 0x01, 0x00, 0x00, 0x00, 0x01, 0x13, 0x60, 0x3e, 0x67,
        0x87, 0x60, 0x3e, 0x32, 0x00, 0x00, 0x00, 0x37, 0xdb, 0x4b, 0x0f, 0xe2, 0x46, 0x60, 0x0f,
        0x32, 0x00, 0x00, 0x00, 0x19, 0xb3, 0x18, 0x0a, 0x2e, 0x58, 0x3a, 0x0a, 0x32, 0x00, 0x00,
        0x00, 0x9e, 0xe9, 0xbc, 0x09, 0x30, 0xfa, 0xbc, 0x09, 0x32, 0x00, 0x00, 0x00, 0x71, 0xab,
        0xb9, 0x09, 0xe5, 0x12, 0xbb, 0x09, 0x32, 0x00, 0x00, 0x00, 0x5e, 0x74, 0xb6, 0x09, 0xcc,
        0x0e, 0xb9, 0x09, 0x32, 0x00, 0x00, 0x00, 0x8b, 0xc5, 0x04,
    ],
];

/// True for a frame that is known background chatter.
pub fn is_background(frame: &[u8]) -> bool {
    BACKGROUND_FRAMES.iter().any(|known| *known == frame)
}
