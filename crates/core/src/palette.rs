//! Background colors keyed by dominant emotion.

/// Mint green.
pub const JOY: (u8, u8, u8) = (0x99, 0xED, 0xC3);
/// Yellow.
pub const SADNESS: (u8, u8, u8) = (0xFF, 0xE1, 0x35);
/// Soft red.
pub const ANGER: (u8, u8, u8) = (0xED, 0x99, 0x99);
/// Light blue.
pub const NEUTRAL: (u8, u8, u8) = (0x99, 0xED, 0xED);
/// Default for unmapped labels.
pub const WHITE: (u8, u8, u8) = (0xFF, 0xFF, 0xFF);

/// Background color for an emotion label (case-insensitive).
pub fn background(label: &str) -> (u8, u8, u8) {
    match label.to_lowercase().as_str() {
        "joy" => JOY,
        "sadness" => SADNESS,
        "anger" => ANGER,
        "neutral" => NEUTRAL,
        _ => WHITE,
    }
}
