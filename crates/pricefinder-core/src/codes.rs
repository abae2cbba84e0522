//! Lookup tables for the catalog's numeric color and size codes.
//!
//! The variant API reports colors as codes like `"COL09"` and sizes as codes
//! like `"SMA004"`. Only the trailing digits carry meaning: the last two for
//! colors, the last three for sizes.

/// Label returned for color codes outside every named range.
pub const OTHER_COLOR: &str = "Others 其他";

const SIZES: &[(u32, &str)] = &[
    (1, "XXS"),
    (2, "XS"),
    (3, "S"),
    (4, "M"),
    (5, "L"),
    (6, "XL"),
    (7, "XXL"),
    (8, "3XL"),
    (9, "4XL"),
    (23, "23-25"),
    (25, "25-27"),
    (27, "27-29"),
    (60, "60"),
    (70, "70"),
    (80, "80"),
    (90, "90"),
    (100, "100"),
    (110, "110"),
    (120, "120"),
    (130, "130"),
    (140, "140"),
    (150, "150"),
    (160, "160"),
    (499, "AA 65/70"),
    (500, "AB 65/70"),
    (501, "CD 65/70"),
    (502, "EF 65/70"),
    (503, "AB 75/80"),
    (504, "CD 75/80"),
    (505, "EF 75/80"),
    (506, "AB 85/90"),
    (507, "CD 85/90"),
    (508, "EF 85/90"),
];

/// Maps a two-digit color code onto its color family.
#[must_use]
pub fn decode_color(code: u32) -> &'static str {
    match code {
        0..=1 => "White 白",
        2..=8 => "Gray 灰",
        9 => "Black 黑",
        10..=19 => "Red 紅",
        20..=29 => "Orange 橘",
        30..=39 => "Brown 棕",
        40..=49 => "Yellow 黃",
        50..=59 => "Green 綠",
        60..=68 => "Blue 藍",
        69 => "Navy 海軍藍",
        70..=79 => "Purple 紫",
        _ => OTHER_COLOR,
    }
}

/// Maps a size code onto its display label. Unknown codes yield `""`.
#[must_use]
pub fn decode_size(code: u32) -> &'static str {
    SIZES
        .iter()
        .find(|(c, _)| *c == code)
        .map_or("", |(_, label)| *label)
}

/// Decodes a raw color code such as `"COL09"` using its last two characters.
///
/// A non-numeric tail decodes to [`OTHER_COLOR`].
#[must_use]
pub fn decode_raw_color(raw: &str) -> &'static str {
    trailing_number(raw, 2).map_or(OTHER_COLOR, decode_color)
}

/// Decodes a raw size code such as `"SMA004"` using its last three characters.
///
/// A non-numeric tail decodes to `""`.
#[must_use]
pub fn decode_raw_size(raw: &str) -> &'static str {
    trailing_number(raw, 3).map_or("", decode_size)
}

fn trailing_number(raw: &str, digits: usize) -> Option<u32> {
    let chars: Vec<char> = raw.trim().chars().collect();
    let start = chars.len().saturating_sub(digits);
    let tail: String = chars[start..].iter().collect();
    tail.parse::<u32>().ok()
}
