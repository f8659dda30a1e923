//! Stable display colours for courses.
//!
//! The colour of a course is a pure function of its key, so it survives
//! reloads and does not depend on the order courses were added in.

/// The colour palette, as CSS hex strings.
pub const PALETTE: [&str; 12] = [
    "#3B82F6", // blue
    "#10B981", // emerald
    "#F59E0B", // amber
    "#EF4444", // red
    "#8B5CF6", // violet
    "#EC4899", // pink
    "#14B8A6", // teal
    "#F97316", // orange
    "#6366F1", // indigo
    "#84CC16", // lime
    "#06B6D4", // cyan
    "#A855F7", // purple
];

/// Hash a key with a 31-based rolling hash and a `MurmurHash3` finalizer.
///
/// All arithmetic wraps at 32 bits.
#[must_use]
pub fn color_hash(key: &str) -> u32 {
    // One step per UTF-16 code unit.
    let mut h = key
        .encode_utf16()
        .fold(0u32, |hash, unit| hash.wrapping_mul(31).wrapping_add(u32::from(unit)));

    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// The palette entry for a course key.
///
/// The hash is read as a signed 32-bit value and its magnitude picks the
/// entry. Distinct keys may share a colour.
#[must_use]
pub fn get_deterministic_color(key: &str) -> &'static str {
    #[allow(clippy::cast_possible_wrap)]
    let signed = color_hash(key) as i32;
    let index = signed.unsigned_abs() as usize % PALETTE.len();
    PALETTE[index]
}
