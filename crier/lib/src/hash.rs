//! Deterministic content hashing for cache keys.
//!
//! This is the classic 32-bit `h * 31 + c` rolling hash, rendered in
//! base-36. It is explicitly NOT cryptographic: two distinct texts can
//! collide, which is acceptable for cache bucketing. The algorithm is pinned
//! — switching to a stronger hash would silently orphan every artifact the
//! cache collaborator already holds under the old keys.

/// Hash arbitrary text into a short base-36 cache key.
///
/// Deterministic and pure: identical input yields the identical key on every
/// run and platform. The accumulator walks UTF-16 code units (matching
/// `charCodeAt` semantics under which existing cache entries were keyed)
/// with signed 32-bit wraparound, and the final value is the absolute value
/// rendered in lowercase base-36.
///
/// ## Examples
///
/// ```
/// use crier_lib::hash::content_hash;
///
/// assert_eq!(content_hash("abc"), content_hash("abc"));
/// assert_ne!(content_hash("abc"), content_hash("abd"));
/// ```
pub fn content_hash(text: &str) -> String {
    let mut acc: i32 = 0;
    for unit in text.encode_utf16() {
        // (acc << 5) - acc + unit, truncated to 32 bits
        acc = acc
            .wrapping_shl(5)
            .wrapping_sub(acc)
            .wrapping_add(unit as i32);
    }
    to_base36(acc.unsigned_abs())
}

/// Render an unsigned value in lowercase base-36.
fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base-36 digits are ASCII")
}
