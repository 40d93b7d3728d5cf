//! Circular comparison of 16-bit counters (ticks, generations, voice
//! sequence ids). The space wraps at 65536, so ordering is decided by the
//! forward distance between two values rather than their numeric order.

const HALF_RANGE: u16 = 1 << 15;

/// Returns whether `incoming` is strictly newer than `local`: the forward
/// distance from `local` to `incoming` is non-zero and smaller than half the
/// space.
///
/// sequence_newer(14, 9) will return true
/// sequence_newer(0, 65535) will return true
/// sequence_newer(8, 14) will return false
pub fn sequence_newer(incoming: u16, local: u16) -> bool {
    let forward = incoming.wrapping_sub(local);
    forward != 0 && forward < HALF_RANGE
}

/// Returns whether or not a wrapping number is greater than another.
/// Exactly half the space apart counts as greater for the larger value.
///
/// sequence_greater_than(2,1) will return true
/// sequence_greater_than(1,2) will return false
/// sequence_greater_than(1,1) will return false
pub fn sequence_greater_than(s1: u16, s2: u16) -> bool {
    ((s1 > s2) && (s1 - s2 <= HALF_RANGE)) || ((s1 < s2) && (s2 - s1 > HALF_RANGE))
}

pub fn sequence_less_than(s1: u16, s2: u16) -> bool {
    sequence_greater_than(s2, s1)
}

/// Signed distance from `a` forward to `b`.
///
/// # Examples
/// ```
/// # use tether_shared::wrapping_diff;
/// assert_eq!(wrapping_diff(1, 2), 1);
/// assert_eq!(wrapping_diff(2, 1), -1);
/// assert_eq!(wrapping_diff(65535, 0), 1);
/// assert_eq!(wrapping_diff(0, 65535), -1);
/// ```
pub fn wrapping_diff(a: u16, b: u16) -> i16 {
    b.wrapping_sub(a) as i16
}
