/// Normalises a possibly negative index against a container length.
///
/// Negative indices count from the end. Returns `None` when the index is
/// out of bounds in either direction.
///
/// # Example
/// ```
/// use zelo::util::num::normalize_index;
///
/// assert_eq!(normalize_index(1, 3), Some(1));
/// assert_eq!(normalize_index(-1, 3), Some(2));
/// assert_eq!(normalize_index(3, 3), None);
/// assert_eq!(normalize_index(-4, 3), None);
/// ```
#[must_use]
pub const fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let position = if index < 0 { index + len } else { index };

    if position < 0 || position >= len {
        None
    } else {
        Some(position as usize)
    }
}

/// Converts an `i64` to a `u32` character scalar when in range.
#[must_use]
pub fn i64_to_char(value: i64) -> Option<char> {
    u32::try_from(value).ok().and_then(char::from_u32)
}
