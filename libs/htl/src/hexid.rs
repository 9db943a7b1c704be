//! Fixed-width hexadecimal tokens for element identities.

use std::fmt::Write;

/// Character length of generated element ids (6 entropy bytes).
pub const ID_LEN: usize = 12;

/// `nbytes` random bytes as a lowercase hex string, 2 characters per
/// byte.
pub fn random_hex(nbytes: usize) -> Result<String, getrandom::Error> {
    let mut buf = vec![0u8; nbytes];
    getrandom::getrandom(&mut buf)?;
    let mut s = String::with_capacity(nbytes * 2);
    for byte in buf {
        write!(&mut s, "{:02x}", byte).expect("writing to a String");
    }
    Ok(s)
}

/// A fresh random element id.
pub fn random_id() -> Result<String, getrandom::Error> {
    random_hex(ID_LEN / 2)
}

/// The hex number one above `id`, left-padded with zeros back to
/// `id`'s width; grows wider when the increment carries out of that
/// width. `None` if `id` is not hex, empty, or too long to treat as a
/// number (over 32 digits).
pub fn hex_succ(id: &str) -> Option<String> {
    if id.is_empty() || id.len() > 32 {
        return None;
    }
    let n = u128::from_str_radix(id, 16).ok()?;
    let next = n.checked_add(1)?;
    Some(format!("{next:0width$x}", width = id.len()))
}
