//! Content hashing.
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let key = hash::digest(&bytes); // 64-char hex
//! ```

/// Hex-encoded blake3 digest of a byte slice.
#[inline]
pub fn digest<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    blake3::hash(data.as_ref()).to_hex().to_string()
}

/// Digest of several parts, each length-prefixed so boundaries matter.
pub fn digest_parts<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    hasher.finalize().to_hex().to_string()
}
