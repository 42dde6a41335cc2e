use md5::{Digest, Md5};

/// Compute the MD5 checksum of a byte slice, returning a lowercase hex string.
///
/// Cookbook files are addressed by this checksum.
pub fn md5_bytes(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Whether `s` looks like a checksum produced by [`md5_bytes`].
pub fn is_md5_hex(s: &str) -> bool {
    s.len() == 32 && s.bytes().all(|b| b.is_ascii_hexdigit())
}
