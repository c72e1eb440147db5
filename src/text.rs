/// Decode a NUL-terminated UTF-16 buffer as the OS hands it back.
///
/// Stops at the first NUL, or at the end of the buffer when there is none.
/// Unpaired surrogates become U+FFFD.
pub fn decode_wide(chars: &[u16]) -> String {
    let end = chars.iter().position(|&c| c == 0).unwrap_or(chars.len());
    String::from_utf16_lossy(&chars[..end])
}
