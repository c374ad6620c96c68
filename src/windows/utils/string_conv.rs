//! String conversion utilities for the provider ABI

/// Convert a Rust string to a NUL-terminated UTF-16 string
pub fn string_to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Convert a UTF-16 string to a Rust string, stopping at the first NUL
pub fn wide_to_string(wide: &[u16]) -> String {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    String::from_utf16_lossy(&wide[..len])
}

/// Convert a UTF-16 string pointer to a Rust string
///
/// # Safety
/// The pointer must be null or point to a NUL-terminated UTF-16 string
pub unsafe fn wide_ptr_to_string(ptr: *const u16) -> String {
    if ptr.is_null() {
        return String::new();
    }

    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }

    let slice = std::slice::from_raw_parts(ptr, len);
    wide_to_string(slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_wide() {
        let wide = string_to_wide("Hello");
        assert_eq!(wide, vec![72, 101, 108, 108, 111, 0]);

        let empty = string_to_wide("");
        assert_eq!(empty, vec![0]);
    }

    #[test]
    fn test_wide_to_string() {
        let wide = vec![72, 101, 108, 108, 111, 0];
        assert_eq!(wide_to_string(&wide), "Hello");

        let no_null = vec![72, 101, 108, 108, 111];
        assert_eq!(wide_to_string(&no_null), "Hello");
    }

    #[test]
    #[cfg_attr(miri, ignore = "Unsafe pointer operations")]
    fn test_wide_ptr_to_string() {
        unsafe {
            assert_eq!(wide_ptr_to_string(std::ptr::null()), "");
        }

        let wide_str = string_to_wide("explorer.exe");
        unsafe {
            assert_eq!(wide_ptr_to_string(wide_str.as_ptr()), "explorer.exe");
        }
    }

    #[test]
    fn test_unicode_strings() {
        let unicode_str = "Hello 世界 🌍";
        let wide = string_to_wide(unicode_str);
        let back = wide_to_string(&wide);
        assert_eq!(back, unicode_str);
    }
}
