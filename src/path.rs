//! Resource-identifier normalization.
//!
//! Editors on Windows export resources as `/k:/project/src/app.js`: a URI path
//! with a leading slash in front of the drive letter. These are turned into
//! native drive paths so that every diagnostic for one file lands on the same
//! grouping key.

use std::path::{Path, PathBuf};

/// Normalize a raw resource identifier into a canonical path string.
///
/// Pure and idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let without_slashes = raw.trim_start_matches('/');
    let path = if drive_letter(without_slashes).is_some() {
        without_slashes
    } else {
        raw
    };

    match drive_letter(path) {
        Some(letter) => format!(
            "{}{}",
            letter.to_ascii_uppercase(),
            path[1..].replace('\\', "/")
        ),
        None => path.to_string(),
    }
}

/// Resolve a normalized path against the run root.
///
/// Absolute paths and drive-letter paths are kept as-is.
pub fn resolve(base: &Path, normalized: &str) -> PathBuf {
    let path = PathBuf::from(normalized);
    if path.is_absolute() || drive_letter(normalized).is_some() {
        path
    } else {
        base.join(path)
    }
}

/// Drive letter of a `K:`, `K:/...` or `K:\...` path.
fn drive_letter(path: &str) -> Option<char> {
    let bytes = path.as_bytes();
    let is_drive = bytes.len() >= 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes.len() == 2 || bytes[2] == b'/' || bytes[2] == b'\\');
    is_drive.then(|| char::from(bytes[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_posix_path_unchanged() {
        assert_eq!(normalize("/home/dev/app/src/main.js"), "/home/dev/app/src/main.js");
    }

    #[test]
    fn test_leading_slash_drive_path() {
        assert_eq!(normalize("/K:/dir/file.js"), "K:/dir/file.js");
        assert_eq!(normalize("/k:/dir/file.js"), "K:/dir/file.js");
    }

    #[test]
    fn test_native_drive_path_backslashes() {
        assert_eq!(normalize("c:\\work\\src\\app.tsx"), "C:/work/src/app.tsx");
    }

    #[test]
    fn test_unc_like_path_untouched() {
        assert_eq!(normalize("//server/share/a.js"), "//server/share/a.js");
    }

    #[test]
    fn test_colon_inside_name_is_not_a_drive() {
        assert_eq!(normalize("/a:b/c"), "/a:b/c");
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let base = Path::new("/project");
        assert_eq!(resolve(base, "src/a.js"), PathBuf::from("/project/src/a.js"));
        assert_eq!(resolve(base, "/tmp/b.js"), PathBuf::from("/tmp/b.js"));
        assert_eq!(resolve(base, "K:/dir/c.js"), PathBuf::from("K:/dir/c.js"));
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in "(/{0,2}[a-zA-Z]:)?[a-z/\\\\:. ]{0,24}") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
