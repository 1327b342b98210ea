use std::fmt;

use twox_hash::xxh3::hash64;

/// Content digest used only to tell whether the clipboard changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint of `text` with surrounding whitespace ignored.
    pub fn of(text: &str) -> Self {
        Fingerprint(hash64(text.trim().as_bytes()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_same_fingerprint() {
        let t = r"C:\Users\test\file.txt";
        assert_eq!(Fingerprint::of(t), Fingerprint::of(t));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(Fingerprint::of("  C:/a\r\n"), Fingerprint::of("C:/a"));
    }

    #[test]
    fn path_variants_differ() {
        let inputs = [
            r"C:\Users\test\file.txt",
            "C:/Users/test/file.txt",
            r"C:\Users\test\file.txT",
            r"\\server\share\file.txt",
            "//server/share/file.txt",
            r"%USERPROFILE%\Documents",
            "%USERPROFILE%/Documents",
            "",
        ];
        for (i, a) in inputs.iter().enumerate() {
            for b in &inputs[i + 1..] {
                assert_ne!(Fingerprint::of(a), Fingerprint::of(b), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn display_is_fixed_width_hex() {
        assert_eq!(Fingerprint::of("x").to_string().len(), 16);
    }
}
