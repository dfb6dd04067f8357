use once_cell::sync::Lazy;
use regex::Regex;

use super::Ty;

/// `YYYY-MM-DD[T ]HH:MM:SS` with `-` or `/` date separators, an optional
/// `Z`/`±HH[:MM]` suffix and optional surrounding double quotes.
static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^"?[0-9]{4}[-/][0-9]{2}[-/][0-9]{2}[T ][0-9]{2}:[0-9]{2}:[0-9]{2}( ?[-+][0-9]{2}(:?[0-9]{2})?|Z)?"?$"#,
    )
    .expect("timestamp pattern compiles")
});

/// One or more pairs of hex digits, nothing else.
static HEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9a-fA-F]{2})+$").expect("hex pattern compiles"));

pub fn looks_like_timestamp(s: &str) -> bool {
    TIMESTAMP.is_match(s)
}

pub fn looks_like_hex(s: &str) -> bool {
    HEX.is_match(s)
}

/// Timestamp wins over Binary: `"20200101"` style strings never reach the hex
/// check once they match the date shape.
pub(super) fn observe_string(s: &str) -> Ty {
    if looks_like_timestamp(s) {
        Ty::Timestamp
    } else if looks_like_hex(s) {
        Ty::Binary
    } else {
        Ty::Str
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_with_and_without_zone() {
        for s in [
            "2024-01-31T12:00:59",
            "2024/01/31 12:00:59",
            "2024-01-31T12:00:59Z",
            "2024-01-31 12:00:59 +05:30",
            "2024-01-31 12:00:59-0800",
            "2024-01-31T12:00:59+01",
            "\"2024-01-31T12:00:59Z\"",
        ] {
            assert!(looks_like_timestamp(s), "{s}");
        }
    }

    #[test]
    fn near_miss_timestamps() {
        for s in [
            "2024-01-31",
            "2024-01-31T12:00",
            "2024-01-31T12:00:59.123",
            "24-01-31T12:00:59",
            "2024-01-31T12:00:59 Z",
        ] {
            assert!(!looks_like_timestamp(s), "{s}");
        }
    }

    #[test]
    fn hex_needs_whole_pairs() {
        assert!(looks_like_hex("ff"));
        assert!(looks_like_hex("DEADbeef00"));
        assert!(!looks_like_hex(""));
        assert!(!looks_like_hex("abc"));
        assert!(!looks_like_hex("0xff"));
    }

    #[test]
    fn classification_order() {
        assert_eq!(observe_string("2024-01-31 12:00:59"), Ty::Timestamp);
        assert_eq!(observe_string("cafe"), Ty::Binary);
        assert_eq!(observe_string("hello"), Ty::Str);
        assert_eq!(observe_string(""), Ty::Str);
    }
}
