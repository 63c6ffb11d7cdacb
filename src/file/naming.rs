//! Stored-name encoding and decoding.
//!
//! An upload of `report.pdf` at `2023-11-14T22:13:20.000Z` is stored as
//! `2023-11-14_22-13-20_1700000000000_report.pdf`. The date and time make
//! directory listings sortable by eye, the millisecond epoch keeps two
//! uploads within the same second apart, and the original name is kept
//! verbatim so it can be recovered without a sidecar file.
//!
//! Older stores used a single-timestamp prefix (`<timestamp>_<name>`); both
//! layouts decode.

use chrono::{DateTime, Utc};

use crate::datetime::filename_stamp;
use crate::{FiledropError, Result};

/// Separator between the prefix segments and the original name.
pub const SEGMENT_DELIMITER: char = '_';

/// Number of prefix segments in the current layout (date, time, epoch).
const CURRENT_PREFIX_SEGMENTS: usize = 3;

/// Number of prefix segments in the legacy layout (timestamp).
const LEGACY_PREFIX_SEGMENTS: usize = 1;

/// Split a filename into its stem and extension at the last dot.
///
/// A name without a dot, or whose only dot is the leading one (`.hidden`),
/// has no extension. A trailing dot yields an empty extension.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

/// Encode an original filename into a stored name for an upload at `now`.
pub fn encode(original_name: &str, now: DateTime<Utc>) -> Result<String> {
    if original_name.is_empty() {
        return Err(FiledropError::InvalidName(
            "original filename is empty".to_string(),
        ));
    }

    let stamp = filename_stamp(&now);
    let millis = now.timestamp_millis();
    let encoded = match split_extension(original_name) {
        (stem, Some(ext)) => format!("{stamp}_{millis}_{stem}.{ext}"),
        (stem, None) => format!("{stamp}_{millis}_{stem}"),
    };

    Ok(encoded)
}

/// A stored name classified by layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedName<'a> {
    /// `<date>_<time>_<epochMillis>_<original>`.
    Current {
        date: &'a str,
        time: &'a str,
        epoch_millis: &'a str,
        original: String,
    },
    /// `<timestamp>_<original>`, written by older versions.
    Legacy { timestamp: &'a str, original: String },
    /// No delimiter at all; the name is shown as-is.
    Unprefixed(&'a str),
}

impl<'a> ParsedName<'a> {
    /// Classify `stored_name` by its number of delimited segments.
    pub fn parse(stored_name: &'a str) -> Self {
        let segments: Vec<&str> = stored_name.split(SEGMENT_DELIMITER).collect();
        let delimiter = SEGMENT_DELIMITER.to_string();

        if segments.len() > CURRENT_PREFIX_SEGMENTS {
            ParsedName::Current {
                date: segments[0],
                time: segments[1],
                epoch_millis: segments[2],
                original: segments[CURRENT_PREFIX_SEGMENTS..].join(&delimiter),
            }
        } else if segments.len() > LEGACY_PREFIX_SEGMENTS {
            ParsedName::Legacy {
                timestamp: segments[0],
                original: segments[LEGACY_PREFIX_SEGMENTS..].join(&delimiter),
            }
        } else {
            ParsedName::Unprefixed(stored_name)
        }
    }

    /// The original display name.
    pub fn original(&self) -> &str {
        match self {
            ParsedName::Current { original, .. } | ParsedName::Legacy { original, .. } => {
                original
            }
            ParsedName::Unprefixed(name) => name,
        }
    }

    /// The upload instant encoded in a current-layout name, if it parses.
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ParsedName::Current { epoch_millis, .. } => epoch_millis
                .parse::<i64>()
                .ok()
                .and_then(DateTime::<Utc>::from_timestamp_millis),
            _ => None,
        }
    }
}

/// Recover the original filename from a stored name.
///
/// Never fails; a name that does not follow either layout is returned as-is.
/// An empty original part (`"123_"`) also falls back to the stored name.
pub fn decode(stored_name: &str) -> String {
    let parsed = ParsedName::parse(stored_name);
    match parsed.original() {
        "" => stored_name.to_string(),
        original => original.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::from_epoch_millis;

    #[test]
    fn test_encode_report_pdf() {
        let now = from_epoch_millis(1_700_000_000_000);
        let stored = encode("report.pdf", now).unwrap();
        assert_eq!(stored, "2023-11-14_22-13-20_1700000000000_report.pdf");
        assert_eq!(decode(&stored), "report.pdf");
    }

    #[test]
    fn test_encode_empty_name_rejected() {
        let now = from_epoch_millis(1_700_000_000_000);
        assert!(matches!(
            encode("", now),
            Err(FiledropError::InvalidName(_))
        ));
    }

    #[test]
    fn test_encode_without_extension() {
        let now = from_epoch_millis(1_700_000_000_000);
        let stored = encode("README", now).unwrap();
        assert_eq!(stored, "2023-11-14_22-13-20_1700000000000_README");
        assert_eq!(decode(&stored), "README");
    }

    #[test]
    fn test_encode_trailing_dot() {
        let now = from_epoch_millis(1_700_000_000_000);
        let stored = encode("notes.", now).unwrap();
        assert_eq!(stored, "2023-11-14_22-13-20_1700000000000_notes.");
        assert_eq!(decode(&stored), "notes.");
    }

    #[test]
    fn test_encode_leading_dot() {
        let now = from_epoch_millis(1_700_000_000_000);
        let stored = encode(".env", now).unwrap();
        assert_eq!(stored, "2023-11-14_22-13-20_1700000000000_.env");
        assert_eq!(decode(&stored), ".env");
    }

    #[test]
    fn test_round_trip() {
        let names = [
            "report.pdf",
            "my_holiday_photo.JPG",
            "archive.tar.gz",
            "no_extension",
            "__init__.txt",
            "a",
            "日本語ファイル.txt",
            "spaces in name.docx",
            "trailing_.",
            "_leading_underscore.png",
        ];
        let instants = [0, 1, 999, 1_700_000_000_000, 1_700_000_000_999, 4_102_444_800_000];

        for name in names {
            for millis in instants {
                let stored = encode(name, from_epoch_millis(millis)).unwrap();
                assert_eq!(decode(&stored), name, "stored name {stored}");
            }
        }
    }

    #[test]
    fn test_distinct_millis_give_distinct_names() {
        let a = encode("same.txt", from_epoch_millis(1_700_000_000_000)).unwrap();
        let b = encode("same.txt", from_epoch_millis(1_700_000_000_001)).unwrap();
        assert_ne!(a, b);
        // Same second, so only the epoch segment differs.
        assert_eq!(a[..19], b[..19]);
    }

    #[test]
    fn test_stored_names_sort_chronologically() {
        let earlier = encode("z.txt", from_epoch_millis(1_600_000_000_000)).unwrap();
        let later = encode("a.txt", from_epoch_millis(1_700_000_000_000)).unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn test_decode_legacy_layout() {
        assert_eq!(decode("1690000000000_report.pdf"), "report.pdf");
        assert_eq!(decode("1690000000000_my_file.txt"), "my_file.txt");
    }

    #[test]
    fn test_decode_unprefixed() {
        assert_eq!(decode("plain.txt"), "plain.txt");
        assert_eq!(decode(""), "");
    }

    #[test]
    fn test_decode_empty_original_falls_back() {
        assert_eq!(decode("1690000000000_"), "1690000000000_");
    }

    #[test]
    fn test_parse_variants() {
        let parsed = ParsedName::parse("2023-11-14_22-13-20_1700000000000_report.pdf");
        assert_eq!(
            parsed,
            ParsedName::Current {
                date: "2023-11-14",
                time: "22-13-20",
                epoch_millis: "1700000000000",
                original: "report.pdf".to_string(),
            }
        );
        assert_eq!(
            parsed.uploaded_at(),
            Some(from_epoch_millis(1_700_000_000_000))
        );

        let parsed = ParsedName::parse("1690000000000_report.pdf");
        assert!(matches!(parsed, ParsedName::Legacy { timestamp: "1690000000000", .. }));
        assert_eq!(parsed.uploaded_at(), None);

        assert_eq!(ParsedName::parse("x"), ParsedName::Unprefixed("x"));
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.txt"), ("a", Some("txt")));
        assert_eq!(split_extension("a.tar.gz"), ("a.tar", Some("gz")));
        assert_eq!(split_extension("a."), ("a", Some("")));
        assert_eq!(split_extension(".hidden"), (".hidden", None));
        assert_eq!(split_extension("plain"), ("plain", None));
    }
}
