//! The idea file-naming scheme.
//!
//! An idea is one text file whose name encodes its due date:
//! `YYYYMMDD.txt`, or `YYYYMMDD_N.txt` when several ideas share a date.
//! The zero-padded prefix makes alphabetical order equal chronological order.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

/// File extension for idea files.
pub const IDEA_EXTENSION: &str = "txt";

/// Date format used in idea filenames and backup directory names.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// A single idea on disk, identified by its filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Idea {
    /// Full path of the idea file.
    pub path: PathBuf,
    /// Due date parsed from the 8-character filename prefix.
    pub due_date: NaiveDate,
    /// Collision suffix (`_2`, `_3`, ...) when several ideas share a date.
    pub disambiguator: Option<u32>,
}

impl Idea {
    /// Parses an idea from a file path, returning `None` when the filename
    /// does not start with a valid `YYYYMMDD` prefix.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Idea> {
        let path = path.into();
        let name = path.file_name()?.to_str()?;
        let due_date = parse_due_date(name)?;
        let disambiguator = parse_disambiguator(name);
        Some(Idea {
            path,
            due_date,
            disambiguator,
        })
    }
}

/// Parses the date prefix of an idea filename.
///
/// Only the first 8 characters take part; whatever follows them is ignored,
/// so `20250101_2.txt` and `20250101-mislabeled.txt` both parse.
pub fn parse_due_date(file_name: &str) -> Option<NaiveDate> {
    let prefix = file_name.get(..8)?;
    NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok()
}

fn parse_disambiguator(file_name: &str) -> Option<u32> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    stem.get(8..)?.strip_prefix('_')?.parse().ok()
}

/// Builds the filename for an idea due on `date`.
pub fn idea_file_name(date: NaiveDate, disambiguator: Option<u32>) -> String {
    let base = date.format(DATE_FORMAT);
    match disambiguator {
        Some(n) => format!("{base}_{n}.{IDEA_EXTENSION}"),
        None => format!("{base}.{IDEA_EXTENSION}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_and_disambiguated_names() {
        let idea = Idea::from_path("/ideas/20250314.txt").unwrap();
        assert_eq!(idea.due_date, date(2025, 3, 14));
        assert_eq!(idea.disambiguator, None);

        let idea = Idea::from_path("/ideas/20250314_2.txt").unwrap();
        assert_eq!(idea.due_date, date(2025, 3, 14));
        assert_eq!(idea.disambiguator, Some(2));
    }

    #[test]
    fn date_prefix_is_enough_even_with_odd_suffix() {
        let idea = Idea::from_path("/ideas/20250314-scribble.txt").unwrap();
        assert_eq!(idea.due_date, date(2025, 3, 14));
        assert_eq!(idea.disambiguator, None);
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(Idea::from_path("/ideas/notes.txt").is_none());
        assert!(Idea::from_path("/ideas/2025031.txt").is_none());
        assert!(Idea::from_path("/ideas/20251301.txt").is_none());
        assert!(Idea::from_path("/ideas/2025031a.txt").is_none());
    }

    #[test]
    fn file_name_round_trips() {
        assert_eq!(idea_file_name(date(2025, 3, 14), None), "20250314.txt");
        assert_eq!(idea_file_name(date(2025, 3, 14), Some(2)), "20250314_2.txt");

        let name = idea_file_name(date(2024, 1, 5), Some(11));
        assert_eq!(parse_due_date(&name), Some(date(2024, 1, 5)));
    }

    #[test]
    fn earlier_dates_sort_first_lexicographically() {
        let pairs = [
            (date(2024, 12, 31), date(2025, 1, 1)),
            (date(2025, 1, 9), date(2025, 1, 10)),
            (date(2025, 9, 30), date(2025, 10, 1)),
        ];
        for (d1, d2) in pairs {
            assert!(idea_file_name(d1, None) < idea_file_name(d2, None));
        }
    }
}
