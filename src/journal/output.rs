use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::VaultError;

/// Hands out `base/YYYY/MM/YYYY-MM-DD[ x].md` paths, one per entry.
///
/// A path is taken if it exists on disk or was handed out earlier in this
/// run. The allocator does not create the file itself.
#[derive(Debug, Clone)]
pub struct OutputAllocator {
    base: PathBuf,
    claimed: HashSet<PathBuf>,
}

fn suffixes() -> impl Iterator<Item = Option<char>> {
    std::iter::once(None).chain((b'a'..=b'z').map(|b| Some(char::from(b))))
}

fn file_name(date: NaiveDate, suffix: Option<char>) -> String {
    let day = date.format("%Y-%m-%d");
    match suffix {
        Some(letter) => format!("{day} {letter}.md"),
        None => format!("{day}.md"),
    }
}

impl OutputAllocator {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            claimed: HashSet::new(),
        }
    }

    pub fn month_dir(&self, date: NaiveDate) -> PathBuf {
        self.base
            .join(format!("{:04}", date.year()))
            .join(format!("{:02}", date.month()))
    }

    fn is_taken(&self, path: &Path) -> bool {
        self.claimed.contains(path) || path.exists()
    }

    pub fn allocate(&mut self, date: NaiveDate) -> Result<PathBuf> {
        let dir = self.month_dir(date);
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

        for suffix in suffixes() {
            let candidate = dir.join(file_name(date, suffix));
            if !self.is_taken(&candidate) {
                self.claimed.insert(candidate.clone());
                return Ok(candidate);
            }
        }
        Err(VaultError::SuffixesExhausted { date }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn name(path: &Path) -> String {
        path.file_name()
            .expect("file name")
            .to_string_lossy()
            .to_string()
    }

    #[test]
    fn same_day_entries_get_suffixes_in_order() {
        let tmp = tempdir().expect("tempdir");
        let mut alloc = OutputAllocator::new(tmp.path());

        let first = alloc.allocate(day(2021, 7, 4)).expect("first");
        let second = alloc.allocate(day(2021, 7, 4)).expect("second");
        let third = alloc.allocate(day(2021, 7, 4)).expect("third");

        assert_eq!(first, tmp.path().join("2021/07/2021-07-04.md"));
        assert_eq!(name(&second), "2021-07-04 a.md");
        assert_eq!(name(&third), "2021-07-04 b.md");
        assert!(tmp.path().join("2021/07").is_dir());
        assert!(!first.exists());
    }

    #[test]
    fn files_left_on_disk_are_skipped() {
        let tmp = tempdir().expect("tempdir");
        let month = tmp.path().join("2020/02");
        fs::create_dir_all(&month).expect("mkdir");
        fs::write(month.join("2020-02-29.md"), "old").expect("write");
        fs::write(month.join("2020-02-29 a.md"), "old").expect("write");

        let mut alloc = OutputAllocator::new(tmp.path());
        let path = alloc.allocate(day(2020, 2, 29)).expect("allocate");
        assert_eq!(name(&path), "2020-02-29 b.md");
    }

    #[test]
    fn different_days_do_not_interfere() {
        let tmp = tempdir().expect("tempdir");
        let mut alloc = OutputAllocator::new(tmp.path());
        let a = alloc.allocate(day(1999, 12, 31)).expect("a");
        let b = alloc.allocate(day(2000, 1, 1)).expect("b");
        assert_eq!(a, tmp.path().join("1999/12/1999-12-31.md"));
        assert_eq!(b, tmp.path().join("2000/01/2000-01-01.md"));
    }

    #[test]
    fn twenty_eighth_entry_on_a_day_is_fatal() {
        let tmp = tempdir().expect("tempdir");
        let mut alloc = OutputAllocator::new(tmp.path());
        let mut seen = HashSet::new();
        for _ in 0..27 {
            let path = alloc.allocate(day(2022, 5, 1)).expect("within limit");
            assert!(seen.insert(path));
        }
        assert!(seen.contains(&tmp.path().join("2022/05/2022-05-01 z.md")));

        let err = alloc.allocate(day(2022, 5, 1)).expect_err("exhausted");
        assert!(matches!(
            err.downcast_ref::<VaultError>(),
            Some(VaultError::SuffixesExhausted { .. })
        ));
    }
}
