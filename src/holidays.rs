//! National holidays read from `<dir>/<year>.json`, cached per year.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
    #[serde(default)]
    pub local_name: String,
}

#[derive(Deserialize)]
struct HolidayFile {
    #[serde(default)]
    holidays: Vec<Holiday>,
}

pub trait HolidayProvider {
    /// Holidays of `year`. Empty when none are known.
    fn holidays_for_year(&self, year: i32) -> Vec<Holiday>;

    fn holiday_dates(&self, year: i32) -> HashSet<NaiveDate> {
        self.holidays_for_year(year)
            .into_iter()
            .map(|holiday| holiday.date)
            .collect()
    }
}

pub struct HolidayDirectory {
    dir: PathBuf,
    cache: RefCell<HashMap<i32, Vec<Holiday>>>,
}

impl HolidayDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn read_year(&self, year: i32) -> anyhow::Result<Vec<Holiday>> {
        let path = self.dir.join(format!("{year}.json"));
        let raw = fs::read_to_string(&path)?;
        let file: HolidayFile = serde_json::from_str(&raw)?;
        Ok(file.holidays)
    }
}

impl HolidayProvider for HolidayDirectory {
    fn holidays_for_year(&self, year: i32) -> Vec<Holiday> {
        if let Some(cached) = self.cache.borrow().get(&year) {
            return cached.clone();
        }
        match self.read_year(year) {
            Ok(holidays) => {
                log::debug!("Loaded {} holidays for {year}", holidays.len());
                self.cache.borrow_mut().insert(year, holidays.clone());
                holidays
            }
            Err(e) => {
                log::warn!("No holidays for {year}: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "country": { "code": "SE", "name": "Sweden" },
        "year": 2026,
        "holidays": [
            { "date": "2026-01-01", "name": "New Year's Day", "local_name": "Nyårsdagen", "type": "national" },
            { "date": "2026-01-06", "name": "Epiphany", "local_name": "Trettondedag jul", "type": "national" }
        ]
    }"#;

    #[test]
    fn reads_and_caches_year() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2026.json");
        fs::write(&path, SAMPLE).unwrap();

        let provider = HolidayDirectory::new(dir.path());
        let holidays = provider.holidays_for_year(2026);
        assert_eq!(holidays.len(), 2);
        assert_eq!(holidays[0].local_name, "Nyårsdagen");

        fs::remove_file(&path).unwrap();
        assert_eq!(provider.holidays_for_year(2026).len(), 2);
        assert!(provider
            .holiday_dates(2026)
            .contains(&NaiveDate::from_ymd_opt(2026, 1, 6).unwrap()));
    }

    #[test]
    fn missing_or_broken_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2025.json"), "{ not json").unwrap();
        let provider = HolidayDirectory::new(dir.path());
        assert!(provider.holidays_for_year(2025).is_empty());
        assert!(provider.holidays_for_year(2024).is_empty());
    }
}
