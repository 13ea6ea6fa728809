// File: ./src/model.rs
// Value types for daily records, date windows and aggregated results.
use crate::error::{Result, StatuslyError};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Category {
    Doing,
    Done,
    Blocker,
    Misc,
}

impl Category {
    /// JSON key and CLI flag name.
    pub fn key(self) -> &'static str {
        match self {
            Category::Doing => "doing",
            Category::Done => "done",
            Category::Blocker => "blocker",
            Category::Misc => "misc",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            Category::Doing => "DOING",
            Category::Done => "DONE",
            Category::Blocker => "BLOCKER",
            Category::Misc => "MISCELLANEOUS",
        }
    }

    /// Categories that take part in cross-day aggregation, in digest order.
    pub fn aggregated() -> [Category; 3] {
        [Category::Doing, Category::Done, Category::Blocker]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Category::iter()
            .find(|c| c.key() == lower)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// One day's notes. All four keys are always serialized; a key missing from
/// an older file loads as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde(default)]
    pub doing: Vec<String>,
    #[serde(default)]
    pub done: Vec<String>,
    #[serde(default)]
    pub blocker: Vec<String>,
    #[serde(default)]
    pub misc: Vec<String>,
}

impl DailyRecord {
    pub fn entries(&self, category: Category) -> &[String] {
        match category {
            Category::Doing => &self.doing,
            Category::Done => &self.done,
            Category::Blocker => &self.blocker,
            Category::Misc => &self.misc,
        }
    }

    fn entries_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Doing => &mut self.doing,
            Category::Done => &mut self.done,
            Category::Blocker => &mut self.blocker,
            Category::Misc => &mut self.misc,
        }
    }

    pub fn extend<I>(&mut self, category: Category, items: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.entries_mut(category).extend(items);
    }

    pub fn is_empty(&self) -> bool {
        Category::iter().all(|c| self.entries(c).is_empty())
    }
}

pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|e| {
        StatuslyError::InvalidRange(format!("'{}' is not a YYYY-MM-DD date ({})", text, e))
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Closed calendar-date interval. `start == end` covers exactly one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(StatuslyError::InvalidRange(format!(
                "end date {} is before start date {}",
                format_date(self.end),
                format_date(self.start)
            )));
        }
        Ok(())
    }

    /// Every date in the window, ascending. Empty if the window is inverted.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        std::iter::successors(Some(self.start), |d| d.checked_add_days(Days::new(1)))
            .take_while(move |d| *d <= end)
    }

    pub fn len_days(&self) -> u64 {
        if self.end < self.start {
            return 0;
        }
        (self.end - self.start).num_days() as u64 + 1
    }

    /// Search-qualifier form: `YYYY-MM-DD..YYYY-MM-DD`.
    pub fn query_range(&self) -> String {
        format!("{}..{}", format_date(self.start), format_date(self.end))
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", format_date(self.start), format_date(self.end))
    }
}

/// Display line for one externally observed event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActivityItem(String);

impl ActivityItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn opened(title: &str, link: &str) -> Self {
        Self(format!("Opened PR: {} ({})", title, link))
    }

    pub fn reviewed(title: &str, link: &str) -> Self {
        Self(format!("Reviewed PR: {} ({})", title, link))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ActivityItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Activity fetched for a window, already classified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedActivity {
    pub doing: Vec<ActivityItem>,
    pub done: Vec<ActivityItem>,
}

impl FetchedActivity {
    pub fn is_empty(&self) -> bool {
        self.doing.is_empty() && self.done.is_empty()
    }
}

/// Deduplicated entries for a window. `misc` never takes part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedWindow {
    pub doing: HashSet<String>,
    pub done: HashSet<String>,
    pub blocker: HashSet<String>,
}

impl AggregatedWindow {
    pub fn is_empty(&self) -> bool {
        self.doing.is_empty() && self.done.is_empty() && self.blocker.is_empty()
    }

    /// Set for an aggregated category; `None` for `Misc`.
    pub fn set(&self, category: Category) -> Option<&HashSet<String>> {
        match category {
            Category::Doing => Some(&self.doing),
            Category::Done => Some(&self.done),
            Category::Blocker => Some(&self.blocker),
            Category::Misc => None,
        }
    }

    /// Union a day's record into the running sets, discarding `misc`.
    pub fn merge_record(&mut self, record: &DailyRecord) {
        self.doing.extend(record.doing.iter().cloned());
        self.done.extend(record.done.iter().cloned());
        self.blocker.extend(record.blocker.iter().cloned());
    }

    pub fn merge_activity(&mut self, activity: FetchedActivity) {
        self.doing
            .extend(activity.doing.into_iter().map(ActivityItem::into_string));
        self.done
            .extend(activity.done.into_iter().map(ActivityItem::into_string));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_window_days_inclusive_across_month_end() {
        let w = DateWindow::parse("2024-02-28", "2024-03-01").unwrap();
        let days: Vec<String> = w.days().map(format_date).collect();
        assert_eq!(days, vec!["2024-02-28", "2024-02-29", "2024-03-01"]);
        assert_eq!(w.len_days(), 3);
    }

    #[test]
    fn test_single_day_window() {
        let w = DateWindow::parse("2024-01-01", "2024-01-01").unwrap();
        assert_eq!(w.days().count(), 1);
        assert_eq!(w.query_range(), "2024-01-01..2024-01-01");
    }

    #[test]
    fn test_inverted_window_rejected() {
        let err = DateWindow::parse("2024-02-02", "2024-02-01").unwrap_err();
        assert!(matches!(err, StatuslyError::InvalidRange(_)));

        let raw = DateWindow {
            start: d("2024-02-02"),
            end: d("2024-02-01"),
        };
        assert!(raw.validate().is_err());
        assert_eq!(raw.days().count(), 0);
        assert_eq!(raw.len_days(), 0);
    }

    #[test]
    fn test_malformed_date_is_invalid_range() {
        for bad in ["2024/01/01", "yesterday", "2024-13-01", ""] {
            assert!(
                matches!(parse_date(bad), Err(StatuslyError::InvalidRange(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_category_round_trip_and_headers() {
        for c in Category::iter() {
            assert_eq!(c.key().parse::<Category>().unwrap(), c);
        }
        assert_eq!("BLOCKER".parse::<Category>().unwrap(), Category::Blocker);
        assert!("later".parse::<Category>().is_err());
        assert_eq!(Category::Misc.header(), "MISCELLANEOUS");
    }

    #[test]
    fn test_record_missing_keys_load_empty() {
        let rec: DailyRecord = serde_json::from_str(r#"{"doing": ["a"]}"#).unwrap();
        assert_eq!(rec.doing, vec!["a"]);
        assert!(rec.done.is_empty() && rec.blocker.is_empty() && rec.misc.is_empty());

        let json = serde_json::to_value(DailyRecord::default()).unwrap();
        for key in ["doing", "done", "blocker", "misc"] {
            assert!(json.get(key).is_some(), "{key} must always be written");
        }
    }

    #[test]
    fn test_merge_record_ignores_misc() {
        let mut agg = AggregatedWindow::default();
        let mut rec = DailyRecord::default();
        rec.extend(Category::Misc, vec!["coffee chat".to_string()]);
        agg.merge_record(&rec);
        assert!(agg.is_empty());
        assert!(agg.set(Category::Misc).is_none());
    }
}
