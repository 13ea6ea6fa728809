// File: ./src/digest.rs
use crate::model::{AggregatedWindow, Category, DailyRecord, format_date};
use chrono::NaiveDate;
use std::fmt;
use strum::IntoEnumIterator;

const BULLET: &str = "  • ";

/// Deterministic text built from an aggregated window; the summarizer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(String);

impl Digest {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders DOING, DONE, BLOCKER in that order, each sorted, skipping empty
/// sections. Returns `None` when every set is empty; the caller should not
/// summarize in that case.
pub fn compose(window: &AggregatedWindow) -> Option<Digest> {
    if window.is_empty() {
        return None;
    }

    let mut out = String::new();
    for category in Category::aggregated() {
        let Some(set) = window.set(category) else {
            continue;
        };
        if set.is_empty() {
            continue;
        }
        let mut items: Vec<&String> = set.iter().collect();
        items.sort();

        out.push_str(category.header());
        out.push_str(":\n");
        for item in items {
            out.push_str(BULLET);
            out.push_str(item);
            out.push('\n');
        }
        out.push('\n');
    }
    Some(Digest(out))
}

/// Single-day view in entry order, including MISCELLANEOUS.
/// `None` when the day has no entries at all.
pub fn render_day(date: NaiveDate, record: &DailyRecord) -> Option<String> {
    if record.is_empty() {
        return None;
    }

    let mut sections = Vec::new();
    for category in Category::iter() {
        let entries = record.entries(category);
        if entries.is_empty() {
            continue;
        }
        let mut section = format!("{}:\n", category.header());
        for item in entries {
            section.push_str(BULLET);
            section.push_str(item);
            section.push('\n');
        }
        sections.push(section);
    }

    Some(format!(
        "\n📓 Log for {}:\n\n{}",
        format_date(date),
        sections.join("\n")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_date;

    #[test]
    fn test_empty_window_has_no_digest() {
        assert_eq!(compose(&AggregatedWindow::default()), None);
    }

    #[test]
    fn test_sections_sorted_and_skipped() {
        let mut w = AggregatedWindow::default();
        w.done.insert("zeta".to_string());
        w.done.insert("alpha".to_string());
        w.done.insert("Beta".to_string());

        let digest = compose(&w).unwrap();
        // Byte order: upper-case sorts before lower-case.
        assert_eq!(digest.as_str(), "DONE:\n  • Beta\n  • alpha\n  • zeta\n\n");
    }

    #[test]
    fn test_render_day_keeps_entry_order_and_misc() {
        let rec = DailyRecord {
            doing: vec!["b".to_string(), "a".to_string()],
            misc: vec!["1:1 with lead".to_string()],
            ..Default::default()
        };
        let text = render_day(parse_date("2024-05-01").unwrap(), &rec).unwrap();
        assert_eq!(
            text,
            "\n📓 Log for 2024-05-01:\n\nDOING:\n  • b\n  • a\n\nMISCELLANEOUS:\n  • 1:1 with lead\n"
        );
    }

    #[test]
    fn test_render_empty_day() {
        assert!(render_day(parse_date("2024-05-01").unwrap(), &DailyRecord::default()).is_none());
    }
}
