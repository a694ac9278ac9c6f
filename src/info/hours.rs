use crate::csv::Row;
use crate::i18n::Language;

/// Canonical weekday order, Monday first.
pub const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// One weekday's opening times as read from the info sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayHours {
    pub day: String,
    pub label_it: String,
    pub label_en: String,
    pub slot1: String,
    pub slot2: String,
}

impl DayHours {
    /// `None` when the row has no `day`.
    pub fn from_row(row: &Row) -> Option<Self> {
        let day = row.non_blank("day")?.to_lowercase();
        Some(DayHours {
            day,
            label_it: row.get("label_it").to_string(),
            label_en: row.get("label_en").to_string(),
            slot1: slot(row.get("slot1_open"), row.get("slot1_close")),
            slot2: slot(row.get("slot2_open"), row.get("slot2_close")),
        })
    }

    fn signature(&self) -> String {
        format!("{}|{}", self.slot1, self.slot2)
    }
}

fn slot(open: &str, close: &str) -> String {
    if open.is_empty() || close.is_empty() {
        String::new()
    } else {
        format!("{} - {}", open, close)
    }
}

/// A run of adjacent days sharing the same slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoursRange {
    pub days_it: String,
    pub days_en: String,
    pub slot1: String,
    pub slot2: String,
}

impl HoursRange {
    pub fn days(&self, lang: Language) -> &str {
        lang.pick(&self.days_it, &self.days_en)
    }

    pub fn times(&self) -> String {
        if self.slot2.is_empty() {
            self.slot1.clone()
        } else {
            format!("{} / {}", self.slot1, self.slot2)
        }
    }
}

/// Unknown day keys sort before Monday.
fn weekday_index(day: &str) -> isize {
    WEEKDAYS
        .iter()
        .position(|d| *d == day)
        .map_or(-1, |i| i as isize)
}

struct Group<'a> {
    start: &'a DayHours,
    end: &'a DayHours,
    signature: String,
}

impl Group<'_> {
    fn close(self) -> HoursRange {
        let label = |first: &str, last: &str| {
            if std::ptr::eq(self.start, self.end) {
                first.to_string()
            } else {
                format!("{} - {}", first, last)
            }
        };
        HoursRange {
            days_it: label(&self.start.label_it, &self.end.label_it),
            days_en: label(&self.start.label_en, &self.end.label_en),
            slot1: self.start.slot1.clone(),
            slot2: self.start.slot2.clone(),
        }
    }
}

/// Sort by weekday and merge adjacent days whose `slot1|slot2` signature
/// matches. Days are never dropped or reordered beyond the weekday sort.
pub fn collapse(mut entries: Vec<DayHours>) -> Vec<HoursRange> {
    entries.sort_by_key(|e| weekday_index(&e.day));

    let mut ranges = Vec::new();
    let mut current: Option<Group<'_>> = None;

    for entry in &entries {
        let signature = entry.signature();
        if let Some(group) = current.as_mut().filter(|g| g.signature == signature) {
            group.end = entry;
            continue;
        }
        let next = Group {
            start: entry,
            end: entry,
            signature,
        };
        if let Some(done) = current.replace(next) {
            ranges.push(done.close());
        }
    }

    if let Some(done) = current {
        ranges.push(done.close());
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [(&str, &str, &str); 7] = [
        ("mon", "Lunedì", "Monday"),
        ("tue", "Martedì", "Tuesday"),
        ("wed", "Mercoledì", "Wednesday"),
        ("thu", "Giovedì", "Thursday"),
        ("fri", "Venerdì", "Friday"),
        ("sat", "Sabato", "Saturday"),
        ("sun", "Domenica", "Sunday"),
    ];

    fn day(key: &str, slot1: &str, slot2: &str) -> DayHours {
        let (_, it, en) = LABELS.iter().find(|(k, _, _)| *k == key).unwrap();
        DayHours {
            day: key.to_string(),
            label_it: it.to_string(),
            label_en: en.to_string(),
            slot1: slot1.to_string(),
            slot2: slot2.to_string(),
        }
    }

    #[test]
    fn full_week_collapses_to_one_range() {
        let entries = LABELS
            .iter()
            .rev()
            .map(|(k, _, _)| day(k, "12:00 - 23:00", ""))
            .collect();
        let ranges = collapse(entries);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].days_en, "Monday - Sunday");
        assert_eq!(ranges[0].days_it, "Lunedì - Domenica");
        assert_eq!(ranges[0].times(), "12:00 - 23:00");
    }

    #[test]
    fn alternating_slots_stay_singletons() {
        let entries = vec![
            day("mon", "a", ""),
            day("tue", "b", ""),
            day("wed", "a", ""),
        ];
        let ranges = collapse(entries);
        let days: Vec<&str> = ranges.iter().map(|r| r.days_en.as_str()).collect();
        assert_eq!(days, vec!["Monday", "Tuesday", "Wednesday"]);
    }

    #[test]
    fn missing_days_are_absent_not_filled() {
        let entries = vec![day("fri", "x", "y"), day("mon", "x", "y")];
        let ranges = collapse(entries);
        // Adjacent in sorted order, so they merge even across the gap.
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].days_en, "Monday - Friday");
        assert_eq!(ranges[0].times(), "x / y");
    }

    #[test]
    fn second_slot_is_part_of_signature() {
        let entries = vec![
            day("mon", "12:00 - 15:00", "19:00 - 23:00"),
            day("tue", "12:00 - 15:00", ""),
        ];
        assert_eq!(collapse(entries).len(), 2);
    }

    #[test]
    fn empty_input() {
        assert!(collapse(Vec::new()).is_empty());
    }

    #[test]
    fn slot_requires_both_ends() {
        assert_eq!(slot("12:00", "15:00"), "12:00 - 15:00");
        assert_eq!(slot("12:00", ""), "");
        assert_eq!(slot("", "15:00"), "");
    }
}
