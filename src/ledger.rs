use std::collections::BTreeMap;

pub const MAX_DAILY_HOURS: u32 = 24;
pub const MAX_MINUTES: u32 = 59;

/// Raw hour/minute fields for one day, exactly as the user typed them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyEntry {
    pub hours: String,
    pub minutes: String,
}

impl DailyEntry {
    pub fn new(hours: impl Into<String>, minutes: impl Into<String>) -> Self {
        Self {
            hours: hours.into(),
            minutes: minutes.into(),
        }
    }

    /// An entry counts once either field holds text, even "0".
    pub fn is_present(&self) -> bool {
        !self.hours.is_empty() || !self.minutes.is_empty()
    }

    /// Hours worked that day as a decimal; blank fields count as zero
    pub fn total_hours(&self) -> f64 {
        let hours = parse_whole(&self.hours).unwrap_or(0);
        let minutes = parse_whole(&self.minutes).unwrap_or(0);
        hours as f64 + minutes as f64 / 60.0
    }
}

/// Leading decimal digits of a field, ignoring surrounding whitespace.
///
/// "7" -> 7, "7.5" -> 7, "" -> None, "x" -> None.
pub fn parse_whole(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Sparse map of day number to entry. Only present entries are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyLedger {
    entries: BTreeMap<u32, DailyEntry>,
}

impl DailyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry, or drop the day when both fields are blank
    pub fn set(&mut self, day: u32, entry: DailyEntry) {
        if entry.is_present() {
            self.entries.insert(day, entry);
        } else {
            self.entries.remove(&day);
        }
    }

    pub fn get(&self, day: u32) -> Option<&DailyEntry> {
        self.entries.get(&day)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &DailyEntry)> {
        self.entries.iter().map(|(day, entry)| (*day, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
