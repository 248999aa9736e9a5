use crate::error::{Result, TrackerError};

/// Longest period that can be tracked; a leap year of calendar days
pub const MAX_TOTAL_DAYS: u32 = 366;

/// The period being tracked: how many working days and how many hours in total.
///
/// The raw strings are kept alongside the parsed values so the persisted record
/// reproduces exactly what was typed.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupParameters {
    raw_total_days: String,
    raw_total_hours: String,
    total_days: u32,
    total_required_hours: f64,
}

impl SetupParameters {
    /// Parse both setup fields. Days must be a whole number in
    /// `1..=MAX_TOTAL_DAYS`, hours a positive number.
    pub fn parse(raw_total_days: &str, raw_total_hours: &str) -> Result<Self> {
        let total_days = raw_total_days.trim().parse::<u32>().map_err(|_| {
            TrackerError::Validation(format!("total days `{raw_total_days}` is not a whole number"))
        })?;
        let total_required_hours = raw_total_hours
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|h| h.is_finite())
            .ok_or_else(|| {
                TrackerError::Validation(format!("total hours `{raw_total_hours}` is not a number"))
            })?;

        if total_days == 0 {
            return Err(TrackerError::Validation(
                "total days must be greater than zero".to_string(),
            ));
        }
        if total_days > MAX_TOTAL_DAYS {
            return Err(TrackerError::Validation(format!(
                "total days must be at most {MAX_TOTAL_DAYS}, got {total_days}"
            )));
        }
        if total_required_hours <= 0.0 {
            return Err(TrackerError::Validation(
                "total hours must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            raw_total_days: raw_total_days.to_string(),
            raw_total_hours: raw_total_hours.to_string(),
            total_days,
            total_required_hours,
        })
    }

    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    pub fn total_required_hours(&self) -> f64 {
        self.total_required_hours
    }

    /// Expected flat daily pace; always derived, never stored
    pub fn standard_hours_per_day(&self) -> f64 {
        self.total_required_hours / self.total_days as f64
    }

    pub fn raw_total_days(&self) -> &str {
        &self.raw_total_days
    }

    pub fn raw_total_hours(&self) -> &str {
        &self.raw_total_hours
    }
}
