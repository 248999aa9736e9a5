use crate::ledger::DailyLedger;
use crate::setup::SetupParameters;

/// Hours assumed for a day with no entry when projecting the period outcome
pub const DEFAULT_FALLBACK_HOURS: f64 = 8.0;

/// Result of one full pass over the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Cumulative variance after each day, index 0 is day 1. `None` for days
    /// without an entry.
    pub per_day: Vec<Option<f64>>,
    pub cumulative_actual: f64,
    pub projected_total: f64,
    pub last_day_with_input: u32,
    /// Variance as of the last day that logged non-zero time
    pub total_variance: f64,
    pub remaining_hours: f64,
    /// Variance at period end if every empty day gets the fallback hours
    pub projected_variance: f64,
}

impl Summary {
    pub fn day_variance(&self, day: u32) -> Option<f64> {
        let idx = (day as usize).checked_sub(1)?;
        self.per_day.get(idx).copied().flatten()
    }
}

/// Recompute every figure from the whole ledger.
///
/// Days are walked in ascending order because each per-day variance depends on
/// the running cumulative sum. Entries for days beyond the setup's range are
/// ignored.
pub fn compute(ledger: &DailyLedger, setup: &SetupParameters, fallback_hours: f64) -> Summary {
    let standard = setup.standard_hours_per_day();
    let total_required = setup.total_required_hours();

    let mut per_day = Vec::new();
    let mut cumulative_actual = 0.0;
    let mut projected_total = 0.0;
    let mut last_day_with_input = 0;

    for day in 1..=setup.total_days() {
        match ledger.get(day).filter(|entry| entry.is_present()) {
            Some(entry) => {
                let daily_total = entry.total_hours();
                if daily_total > 0.0 {
                    last_day_with_input = day;
                }
                cumulative_actual += daily_total;
                projected_total += daily_total;

                let expected = day as f64 * standard;
                per_day.push(Some(cumulative_actual - expected));
            }
            None => {
                projected_total += fallback_hours;
                per_day.push(None);
            }
        }
    }

    let total_variance = cumulative_actual - last_day_with_input as f64 * standard;
    let remaining_hours = (total_required - cumulative_actual).max(0.0);
    let projected_variance = projected_total - total_required;

    Summary {
        per_day,
        cumulative_actual,
        projected_total,
        last_day_with_input,
        total_variance,
        remaining_hours,
        projected_variance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::DailyEntry;

    const EPS: f64 = 1e-9;

    fn setup(days: &str, hours: &str) -> SetupParameters {
        SetupParameters::parse(days, hours).unwrap()
    }

    #[test]
    fn test_empty_ledger_projects_fallback_for_every_day() {
        let summary = compute(&DailyLedger::new(), &setup("5", "40"), DEFAULT_FALLBACK_HOURS);

        assert_eq!(summary.cumulative_actual, 0.0);
        assert_eq!(summary.last_day_with_input, 0);
        assert_eq!(summary.total_variance, 0.0);
        assert_eq!(summary.remaining_hours, 40.0);
        assert_eq!(summary.projected_total, 40.0);
        assert_eq!(summary.projected_variance, 0.0);
        assert!(summary.per_day.iter().all(Option::is_none));
        assert_eq!(summary.per_day.len(), 5);
    }

    #[test]
    fn test_single_day_ahead_of_pace() {
        let mut ledger = DailyLedger::new();
        ledger.set(1, DailyEntry::new("9", "0"));

        let summary = compute(&ledger, &setup("5", "40"), DEFAULT_FALLBACK_HOURS);

        assert_eq!(summary.day_variance(1), Some(1.0));
        assert_eq!(summary.total_variance, 1.0);
        assert_eq!(summary.remaining_hours, 31.0);
        assert_eq!(summary.projected_total, 41.0);
        assert_eq!(summary.projected_variance, 1.0);
    }

    #[test]
    fn test_explicit_zero_does_not_advance_last_day() {
        let mut ledger = DailyLedger::new();
        ledger.set(1, DailyEntry::new("8", "0"));
        ledger.set(2, DailyEntry::new("0", "0"));

        let summary = compute(&ledger, &setup("5", "40"), DEFAULT_FALLBACK_HOURS);

        assert_eq!(summary.last_day_with_input, 1);
        assert_eq!(summary.cumulative_actual, 8.0);
        assert_eq!(summary.total_variance, 0.0);
        // day 2 is present, so it carries a variance and no fallback
        assert_eq!(summary.day_variance(2), Some(-8.0));
        assert_eq!(summary.projected_total, 8.0 + 0.0 + 3.0 * 8.0);
        assert_eq!(summary.projected_variance, -8.0);
    }

    #[test]
    fn test_gap_days_are_ignored_by_total_variance() {
        let mut ledger = DailyLedger::new();
        ledger.set(1, DailyEntry::new("8", ""));
        ledger.set(3, DailyEntry::new("7", "30"));

        let summary = compute(&ledger, &setup("5", "40"), DEFAULT_FALLBACK_HOURS);

        assert_eq!(summary.day_variance(2), None);
        assert!((summary.day_variance(3).unwrap() - (15.5 - 24.0)).abs() < EPS);
        assert_eq!(summary.last_day_with_input, 3);
        assert!((summary.total_variance - (15.5 - 24.0)).abs() < EPS);
        assert!((summary.projected_total - (15.5 + 3.0 * 8.0)).abs() < EPS);
    }

    #[test]
    fn test_remaining_hours_never_negative() {
        let mut ledger = DailyLedger::new();
        ledger.set(1, DailyEntry::new("24", "0"));
        ledger.set(2, DailyEntry::new("24", "0"));

        let summary = compute(&ledger, &setup("2", "20"), DEFAULT_FALLBACK_HOURS);

        assert_eq!(summary.cumulative_actual, 48.0);
        assert_eq!(summary.remaining_hours, 0.0);
        assert_eq!(summary.projected_variance, 28.0);
    }

    #[test]
    fn test_cumulative_actual_excludes_fallback() {
        let mut ledger = DailyLedger::new();
        ledger.set(2, DailyEntry::new("6", "15"));
        ledger.set(4, DailyEntry::new("", "45"));

        let summary = compute(&ledger, &setup("4", "32"), DEFAULT_FALLBACK_HOURS);

        assert!((summary.cumulative_actual - 7.0).abs() < EPS);
        assert!((summary.projected_total - (7.0 + 16.0)).abs() < EPS);
    }

    #[test]
    fn test_custom_fallback_hours() {
        let summary = compute(&DailyLedger::new(), &setup("4", "32"), 7.5);
        assert_eq!(summary.projected_total, 30.0);
        assert_eq!(summary.projected_variance, -2.0);
    }

    #[test]
    fn test_entries_past_period_end_are_ignored() {
        let mut ledger = DailyLedger::new();
        ledger.set(9, DailyEntry::new("10", ""));

        let summary = compute(&ledger, &setup("3", "24"), DEFAULT_FALLBACK_HOURS);

        assert_eq!(summary.cumulative_actual, 0.0);
        assert_eq!(summary.day_variance(9), None);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let mut ledger = DailyLedger::new();
        ledger.set(1, DailyEntry::new("7", "45"));
        ledger.set(2, DailyEntry::new("0", ""));
        let params = setup("10", "75");

        let first = compute(&ledger, &params, DEFAULT_FALLBACK_HOURS);
        let second = compute(&ledger, &params, DEFAULT_FALLBACK_HOURS);
        assert_eq!(first, second);
    }
}
