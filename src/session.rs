use log::{info, warn};

use crate::error::{Result, TrackerError};
use crate::ledger::{parse_whole, DailyEntry, DailyLedger, MAX_DAILY_HOURS, MAX_MINUTES};
use crate::setup::SetupParameters;
use crate::store::{KeyValueStore, SessionStore, Stored};
use crate::variance::{self, Summary};

/// Setup plus everything entered so far
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub setup: SetupParameters,
    pub ledger: DailyLedger,
}

/// What [`SessionController::resume`] found in storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// Nothing saved; start at setup
    Fresh,
    /// A saved calculation was restored
    Resumed,
    /// The saved record was unreadable or had invalid setup values and was deleted
    DiscardedCorrupt,
}

/// Owns the one active calculation and keeps storage in step with it
#[derive(Debug)]
pub struct SessionController<K: KeyValueStore> {
    store: SessionStore<K>,
    fallback_hours: f64,
    state: Option<SessionState>,
    summary: Option<Summary>,
}

impl<K: KeyValueStore> SessionController<K> {
    pub fn new(kv: K, fallback_hours: f64) -> Self {
        Self {
            store: SessionStore::new(kv),
            fallback_hours,
            state: None,
            summary: None,
        }
    }

    /// Begin a new calculation. Invalid input or a failed save leaves
    /// everything untouched.
    pub fn start(&mut self, raw_total_days: &str, raw_total_hours: &str) -> Result<&Summary> {
        let setup = SetupParameters::parse(raw_total_days, raw_total_hours)?;
        info!(
            "event=session_start total_days={} total_hours={} standard_per_day={:.4}",
            setup.total_days(),
            setup.total_required_hours(),
            setup.standard_hours_per_day()
        );

        let ledger = DailyLedger::new();
        self.store.save(&setup, &ledger)?;
        self.state = Some(SessionState { setup, ledger });
        self.recompute()
    }

    /// Replace one day's fields, save, then recompute from the full ledger.
    ///
    /// Both fields blank clears the day. A failed save puts the old entry back.
    pub fn edit_day(&mut self, day: u32, hours: &str, minutes: &str) -> Result<&Summary> {
        let state = self.state.as_mut().ok_or(TrackerError::NotStarted)?;
        let total_days = state.setup.total_days();
        if day == 0 || day > total_days {
            return Err(TrackerError::DayOutOfRange { day, total_days });
        }
        check_field(hours, MAX_DAILY_HOURS, "hours")?;
        check_field(minutes, MAX_MINUTES, "minutes")?;

        let previous = state.ledger.get(day).cloned().unwrap_or_default();
        state.ledger.set(day, DailyEntry::new(hours, minutes));
        if let Err(err) = self.persist() {
            warn!("event=edit_day day={day} status=rolled_back error={err}");
            if let Some(state) = self.state.as_mut() {
                state.ledger.set(day, previous);
            }
            return Err(err);
        }
        self.recompute()
    }

    /// Drop the saved record and forget the calculation.
    ///
    /// Callers are expected to have confirmed with the user first.
    pub fn reset(&mut self) -> Result<()> {
        self.store.delete()?;
        self.state = None;
        self.summary = None;
        info!("event=session_reset status=ok");
        Ok(())
    }

    /// Restore the saved calculation, if any, on startup
    pub fn resume(&mut self) -> Result<ResumeOutcome> {
        let record = match self.store.read()? {
            Stored::Absent => {
                info!("event=session_resume outcome=fresh");
                return Ok(ResumeOutcome::Fresh);
            }
            Stored::Unparsable => return self.discard_corrupt("unparsable"),
            Stored::Record(record) => record,
        };

        let setup = match SetupParameters::parse(&record.total_days, &record.total_hours) {
            Ok(setup) => setup,
            Err(err) => return self.discard_corrupt(&err.to_string()),
        };

        let mut ledger = DailyLedger::new();
        for (day, entry) in record.entries() {
            if day == 0 || day > setup.total_days() {
                warn!("event=session_resume skipped_day={day} total_days={}", setup.total_days());
                continue;
            }
            ledger.set(day, entry);
        }

        info!(
            "event=session_resume outcome=resumed total_days={} entries={}",
            setup.total_days(),
            ledger.len()
        );
        self.state = Some(SessionState { setup, ledger });
        self.recompute()?;
        Ok(ResumeOutcome::Resumed)
    }

    /// Rebuild the summary from the complete ledger
    pub fn recompute(&mut self) -> Result<&Summary> {
        let state = self.state.as_ref().ok_or(TrackerError::NotStarted)?;
        let summary = variance::compute(&state.ledger, &state.setup, self.fallback_hours);
        let summary: &Summary = self.summary.insert(summary);
        Ok(summary)
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn store(&self) -> &SessionStore<K> {
        &self.store
    }

    fn persist(&mut self) -> Result<()> {
        let state = self.state.as_ref().ok_or(TrackerError::NotStarted)?;
        self.store.save(&state.setup, &state.ledger)
    }

    fn discard_corrupt(&mut self, reason: &str) -> Result<ResumeOutcome> {
        warn!("event=session_resume outcome=discarded reason=\"{reason}\"");
        self.store.delete()?;
        self.state = None;
        self.summary = None;
        Ok(ResumeOutcome::DiscardedCorrupt)
    }
}

/// A blank field is fine; otherwise it must be a whole number no larger than `max`
fn check_field(raw: &str, max: u32, name: &str) -> Result<()> {
    if raw.is_empty() {
        return Ok(());
    }
    let all_digits = raw.chars().all(|c| c.is_ascii_digit());
    match parse_whole(raw) {
        Some(value) if all_digits && value <= max => Ok(()),
        _ => Err(TrackerError::Validation(format!(
            "{name} must be a whole number between 0 and {max}, got `{raw}`"
        ))),
    }
}
