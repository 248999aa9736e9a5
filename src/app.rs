use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::error;

use crate::config::Config;
use crate::error::{Result, TrackerError};
use crate::ledger::{parse_whole, DailyEntry, MAX_DAILY_HOURS, MAX_MINUTES};
use crate::session::{ResumeOutcome, SessionController};
use crate::store::KeyValueStore;

const MAX_SETUP_FIELD_LEN: usize = 8;
const MAX_DAY_FIELD_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Setup,
    Tracking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SetupField {
    #[strum(to_string = "Total working days")]
    TotalDays,
    #[strum(to_string = "Total required hours")]
    TotalHours,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayField {
    Hours,
    Minutes,
}

/// Whether the event loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

#[derive(Debug, Default, Clone)]
pub struct SetupForm {
    pub total_days: String,
    pub total_hours: String,
    pub focus: Option<SetupField>,
    /// Blocking message shown after a rejected start
    pub error: Option<String>,
}

impl SetupForm {
    fn field_mut(&mut self, field: SetupField) -> &mut String {
        match field {
            SetupField::TotalDays => &mut self.total_days,
            SetupField::TotalHours => &mut self.total_hours,
        }
    }

    pub fn focused(&self) -> SetupField {
        self.focus.unwrap_or(SetupField::TotalDays)
    }
}

/// Two-view terminal app: a setup form, then one editable row per day.
#[derive(Debug)]
pub struct App<K: KeyValueStore> {
    pub session: SessionController<K>,
    pub config: Config,
    pub view: View,
    pub setup: SetupForm,
    /// Field buffers for every day, index 0 is day 1
    pub rows: Vec<DailyEntry>,
    /// Selected row index
    pub cursor: usize,
    pub field: DayField,
    pub confirming_reset: bool,
    /// One-line feedback for the tracking view
    pub status: Option<String>,
}

impl<K: KeyValueStore> App<K> {
    /// Build the app and restore any saved calculation
    pub fn new(kv: K, config: Config) -> Result<Self> {
        let session = SessionController::new(kv, config.fallback_hours_per_day);
        let mut app = Self {
            session,
            config,
            view: View::Setup,
            setup: SetupForm::default(),
            rows: Vec::new(),
            cursor: 0,
            field: DayField::Hours,
            confirming_reset: false,
            status: None,
        };

        if app.session.resume()? == ResumeOutcome::Resumed {
            app.enter_tracking();
        }
        Ok(app)
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match self.view {
            View::Setup => self.on_setup_key(key),
            View::Tracking if self.confirming_reset => self.on_confirm_key(key),
            View::Tracking => self.on_tracking_key(key),
        }
    }

    pub fn selected_day(&self) -> u32 {
        self.cursor as u32 + 1
    }

    fn on_setup_key(&mut self, key: KeyEvent) -> Action {
        let focus = self.setup.focused();
        match key.code {
            KeyCode::Esc => return Action::Quit,
            KeyCode::Tab | KeyCode::Down | KeyCode::Up | KeyCode::BackTab => {
                self.setup.focus = Some(match focus {
                    SetupField::TotalDays => SetupField::TotalHours,
                    SetupField::TotalHours => SetupField::TotalDays,
                });
            }
            KeyCode::Backspace => {
                self.setup.field_mut(focus).pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                let value = self.setup.field_mut(focus);
                if value.len() < MAX_SETUP_FIELD_LEN {
                    value.push(c);
                }
            }
            KeyCode::Enter => self.start(),
            _ => {}
        }
        Action::Continue
    }

    fn start(&mut self) {
        let days = self.setup.total_days.clone();
        let hours = self.setup.total_hours.clone();
        match self.session.start(&days, &hours) {
            Ok(_) => {
                self.setup.error = None;
                self.enter_tracking();
            }
            Err(TrackerError::Validation(msg)) => {
                self.setup.error = Some(format!("Please enter valid numbers: {msg}"));
            }
            Err(err) => {
                error!("event=session_start status=failed error={err}");
                self.setup.error = Some(err.to_string());
            }
        }
    }

    fn on_tracking_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Action::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.rows.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::PageUp => self.cursor = self.cursor.saturating_sub(10),
            KeyCode::PageDown => {
                self.cursor = (self.cursor + 10).min(self.rows.len().saturating_sub(1));
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.rows.len().saturating_sub(1),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.field = match self.field {
                    DayField::Hours => DayField::Minutes,
                    DayField::Minutes => DayField::Hours,
                };
            }
            KeyCode::Enter => {
                // move down the column like a spreadsheet
                if self.field == DayField::Hours {
                    self.field = DayField::Minutes;
                } else {
                    self.field = DayField::Hours;
                    if self.cursor + 1 < self.rows.len() {
                        self.cursor += 1;
                    }
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() => self.type_digit(c),
            KeyCode::Backspace => {
                self.edit_selected(|value, _| {
                    value.pop();
                });
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(row) = self.rows.get_mut(self.cursor) {
                    *row = DailyEntry::default();
                }
                self.commit_selected();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.step_selected(true),
            KeyCode::Char('-') => self.step_selected(false),
            KeyCode::Char('r') => {
                self.confirming_reset = true;
                self.status = None;
            }
            _ => {}
        }
        Action::Continue
    }

    fn on_confirm_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.confirming_reset = false;
                self.reset();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirming_reset = false;
            }
            _ => {}
        }
        Action::Continue
    }

    fn reset(&mut self) {
        if let Err(err) = self.session.reset() {
            error!("event=session_reset status=failed error={err}");
            self.status = Some(format!("Reset failed: {err}"));
            return;
        }
        self.view = View::Setup;
        self.setup = SetupForm::default();
        self.rows.clear();
        self.cursor = 0;
        self.field = DayField::Hours;
        self.status = None;
    }

    fn type_digit(&mut self, c: char) {
        self.edit_selected(|value, max| {
            let mut candidate = if value.as_str() == "0" {
                String::new()
            } else {
                value.clone()
            };
            candidate.push(c);
            let fits = candidate.len() <= MAX_DAY_FIELD_LEN
                && parse_whole(&candidate).is_some_and(|v| v <= max);
            if fits {
                *value = candidate;
            }
        });
    }

    fn step_selected(&mut self, up: bool) {
        let step = match self.field {
            DayField::Hours => 1,
            DayField::Minutes => self.config.minute_step.max(1),
        };
        self.edit_selected(|value, max| {
            let current = parse_whole(value).unwrap_or(0);
            let next = if up {
                (current + step).min(max)
            } else {
                current.saturating_sub(step)
            };
            *value = next.to_string();
        });
    }

    fn edit_selected<F: FnOnce(&mut String, u32)>(&mut self, edit: F) {
        let Some(row) = self.rows.get_mut(self.cursor) else {
            return;
        };
        let (value, max) = match self.field {
            DayField::Hours => (&mut row.hours, MAX_DAILY_HOURS),
            DayField::Minutes => (&mut row.minutes, MAX_MINUTES),
        };
        edit(value, max);
        self.commit_selected();
    }

    /// Push the selected row's buffers through the controller. A rejected
    /// edit puts the row back to what the ledger holds.
    fn commit_selected(&mut self) {
        let day = self.selected_day();
        let Some(row) = self.rows.get(self.cursor).cloned() else {
            return;
        };
        match self.session.edit_day(day, &row.hours, &row.minutes).map(|_| ()) {
            Ok(()) => self.status = None,
            Err(err) => {
                error!("event=edit_day day={day} status=failed error={err}");
                self.status = Some(err.to_string());
                let saved = self.session.state().and_then(|state| state.ledger.get(day));
                if let Some(row) = self.rows.get_mut(self.cursor) {
                    *row = saved.cloned().unwrap_or_default();
                }
            }
        }
    }

    fn enter_tracking(&mut self) {
        let Some(state) = self.session.state() else {
            return;
        };
        self.setup.total_days = state.setup.raw_total_days().to_string();
        self.setup.total_hours = state.setup.raw_total_hours().to_string();
        self.rows = (1..=state.setup.total_days())
            .map(|day| state.ledger.get(day).cloned().unwrap_or_default())
            .collect();
        self.cursor = 0;
        self.field = DayField::Hours;
        self.view = View::Tracking;
    }
}
