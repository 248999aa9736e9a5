// Integration tests for the controller against an on-disk store.
// Each "restart" reopens the database the way a new process would.

use assert_matches::assert_matches;
use paceline::session::{ResumeOutcome, SessionController};
use paceline::store::{KeyValueStore, SessionStore, SqliteStore, Stored, STORAGE_KEY};
use paceline::variance::DEFAULT_FALLBACK_HOURS;
use tempfile::tempdir;

fn open(path: &std::path::Path) -> SessionController<SqliteStore> {
    SessionController::new(SqliteStore::open(path).unwrap(), DEFAULT_FALLBACK_HOURS)
}

#[test]
fn calculation_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");

    {
        let mut ctl = open(&path);
        ctl.start("20", "160").unwrap();
        ctl.edit_day(1, "8", "30").unwrap();
        ctl.edit_day(2, "7", "").unwrap();
        ctl.edit_day(3, "0", "0").unwrap();
    }

    let mut ctl = open(&path);
    assert_eq!(ctl.resume().unwrap(), ResumeOutcome::Resumed);

    let state = ctl.state().unwrap();
    assert_eq!(state.setup.raw_total_days(), "20");
    assert_eq!(state.setup.raw_total_hours(), "160");
    assert_eq!(state.ledger.len(), 3);

    let summary = ctl.summary().unwrap();
    assert_eq!(summary.cumulative_actual, 15.5);
    assert_eq!(summary.last_day_with_input, 2);
    assert_eq!(summary.total_variance, -0.5);
    assert_eq!(summary.remaining_hours, 144.5);
    // 17 empty days at 8 hours each
    assert_eq!(summary.projected_total, 15.5 + 17.0 * 8.0);
}

#[test]
fn saved_strings_round_trip_exactly() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");

    {
        let mut ctl = open(&path);
        ctl.start("5", "37.5").unwrap();
        ctl.edit_day(4, "", "45").unwrap();
    }

    let store = SessionStore::new(SqliteStore::open(&path).unwrap());
    let record = store.load().unwrap().unwrap();
    assert_eq!(record.total_days, "5");
    assert_eq!(record.total_hours, "37.5");
    assert_eq!(record.daily_inputs.len(), 1);
    assert_eq!(record.daily_inputs["4"].hours, "");
    assert_eq!(record.daily_inputs["4"].minutes, "45");
}

#[test]
fn reset_leaves_nothing_behind() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");

    {
        let mut ctl = open(&path);
        ctl.start("10", "80").unwrap();
        for day in 1..=10 {
            ctl.edit_day(day, "9", "15").unwrap();
        }
        ctl.reset().unwrap();
        assert!(!ctl.is_active());
    }

    let kv = SqliteStore::open(&path).unwrap();
    assert_eq!(kv.get(STORAGE_KEY).unwrap(), None);

    let mut ctl = open(&path);
    assert_eq!(ctl.resume().unwrap(), ResumeOutcome::Fresh);
}

#[test]
fn corrupt_record_is_deleted_on_resume() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");

    {
        let mut kv = SqliteStore::open(&path).unwrap();
        kv.set(
            STORAGE_KEY,
            r#"{"totalDays":"abc","totalHours":"40","dailyInputs":{}}"#,
        )
        .unwrap();
    }

    let mut ctl = open(&path);
    assert_eq!(ctl.resume().unwrap(), ResumeOutcome::DiscardedCorrupt);
    assert!(!ctl.is_active());
    assert_matches!(ctl.store().read(), Ok(Stored::Absent));
}

#[test]
fn oversized_period_never_reaches_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");

    {
        let mut ctl = open(&path);
        assert!(ctl.start("99999999", "40").is_err());
        assert!(!ctl.is_active());
    }
    assert_eq!(SqliteStore::open(&path).unwrap().get(STORAGE_KEY).unwrap(), None);

    {
        let mut kv = SqliteStore::open(&path).unwrap();
        kv.set(
            STORAGE_KEY,
            r#"{"totalDays":"4000000000","totalHours":"40","dailyInputs":{"1":{"hours":"8","minutes":""}}}"#,
        )
        .unwrap();
    }

    let mut ctl = open(&path);
    assert_eq!(ctl.resume().unwrap(), ResumeOutcome::DiscardedCorrupt);
    assert_matches!(ctl.store().read(), Ok(Stored::Absent));
}

#[test]
fn restart_over_old_session_replaces_it() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");

    let mut ctl = open(&path);
    ctl.start("5", "40").unwrap();
    ctl.edit_day(5, "10", "").unwrap();
    ctl.reset().unwrap();
    ctl.start("3", "21").unwrap();

    let record = ctl.store().load().unwrap().unwrap();
    assert_eq!(record.total_days, "3");
    assert!(record.daily_inputs.is_empty());
    assert_eq!(ctl.summary().unwrap().projected_variance, 3.0);
}
