use std::fmt::Write;

use crate::format::format_hours;
use crate::session::SessionState;
use crate::variance::Summary;

/// Plain-text rendering of a calculation for non-interactive output
pub fn render_report(state: &SessionState, summary: &Summary) -> String {
    let setup = &state.setup;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} days, {} hours required, standard pace {} per day",
        setup.total_days(),
        setup.raw_total_hours().trim(),
        format_hours(setup.standard_hours_per_day(), false)
    );

    for (day, entry) in state.ledger.iter() {
        let Some(variance) = summary.day_variance(day) else {
            continue;
        };
        let _ = writeln!(
            out,
            "day {day}: {}h {}m  {}",
            if entry.hours.is_empty() { "-" } else { entry.hours.as_str() },
            if entry.minutes.is_empty() { "-" } else { entry.minutes.as_str() },
            format_hours(variance, true)
        );
    }

    let _ = writeln!(out, "variance to date: {}", format_hours(summary.total_variance, true));
    let _ = writeln!(out, "remaining hours: {}", format_hours(summary.remaining_hours, false));
    let _ = writeln!(
        out,
        "projected end variance: {}",
        format_hours(summary.projected_variance, true)
    );
    out
}
