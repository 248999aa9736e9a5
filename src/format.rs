/// Render decimal hours as "H hours M minutes".
///
/// The value is rounded to whole minutes first, so `1.999` becomes
/// "2 hours 0 minutes". With `with_sign` the result is prefixed by `+` or `-`
/// taken from the sign of the unrounded input; zero counts as positive.
pub fn format_hours(decimal_hours: f64, with_sign: bool) -> String {
    let total_minutes = (decimal_hours.abs() * 60.0).round() as u64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    let time_string = format!("{hours} hours {minutes} minutes");

    if with_sign {
        let sign = if decimal_hours < 0.0 { '-' } else { '+' };
        format!("{sign}{time_string}")
    } else {
        time_string
    }
}

/// Which way a variance leans; drives colouring in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    Ahead,
    OnPace,
    Behind,
}

impl Pace {
    pub fn of(variance: f64) -> Self {
        if variance > 0.0 {
            Pace::Ahead
        } else if variance < 0.0 {
            Pace::Behind
        } else {
            Pace::OnPace
        }
    }
}
