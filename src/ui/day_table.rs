use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};

use crate::app::DayField;
use crate::format::{format_hours, Pace};
use crate::ledger::DailyEntry;

pub struct DayRowData<'a> {
    pub day: u32,
    pub entry: &'a DailyEntry,
    pub variance: Option<f64>,
    /// Which field is being edited, if this is the selected row
    pub editing: Option<DayField>,
}

pub fn pace_style(variance: f64) -> Style {
    match Pace::of(variance) {
        Pace::Ahead => Style::default().fg(Color::Green),
        Pace::Behind => Style::default().fg(Color::Red),
        Pace::OnPace => Style::default(),
    }
}

/// Pure presenter for a single day row
pub fn present_row(data: &DayRowData) -> Row<'static> {
    let field_cell = |value: &str, placeholder: &str, field: DayField| {
        let text = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.to_string()
        };
        let style = if data.editing == Some(field) {
            Style::default()
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                .fg(Color::Cyan)
        } else if value.is_empty() {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };
        Cell::from(text).style(style)
    };

    // blank when the day has no entry yet
    let variance_cell = match data.variance {
        Some(v) => Cell::from(format_hours(v, true)).style(pace_style(v)),
        None => Cell::from(""),
    };

    let row = Row::new(vec![
        Cell::from(format!("Day {}", data.day)),
        field_cell(&data.entry.hours, "h", DayField::Hours),
        field_cell(&data.entry.minutes, "m", DayField::Minutes),
        variance_cell,
    ]);

    if data.editing.is_some() {
        row.style(Style::default().bg(Color::DarkGray))
    } else {
        row
    }
}

/// First row index to show so that `cursor` stays inside a window of `height` rows
pub fn scroll_offset(cursor: usize, height: usize) -> usize {
    if height == 0 {
        return cursor;
    }
    cursor.saturating_sub(height - 1)
}

pub fn render_day_table(
    rows: &[DailyEntry],
    variances: &[Option<f64>],
    cursor: usize,
    field: DayField,
    area: Rect,
    buf: &mut Buffer,
) {
    // borders + header
    let table_height = area.height.saturating_sub(3) as usize;
    let offset = scroll_offset(cursor, table_height);

    let visible_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(table_height)
        .map(|(idx, entry)| {
            present_row(&DayRowData {
                day: idx as u32 + 1,
                entry,
                variance: variances.get(idx).copied().flatten(),
                editing: (idx == cursor).then_some(field),
            })
        })
        .collect();

    let header = Row::new(vec!["Day", "Hours", "Minutes", "Cumulative variance"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let scroll_info = if rows.len() > table_height {
        format!(" ({}/{})", cursor + 1, rows.len())
    } else {
        String::new()
    };

    let table = Table::new(
        visible_rows,
        [
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Daily hours{scroll_info}")),
    )
    .column_spacing(2);

    Widget::render(table, area, buf);
}
