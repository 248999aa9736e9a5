pub mod day_table;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, SetupField, View};
use crate::format::format_hours;
use crate::store::KeyValueStore;
use crate::variance::Summary;

use self::day_table::{pace_style, render_day_table};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

impl<K: KeyValueStore> Widget for &App<K> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.view {
            View::Setup => render_setup(self, area, buf),
            View::Tracking => render_tracking(self, area, buf),
        }
    }
}

fn render_setup<K: KeyValueStore>(app: &App<K>, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(4), // two fields inside a border
            Constraint::Length(2), // error line
            Constraint::Length(1), // legend
            Constraint::Min(0),
        ])
        .split(area);

    let focused = app.setup.focused();
    let field_line = |field: SetupField, value: &str| {
        let marker = if field == focused { "▸ " } else { "  " };
        let value_style = if field == focused {
            bold_style.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED)
        } else {
            bold_style
        };
        let shown = if value.is_empty() { "_" } else { value };
        Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{field}: "), bold_style),
            Span::styled(shown.to_string(), value_style),
        ])
    };

    let form = Paragraph::new(vec![
        field_line(SetupField::TotalDays, &app.setup.total_days),
        field_line(SetupField::TotalHours, &app.setup.total_hours),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Set up the period"),
    );
    form.render(chunks[1], buf);

    if let Some(err) = &app.setup.error {
        Paragraph::new(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);
    }

    Paragraph::new(Span::styled(
        "(tab) switch field / (enter) start / (esc)ape",
        italic_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);
}

fn render_tracking<K: KeyValueStore>(app: &App<K>, area: Rect, buf: &mut Buffer) {
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // pace header
            Constraint::Min(4),    // day table
            Constraint::Length(5), // summary box
            Constraint::Length(1), // status / confirm
            Constraint::Length(1), // legend
        ])
        .split(area);

    if let Some(state) = app.session.state() {
        let header = format!(
            "{} days / {} hours required / standard pace {} per day",
            state.setup.total_days(),
            state.setup.raw_total_hours().trim(),
            format_hours(state.setup.standard_hours_per_day(), false)
        );
        Paragraph::new(Span::styled(
            header,
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);
    }

    let variances: &[Option<f64>] = app
        .session
        .summary()
        .map(|s| s.per_day.as_slice())
        .unwrap_or(&[]);
    render_day_table(&app.rows, variances, app.cursor, app.field, chunks[1], buf);

    if let Some(summary) = app.session.summary() {
        Paragraph::new(summary_lines(summary))
            .block(Block::default().borders(Borders::ALL).title("Summary"))
            .render(chunks[2], buf);
    }

    if app.confirming_reset {
        Paragraph::new(Span::styled(
            "Really reset everything? All entered data will be erased. (y/n)",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    } else if let Some(status) = &app.status {
        Paragraph::new(Span::styled(status.clone(), Style::default().fg(Color::Red)))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }

    Paragraph::new(Span::styled(
        format!(
            "(↑/↓) day / (←/→) field / (0-9) type / (+/-) step {}m / (x) clear / (r)eset / (esc)ape",
            app.config.minute_step
        ),
        italic_style,
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(chunks[4], buf);
}

/// Three summary lines with labels padded to a common display width
pub fn summary_lines(summary: &Summary) -> Vec<Line<'static>> {
    let figures = [
        (
            "Variance to date",
            format_hours(summary.total_variance, true),
            pace_style(summary.total_variance),
        ),
        (
            "Remaining hours",
            format_hours(summary.remaining_hours, false),
            Style::default(),
        ),
        (
            "Projected end variance",
            format_hours(summary.projected_variance, true),
            pace_style(summary.projected_variance),
        ),
    ];

    let label_width = figures
        .iter()
        .map(|(label, _, _)| label.width())
        .max()
        .unwrap_or(0);

    figures
        .into_iter()
        .map(|(label, value, style)| {
            let padding = " ".repeat(label_width - label.width());
            Line::from(vec![
                Span::styled(
                    format!("{label}:{padding} "),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(value, style),
            ])
        })
        .collect()
}
