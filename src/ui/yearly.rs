use chrono::Weekday;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::Paragraph,
};

use super::helpers::{month_name, weekday_label};
use super::theme::Theme;
use crate::app::App;
use crate::grid::summary::{DayShade, YearSummary};

const LABEL_WIDTH: usize = 4;
const WEEK_WIDTH: usize = 2;

fn shade_span(shade: DayShade) -> Span<'static> {
    match shade {
        DayShade::Holiday => Span::styled("■ ", Style::default().fg(Theme::warn())),
        DayShade::Worked => Span::styled("■ ", Style::default().fg(Theme::success())),
        DayShade::Empty => Span::styled("· ", Style::default().fg(Theme::dim())),
        DayShade::OutsideYear => Span::raw("  "),
    }
}

/// Month abbreviations placed over the week where each month starts.
fn month_ruler(summary: &YearSummary) -> String {
    let mut ruler = " ".repeat(LABEL_WIDTH + summary.weeks.len() * WEEK_WIDTH);
    for (week, month) in &summary.month_starts {
        let at = LABEL_WIDTH + week * WEEK_WIDTH;
        let label: String = month_name(*month).chars().take(3).collect();
        if at + label.len() <= ruler.len() {
            ruler.replace_range(at..at + label.len(), &label);
        }
    }
    ruler
}

pub fn build_yearly_text(summary: &YearSummary) -> Text<'static> {
    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        month_ruler(summary),
        Style::default().fg(Theme::dim()),
    )));

    let weekdays = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    for (index, weekday) in weekdays.iter().enumerate() {
        let mut spans = vec![Span::styled(
            format!("{:<width$}", weekday_label(*weekday), width = LABEL_WIDTH),
            Style::default().fg(Theme::dim()),
        )];
        spans.extend(summary.weeks.iter().map(|week| shade_span(week[index])));
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Worked days: ", Style::default().fg(Theme::dim())),
        Span::styled(
            summary.worked_days.to_string(),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Hours: ", Style::default().fg(Theme::dim())),
        Span::styled(
            summary.total_hours.to_string(),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled("■", Style::default().fg(Theme::success())),
        Span::styled(" worked  ", Style::default().fg(Theme::dim())),
        Span::styled("■", Style::default().fg(Theme::warn())),
        Span::styled(" holiday", Style::default().fg(Theme::dim())),
    ]));
    Text::from(lines)
}

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let text = match &app.yearly {
        Some(summary) => build_yearly_text(summary),
        None => Text::from("No summary yet"),
    };
    frame.render_widget(Paragraph::new(text), area);
}
