//! Month grid: one row per project, one column per day, sums on the edges.

use chrono::{Datelike, NaiveDate};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::Paragraph,
};

use super::helpers::{clamp_name, is_weekend, month_name, weekday_label};
use super::theme::Theme;
use crate::app::App;
use crate::remote::DayStatus;
use crate::types::{Hours, ProjectId};

pub const NAME_WIDTH: u16 = 22;
pub const CELL_WIDTH: u16 = 4;
const SUM_WIDTH: u16 = 7;
/// Weekday and day-number lines above the project rows.
const HEADER_ROWS: u16 = 2;
/// Sum and absence lines below them.
const FOOTER_ROWS: u16 = 2;

/// Where cells land on screen. Rendering and mouse hit-testing both derive
/// it from the same area and state, so a click maps to what was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    area: Rect,
    pub first_col: usize,
    pub visible_cols: usize,
    pub first_row: usize,
    pub visible_rows: usize,
}

/// First index of a `visible`-wide window over `total` items that contains `active`.
fn scroll_to(active: usize, visible: usize, total: usize) -> usize {
    if visible > 0 && active >= visible {
        (active + 1 - visible).min(total - visible)
    } else {
        0
    }
}

impl GridGeometry {
    pub fn new(area: Rect, app: &App) -> Self {
        let day_count = app.grid.days().len();
        let fit_cols = area.width.saturating_sub(NAME_WIDTH + SUM_WIDTH) / CELL_WIDTH;
        let visible_cols = usize::from(fit_cols).min(day_count);

        let row_count = app.grid.projects().len();
        let fit_rows = area.height.saturating_sub(HEADER_ROWS + FOOTER_ROWS);
        let visible_rows = usize::from(fit_rows).min(row_count);

        // Scroll just far enough to keep the active cell on screen.
        let active = app.grid.active();
        let active_col = active.map(|pos| pos.col).unwrap_or(0);
        let active_row = active
            .and_then(|pos| app.grid.projects().iter().position(|p| p.id == pos.project))
            .unwrap_or(0);

        Self {
            area,
            first_col: scroll_to(active_col, visible_cols, day_count),
            visible_cols,
            first_row: scroll_to(active_row, visible_rows, row_count),
            visible_rows,
        }
    }

    fn rows_top(&self) -> u16 {
        self.area.y + HEADER_ROWS
    }

    fn cells_left(&self) -> u16 {
        self.area.x + NAME_WIDTH
    }

    /// (row, column) of the cell under a terminal position.
    pub fn cell_at(&self, x: u16, y: u16) -> Option<(usize, usize)> {
        if x < self.cells_left() || y < self.rows_top() {
            return None;
        }
        let row = usize::from(y - self.rows_top());
        let offset = usize::from((x - self.cells_left()) / CELL_WIDTH);
        if row >= self.visible_rows || offset >= self.visible_cols {
            return None;
        }
        Some((self.first_row + row, self.first_col + offset))
    }

    /// Like `cell_at`, but positions off the grid snap to the closest cell.
    pub fn nearest_cell(&self, x: u16, y: u16) -> Option<(usize, usize)> {
        if self.visible_rows == 0 || self.visible_cols == 0 {
            return None;
        }
        let row = usize::from(y.saturating_sub(self.rows_top())).min(self.visible_rows - 1);
        let offset = usize::from(x.saturating_sub(self.cells_left()) / CELL_WIDTH)
            .min(self.visible_cols - 1);
        Some((self.first_row + row, self.first_col + offset))
    }
}

fn cell_text(value: Hours) -> String {
    if value == 0 {
        "  · ".to_string()
    } else {
        format!("{value:>3} ")
    }
}

fn day_color(app: &App, date: NaiveDate) -> Color {
    if app.holiday_on(date).is_some() {
        Theme::warn()
    } else if is_weekend(date) {
        Theme::dim()
    } else {
        Theme::text()
    }
}

fn status_style(app: &App, date: NaiveDate) -> Style {
    match app.day_status(date) {
        DayStatus::Verified => Style::default()
            .fg(Theme::success())
            .add_modifier(Modifier::BOLD),
        DayStatus::Mismatch => Style::default()
            .fg(Theme::error())
            .add_modifier(Modifier::BOLD),
        DayStatus::Reported => Style::default().fg(Theme::reported()),
        DayStatus::Unreported => Style::default().fg(day_color(app, date)),
    }
}

fn cell_style(app: &App, project: &ProjectId, col: usize, date: NaiveDate, value: Hours) -> Style {
    let fg = if value == 0 || is_weekend(date) || app.holiday_on(date).is_some() {
        Theme::dim()
    } else {
        Theme::text()
    };
    let mut style = Style::default().fg(fg);

    let active = app
        .grid
        .active()
        .is_some_and(|pos| &pos.project == project && pos.col == col);
    if active {
        style = style
            .fg(Color::Black)
            .bg(Theme::highlight())
            .add_modifier(Modifier::BOLD);
    } else if app.grid.is_selected(project, col) {
        style = style.bg(Theme::selection());
    }
    if app.editing() == Some((project, col)) {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    style
}

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let geometry = GridGeometry::new(area, app);
    let grid = &app.grid;
    let days = &grid.days()[geometry.first_col..geometry.first_col + geometry.visible_cols];
    let name_width = usize::from(NAME_WIDTH);
    let sum_width = usize::from(SUM_WIDTH);
    let mut lines = Vec::new();

    let title = format!("{} {}", month_name(grid.month()), grid.year());
    let mut spans = vec![Span::styled(
        clamp_name(&title, name_width),
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )];
    for date in days {
        spans.push(Span::styled(
            format!("{:>3} ", weekday_label(date.weekday())),
            Style::default().fg(day_color(app, *date)),
        ));
    }
    spans.push(Span::styled(
        format!("{:>sum_width$}", "Sum"),
        Style::default().fg(Theme::dim()),
    ));
    lines.push(Line::from(spans));

    let mut spans = vec![Span::raw(" ".repeat(name_width))];
    for date in days {
        let marker = if app.dirty_days.contains(date) { "*" } else { " " };
        spans.push(Span::styled(
            format!("{:>3}{marker}", date.day()),
            status_style(app, *date),
        ));
    }
    lines.push(Line::from(spans));

    let rows = grid.projects().iter().skip(geometry.first_row);
    for project in rows.take(geometry.visible_rows) {
        let mut spans = vec![Span::styled(
            format!("{} ", clamp_name(&project.name, name_width - 1)),
            Style::default().fg(Theme::text()),
        )];
        for (offset, date) in days.iter().enumerate() {
            let col = geometry.first_col + offset;
            let value = grid.get_value(&project.id, *date);
            spans.push(Span::styled(
                cell_text(value),
                cell_style(app, &project.id, col, *date, value),
            ));
        }
        spans.push(Span::styled(
            format!("{:>sum_width$}", grid.row_sum(&project.id)),
            Style::default().fg(Theme::accent()),
        ));
        lines.push(Line::from(spans));
    }

    let mut spans = vec![Span::styled(
        clamp_name("Sum", name_width),
        Style::default()
            .fg(Theme::dim())
            .add_modifier(Modifier::BOLD),
    )];
    for date in days {
        spans.push(Span::styled(
            format!("{:>3} ", grid.column_sum(*date)),
            Style::default().fg(Theme::accent()),
        ));
    }
    spans.push(Span::styled(
        format!("{:>sum_width$}", grid.total_sum()),
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::from(spans));

    let mut spans = vec![Span::styled(
        clamp_name("Absence", name_width),
        Style::default().fg(Theme::dim()),
    )];
    for date in days {
        let symbol = grid.absence_for(*date).map(|kind| kind.symbol()).unwrap_or("");
        spans.push(Span::styled(
            format!("{symbol:>3} "),
            Style::default().fg(Theme::primary()),
        ));
    }
    lines.push(Line::from(spans));

    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}
