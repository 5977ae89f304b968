mod calendar;
mod help;
mod helpers;
mod theme;
mod yearly;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::app::{App, AppView};
use crate::grid::SelectionState;
use crate::remote::DayStatus;
use crate::types::CellPos;
use calendar::GridGeometry;
use theme::Theme;

use help::build_help_text;

fn layout(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

fn framed(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Theme::secondary()))
        .title(title)
}

/// Inner area the month grid is drawn into, for a frame of size `area`.
pub fn calendar_area(area: Rect) -> Rect {
    let (_, body, _) = layout(area);
    framed("").inner(body)
}

fn position(app: &App, hit: Option<(usize, usize)>) -> Option<CellPos> {
    let (row, col) = hit?;
    let project = app.grid.projects().get(row)?;
    Some(CellPos::new(project.id.clone(), col))
}

/// Cell under terminal position (`x`, `y`).
pub fn cell_at(area: Rect, app: &App, x: u16, y: u16) -> Option<CellPos> {
    let geometry = GridGeometry::new(calendar_area(area), app);
    position(app, geometry.cell_at(x, y))
}

/// Cell closest to (`x`, `y`), used while dragging past the grid edge.
pub fn nearest_cell(area: Rect, app: &App, x: u16, y: u16) -> Option<CellPos> {
    let geometry = GridGeometry::new(calendar_area(area), app);
    position(app, geometry.nearest_cell(x, y))
}

/// Renders the entire UI for a single frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let (header_area, body_area, footer_area) = layout(frame.area());

    let mut header_spans = vec![
        Span::styled(
            "  Timegrid  ",
            Style::default().fg(Color::Black).bg(Theme::primary()),
        ),
        Span::raw(" "),
        Span::styled(
            "timesheet",
            Style::default()
                .fg(Theme::secondary())
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
    ];
    header_spans.push(if !app.has_remote() {
        Span::styled("offline", Style::default().fg(Theme::dim()))
    } else if app.pending > 0 {
        Span::styled(
            format!("syncing ({})", app.pending),
            Style::default().fg(Theme::warn()),
        )
    } else {
        Span::styled("connected", Style::default().fg(Theme::success()))
    });
    if !app.dirty_days.is_empty() {
        header_spans.push(Span::styled(
            format!("   {} day(s) not uploaded", app.dirty_days.len()),
            Style::default().fg(Theme::dim()),
        ));
    }
    let header = Paragraph::new(Text::from(Line::from(header_spans)))
        .alignment(Alignment::Left)
        .block(framed(""));
    frame.render_widget(header, header_area);

    let title = match app.view {
        AppView::Calendar => " Calendar ",
        AppView::Yearly => " Year ",
        AppView::Help => " Help ",
    };
    let block = framed(title);
    let inner = block.inner(body_area);
    frame.render_widget(block, body_area);
    match app.view {
        AppView::Calendar => calendar::render(frame, inner, app),
        AppView::Yearly => yearly::render(frame, inner, app),
        AppView::Help => frame.render_widget(
            Paragraph::new(build_help_text()).style(Style::default().fg(Theme::text())),
            inner,
        ),
    }

    let footer = Paragraph::new(Text::from(vec![info_line(app), keybinds_line(app)]))
        .alignment(Alignment::Left)
        .block(framed(""));
    frame.render_widget(footer, footer_area);
}

/// Status message, or facts about the focused day.
fn info_line(app: &App) -> Line<'static> {
    if let Some(status) = &app.status {
        return Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Theme::warn()),
        ));
    }
    let Some(date) = app.grid.active_date() else {
        return Line::from(Span::styled(
            "Click a cell or press an arrow key to start",
            Style::default().fg(Theme::dim()),
        ));
    };

    let mut spans = vec![Span::styled(
        date.format("%A %Y-%m-%d").to_string(),
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::styled(
        format!("  {}h", app.grid.column_sum(date)),
        Style::default().fg(Theme::text()),
    ));
    if app.grid.selection_state() == SelectionState::Extended {
        spans.push(Span::styled(
            "  range selected",
            Style::default().fg(Theme::secondary()),
        ));
    }
    if let Some(holiday) = app.holiday_on(date) {
        spans.push(Span::styled(
            format!("  {}", holiday.local_name),
            Style::default().fg(Theme::warn()),
        ));
    }
    if let Some(kind) = app.grid.absence_for(date) {
        spans.push(Span::styled(
            format!("  absence: {}", kind.label()),
            Style::default().fg(Theme::primary()),
        ));
    }
    let remote = match app.day_status(date) {
        DayStatus::Verified => Some(("  verified", Theme::success())),
        DayStatus::Reported => Some(("  reported", Theme::reported())),
        DayStatus::Mismatch => Some(("  reported hours differ", Theme::error())),
        DayStatus::Unreported => None,
    };
    if let Some((label, color)) = remote {
        spans.push(Span::styled(label, Style::default().fg(color)));
    }
    Line::from(spans)
}

/// Key hints. Undo, redo and paste only show when they would do something.
fn calendar_hints(app: &App) -> String {
    let mut hints = vec!["arrows move", "shift extends", "0-9 enter"];
    if app.grid.can_undo() {
        hints.push("^Z undo");
    }
    if app.grid.can_redo() {
        hints.push("^Y redo");
    }
    let clip = app.grid.clipboard_rows();
    let paste = clip
        .first()
        .map(|row| format!("^V paste {}x{}", clip.len(), row.len()));
    let mut line = hints.join("  ");
    if let Some(paste) = paste {
        line.push_str("  ");
        line.push_str(&paste);
    }
    line.push_str("  [ ] month  y year  s/u/v sync  ? help  q quit");
    line
}

fn keybinds_line(app: &App) -> Line<'static> {
    let hint = match app.view {
        AppView::Calendar => calendar_hints(app),
        AppView::Yearly => "[ ] year  esc back".to_string(),
        AppView::Help => "esc back".to_string(),
    };
    Line::from(Span::styled(hint, Style::default().fg(Theme::dim())))
}
