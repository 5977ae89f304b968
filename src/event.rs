use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::app::{App, AppEvent, PointerEvent};

/// Resolve a left-button mouse event against the grid drawn in `area`.
fn pointer(mouse: MouseEvent, area: Rect, app: &App) -> Option<PointerEvent> {
    let (x, y) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let pos = crate::ui::cell_at(area, app, x, y)?;
            Some(PointerEvent::Down {
                pos,
                shift: mouse.modifiers.contains(KeyModifiers::SHIFT),
            })
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            crate::ui::nearest_cell(area, app, x, y).map(PointerEvent::Drag)
        }
        MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Up),
        _ => None,
    }
}

/// Polls for crossterm events and maps them to `AppEvent`s.
pub fn poll(timeout: Duration, area: Rect, app: &App) -> Result<Option<AppEvent>> {
    if event::poll(timeout)? {
        return Ok(match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::KeyPress(key)),
            Event::Mouse(mouse) => pointer(mouse, area, app).map(AppEvent::Pointer),
            _ => None,
        });
    }
    Ok(Some(AppEvent::Tick))
}

/// Runs the main event loop.
pub fn run(app: &mut App, terminal: &mut crate::tui::Terminal) -> Result<()> {
    let tick_rate = Duration::from_millis(250);

    while app.running {
        terminal.draw(|frame| crate::ui::draw(frame, app))?;

        let size = terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        if let Some(event) = poll(tick_rate, area, app)? {
            app.update(event);
        }
    }
    Ok(())
}
