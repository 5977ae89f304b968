use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::theme::Theme;

pub fn build_help_text() -> Text<'static> {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        "Key bindings",
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    lines.push(section_title("Global"));
    lines.extend(section_lines(&[
        "q: Quit (or leave help / yearly view)",
        "?: Toggle help",
        "esc: Back, clears the status line",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Grid"));
    lines.extend(section_lines(&[
        "Arrows/Enter: Move focus",
        "Shift+Arrows: Extend selection",
        "Mouse: Click to focus, drag to select, Shift+click to move focus only",
        "0-9: Type into the focused cell, or fill a selected range",
        "Delete/Backspace: Clear the selection",
        "Ctrl+C / Ctrl+V: Copy / paste a block",
        "Ctrl+Z / Ctrl+Y: Undo / redo",
        "Ctrl+A: Cycle the absence mark of the focused days",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Calendar"));
    lines.extend(section_lines(&[
        "[ / ]: Previous / next month (year in the yearly view)",
        "t: Jump to the current month",
        "y: Yearly overview",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Payroll service"));
    lines.extend(section_lines(&[
        "s: Fetch the month's reports",
        "u: Upload the focused day",
        "v: Verify every reported day of the month",
        "Day colours: green verified, blue reported, red hours differ",
        "*: Day edited since its last upload",
    ]));

    Text::from(lines)
}

fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    ))
}

fn section_lines(items: &[&str]) -> Vec<Line<'static>> {
    items
        .iter()
        .map(|item| {
            Line::from(Span::styled(
                format!("  - {item}"),
                Style::default().fg(Theme::text()),
            ))
        })
        .collect()
}
