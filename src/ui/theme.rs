use ratatui::style::Color;

/// Unified color theme for the application
pub struct Theme;

impl Theme {
    /// Primary branding color
    pub fn primary() -> Color {
        Color::Magenta
    }

    /// Secondary/border color
    pub fn secondary() -> Color {
        Color::Cyan
    }

    /// Verified days and worked heatmap cells
    pub fn success() -> Color {
        Color::Green
    }

    /// Holidays
    pub fn warn() -> Color {
        Color::Yellow
    }

    /// Reported hours disagree with the grid
    pub fn error() -> Color {
        Color::Red
    }

    /// Reported but not verified
    pub fn reported() -> Color {
        Color::Blue
    }

    /// Cells inside the selection
    pub fn selection() -> Color {
        Color::Rgb(40, 60, 90)
    }

    /// Active cell
    pub fn highlight() -> Color {
        Color::Cyan
    }

    pub fn dim() -> Color {
        Color::DarkGray
    }

    pub fn text() -> Color {
        Color::White
    }

    /// Sums and counts
    pub fn accent() -> Color {
        Color::LightBlue
    }
}
