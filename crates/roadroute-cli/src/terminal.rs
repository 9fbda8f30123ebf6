//! Terminal styling and color utilities.
//!
//! Routes are drawn in two colors: red for the primary route and blue for
//! the alternate. Color is dropped when the terminal cannot show it.

/// ANSI escape codes for text styling and colors.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";
    /// Bright bold white for headings.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for step numbers and secondary text.
    pub const GRAY: &str = "\x1b[90m";
    /// Red for the primary route.
    pub const RED: &str = "\x1b[31m";
    /// Blue for the alternate route.
    pub const BLUE: &str = "\x1b[34m";
    /// Yellow for warnings such as a missing alternate.
    pub const YELLOW: &str = "\x1b[33m";
}

/// Resolved color codes, either ANSI sequences or empty strings when color
/// is disabled.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
    pub primary: &'static str,
    pub alternate: &'static str,
    pub warning: &'static str,
}

impl ColorPalette {
    /// Create a palette with actual ANSI color codes.
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
            primary: colors::RED,
            alternate: colors::BLUE,
            warning: colors::YELLOW,
        }
    }

    /// Create a palette with no colors (empty strings).
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            white_bold: "",
            gray: "",
            primary: "",
            alternate: "",
            warning: "",
        }
    }

    /// Create a palette based on terminal capabilities.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Check if the terminal supports ANSI color codes.
///
/// This function respects:
/// - The `NO_COLOR` environment variable (https://no-color.org/)
/// - The `TERM=dumb` convention for non-capable terminals
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}

/// Format a distance in metres, switching to kilometres from 1 km up.
///
/// # Examples
///
/// ```
/// # use roadroute_cli::terminal::format_distance;
/// assert_eq!(format_distance(87.26), "87.3 m");
/// assert_eq!(format_distance(1520.0), "1.52 km");
/// ```
#[must_use]
pub fn format_distance(metres: f64) -> String {
    if metres < 1000.0 {
        format!("{metres:.1} m")
    } else {
        format!("{:.2} km", metres / 1000.0)
    }
}
