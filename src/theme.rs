//! Theme Module
//!
//! Color presets for terminal output.
use colored::{Color, ColoredString, Colorize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeName {
    /// White on black, the original window colors.
    #[default]
    Classic,
    Light,
    Matrix,
    Ocean,
}

impl ThemeName {
    pub const ALL: [ThemeName; 4] = [
        ThemeName::Classic,
        ThemeName::Light,
        ThemeName::Matrix,
        ThemeName::Ocean,
    ];

    pub fn theme(self) -> Theme {
        match self {
            ThemeName::Classic => Theme::new(Color::White, Color::Black),
            ThemeName::Light => Theme::new(Color::Black, Color::White),
            ThemeName::Matrix => Theme::new(Color::Green, Color::Black),
            ThemeName::Ocean => Theme::new(Color::Cyan, Color::Blue),
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeName::Classic => write!(f, "classic"),
            ThemeName::Light => write!(f, "light"),
            ThemeName::Matrix => write!(f, "matrix"),
            ThemeName::Ocean => write!(f, "ocean"),
        }
    }
}

impl FromStr for ThemeName {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classic" | "default" | "dark" => Ok(ThemeName::Classic),
            "light" => Ok(ThemeName::Light),
            "matrix" | "hacker" => Ok(ThemeName::Matrix),
            "ocean" => Ok(ThemeName::Ocean),
            _ => Err(format!("Invalid theme: {}", s)),
        }
    }
}

/// Foreground and background colors applied to result text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub foreground: Color,
    pub background: Color,
}

impl Theme {
    pub fn new(foreground: Color, background: Color) -> Self {
        Self {
            foreground,
            background,
        }
    }

    pub fn paint(&self, text: &str) -> ColoredString {
        text.color(self.foreground).on_color(self.background)
    }
}

impl Default for Theme {
    fn default() -> Self {
        ThemeName::default().theme()
    }
}
