//! Light and dark color palettes.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Which palette is active. Persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
  Light,
  #[default]
  Dark,
}

impl ThemeKind {
  pub fn toggled(self) -> Self {
    match self {
      ThemeKind::Light => ThemeKind::Dark,
      ThemeKind::Dark => ThemeKind::Light,
    }
  }
}

/// Resolved colors for the active theme.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
  pub background: Color,
  pub foreground: Color,
  pub muted: Color,
  pub accent: Color,
  pub border: Color,
  pub selected_bg: Color,
  pub price: Color,
  pub badge_new: Color,
  pub warning: Color,
}

impl Theme {
  pub fn of(kind: ThemeKind) -> Self {
    match kind {
      ThemeKind::Dark => Self {
        background: Color::Reset,
        foreground: Color::White,
        muted: Color::DarkGray,
        accent: Color::Cyan,
        border: Color::Blue,
        selected_bg: Color::DarkGray,
        price: Color::Green,
        badge_new: Color::Yellow,
        warning: Color::Red,
      },
      ThemeKind::Light => Self {
        background: Color::White,
        foreground: Color::Black,
        muted: Color::Gray,
        accent: Color::Blue,
        border: Color::Cyan,
        selected_bg: Color::Gray,
        price: Color::Green,
        badge_new: Color::Magenta,
        warning: Color::Red,
      },
    }
  }
}
