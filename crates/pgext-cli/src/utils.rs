use std::{
    fmt::Display,
    sync::{LazyLock, RwLock},
};

use nu_ansi_term::Color::{self, DarkGray, Green, Red, Yellow};
use pgext_core::CellStatus;
use serde::Serialize;
use tracing::info;

pub struct Icons;

impl Icons {
    pub const ARROW: &str = "→";
    pub const AVAILABLE: &str = "●";
    pub const HIDDEN: &str = "◌";
    pub const MISSING: &str = "○";
    pub const WARNING: &str = "▲";
}

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub fn color_enabled() -> bool {
    COLOR.read().map(|color| *color).unwrap_or(true)
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if color_enabled() {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

pub fn status_color(status: CellStatus) -> Color {
    match status {
        CellStatus::Available => Green,
        CellStatus::Warning => Yellow,
        CellStatus::Missing => Red,
        CellStatus::Hidden => DarkGray,
    }
}

pub fn status_icon(status: CellStatus) -> &'static str {
    match status {
        CellStatus::Available => Icons::AVAILABLE,
        CellStatus::Warning => Icons::WARNING,
        CellStatus::Missing => Icons::MISSING,
        CellStatus::Hidden => Icons::HIDDEN,
    }
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_legend() {
    info!(
        "{} available  {} warning  {} missing  {} hidden",
        Colored(Green, Icons::AVAILABLE),
        Colored(Yellow, Icons::WARNING),
        Colored(Red, Icons::MISSING),
        Colored(DarkGray, Icons::HIDDEN),
    );
}
