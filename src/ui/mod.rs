//! TUI components

pub mod theme;

pub use theme::Theme;
