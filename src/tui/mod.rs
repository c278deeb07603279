//! Terminal front end using ratatui

mod canvas;
mod input;
mod terminal;

pub use canvas::Canvas;
pub use input::map_event;
pub use terminal::Tui;
