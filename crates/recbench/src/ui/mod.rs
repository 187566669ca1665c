//! Terminal dashboard

mod layout;
mod widgets;

pub use layout::{draw, UiState};
