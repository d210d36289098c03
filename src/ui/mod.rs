//! egui widgets. Everything here reads [`crate::state::AppState`] and draws;
//! chart data comes from [`crate::view::render`].

pub mod panels;
pub mod plot;
pub mod table;
