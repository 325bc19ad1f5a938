pub mod hints;
pub mod popup;
pub mod spinner;
