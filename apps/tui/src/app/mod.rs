// Application state, key handling and side-effecting collaborators

pub mod actions;
pub mod column_picker;
pub mod filter_panel;
pub mod input;
pub mod state;

pub use actions::AppActions;
pub use input::handle_input;
pub use state::{App, AppScreen, DetailState, FetchOutcome, TimelineState, ViewState};
