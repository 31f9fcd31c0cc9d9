mod autoplay;
mod event_handler;
mod images;
mod shell;
mod state;
mod upload;
mod viewer;

pub use event_handler::handle_ui_event;
pub use shell::refresh_story_row;
pub use state::{AppState, UiEvent};
