use super::images::{request_image, ImageTarget};
use super::state::AppState;
use crate::ui::shell::populate_story_row;

/// Rebuild the avatar row from the current story list and start loading
/// the author images.
pub fn refresh_story_row(s: &mut AppState) {
    let slots = match s.shell.as_ref() {
        Some(shell) => populate_story_row(shell, &s.stories, &s.ui_sender),
        None => return,
    };
    for slot in slots {
        request_image(s, &slot.url, ImageTarget::avatar(&slot.avatar));
    }
    log::debug!("Story row shows {} stories", s.stories.len());
}
