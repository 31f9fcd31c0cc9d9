use super::images::on_image_fetched;
use super::state::{SharedState, UiEvent};
use super::upload::{
    close_uploader, on_file_picked, on_files_dropped, on_story_uploaded, open_uploader,
    remove_preview, set_dragging,
};
use super::viewer::{on_autoplay_tick, on_carousel_input, open_viewer};

/// Handle a UI event. Every state change of the application goes through here.
pub fn handle_ui_event(state: &SharedState, event: UiEvent) {
    match event {
        UiEvent::OpenViewer(index) => open_viewer(state, index),
        UiEvent::Carousel(input) => on_carousel_input(state, input),
        UiEvent::AutoplayTick {
            generation,
            elapsed,
        } => on_autoplay_tick(state, generation, elapsed),
        UiEvent::OpenUploader => open_uploader(state),
        UiEvent::CloseUploader => close_uploader(state),
        UiEvent::DragEnter => set_dragging(state, true),
        UiEvent::DragLeave => set_dragging(state, false),
        UiEvent::UploadPicked(uri) => on_file_picked(state, &uri),
        UiEvent::UploadDropped(uris) => on_files_dropped(state, uris),
        UiEvent::RemovePreview => remove_preview(state),
        UiEvent::StoryUploaded(candidate) => on_story_uploaded(state, candidate),
        UiEvent::ImageFetched { url, result } => {
            on_image_fetched(&mut state.borrow_mut(), url, result);
        }
    }
}
