use chrono::Local;
use gtk4::prelude::*;
use gtk4::{gio, glib};

use super::shell::refresh_story_row;
use super::state::{AppState, SharedState, UiEvent, UploaderSession};
use crate::story::Story;
use crate::ui::uploader::{self as uploader_ui, UploaderWidgets};
use crate::uploader::{UploadCandidate, UploadError, Uploader};

const QUERY_ATTRIBUTES: &str = "standard::content-type,standard::size,standard::display-name";

/// Read type, size and name of the file behind `uri`.
pub fn probe(uri: &str) -> Result<UploadCandidate, UploadError> {
    let file = gio::File::for_uri(uri);
    let info = file
        .query_info(
            QUERY_ATTRIBUTES,
            gio::FileQueryInfoFlags::NONE,
            None::<&gio::Cancellable>,
        )
        .map_err(|e: glib::Error| UploadError::Unreadable(e.message().to_string()))?;

    let mime = info
        .content_type()
        .and_then(|content_type| gio::content_type_get_mime_type(&content_type))
        .map(|mime| mime.to_string())
        .unwrap_or_default();

    Ok(UploadCandidate {
        uri: uri.to_string(),
        name: info.display_name().to_string(),
        mime,
        size: u64::try_from(info.size()).unwrap_or(0),
    })
}

pub fn open_uploader(state: &SharedState) {
    let mut s = state.borrow_mut();
    if let Some(ref session) = s.uploader {
        session.widgets.window.present();
        return;
    }
    let Some(parent) = s.shell.as_ref().map(|shell| shell.window.clone()) else {
        return;
    };

    let sender = s.ui_sender.clone();
    let uploader = Uploader::new(s.config.uploader.clone(), move |candidate| {
        let _ = sender.try_send(UiEvent::StoryUploaded(candidate.clone()));
    });
    let widgets = uploader_ui::build_uploader(
        &parent,
        &uploader.policy().allowed_types,
        s.ui_sender.clone(),
    );
    render(&widgets, &uploader);
    widgets.window.present();

    log::info!("Uploader opened");
    s.uploader = Some(UploaderSession { uploader, widgets });
}

pub fn close_uploader(state: &SharedState) {
    if let Some(session) = state.borrow_mut().uploader.take() {
        uploader_ui::destroy_uploader(&session.widgets);
        log::info!("Uploader closed");
    }
}

pub fn set_dragging(state: &SharedState, dragging: bool) {
    let mut s = state.borrow_mut();
    let Some(session) = s.uploader.as_mut() else {
        return;
    };
    if session.uploader.is_dragging() == dragging {
        return;
    }
    if dragging {
        session.uploader.drag_enter();
    } else {
        session.uploader.drag_leave();
    }
    uploader_ui::render_uploader(&session.widgets, &session.uploader);
}

pub fn on_files_dropped(state: &SharedState, uris: Vec<String>) {
    let uri = {
        let mut s = state.borrow_mut();
        let Some(session) = s.uploader.as_mut() else {
            return;
        };
        let uri = session.uploader.take_dropped(uris);
        uploader_ui::render_uploader(&session.widgets, &session.uploader);
        uri
    };
    match uri {
        Some(uri) => on_file_picked(state, &uri),
        None => log::debug!("Drop carried no files"),
    }
}

pub fn on_file_picked(state: &SharedState, uri: &str) {
    let probed = probe(uri);
    let mut s = state.borrow_mut();
    let Some(session) = s.uploader.as_mut() else {
        return;
    };
    match probed {
        Ok(candidate) => {
            if session.uploader.submit(candidate).is_ok() {
                uploader_ui::show_preview(&session.widgets, session.uploader.preview());
            }
        }
        Err(err) => {
            log::warn!("Cannot inspect {uri}: {err}");
            session.uploader.reject(err);
        }
    }
    uploader_ui::render_uploader(&session.widgets, &session.uploader);
}

pub fn remove_preview(state: &SharedState) {
    let mut s = state.borrow_mut();
    if let Some(session) = s.uploader.as_mut() {
        session.uploader.clear_preview();
        render(&session.widgets, &session.uploader);
    }
}

/// An accepted file becomes the newest story. The dialog closes afterwards.
pub fn on_story_uploaded(state: &SharedState, candidate: UploadCandidate) {
    {
        let mut s = state.borrow_mut();
        let story = story_from_candidate(&s, candidate);
        log::info!("New story {} ({:?})", story.id, story.kind);
        s.stories.prepend(story);
        refresh_story_row(&mut s);
    }
    close_uploader(state);
}

fn story_from_candidate(s: &AppState, candidate: UploadCandidate) -> Story {
    Story::from_upload(
        candidate.uri,
        &candidate.mime,
        s.config.author.clone(),
        s.config.story_duration(),
        Local::now(),
    )
}

fn render(widgets: &UploaderWidgets, uploader: &Uploader) {
    uploader_ui::show_preview(widgets, uploader.preview());
    uploader_ui::render_uploader(widgets, uploader);
}
