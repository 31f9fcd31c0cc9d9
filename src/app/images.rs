use std::collections::HashMap;

use gtk4::prelude::*;
use gtk4::{gdk, gio, glib};

use super::state::{AppState, UiEvent};
use crate::media::{self, MediaSource};

/// A widget waiting for an image.
#[derive(Clone)]
pub enum ImageTarget {
    Picture(glib::WeakRef<gtk4::Picture>),
    Avatar(glib::WeakRef<libadwaita::Avatar>),
}

impl ImageTarget {
    pub fn picture(picture: &gtk4::Picture) -> Self {
        ImageTarget::Picture(picture.downgrade())
    }

    pub fn avatar(avatar: &libadwaita::Avatar) -> Self {
        ImageTarget::Avatar(avatar.downgrade())
    }

    fn widget(&self) -> Option<gtk4::Widget> {
        match self {
            ImageTarget::Picture(weak) => weak.upgrade().map(|w| w.upcast()),
            ImageTarget::Avatar(weak) => weak.upgrade().map(|w| w.upcast()),
        }
    }

    fn is_same(&self, other: &ImageTarget) -> bool {
        match (self.widget(), other.widget()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn apply(&self, texture: &gdk::Texture) {
        match self {
            ImageTarget::Picture(weak) => {
                if let Some(picture) = weak.upgrade() {
                    picture.set_paintable(Some(texture));
                }
            }
            ImageTarget::Avatar(weak) => {
                if let Some(avatar) = weak.upgrade() {
                    avatar.set_custom_image(Some(texture));
                }
            }
        }
    }

    fn clear(&self) {
        match self {
            ImageTarget::Picture(weak) => {
                if let Some(picture) = weak.upgrade() {
                    picture.set_paintable(None::<&gdk::Paintable>);
                }
            }
            ImageTarget::Avatar(weak) => {
                if let Some(avatar) = weak.upgrade() {
                    avatar.set_custom_image(None::<&gdk::Paintable>);
                }
            }
        }
    }
}

/// Decoded images by URL, plus widgets waiting on in-flight fetches.
#[derive(Default)]
pub struct ImageCache {
    textures: HashMap<String, gdk::Texture>,
    waiting: HashMap<String, Vec<ImageTarget>>,
}

impl ImageCache {
    /// Drop any pending request for this widget so a slow fetch cannot
    /// overwrite a newer image.
    fn forget(&mut self, target: &ImageTarget) {
        for targets in self.waiting.values_mut() {
            targets.retain(|t| !t.is_same(target) && t.widget().is_some());
        }
    }
}

/// Show the image at `url` in `target`, fetching it in the background if needed.
pub fn request_image(state: &mut AppState, url: &str, target: ImageTarget) {
    state.images.forget(&target);
    target.clear();

    if let Some(texture) = state.images.textures.get(url) {
        target.apply(texture);
        return;
    }

    match MediaSource::classify(url) {
        MediaSource::Local(uri) => match gdk::Texture::from_file(&gio::File::for_uri(uri)) {
            Ok(texture) => {
                target.apply(&texture);
                state.images.textures.insert(url.to_string(), texture);
            }
            Err(e) => log::warn!("Failed to load image {uri}: {e}"),
        },
        MediaSource::Remote(remote) => {
            let in_flight = state.images.waiting.contains_key(url);
            state
                .images
                .waiting
                .entry(url.to_string())
                .or_default()
                .push(target);
            if in_flight {
                return;
            }

            let client = state.http.clone();
            let sender = state.ui_sender.clone();
            let limit = state.config.remote_fetch_limit();
            let url = remote.to_string();
            state.tokio_rt.spawn(async move {
                let result = media::fetch_bytes(&client, &url, limit)
                    .await
                    .map_err(|e| e.to_string());
                let _ = sender.send(UiEvent::ImageFetched { url, result }).await;
            });
        }
    }
}

/// Decode a finished fetch and hand it to everyone still waiting.
pub fn on_image_fetched(state: &mut AppState, url: String, result: Result<Vec<u8>, String>) {
    let waiters = state.images.waiting.remove(&url).unwrap_or_default();
    let bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Failed to fetch image {url}: {e}");
            return;
        }
    };

    match gdk::Texture::from_bytes(&glib::Bytes::from_owned(bytes)) {
        Ok(texture) => {
            for target in &waiters {
                target.apply(&texture);
            }
            state.images.textures.insert(url, texture);
        }
        Err(e) => log::warn!("Failed to decode image {url}: {e}"),
    }
}
