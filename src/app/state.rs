use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::Local;

use super::autoplay::AutoplayTimer;
use super::images::ImageCache;
use crate::carousel::{CarouselInput, CarouselSession};
use crate::config::Config;
use crate::story::{sample_stories, StoryList};
use crate::ui::shell::ShellWidgets;
use crate::ui::uploader::UploaderWidgets;
use crate::ui::viewer::ViewerWidgets;
use crate::uploader::{UploadCandidate, Uploader};

/// Events delivered to the GTK main thread. Widget callbacks, the autoplay
/// timer and background fetches only ever send these; all state changes
/// happen in `handle_ui_event`.
#[derive(Debug, Clone)]
pub enum UiEvent {
    OpenViewer(usize),
    Carousel(CarouselInput),
    AutoplayTick { generation: u64, elapsed: Duration },
    OpenUploader,
    CloseUploader,
    DragEnter,
    DragLeave,
    /// File URI chosen in the file dialog.
    UploadPicked(String),
    /// File URIs dropped on the upload target, in drop order.
    UploadDropped(Vec<String>),
    RemovePreview,
    StoryUploaded(UploadCandidate),
    ImageFetched {
        url: String,
        result: Result<Vec<u8>, String>,
    },
}

/// The open full-screen viewer.
pub struct ViewerSession {
    pub carousel: CarouselSession,
    pub timer: AutoplayTimer,
    pub widgets: ViewerWidgets,
}

/// The open "Add story" dialog.
pub struct UploaderSession {
    pub uploader: Uploader,
    pub widgets: UploaderWidgets,
}

/// Central application state. Lives on the GTK main thread inside Rc<RefCell<>>.
pub struct AppState {
    pub config: Config,
    pub stories: StoryList,
    pub images: ImageCache,
    pub tokio_rt: tokio::runtime::Runtime,
    pub http: reqwest::Client,
    pub ui_sender: async_channel::Sender<UiEvent>,

    // Overlays, present only while shown
    pub viewer: Option<ViewerSession>,
    pub uploader: Option<UploaderSession>,

    // UI handles
    pub shell: Option<ShellWidgets>,
}

impl AppState {
    pub fn new(config: Config, sender: async_channel::Sender<UiEvent>) -> Self {
        let tokio_rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

        Self {
            config,
            stories: StoryList::new(sample_stories(Local::now())),
            images: ImageCache::default(),
            tokio_rt,
            http: reqwest::Client::new(),
            ui_sender: sender,
            viewer: None,
            uploader: None,
            shell: None,
        }
    }
}

pub type SharedState = Rc<RefCell<AppState>>;
