use gtk4::prelude::*;
use gtk4::{gdk, gio, glib};
use libadwaita::prelude::*;

use crate::app::UiEvent;
use crate::story::MediaKind;
use crate::uploader::{Preview, Uploader};

const PAGE_EMPTY: &str = "empty";
const PAGE_IMAGE: &str = "image";
const PAGE_VIDEO: &str = "video";

/// Handles returned from building the "Add story" dialog.
pub struct UploaderWidgets {
    pub window: libadwaita::Window,
    pub drop_zone: gtk4::Overlay,
    pub content: gtk4::Stack,
    pub preview_picture: gtk4::Picture,
    pub preview_video: gtk4::Video,
    pub remove_button: gtk4::Button,
    pub error_label: gtk4::Label,
}

/// Build the modal upload dialog. `allowed_types` filters the file picker.
pub fn build_uploader(
    parent: &impl IsA<gtk4::Window>,
    allowed_types: &[String],
    sender: async_channel::Sender<UiEvent>,
) -> UploaderWidgets {
    let window = libadwaita::Window::builder()
        .title("Add New Story")
        .default_width(420)
        .default_height(560)
        .transient_for(parent)
        .modal(true)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();
    toolbar_view.add_top_bar(&header);

    // --- Empty state ---
    let placeholder = gtk4::Box::new(gtk4::Orientation::Vertical, 16);
    placeholder.set_valign(gtk4::Align::Center);

    let upload_icon = gtk4::Image::from_icon_name("document-send-symbolic");
    upload_icon.set_pixel_size(32);
    upload_icon.add_css_class("dim-label");
    placeholder.append(&upload_icon);

    let title = gtk4::Label::new(Some("Drag and drop your story here"));
    title.add_css_class("title-4");
    placeholder.append(&title);

    let browse_button = gtk4::Button::builder()
        .label("or browse files")
        .halign(gtk4::Align::Center)
        .build();
    browse_button.add_css_class("link");
    placeholder.append(&browse_button);

    let kinds = gtk4::Box::new(gtk4::Orientation::Horizontal, 16);
    kinds.set_halign(gtk4::Align::Center);
    for (icon, text) in [
        ("image-x-generic-symbolic", "Images"),
        ("video-x-generic-symbolic", "Videos"),
    ] {
        let item = gtk4::Box::new(gtk4::Orientation::Horizontal, 4);
        item.append(&gtk4::Image::from_icon_name(icon));
        item.append(&gtk4::Label::new(Some(text)));
        item.add_css_class("dim-label");
        kinds.append(&item);
    }
    placeholder.append(&kinds);

    // --- Preview ---
    let preview_picture = gtk4::Picture::new();
    preview_picture.set_content_fit(gtk4::ContentFit::Cover);
    preview_picture.set_can_shrink(true);
    let preview_video = gtk4::Video::new();

    let content = gtk4::Stack::new();
    content.set_transition_type(gtk4::StackTransitionType::Crossfade);
    content.add_named(&placeholder, Some(PAGE_EMPTY));
    content.add_named(&preview_picture, Some(PAGE_IMAGE));
    content.add_named(&preview_video, Some(PAGE_VIDEO));

    let remove_button = gtk4::Button::from_icon_name("window-close-symbolic");
    remove_button.set_tooltip_text(Some("Remove file"));
    remove_button.set_halign(gtk4::Align::End);
    remove_button.set_valign(gtk4::Align::Start);
    remove_button.set_margin_top(8);
    remove_button.set_margin_end(8);
    remove_button.add_css_class("osd");
    remove_button.add_css_class("circular");
    remove_button.set_visible(false);

    let error_label = gtk4::Label::new(None);
    error_label.add_css_class("upload-error");
    error_label.set_halign(gtk4::Align::Center);
    error_label.set_valign(gtk4::Align::End);
    error_label.set_margin_bottom(8);
    error_label.set_wrap(true);
    error_label.set_visible(false);

    let drop_zone = gtk4::Overlay::new();
    drop_zone.add_css_class("drop-zone");
    drop_zone.set_child(Some(&content));
    drop_zone.add_overlay(&remove_button);
    drop_zone.add_overlay(&error_label);
    drop_zone.set_vexpand(true);
    drop_zone.set_margin_start(16);
    drop_zone.set_margin_end(16);
    drop_zone.set_margin_top(12);
    drop_zone.set_margin_bottom(16);

    toolbar_view.set_content(Some(&drop_zone));
    window.set_content(Some(&toolbar_view));

    // --- Drag and drop ---
    let drop_target = gtk4::DropTarget::new(gdk::FileList::static_type(), gdk::DragAction::COPY);
    let sender_for_enter = sender.clone();
    drop_target.connect_enter(move |_, _, _| {
        let _ = sender_for_enter.try_send(UiEvent::DragEnter);
        gdk::DragAction::COPY
    });
    let sender_for_motion = sender.clone();
    drop_target.connect_motion(move |_, _, _| {
        let _ = sender_for_motion.try_send(UiEvent::DragEnter);
        gdk::DragAction::COPY
    });
    let sender_for_leave = sender.clone();
    drop_target.connect_leave(move |_| {
        let _ = sender_for_leave.try_send(UiEvent::DragLeave);
    });
    let sender_for_drop = sender.clone();
    drop_target.connect_drop(move |_, value, _, _| {
        let Ok(files) = value.get::<gdk::FileList>() else {
            return false;
        };
        let uris = files.files().iter().map(|f| f.uri().to_string()).collect();
        let _ = sender_for_drop.try_send(UiEvent::UploadDropped(uris));
        true
    });
    drop_zone.add_controller(drop_target);

    // --- Manual selection ---
    let filter = gtk4::FileFilter::new();
    filter.set_name(Some("Images and videos"));
    for mime in allowed_types {
        filter.add_mime_type(mime);
    }
    let filters = gio::ListStore::new::<gtk4::FileFilter>();
    filters.append(&filter);

    let window_for_browse = window.clone();
    let sender_for_browse = sender.clone();
    browse_button.connect_clicked(move |_| {
        let dialog = gtk4::FileDialog::builder()
            .title("Choose a photo or video")
            .modal(true)
            .filters(&filters)
            .default_filter(&filter)
            .build();
        let sender = sender_for_browse.clone();
        dialog.open(
            Some(&window_for_browse),
            None::<&gio::Cancellable>,
            move |result| match result {
                Ok(file) => {
                    let _ = sender.try_send(UiEvent::UploadPicked(file.uri().to_string()));
                }
                Err(e) => log::debug!("File dialog dismissed: {e}"),
            },
        );
    });

    let sender_for_remove = sender.clone();
    remove_button.connect_clicked(move |_| {
        let _ = sender_for_remove.try_send(UiEvent::RemovePreview);
    });

    window.connect_close_request(move |_| {
        let _ = sender.try_send(UiEvent::CloseUploader);
        glib::Propagation::Stop
    });

    UploaderWidgets {
        window,
        drop_zone,
        content,
        preview_picture,
        preview_video,
        remove_button,
        error_label,
    }
}

/// Sync drag highlight and the error message with the uploader state.
pub fn render_uploader(widgets: &UploaderWidgets, uploader: &Uploader) {
    if uploader.is_dragging() {
        widgets.drop_zone.add_css_class("dragging");
    } else {
        widgets.drop_zone.remove_css_class("dragging");
    }

    match uploader.error() {
        Some(err) => {
            widgets.error_label.set_text(&err.to_string());
            widgets.error_label.set_visible(true);
        }
        None => widgets.error_label.set_visible(false),
    }
}

/// Show the accepted file: a decoded texture for images, a playing stream
/// for videos. `None` returns to the empty drop target.
pub fn show_preview(widgets: &UploaderWidgets, preview: Option<&Preview>) {
    stop_preview_video(widgets);
    widgets
        .preview_picture
        .set_paintable(None::<&gdk::Paintable>);

    let Some(preview) = preview else {
        widgets.content.set_visible_child_name(PAGE_EMPTY);
        widgets.remove_button.set_visible(false);
        return;
    };

    let file = gio::File::for_uri(&preview.uri);
    match preview.kind {
        MediaKind::Image => match gdk::Texture::from_file(&file) {
            Ok(texture) => {
                widgets.preview_picture.set_paintable(Some(&texture));
                widgets.content.set_visible_child_name(PAGE_IMAGE);
            }
            Err(e) => {
                log::warn!("Failed to decode preview {}: {e}", preview.uri);
                widgets.content.set_visible_child_name(PAGE_EMPTY);
            }
        },
        MediaKind::Video => {
            let stream = gtk4::MediaFile::for_file(&file);
            stream.set_muted(true);
            stream.set_loop(true);
            stream.play();
            widgets.preview_video.set_media_stream(Some(&stream));
            widgets.content.set_visible_child_name(PAGE_VIDEO);
        }
    }
    widgets.remove_button.set_visible(true);
}

fn stop_preview_video(widgets: &UploaderWidgets) {
    if let Some(stream) = widgets.preview_video.media_stream() {
        stream.pause();
    }
    widgets
        .preview_video
        .set_media_stream(None::<&gtk4::MediaStream>);
}

pub fn destroy_uploader(widgets: &UploaderWidgets) {
    stop_preview_video(widgets);
    widgets.window.destroy();
}
