use chrono::{DateTime, Local};
use gtk4::prelude::*;
use gtk4::{self, gdk, gio, glib, Align};

use crate::app::UiEvent;
use crate::carousel::{CarouselInput, CarouselSession, SwipeDirection, FULL};
use crate::media::MediaSource;
use crate::story::{MediaKind, Story};

const CONTENT_WIDTH: i32 = 420;
const CONTENT_HEIGHT: i32 = 760;
const PAGE_IMAGE: &str = "image";
const PAGE_VIDEO: &str = "video";

/// Handles returned from building the full-screen viewer.
pub struct ViewerWidgets {
    pub window: gtk4::Window,
    pub bars: Vec<gtk4::ProgressBar>,
    pub avatar: libadwaita::Avatar,
    pub author_label: gtk4::Label,
    pub age_label: gtk4::Label,
    pub media: gtk4::Stack,
    pub picture: gtk4::Picture,
    pub video: gtk4::Video,
    pub previous_button: gtk4::Button,
    pub next_button: gtk4::Button,
    pub pause_button: gtk4::Button,
}

/// Keyboard shortcuts of the viewer.
pub fn input_for_key(key: gdk::Key) -> Option<CarouselInput> {
    match key {
        gdk::Key::Left => Some(CarouselInput::Previous),
        gdk::Key::Right => Some(CarouselInput::Next),
        gdk::Key::Escape => Some(CarouselInput::Close),
        gdk::Key::space => Some(CarouselInput::TogglePause),
        _ => None,
    }
}

fn control_button(icon: &str, tooltip: &str, halign: Align, valign: Align) -> gtk4::Button {
    let button = gtk4::Button::from_icon_name(icon);
    button.set_tooltip_text(Some(tooltip));
    button.set_halign(halign);
    button.set_valign(valign);
    button.set_margin_start(16);
    button.set_margin_end(16);
    button.set_margin_bottom(16);
    style_control(&button);
    button
}

/// Overlay controls never hold keyboard focus, so Space and the arrow keys
/// always reach the viewer's key controller.
fn style_control(button: &gtk4::Button) {
    button.set_focus_on_click(false);
    button.set_can_focus(false);
    button.add_css_class("story-control");
    button.add_css_class("flat");
}

/// Key controller that sees keys before any child widget does.
fn key_controller(sender: async_channel::Sender<UiEvent>) -> gtk4::EventControllerKey {
    let keys = gtk4::EventControllerKey::new();
    keys.set_propagation_phase(gtk4::PropagationPhase::Capture);
    keys.connect_key_pressed(move |_, key, _, _| match input_for_key(key) {
        Some(input) => {
            let _ = sender.try_send(UiEvent::Carousel(input));
            glib::Propagation::Stop
        }
        None => glib::Propagation::Proceed,
    });
    keys
}

fn send_on_click(
    button: &gtk4::Button,
    sender: &async_channel::Sender<UiEvent>,
    input: CarouselInput,
) {
    let sender = sender.clone();
    button.connect_clicked(move |_| {
        let _ = sender.try_send(UiEvent::Carousel(input));
    });
}

/// Build the viewer window with one progress bar per story.
pub fn build_viewer(
    parent: &impl IsA<gtk4::Window>,
    story_count: usize,
    sender: async_channel::Sender<UiEvent>,
) -> ViewerWidgets {
    let window = gtk4::Window::builder()
        .transient_for(parent)
        .modal(true)
        .decorated(false)
        .fullscreened(true)
        .title("Stories")
        .default_width(CONTENT_WIDTH)
        .default_height(CONTENT_HEIGHT)
        .build();
    window.add_css_class("story-viewer");

    let content = gtk4::Overlay::new();
    content.set_size_request(CONTENT_WIDTH, -1);
    content.set_halign(Align::Center);
    content.set_vexpand(true);

    // --- Media ---
    let picture = gtk4::Picture::new();
    picture.set_content_fit(gtk4::ContentFit::Cover);
    picture.set_can_shrink(true);

    let video = gtk4::Video::new();

    let media = gtk4::Stack::new();
    media.set_transition_type(gtk4::StackTransitionType::Crossfade);
    media.set_transition_duration(200);
    media.add_named(&picture, Some(PAGE_IMAGE));
    media.add_named(&video, Some(PAGE_VIDEO));
    content.set_child(Some(&media));

    // --- Progress bars and author header ---
    let top = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    top.set_valign(Align::Start);
    top.set_margin_start(16);
    top.set_margin_end(16);
    top.set_margin_top(16);

    let bar_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 4);
    bar_box.set_homogeneous(true);
    let bars: Vec<gtk4::ProgressBar> = (0..story_count)
        .map(|_| {
            let bar = gtk4::ProgressBar::new();
            bar.set_hexpand(true);
            bar.add_css_class("story-bar");
            bar_box.append(&bar);
            bar
        })
        .collect();
    top.append(&bar_box);

    let header = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);
    let avatar = libadwaita::Avatar::new(32, None, true);
    let names = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    let author_label = gtk4::Label::new(None);
    author_label.add_css_class("story-author");
    author_label.set_xalign(0.0);
    let age_label = gtk4::Label::new(None);
    age_label.add_css_class("story-age");
    age_label.set_xalign(0.0);
    names.append(&author_label);
    names.append(&age_label);
    names.set_hexpand(true);

    let close_button = gtk4::Button::from_icon_name("window-close-symbolic");
    close_button.set_tooltip_text(Some("Close stories"));
    style_control(&close_button);
    send_on_click(&close_button, &sender, CarouselInput::Close);

    header.append(&avatar);
    header.append(&names);
    header.append(&close_button);
    top.append(&header);
    content.add_overlay(&top);

    // --- Navigation ---
    let previous_button =
        control_button("go-previous-symbolic", "Previous story", Align::Start, Align::Center);
    send_on_click(&previous_button, &sender, CarouselInput::Previous);
    content.add_overlay(&previous_button);

    let next_button = control_button("go-next-symbolic", "Next story", Align::End, Align::Center);
    send_on_click(&next_button, &sender, CarouselInput::Next);
    content.add_overlay(&next_button);

    let pause_button =
        control_button("media-playback-pause-symbolic", "Pause", Align::End, Align::End);
    send_on_click(&pause_button, &sender, CarouselInput::TogglePause);
    content.add_overlay(&pause_button);

    window.set_child(Some(&content));

    // Hold to pause
    let press = gtk4::GestureClick::new();
    press.set_button(0);
    let sender_for_press = sender.clone();
    press.connect_pressed(move |_, _, _, _| {
        let _ = sender_for_press.try_send(UiEvent::Carousel(CarouselInput::Press));
    });
    let sender_for_release = sender.clone();
    press.connect_released(move |_, _, _, _| {
        let _ = sender_for_release.try_send(UiEvent::Carousel(CarouselInput::Release));
    });
    // A press that turns into a drag never sees `released`.
    let sender_for_stop = sender.clone();
    press.connect_stopped(move |_| {
        let _ = sender_for_stop.try_send(UiEvent::Carousel(CarouselInput::Release));
    });
    media.add_controller(press);

    let swipe = gtk4::GestureSwipe::new();
    swipe.set_touch_only(false);
    let sender_for_swipe = sender.clone();
    swipe.connect_swipe(move |_, velocity_x, velocity_y| {
        if let Some(direction) = SwipeDirection::from_velocity(velocity_x, velocity_y) {
            let input = CarouselInput::Swipe(direction);
            let _ = sender_for_swipe.try_send(UiEvent::Carousel(input));
        }
    });
    content.add_controller(swipe);

    window.add_controller(key_controller(sender.clone()));

    window.connect_close_request(move |_| {
        let _ = sender.try_send(UiEvent::Carousel(CarouselInput::Close));
        glib::Propagation::Stop
    });

    ViewerWidgets {
        window,
        bars,
        avatar,
        author_label,
        age_label,
        media,
        picture,
        video,
        previous_button,
        next_button,
        pause_button,
    }
}

/// Switch header and media to `story`. Images are filled in by the caller
/// once their texture is available.
pub fn show_story(viewer: &ViewerWidgets, story: &Story, now: DateTime<Local>) {
    viewer.author_label.set_text(&story.author.name);
    viewer.avatar.set_text(Some(&story.author.name));
    viewer.age_label.set_text(&story.age_label(now));

    stop_video(viewer);
    match story.kind {
        MediaKind::Image => {
            viewer.media.set_visible_child_name(PAGE_IMAGE);
        }
        MediaKind::Video => {
            let file = match MediaSource::classify(&story.url) {
                MediaSource::Remote(url) => {
                    // GIO streams http(s) only when gvfs is installed
                    log::warn!("Playing remote video {url} through GIO, this needs gvfs");
                    gio::File::for_uri(url)
                }
                MediaSource::Local(uri) => gio::File::for_uri(uri),
            };
            let stream = gtk4::MediaFile::for_file(&file);
            stream.set_muted(true);
            stream.set_loop(true);
            stream.play();
            viewer.video.set_media_stream(Some(&stream));
            viewer.media.set_visible_child_name(PAGE_VIDEO);
        }
    }
}

pub fn render_navigation(viewer: &ViewerWidgets, session: &CarouselSession) {
    viewer.previous_button.set_visible(session.has_previous());
    viewer.next_button.set_visible(session.has_next());
}

pub fn render_progress(viewer: &ViewerWidgets, session: &CarouselSession) {
    for (bar, fill) in viewer.bars.iter().zip(session.bar_fills()) {
        bar.set_fraction(fill / FULL);
    }
}

pub fn render_paused(viewer: &ViewerWidgets, paused: bool) {
    let (icon, tooltip) = if paused {
        ("media-playback-start-symbolic", "Play")
    } else {
        ("media-playback-pause-symbolic", "Pause")
    };
    viewer.pause_button.set_icon_name(icon);
    viewer.pause_button.set_tooltip_text(Some(tooltip));
}

/// Everything the viewer shows for the session's current position.
pub fn render_all(viewer: &ViewerWidgets, session: &CarouselSession) {
    show_story(viewer, session.current(), Local::now());
    render_navigation(viewer, session);
    render_progress(viewer, session);
    render_paused(viewer, session.is_paused());
}

fn stop_video(viewer: &ViewerWidgets) {
    if let Some(stream) = viewer.video.media_stream() {
        stream.pause();
    }
    viewer.video.set_media_stream(None::<&gtk4::MediaStream>);
}

/// Tear the viewer down for good.
pub fn destroy_viewer(viewer: &ViewerWidgets) {
    stop_video(viewer);
    viewer.window.destroy();
}
