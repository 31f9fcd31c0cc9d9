use std::time::Duration;

use gtk4::prelude::*;

use super::autoplay::AutoplayTimer;
use super::images::{request_image, ImageTarget};
use super::state::{AppState, SharedState, ViewerSession};
use crate::carousel::{CarouselInput, CarouselSession, Step};
use crate::story::MediaKind;
use crate::ui::viewer::{self as viewer_ui, ViewerWidgets};

/// Open the full-screen viewer on the story at `index` of the current list.
pub fn open_viewer(state: &SharedState, index: usize) {
    let mut s = state.borrow_mut();
    if s.viewer.is_some() {
        log::debug!("Viewer already open, ignoring request for story {index}");
        return;
    }

    let carousel = match CarouselSession::open(s.stories.snapshot(), index) {
        Ok(carousel) => carousel,
        Err(e) => {
            log::warn!("Cannot open viewer: {e}");
            return;
        }
    };
    let Some(parent) = s.shell.as_ref().map(|shell| shell.window.clone()) else {
        return;
    };

    let sender = s.ui_sender.clone();
    let widgets = viewer_ui::build_viewer(&parent, carousel.stories().len(), sender.clone());
    viewer_ui::render_all(&widgets, &carousel);
    load_story_images(&mut s, &widgets, &carousel);

    let mut timer = AutoplayTimer::new();
    timer.start(s.config.tick_interval(), sender);

    log::info!(
        "Viewing story {} by {}",
        carousel.current().id,
        carousel.current().author.name
    );
    widgets.window.present();
    s.viewer = Some(ViewerSession {
        carousel,
        timer,
        widgets,
    });
}

/// Feed a user input to the open carousel.
pub fn on_carousel_input(state: &SharedState, input: CarouselInput) {
    let step = {
        let mut s = state.borrow_mut();
        let Some(viewer) = s.viewer.as_mut() else {
            return;
        };
        viewer.carousel.handle(input)
    };
    log::debug!("{input:?} -> {step:?}");
    apply_step(state, step);
}

/// One autoplay tick. Ticks from a timer run that has since been restarted
/// or stopped are dropped.
pub fn on_autoplay_tick(state: &SharedState, generation: u64, elapsed: Duration) {
    let step = {
        let mut s = state.borrow_mut();
        let Some(viewer) = s.viewer.as_mut() else {
            return;
        };
        if !viewer.timer.accepts(generation) {
            return;
        }
        viewer.carousel.tick(elapsed)
    };
    apply_step(state, step);
}

/// Bring timer and widgets in line with what the carousel just did.
fn apply_step(state: &SharedState, step: Step) {
    let mut s = state.borrow_mut();
    let sender = s.ui_sender.clone();
    let interval = s.config.tick_interval();

    match step {
        Step::Unchanged => {}
        Step::Progressed => {
            if let Some(viewer) = s.viewer.as_ref() {
                viewer_ui::render_progress(&viewer.widgets, &viewer.carousel);
            }
        }
        Step::Switched => {
            let Some(mut viewer) = s.viewer.take() else {
                return;
            };
            viewer_ui::render_all(&viewer.widgets, &viewer.carousel);
            load_story_images(&mut s, &viewer.widgets, &viewer.carousel);
            viewer.timer.follow(&viewer.carousel, interval, sender);
            log::info!(
                "Viewing story {} by {}",
                viewer.carousel.current().id,
                viewer.carousel.current().author.name
            );
            s.viewer = Some(viewer);
        }
        Step::Paused => {
            if let Some(viewer) = s.viewer.as_mut() {
                viewer.timer.stop();
                viewer_ui::render_paused(&viewer.widgets, true);
            }
        }
        Step::Resumed => {
            if let Some(viewer) = s.viewer.as_mut() {
                viewer.timer.start(interval, sender);
                viewer_ui::render_paused(&viewer.widgets, false);
            }
        }
        Step::Closed => {
            if let Some(mut viewer) = s.viewer.take() {
                viewer.timer.stop();
                viewer_ui::destroy_viewer(&viewer.widgets);
                log::info!("Viewer closed");
            }
        }
    }
}

fn load_story_images(
    s: &mut AppState,
    widgets: &ViewerWidgets,
    carousel: &CarouselSession,
) {
    let story = carousel.current();
    request_image(s, &story.author.avatar, ImageTarget::avatar(&widgets.avatar));
    if story.kind == MediaKind::Image {
        request_image(s, &story.url, ImageTarget::picture(&widgets.picture));
    }
}
