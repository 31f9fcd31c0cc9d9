mod app;
mod carousel;
mod config;
mod media;
mod story;
mod ui;
mod uploader;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use app::{AppState, UiEvent};
use config::Config;

fn main() {
    env_logger::init();
    log::info!("Story Reel starting");

    let application = libadwaita::Application::builder()
        .application_id("io.github.storyreel.StoryReel")
        .build();

    application.connect_activate(on_activate);
    application.run();
}

fn on_activate(app: &libadwaita::Application) {
    if let Some(window) = app.active_window() {
        window.present();
        return;
    }

    let config = if Config::path().exists() {
        Config::load()
    } else {
        let config = Config::default();
        if let Err(e) = config.save() {
            log::warn!("Failed to write default config: {e}");
        }
        config
    };

    ui::style::install();

    // All widget callbacks, timers and fetches report back through this channel
    let (ui_tx, ui_rx) = async_channel::unbounded::<UiEvent>();
    let state = Rc::new(RefCell::new(AppState::new(config, ui_tx)));

    let shell = ui::shell::build_shell(app);
    let window = shell.window.clone();
    {
        let mut s = state.borrow_mut();
        s.shell = Some(shell);
        app::refresh_story_row(&mut s);
    }
    window.present();

    {
        let state_clone = state.clone();
        gtk4::glib::spawn_future_local(async move {
            while let Ok(event) = ui_rx.recv().await {
                app::handle_ui_event(&state_clone, event);
            }
        });
    }
}
