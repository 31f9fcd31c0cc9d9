use gtk4::gdk;

const CSS: &str = r#"
.story-ring {
    background-image: linear-gradient(45deg, #facc15, #ef4444, #a855f7);
    border-radius: 9999px;
    padding: 3px;
}
.story-ring > avatar {
    border: 2px solid @window_bg_color;
    border-radius: 9999px;
}
.add-story-ring {
    background-color: alpha(@window_fg_color, 0.08);
    border-radius: 9999px;
    min-width: 80px;
    min-height: 80px;
}
.add-story-ring image {
    color: #3b82f6;
}
.story-name {
    font-size: 12px;
}

window.story-viewer {
    background-color: black;
}
.story-bar trough {
    min-height: 2px;
    background-color: rgba(255, 255, 255, 0.35);
}
.story-bar progress {
    min-height: 2px;
    background-color: white;
}
.story-author {
    color: white;
    font-weight: bold;
}
.story-age {
    color: rgba(255, 255, 255, 0.7);
    font-size: 13px;
}
.story-control {
    color: white;
    background-color: rgba(0, 0, 0, 0.2);
    border-radius: 9999px;
    min-width: 36px;
    min-height: 36px;
}
.story-control:hover {
    background-color: rgba(0, 0, 0, 0.3);
}

.drop-zone {
    border: 2px dashed alpha(@window_fg_color, 0.25);
    border-radius: 8px;
    padding: 32px;
}
.drop-zone.dragging {
    border-color: #3b82f6;
    background-color: alpha(#3b82f6, 0.08);
}
.upload-error {
    color: #ef4444;
    background-color: @window_bg_color;
    border-radius: 9999px;
    padding: 6px 14px;
}
"#;

/// Register the application stylesheet for the default display.
pub fn install() {
    let Some(display) = gdk::Display::default() else {
        log::warn!("No default display, skipping stylesheet");
        return;
    };
    let css_provider = gtk4::CssProvider::new();
    css_provider.load_from_string(CSS);
    gtk4::style_context_add_provider_for_display(
        &display,
        &css_provider,
        gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
