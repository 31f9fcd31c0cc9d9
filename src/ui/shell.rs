use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::app::UiEvent;
use crate::story::StoryList;

const AVATAR_SIZE: i32 = 74;

/// Handles returned from building the main window.
pub struct ShellWidgets {
    pub window: libadwaita::ApplicationWindow,
    pub story_row: gtk4::Box,
}

/// An avatar in the story row that still needs its image.
pub struct AvatarSlot {
    pub url: String,
    pub avatar: libadwaita::Avatar,
}

/// Build the main window with an empty story row.
pub fn build_shell(app: &libadwaita::Application) -> ShellWidgets {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("Stories")
        .default_width(640)
        .default_height(220)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();
    toolbar_view.add_top_bar(&header);

    let story_row = gtk4::Box::new(gtk4::Orientation::Horizontal, 16);
    story_row.set_margin_start(16);
    story_row.set_margin_end(16);
    story_row.set_margin_top(24);
    story_row.set_margin_bottom(16);

    let scrolled = gtk4::ScrolledWindow::builder()
        .vscrollbar_policy(gtk4::PolicyType::Never)
        .hscrollbar_policy(gtk4::PolicyType::Automatic)
        .child(&story_row)
        .build();
    toolbar_view.set_content(Some(&scrolled));
    window.set_content(Some(&toolbar_view));

    ShellWidgets { window, story_row }
}

/// Replace the row contents with the "Add story" circle followed by one
/// circle per story. Returns the avatars whose images still have to be loaded.
pub fn populate_story_row(
    shell: &ShellWidgets,
    stories: &StoryList,
    sender: &async_channel::Sender<UiEvent>,
) -> Vec<AvatarSlot> {
    while let Some(child) = shell.story_row.first_child() {
        shell.story_row.remove(&child);
    }

    shell.story_row.append(&build_add_circle(sender.clone()));

    let mut slots = Vec::with_capacity(stories.len());
    for (index, story) in stories.iter().enumerate() {
        let avatar = libadwaita::Avatar::new(AVATAR_SIZE, Some(&story.author.name), true);
        let ring = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
        ring.add_css_class("story-ring");
        ring.set_halign(gtk4::Align::Center);
        ring.append(&avatar);

        let name = gtk4::Label::new(Some(&story.author.name));
        name.add_css_class("story-name");
        name.set_ellipsize(gtk4::pango::EllipsizeMode::End);
        name.set_max_width_chars(10);

        let column = gtk4::Box::new(gtk4::Orientation::Vertical, 4);
        column.append(&ring);
        column.append(&name);

        let button = gtk4::Button::builder()
            .child(&column)
            .tooltip_text(format!("View {}'s story", story.author.name))
            .build();
        button.add_css_class("flat");
        let sender = sender.clone();
        button.connect_clicked(move |_| {
            let _ = sender.try_send(UiEvent::OpenViewer(index));
        });
        shell.story_row.append(&button);

        slots.push(AvatarSlot {
            url: story.author.avatar.clone(),
            avatar,
        });
    }
    slots
}

fn build_add_circle(sender: async_channel::Sender<UiEvent>) -> gtk4::Button {
    let plus = gtk4::Image::from_icon_name("list-add-symbolic");
    plus.set_pixel_size(24);

    let ring = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    ring.add_css_class("add-story-ring");
    ring.set_halign(gtk4::Align::Center);
    ring.set_valign(gtk4::Align::Center);
    plus.set_vexpand(true);
    ring.append(&plus);

    let label = gtk4::Label::new(Some("Add story"));
    label.add_css_class("story-name");

    let column = gtk4::Box::new(gtk4::Orientation::Vertical, 4);
    column.append(&ring);
    column.append(&label);

    let button = gtk4::Button::builder().child(&column).build();
    button.add_css_class("flat");
    button.connect_clicked(move |_| {
        let _ = sender.try_send(UiEvent::OpenUploader);
    });
    button
}
