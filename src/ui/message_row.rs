use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use crate::chat::{Message, Origin};

/// Build one chat row: user bubbles on the right, assistant bubbles on
/// the left with a name header and, for spoken replies, an inline
/// playback control.
pub fn build_message_row(message: &Message) -> gtk4::ListBoxRow {
    let bubble = gtk4::Box::new(gtk4::Orientation::Vertical, 6);
    bubble.add_css_class("bubble");

    match message.origin {
        Origin::User => bubble.add_css_class("user"),
        Origin::Assistant => {
            bubble.add_css_class("assistant");
            bubble.append(&assistant_header());
        }
    }

    let text = gtk4::Label::new(Some(&message.text));
    text.set_wrap(true);
    text.set_xalign(0.0);
    text.set_selectable(true);
    text.set_max_width_chars(42);
    bubble.append(&text);

    if let Some(ref url) = message.audio_url {
        bubble.append(&play_button(url));
    }

    let align = gtk4::Box::new(gtk4::Orientation::Horizontal, 0);
    align.set_hexpand(true);
    match message.origin {
        Origin::User => align.set_halign(gtk4::Align::End),
        Origin::Assistant => align.set_halign(gtk4::Align::Start),
    }
    align.append(&bubble);

    let row = gtk4::ListBoxRow::new();
    row.set_activatable(false);
    row.set_child(Some(&align));
    row.set_tooltip_text(Some(&message.at));
    row
}

fn assistant_header() -> gtk4::Box {
    let header = gtk4::Box::new(gtk4::Orientation::Horizontal, 6);
    let icon = gtk4::Image::from_icon_name("avatar-default-symbolic");
    let name = gtk4::Label::new(Some("Voice Assistant"));
    name.add_css_class("assistant-name");
    header.append(&icon);
    header.append(&name);
    header
}

/// Inline playback for a spoken reply. The media handle is kept alive
/// across clicks so playback isn't cut off when the closure returns.
fn play_button(url: &str) -> gtk4::Button {
    let button = gtk4::Button::from_icon_name("media-playback-start-symbolic");
    button.set_halign(gtk4::Align::Start);
    button.add_css_class("flat");
    button.set_tooltip_text(Some("Play reply"));

    let url = url.to_string();
    let player: Rc<RefCell<Option<gtk4::MediaFile>>> = Rc::new(RefCell::new(None));
    button.connect_clicked(move |_| {
        let file = gtk4::gio::File::for_uri(&url);
        let media = gtk4::MediaFile::for_file(&file);
        media.play();
        *player.borrow_mut() = Some(media);
    });

    button
}
