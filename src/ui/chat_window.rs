use gtk4::glib;
use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::app::{BackendEvent, ChatStatus};
use crate::chat::Message;

const MIC_IDLE_ICON: &str = "audio-input-microphone-symbolic";
const MIC_RECORDING_ICON: &str = "microphone-sensitivity-muted-symbolic";

/// Handles returned from building the chat window.
pub struct ChatWindowWidgets {
    pub window: libadwaita::ApplicationWindow,
    pub message_list: gtk4::ListBox,
    pub scrolled: gtk4::ScrolledWindow,
    pub mic_button: gtk4::Button,
    pub mic_icon: gtk4::Image,
}

/// Build the main chat window: header bar, scrolling message list and
/// the mic toggle pinned to the bottom.
pub fn build_chat_window(
    app: &libadwaita::Application,
    backend_sender: async_channel::Sender<BackendEvent>,
) -> ChatWindowWidgets {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("Voice Chatbot")
        .default_width(480)
        .default_height(640)
        .build();

    load_css();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();
    toolbar_view.add_top_bar(&header);

    let message_list = gtk4::ListBox::new();
    message_list.set_selection_mode(gtk4::SelectionMode::None);
    message_list.add_css_class("chat-list");
    message_list.set_margin_start(12);
    message_list.set_margin_end(12);
    message_list.set_margin_top(12);
    message_list.set_margin_bottom(12);
    message_list.set_valign(gtk4::Align::Start);

    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .vexpand(true)
        .child(&message_list)
        .build();

    // Single toggle control; icon and style track the controller state.
    let mic_icon = gtk4::Image::from_icon_name(MIC_IDLE_ICON);
    mic_icon.set_pixel_size(24);

    let mic_button = gtk4::Button::new();
    mic_button.set_child(Some(&mic_icon));
    mic_button.add_css_class("mic-button");
    mic_button.add_css_class("circular");
    mic_button.add_css_class("suggested-action");

    let sender_for_click = backend_sender;
    mic_button.connect_clicked(move |_| {
        let _ = sender_for_click.try_send(BackendEvent::MicToggled);
    });

    let mic_bar = gtk4::Box::new(gtk4::Orientation::Horizontal, 0);
    mic_bar.add_css_class("mic-bar");
    mic_bar.set_halign(gtk4::Align::Center);
    mic_bar.set_margin_top(10);
    mic_bar.set_margin_bottom(14);
    mic_bar.append(&mic_button);

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    content.append(&scrolled);
    content.append(&gtk4::Separator::new(gtk4::Orientation::Horizontal));
    content.append(&mic_bar);

    toolbar_view.set_content(Some(&content));
    window.set_content(Some(&toolbar_view));

    ChatWindowWidgets {
        window,
        message_list,
        scrolled,
        mic_button,
        mic_icon,
    }
}

/// Append a message row and scroll it into view.
pub fn append_row(widgets: &ChatWindowWidgets, message: &Message) {
    let row = super::message_row::build_message_row(message);
    widgets.message_list.append(&row);
    scroll_to_bottom(&widgets.scrolled);
}

/// Flip the mic button between the idle and recording looks.
pub fn set_mic_state(widgets: &ChatWindowWidgets, status: ChatStatus) {
    match status {
        ChatStatus::Idle => {
            widgets.mic_icon.set_icon_name(Some(MIC_IDLE_ICON));
            widgets.mic_button.remove_css_class("recording");
        }
        ChatStatus::Recording => {
            widgets.mic_icon.set_icon_name(Some(MIC_RECORDING_ICON));
            widgets.mic_button.add_css_class("recording");
        }
    }
}

/// Scroll once the new row has been allocated.
fn scroll_to_bottom(scrolled: &gtk4::ScrolledWindow) {
    let adj = scrolled.vadjustment();
    glib::idle_add_local_once(move || {
        adj.set_value(adj.upper() - adj.page_size());
    });
}

fn load_css() {
    let css_provider = gtk4::CssProvider::new();
    css_provider.load_from_string(
        r#"
        .chat-list {
            background: transparent;
        }
        .chat-list row {
            padding: 4px 0;
        }
        .bubble {
            border-radius: 12px;
            padding: 10px 14px;
        }
        .bubble.user {
            background-color: @accent_bg_color;
            color: @accent_fg_color;
        }
        .bubble.assistant {
            background-color: @card_bg_color;
        }
        .assistant-name {
            font-weight: bold;
        }
        .mic-button {
            padding: 14px;
        }
        .mic-button.recording {
            background-color: #ff3b30;
        }
        .mic-button.recording image {
            animation: mic-pulse 1s ease-in-out infinite;
        }
        @keyframes mic-pulse {
            0% { opacity: 1.0; }
            50% { opacity: 0.4; }
            100% { opacity: 1.0; }
        }
        "#,
    );
    gtk4::style_context_add_provider_for_display(
        &gtk4::gdk::Display::default().unwrap(),
        &css_provider,
        gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
