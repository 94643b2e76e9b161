mod app;
mod capture;
mod chat;
mod config;
mod ui;
mod voice_service;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use libadwaita::prelude::*;

use app::{AppState, BackendEvent};

fn main() {
    env_logger::init();
    log::info!("Voice Chatbot starting");

    let application = libadwaita::Application::builder()
        .application_id("com.github.voicechat.voice-chat")
        .build();

    application.connect_activate(on_activate);
    application.run();
}

fn on_activate(app: &libadwaita::Application) {
    // Async channel for backend → UI communication
    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();

    let state = Rc::new(RefCell::new(AppState::new(backend_tx.clone())));

    // Build UI and seed it with whatever the log already holds (the greeting)
    let window = ui::chat_window::build_chat_window(app, backend_tx);
    for message in state.borrow().log.iter() {
        ui::chat_window::append_row(&window, message);
    }

    window.window.present();
    state.borrow_mut().window = Some(window);

    // Attach backend event handler
    {
        let state_clone = state.clone();
        gtk4::glib::spawn_future_local(async move {
            while let Ok(event) = backend_rx.recv().await {
                app::handle_backend_event(&state_clone, event);
            }
        });
    }
}
