use std::cell::RefCell;
use std::rc::Rc;

use super::pipeline::dispatch_upload;
use super::state::{append_message, update_status, AppState, ChatStatus};
use crate::capture::RecordingSession;
use crate::chat::Message;

/// Shown when the capture device cannot be opened.
const MIC_ACCESS_TEXT: &str = "Please allow microphone access to use voice features.";

/// Placeholder appended as soon as a recording is finalized, before
/// the upload goes out.
const RECORDING_SENT_TEXT: &str = "Recording sent...";

/// Start a recording session from the microphone. Idle → Recording.
pub fn start_recording(state: &Rc<RefCell<AppState>>) {
    if state.borrow().session.is_some() {
        log::info!("Ignoring start while a session is active");
        return;
    }

    log::info!("Starting recording");

    let session = {
        let s = state.borrow();
        RecordingSession::start(s.capture.as_ref())
    };

    match session {
        Ok(session) => {
            state.borrow_mut().session = Some(session);
            update_status(state, ChatStatus::Recording);
        }
        Err(e) => {
            // Stay Idle; this is the only user-visible capture error path.
            log::error!("Failed to open capture stream: {e}");
            append_message(state, Message::assistant(MIC_ACCESS_TEXT));
        }
    }
}

/// Stop the active session and dispatch the upload. Recording → Idle;
/// no-op when no session is active.
pub fn stop_recording(state: &Rc<RefCell<AppState>>) {
    let Some(session) = state.borrow_mut().session.take() else {
        log::info!("Stop requested with no active session");
        return;
    };

    log::info!("Stopping recording");

    let payload = session.finish();
    log::info!("Captured {} bytes", payload.len());

    update_status(state, ChatStatus::Idle);
    append_message(state, Message::user(RECORDING_SENT_TEXT));
    dispatch_upload(state, payload);
}
