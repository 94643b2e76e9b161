use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::capture::{CaptureBackend, MicBackend, RecordingSession};
use crate::chat::{ConversationLog, Message};
use crate::config::Config;
use crate::ui::chat_window::ChatWindowWidgets;
use crate::voice_service::{HttpVoiceService, VoiceReply, VoiceService};

/// Events sent from background tasks and view callbacks to the GTK
/// main thread.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    MicToggled,
    ExchangeComplete(VoiceReply),
    ExchangeFailed(String),
}

/// Recording lifecycle status. Cycles between the two states for the
/// lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStatus {
    Idle,
    Recording,
}

/// Central application state. Lives on the GTK main thread inside
/// Rc<RefCell<>>; background work only reaches it through
/// `BackendEvent`s, so no locking is needed here.
pub struct AppState {
    pub status: ChatStatus,
    pub log: ConversationLog,
    pub session: Option<RecordingSession>,
    pub capture: Box<dyn CaptureBackend>,
    pub voice: Arc<dyn VoiceService>,
    pub tokio_rt: tokio::runtime::Runtime,
    pub backend_sender: async_channel::Sender<BackendEvent>,

    // UI handle
    pub window: Option<ChatWindowWidgets>,
}

impl AppState {
    pub fn new(sender: async_channel::Sender<BackendEvent>) -> Self {
        let config = Config::load();
        let voice = Arc::new(HttpVoiceService::new(config.server_url));
        Self::with_services(sender, Box::new(MicBackend), voice)
    }

    /// Build state with explicit capture/service implementations.
    pub fn with_services(
        sender: async_channel::Sender<BackendEvent>,
        capture: Box<dyn CaptureBackend>,
        voice: Arc<dyn VoiceService>,
    ) -> Self {
        let tokio_rt = tokio::runtime::Runtime::new()
            .expect("Failed to create tokio runtime");

        Self {
            status: ChatStatus::Idle,
            log: ConversationLog::with_greeting(),
            session: None,
            capture,
            voice,
            tokio_rt,
            backend_sender: sender,
            window: None,
        }
    }
}

/// Append a message to the log, mirroring it into the view when one is
/// attached. The log itself is the source of truth; rows are only ever
/// added, matching the append-only history.
pub fn append_message(state: &Rc<RefCell<AppState>>, message: Message) {
    let mut s = state.borrow_mut();
    if let Some(ref window) = s.window {
        crate::ui::chat_window::append_row(window, &message);
    }
    s.log.append(message);
}

/// Update the lifecycle status and the mic button to match.
pub fn update_status(state: &Rc<RefCell<AppState>>, status: ChatStatus) {
    let mut s = state.borrow_mut();
    s.status = status;
    if let Some(ref window) = s.window {
        crate::ui::chat_window::set_mic_state(window, status);
    }
}
