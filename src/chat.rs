use chrono::Local;

/// First entry of every conversation, shown before any recording.
pub const GREETING: &str =
    "Hello! I'm your voice assistant. Click the microphone to start speaking.";

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Assistant,
}

/// A single chat entry. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub origin: Origin,
    pub text: String,
    /// Absolute URL of a spoken reply, when the service returned one.
    pub audio_url: Option<String>,
    /// Local wall-clock time the message was created, for display.
    pub at: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Origin::User, text.into(), None)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Origin::Assistant, text.into(), None)
    }

    pub fn assistant_with_audio(text: impl Into<String>, audio_url: Option<String>) -> Self {
        Self::new(Origin::Assistant, text.into(), audio_url)
    }

    fn new(origin: Origin, text: String, audio_url: Option<String>) -> Self {
        Self {
            origin,
            text,
            audio_url,
            at: Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

/// In-memory conversation history. Append-only: insertion order is
/// display order, and entries are never edited or removed.
#[derive(Debug, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// A log seeded with the assistant greeting.
    pub fn with_greeting() -> Self {
        let mut log = Self::default();
        log.append(Message::assistant(GREETING));
        log
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }
}
