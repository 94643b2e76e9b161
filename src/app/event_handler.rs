use std::cell::RefCell;
use std::rc::Rc;

use super::recording::{start_recording, stop_recording};
use super::state::{append_message, AppState, BackendEvent, ChatStatus};
use crate::chat::Message;

/// Shown when the exchange fails for any reason, network or parse.
const FALLBACK_TEXT: &str = "Sorry, I had trouble processing your request. Please try again.";

/// Handle a backend event. This is the recording state machine.
pub fn handle_backend_event(state: &Rc<RefCell<AppState>>, event: BackendEvent) {
    match event {
        BackendEvent::MicToggled => {
            let status = state.borrow().status;
            match status {
                ChatStatus::Idle => start_recording(state),
                ChatStatus::Recording => stop_recording(state),
            }
        }
        BackendEvent::ExchangeComplete(reply) => {
            log::info!("Assistant reply: {}", reply.text);
            append_message(
                state,
                Message::assistant_with_audio(reply.text, reply.audio_url),
            );
        }
        BackendEvent::ExchangeFailed(err) => {
            log::error!("{err}");
            append_message(state, Message::assistant(FALLBACK_TEXT));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::capture::stub::StubBackend;
    use crate::chat::{Origin, GREETING};
    use crate::voice_service::stub::StubVoiceService;
    use crate::voice_service::VoiceReply;

    fn test_state(
        capture: StubBackend,
        voice: StubVoiceService,
    ) -> (
        Rc<RefCell<AppState>>,
        async_channel::Receiver<BackendEvent>,
    ) {
        let (tx, rx) = async_channel::unbounded();
        let state = AppState::with_services(tx, Box::new(capture), Arc::new(voice));
        (Rc::new(RefCell::new(state)), rx)
    }

    fn texts(state: &Rc<RefCell<AppState>>) -> Vec<String> {
        state.borrow().log.iter().map(|m| m.text.clone()).collect()
    }

    #[test]
    fn toggle_alternates_between_idle_and_recording() {
        let reply = VoiceReply {
            text: "ok".into(),
            audio_url: None,
        };
        let (state, _rx) = test_state(
            StubBackend::emitting(vec![vec![1]]),
            StubVoiceService::replying(reply),
        );

        assert_eq!(state.borrow().status, ChatStatus::Idle);
        handle_backend_event(&state, BackendEvent::MicToggled);
        assert_eq!(state.borrow().status, ChatStatus::Recording);
        handle_backend_event(&state, BackendEvent::MicToggled);
        assert_eq!(state.borrow().status, ChatStatus::Idle);
        assert!(state.borrow().session.is_none());
    }

    #[test]
    fn a_second_start_never_opens_a_second_session() {
        let backend = StubBackend::emitting(vec![vec![1]]);
        let opens = backend.opens.clone();
        let (state, _rx) = test_state(backend, StubVoiceService::failing("unused"));

        start_recording(&state);
        start_recording(&state);

        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert_eq!(state.borrow().status, ChatStatus::Recording);
    }

    #[test]
    fn stop_without_a_session_is_a_noop() {
        let (state, rx) = test_state(
            StubBackend::emitting(Vec::new()),
            StubVoiceService::failing("unused"),
        );

        stop_recording(&state);

        assert_eq!(state.borrow().status, ChatStatus::Idle);
        assert_eq!(texts(&state), vec![GREETING.to_string()]);
        assert!(rx.is_empty());
    }

    #[test]
    fn capture_denial_appends_one_message_and_stays_idle() {
        let (state, rx) = test_state(StubBackend::denied(), StubVoiceService::failing("unused"));

        handle_backend_event(&state, BackendEvent::MicToggled);

        let s = state.borrow();
        assert_eq!(s.status, ChatStatus::Idle);
        let appended: Vec<&crate::chat::Message> = s.log.iter().skip(1).collect();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].origin, Origin::Assistant);
        assert_eq!(
            appended[0].text,
            "Please allow microphone access to use voice features."
        );
        // No upload was dispatched.
        assert!(rx.is_empty());
    }

    #[test]
    fn successful_exchange_appends_log_entries_in_order() {
        let reply = VoiceReply {
            text: "Turn off the lights".into(),
            audio_url: None,
        };
        let (state, rx) = test_state(
            StubBackend::emitting(vec![vec![1, 2], vec![3]]),
            StubVoiceService::replying(reply),
        );

        handle_backend_event(&state, BackendEvent::MicToggled);
        handle_backend_event(&state, BackendEvent::MicToggled);

        let outcome = rx.recv_blocking().expect("upload outcome");
        handle_backend_event(&state, outcome);

        assert_eq!(
            texts(&state),
            vec![
                GREETING.to_string(),
                "Recording sent...".to_string(),
                "Turn off the lights".to_string(),
            ]
        );
    }

    #[test]
    fn reply_audio_url_is_carried_onto_the_message() {
        let reply = VoiceReply {
            text: "Hello".into(),
            audio_url: Some("http://localhost:8000/files/1.mp3".into()),
        };
        let (state, rx) = test_state(
            StubBackend::emitting(vec![vec![1]]),
            StubVoiceService::replying(reply),
        );

        handle_backend_event(&state, BackendEvent::MicToggled);
        handle_backend_event(&state, BackendEvent::MicToggled);
        let outcome = rx.recv_blocking().expect("upload outcome");
        handle_backend_event(&state, outcome);

        let s = state.borrow();
        let last = s.log.iter().last().expect("reply entry");
        assert_eq!(last.text, "Hello");
        assert_eq!(
            last.audio_url.as_deref(),
            Some("http://localhost:8000/files/1.mp3")
        );
    }

    #[test]
    fn failed_exchange_appends_the_fallback_and_leaves_the_buffer_empty() {
        let backend = StubBackend::emitting(vec![vec![9, 9]]);
        let last_buffer = backend.last_buffer.clone();
        let (state, rx) = test_state(backend, StubVoiceService::failing("connection refused"));

        handle_backend_event(&state, BackendEvent::MicToggled);
        handle_backend_event(&state, BackendEvent::MicToggled);
        let outcome = rx.recv_blocking().expect("upload outcome");
        handle_backend_event(&state, outcome);

        assert_eq!(
            texts(&state),
            vec![
                GREETING.to_string(),
                "Recording sent...".to_string(),
                FALLBACK_TEXT.to_string(),
            ]
        );

        let buffer = last_buffer.lock().unwrap().clone().expect("buffer handed out");
        assert!(buffer.lock().unwrap().is_empty());
        // The failure is terminal per attempt, not fatal: another
        // recording can start.
        start_recording(&state);
        assert_eq!(state.borrow().status, ChatStatus::Recording);
    }
}
