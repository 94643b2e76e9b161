use std::cell::RefCell;
use std::rc::Rc;

use super::state::{AppState, BackendEvent};

/// Dispatch the recording upload on the tokio runtime. The outcome
/// comes back to the main thread as a `BackendEvent`; once sent there
/// is no way to cancel the exchange.
pub fn dispatch_upload(state: &Rc<RefCell<AppState>>, payload: Vec<u8>) {
    let s = state.borrow();
    let voice = s.voice.clone();
    let sender = s.backend_sender.clone();

    s.tokio_rt.spawn(async move {
        match voice.exchange(payload).await {
            Ok(reply) => {
                let _ = sender.send(BackendEvent::ExchangeComplete(reply)).await;
            }
            Err(e) => {
                let _ = sender
                    .send(BackendEvent::ExchangeFailed(format!("Upload failed: {e}")))
                    .await;
            }
        }
    });
}
