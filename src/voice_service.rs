use async_trait::async_trait;
use serde::Deserialize;

pub type ServiceError = Box<dyn std::error::Error + Send + Sync>;

const VOICE_PATH: &str = "/voice/";
const AUDIO_FIELD: &str = "audio_file";
const AUDIO_FILENAME: &str = "recording.webm";
const AUDIO_MIME: &str = "audio/webm";

/// Decoded reply from the voice service. `audio_url`, when present,
/// has already been prefixed with the service base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceReply {
    pub text: String,
    pub audio_url: Option<String>,
}

/// Wire shape of the endpoint's JSON body.
#[derive(Deserialize)]
struct WireReply {
    text: String,
    audio_url: Option<String>,
}

/// One request/response exchange with the remote voice service. No
/// retry, no timeout, no cancellation once dispatched.
#[async_trait]
pub trait VoiceService: Send + Sync {
    async fn exchange(&self, payload: Vec<u8>) -> Result<VoiceReply, ServiceError>;
}

/// reqwest-backed client. POSTs the recording as a single-part
/// multipart form and decodes the JSON reply.
pub struct HttpVoiceService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVoiceService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl VoiceService for HttpVoiceService {
    async fn exchange(&self, payload: Vec<u8>) -> Result<VoiceReply, ServiceError> {
        log::info!("Uploading {} byte recording", payload.len());

        let part = reqwest::multipart::Part::bytes(payload)
            .file_name(AUDIO_FILENAME)
            .mime_str(AUDIO_MIME)?;
        let form = reqwest::multipart::Form::new().part(AUDIO_FIELD, part);

        let url = format!("{}{VOICE_PATH}", self.base_url.trim_end_matches('/'));
        let resp = self.client.post(&url).multipart(form).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("Voice service error {status}: {text}").into());
        }

        let body = resp.text().await?;
        decode_reply(&self.base_url, &body)
    }
}

/// Parse the endpoint's JSON body. The service returns `audio_url` as
/// a path; the player needs it prefixed with the service base.
fn decode_reply(base_url: &str, body: &str) -> Result<VoiceReply, ServiceError> {
    let wire: WireReply = serde_json::from_str(body)?;
    Ok(VoiceReply {
        text: wire.text,
        audio_url: wire
            .audio_url
            .map(|path| format!("{}{path}", base_url.trim_end_matches('/'))),
    })
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reply_audio_path_is_prefixed_with_the_base_url() {
        let reply = decode_reply(
            "http://localhost:8000",
            r#"{"text": "Hello", "audio_url": "/files/1.mp3"}"#,
        )
        .expect("valid body");

        assert_eq!(reply.text, "Hello");
        assert_eq!(
            reply.audio_url.as_deref(),
            Some("http://localhost:8000/files/1.mp3")
        );
    }

    #[test]
    fn trailing_slash_on_the_base_does_not_double_up() {
        let reply = decode_reply(
            "http://localhost:8000/",
            r#"{"text": "Hello", "audio_url": "/files/1.mp3"}"#,
        )
        .expect("valid body");

        assert_eq!(
            reply.audio_url.as_deref(),
            Some("http://localhost:8000/files/1.mp3")
        );
    }

    #[test]
    fn missing_audio_url_stays_absent() {
        let reply = decode_reply("http://localhost:8000", r#"{"text": "Hello"}"#)
            .expect("valid body");

        assert_eq!(reply.text, "Hello");
        assert_eq!(reply.audio_url, None);
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(decode_reply("http://localhost:8000", "not json").is_err());
        assert!(decode_reply("http://localhost:8000", r#"{"audio_url": "/x"}"#).is_err());
    }
}
