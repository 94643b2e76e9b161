use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

pub type CaptureError = Box<dyn std::error::Error + Send + Sync>;

/// Shared accumulation buffer for one recording session. Each entry is
/// one raw binary fragment as emitted by the device callback.
pub type FragmentBuffer = Arc<Mutex<Vec<Vec<u8>>>>;

/// An open microphone stream. Finalizing releases the underlying
/// device tracks; a finalized handle must not be reused.
pub trait CaptureHandle {
    /// Stop fragment emission and release the device.
    fn finalize(&mut self);
}

/// Seam over the platform capture API so the recording lifecycle can
/// run under test without a real device.
pub trait CaptureBackend {
    /// Request capture access and start streaming fragments into `buffer`.
    fn open(&self, buffer: FragmentBuffer) -> Result<Box<dyn CaptureHandle>, CaptureError>;
}

/// One recording attempt: the live handle plus its fragment buffer.
/// Exists only between start and stop; `finish` consumes it.
pub struct RecordingSession {
    handle: Box<dyn CaptureHandle>,
    fragments: FragmentBuffer,
}

impl RecordingSession {
    /// Open a capture stream on `backend` with a fresh fragment buffer.
    pub fn start(backend: &dyn CaptureBackend) -> Result<Self, CaptureError> {
        let fragments: FragmentBuffer = Arc::new(Mutex::new(Vec::new()));
        let handle = backend.open(fragments.clone())?;
        Ok(Self { handle, fragments })
    }

    /// Finalize the handle and concatenate everything captured so far
    /// into a single payload. The buffer is left empty regardless of
    /// what happens to the payload afterwards.
    pub fn finish(mut self) -> Vec<u8> {
        self.handle.finalize();
        let fragments = std::mem::take(&mut *self.fragments.lock().unwrap());
        fragments.concat()
    }
}

/// Capture from the default input device via cpal. Frames are mixed
/// down to mono 16-bit little-endian PCM at ~16kHz, one fragment per
/// device callback.
pub struct MicBackend;

struct MicHandle {
    stream: Option<cpal::Stream>,
}

impl CaptureHandle for MicHandle {
    fn finalize(&mut self) {
        // Dropping the stream stops the underlying tracks.
        self.stream.take();
    }
}

impl CaptureBackend for MicBackend {
    fn open(&self, buffer: FragmentBuffer) -> Result<Box<dyn CaptureHandle>, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or("No input device found")?;

        log::info!("Input device: {:?}", device.description());

        let supported_configs: Vec<_> = device.supported_input_configs()?.collect();

        // Try to find a config that supports 16kHz mono
        let target_rate: u32 = 16000;
        let desired = supported_configs.iter().find(|c| {
            c.channels() == 1
                && c.min_sample_rate() <= target_rate
                && c.max_sample_rate() >= target_rate
                && c.sample_format() == cpal::SampleFormat::F32
        });

        let (config, downsample_factor) = if let Some(cfg) = desired {
            (cfg.with_sample_rate(target_rate).config(), 1usize)
        } else {
            // Fall back to default config, downsample in the callback
            let default_config = device.default_input_config()?;
            let rate = default_config.sample_rate();
            let factor = (rate / target_rate).max(1) as usize;
            log::info!("Using native rate {rate}Hz, downsampling by {factor}x");
            (default_config.config(), factor)
        };

        let channels = config.channels as usize;

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let mut fragment = Vec::with_capacity(data.len() / channels * 2);
                for (i, frame) in data.chunks(channels).enumerate() {
                    if i % downsample_factor == 0 {
                        let mono = frame.iter().sum::<f32>() / channels as f32;
                        let sample = (mono.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                        fragment.extend_from_slice(&sample.to_le_bytes());
                    }
                }
                if !fragment.is_empty() {
                    buffer.lock().unwrap().push(fragment);
                }
            },
            |err| log::error!("Input stream error: {err}"),
            None,
        )?;

        stream.play()?;
        Ok(Box::new(MicHandle {
            stream: Some(stream),
        }))
    }
}
