//! Real microphone capture via cpal.
//!
//! The cpal stream lives on a dedicated recorder thread (streams are not
//! `Send` on every platform). `start()` waits for that thread to report the
//! stream is running; `stop()` signals the thread and hands back a
//! `CaptureCompletion` that resolves once the WAV file is finalized.
//!
//! Without the `cpal` feature, `start()` returns `CaptureError::DeviceUnavailable`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use tokio::sync::oneshot;

use crate::wav::{self, AudioBuffer};
use crate::{AudioCaptureService, CaptureCompletion, CaptureError, CompletionSender};

/// Hard cap on a single recording, in seconds of device audio.
const MAX_RECORDING_SECS: usize = 600;

/// Configuration for the microphone recorder.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Where the finished recording is written.
    pub artifact_path: PathBuf,
    /// Name or substring of the input device. "default" picks the system default.
    pub device_name: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            artifact_path: std::env::temp_dir().join("recording.wav"),
            device_name: "default".to_string(),
        }
    }
}

struct ActiveRecording {
    stop_tx: mpsc::Sender<()>,
    completion: CaptureCompletion,
}

/// Microphone capture service writing one WAV artifact per recording.
pub struct MicrophoneRecorder {
    config: RecorderConfig,
    active: Arc<AtomicBool>,
    session: Mutex<Option<ActiveRecording>>,
}

impl MicrophoneRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            active: Arc::new(AtomicBool::new(false)),
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }
}

impl AudioCaptureService for MicrophoneRecorder {
    async fn start(&self) -> Result<(), CaptureError> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyRecording);
        }

        // A leftover file from a crashed cycle must not be mistaken for this one.
        let _ = std::fs::remove_file(&self.config.artifact_path);

        let (ready_tx, ready_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = mpsc::channel();
        let (done_tx, completion) = CaptureCompletion::pending();

        let config = self.config.clone();
        let spawned = std::thread::Builder::new()
            .name("quill-recorder".to_string())
            .spawn(move || record_until_stopped(config, ready_tx, stop_rx, done_tx));

        if let Err(e) = spawned {
            self.active.store(false, Ordering::SeqCst);
            return Err(CaptureError::Stream(format!(
                "failed to spawn recorder thread: {}",
                e
            )));
        }

        let ready = ready_rx.await.unwrap_or_else(|_| {
            Err(CaptureError::Stream(
                "recorder thread exited during startup".to_string(),
            ))
        });
        if let Err(e) = ready {
            self.active.store(false, Ordering::SeqCst);
            return Err(e);
        }

        let mut guard = self
            .session
            .lock()
            .map_err(|e| CaptureError::Stream(format!("Session mutex poisoned: {}", e)))?;
        *guard = Some(ActiveRecording {
            stop_tx,
            completion,
        });

        tracing::info!(path = %self.config.artifact_path.display(), "Microphone recording started");
        Ok(())
    }

    fn stop(&self) -> Result<CaptureCompletion, CaptureError> {
        let recording = {
            let mut guard = self
                .session
                .lock()
                .map_err(|e| CaptureError::Stream(format!("Session mutex poisoned: {}", e)))?;
            guard.take().ok_or(CaptureError::NotRecording)?
        };
        self.active.store(false, Ordering::SeqCst);

        // If the thread already died its completion carries the reason.
        let _ = recording.stop_tx.send(());
        tracing::info!("Microphone recording stop requested");
        Ok(recording.completion)
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Recorder thread body: open the stream, wait for stop, write the WAV.
fn record_until_stopped(
    config: RecorderConfig,
    ready_tx: oneshot::Sender<Result<(), CaptureError>>,
    stop_rx: mpsc::Receiver<()>,
    done_tx: CompletionSender,
) {
    let buffer = AudioBuffer::new(MAX_RECORDING_SECS * 48_000);

    let input = match open_input(&config.device_name, buffer.clone()) {
        Ok(input) => input,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };
    let _ = ready_tx.send(Ok(()));

    // Either an explicit stop or the recorder being dropped ends the take.
    let _ = stop_rx.recv();
    let device_rate = input.sample_rate;
    drop(input);

    let samples = buffer.take();
    let speech = wav::resample(&samples, device_rate, crate::AudioFormat::SPEECH.sample_rate);
    let result = wav::write_speech_wav(&config.artifact_path, &speech);
    if let Err(ref e) = result {
        tracing::warn!(error = %e, "Recording could not be finalized");
    }
    let _ = done_tx.send(result);
}

/// A running input stream and the rate its samples arrive at.
struct OpenInput {
    #[cfg(feature = "cpal")]
    _stream: cpal::Stream,
    sample_rate: u32,
}

#[cfg(feature = "cpal")]
fn open_input(device_name: &str, buffer: AudioBuffer) -> Result<OpenInput, CaptureError> {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    let host = cpal::default_host();
    let device = if device_name == "default" {
        host.default_input_device()
    } else {
        host.input_devices()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?
            .find(|d| d.name().map(|n| n.contains(device_name)).unwrap_or(false))
    }
    .ok_or_else(|| {
        CaptureError::DeviceUnavailable(format!("no input device matching '{}'", device_name))
    })?;

    let supported = device
        .default_input_config()
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
    let sample_format = supported.sample_format();
    let stream_config: cpal::StreamConfig = supported.config();
    let channels = stream_config.channels as usize;
    let sample_rate = stream_config.sample_rate.0;

    tracing::debug!(
        device = %device.name().unwrap_or_default(),
        sample_rate,
        channels,
        ?sample_format,
        "Opening input stream"
    );

    let err_fn = |e: cpal::StreamError| tracing::warn!(error = %e, "Input stream error");

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                buffer.push(&wav::downmix(data, channels));
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_input_stream(
            &stream_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let floats: Vec<f32> = data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                buffer.push(&wav::downmix(&floats, channels));
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::U16 => device.build_input_stream(
            &stream_config,
            move |data: &[u16], _: &cpal::InputCallbackInfo| {
                let floats: Vec<f32> = data
                    .iter()
                    .map(|&s| (s as f32 - 32_768.0) / 32_768.0)
                    .collect();
                buffer.push(&wav::downmix(&floats, channels));
            },
            err_fn,
            None,
        ),
        other => {
            return Err(CaptureError::DeviceUnavailable(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    }
    .map_err(|e| CaptureError::Stream(e.to_string()))?;

    stream
        .play()
        .map_err(|e| CaptureError::Stream(e.to_string()))?;

    Ok(OpenInput {
        _stream: stream,
        sample_rate,
    })
}

#[cfg(not(feature = "cpal"))]
fn open_input(_device_name: &str, _buffer: AudioBuffer) -> Result<OpenInput, CaptureError> {
    tracing::warn!("MicrophoneRecorder built without `cpal` feature");
    Err(CaptureError::DeviceUnavailable(
        "microphone capture requires the `cpal` feature".to_string(),
    ))
}
