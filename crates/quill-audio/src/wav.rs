//! Sample buffering, resampling and WAV encoding for speech recordings.

use std::path::Path;
use std::sync::{Arc, Mutex};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::{AudioArtifact, AudioFormat, CaptureError};

/// Thread-safe accumulator for mono f32 samples.
///
/// Filled from the audio callback thread and drained once when the
/// recording stops.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    samples: Arc<Mutex<Vec<f32>>>,
    /// Maximum buffer size in samples (prevents unbounded growth).
    max_samples: usize,
}

impl AudioBuffer {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: Arc::new(Mutex::new(Vec::new())),
            max_samples,
        }
    }

    /// Append samples. Once full, further samples are dropped so the start
    /// of the utterance is kept.
    pub fn push(&self, data: &[f32]) {
        if let Ok(mut buf) = self.samples.lock() {
            let room = self.max_samples.saturating_sub(buf.len());
            buf.extend_from_slice(&data[..data.len().min(room)]);
        }
    }

    /// Take all buffered samples, leaving the buffer empty.
    pub fn take(&self) -> Vec<f32> {
        if let Ok(mut buf) = self.samples.lock() {
            std::mem::take(&mut *buf)
        } else {
            Vec::new()
        }
    }

    pub fn len(&self) -> usize {
        self.samples.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Average interleaved frames down to a single channel.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Linear resampling from one sample rate to another.
///
/// Adequate for speech headed to a recognizer that itself works at 16 kHz.
pub fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || input.is_empty() || from_rate == 0 || to_rate == 0 {
        return input.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (input.len() as f64 / ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_idx = i as f64 * ratio;
        let idx0 = (src_idx.floor() as usize).min(input.len() - 1);
        let idx1 = (idx0 + 1).min(input.len() - 1);
        let frac = (src_idx - idx0 as f64) as f32;

        output.push(input[idx0] * (1.0 - frac) + input[idx1] * frac);
    }

    output
}

/// Write 16 kHz mono samples as 16-bit PCM WAV, replacing any existing file.
///
/// Returns `CaptureError::NoAudio` without touching disk when `samples` is
/// empty.
pub fn write_speech_wav(path: &Path, samples: &[f32]) -> Result<AudioArtifact, CaptureError> {
    if samples.is_empty() {
        return Err(CaptureError::NoAudio);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let format = AudioFormat::SPEECH;
    let spec = WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample,
        sample_format: SampleFormat::Int,
    };

    removing_on_error(path, || {
        let mut writer = WavWriter::create(path, spec)?;
        for &sample in samples {
            let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(sample_i16)?;
        }
        writer.finalize()
    })?;

    let duration_ms = samples.len() as u64 * 1000 / format.sample_rate as u64;
    tracing::debug!(
        path = %path.display(),
        samples = samples.len(),
        duration_ms,
        "Recording written"
    );
    Ok(AudioArtifact::new(path.to_path_buf(), format, duration_ms))
}

/// Run `write`; if it fails, delete whatever it left at `path`.
fn removing_on_error<T, E>(path: &Path, write: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let result = write();
    if result.is_err() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::debug!(path = %path.display(), error = %e, "No partial recording to remove");
        }
    }
    result
}
