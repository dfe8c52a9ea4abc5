//! Transcription by launching the Whisper command line as a child process.
//!
//! The child is invoked as
//! `<program> <args...> <audio> --model <m> --output_format txt --language <l> --output_dir <dir>`
//! and on success leaves `<dir>/<audio stem>.txt` behind. Nonzero exits are
//! classified by scanning the combined stdout and stderr.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use quill_audio::AudioArtifact;
use quill_core::config::{expand_home, TranscriptionConfig};
use tokio::process::Command;

use crate::{FailureReason, TranscriptionInvoker, TranscriptionResult};

/// Settings for one external transcription program.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    pub program: String,
    /// Arguments placed before the audio path (e.g. `-m whisper`).
    pub args: Vec<String>,
    pub model: String,
    pub language: String,
    pub output_dir: PathBuf,
    /// Directories prepended to the child's `PATH`.
    pub extra_path: Vec<PathBuf>,
    /// Case-insensitive marker of a missing helper tool in failure output.
    pub dependency_signature: String,
    pub timeout: Duration,
}

impl From<&TranscriptionConfig> for WhisperConfig {
    fn from(config: &TranscriptionConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            model: config.model.clone(),
            language: config.language.clone(),
            output_dir: config.output_dir_path(),
            extra_path: config.extra_path.iter().map(|p| expand_home(p)).collect(),
            dependency_signature: config.dependency_signature.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self::from(&TranscriptionConfig::default())
    }
}

/// Classify the output of a failed run.
pub fn classify_failure(output: &str, dependency_signature: &str) -> FailureReason {
    let signature = dependency_signature.trim();
    if !signature.is_empty() && output.to_lowercase().contains(&signature.to_lowercase()) {
        FailureReason::MissingDependency {
            tool: signature.to_string(),
        }
    } else {
        FailureReason::TranscriptionError
    }
}

/// Removes the transcript file when dropped.
struct TranscriptFile(PathBuf);

impl Drop for TranscriptFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => tracing::debug!(path = %self.0.display(), "Transcript removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.0.display(), error = %e, "Failed to remove transcript"),
        }
    }
}

/// Process-backed transcription service.
pub struct WhisperProcess {
    config: WhisperConfig,
}

impl WhisperProcess {
    pub fn new(config: WhisperConfig) -> Self {
        tracing::info!(
            program = %config.program,
            model = %config.model,
            language = %config.language,
            output_dir = %config.output_dir.display(),
            "Whisper process configured"
        );
        Self { config }
    }

    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }

    /// Where the child writes the transcript for `audio`.
    pub fn transcript_path(&self, audio: &Path) -> PathBuf {
        let stem = audio
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| OsString::from("recording"));
        let mut name = stem;
        name.push(".txt");
        self.config.output_dir.join(name)
    }

    /// The child's `PATH`: extra directories first, then the inherited value.
    fn child_path(&self) -> Option<OsString> {
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let dirs = self
            .config
            .extra_path
            .iter()
            .cloned()
            .chain(std::env::split_paths(&inherited));
        match std::env::join_paths(dirs) {
            Ok(joined) => Some(joined),
            Err(e) => {
                tracing::warn!(error = %e, "Could not extend PATH; using inherited value");
                None
            }
        }
    }

    fn build_command(&self, audio: &Path) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.args)
            .arg(audio)
            .arg("--model")
            .arg(&self.config.model)
            .arg("--output_format")
            .arg("txt")
            .arg("--language")
            .arg(&self.config.language)
            .arg("--output_dir")
            .arg(&self.config.output_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = self.child_path() {
            cmd.env("PATH", path);
        }
        cmd
    }

    async fn run(&self, audio: &Path) -> TranscriptionResult {
        let transcript = TranscriptFile(self.transcript_path(audio));
        // A transcript left by an earlier crash would read as this run's output.
        let _ = tokio::fs::remove_file(&transcript.0).await;

        if let Err(e) = tokio::fs::create_dir_all(&self.config.output_dir).await {
            return TranscriptionResult::ProcessFailure {
                reason: FailureReason::TranscriptionError,
                raw_output: format!("cannot create output dir: {}", e),
            };
        }

        let child = match self.build_command(audio).spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(program = %self.config.program, "Transcription program not found");
                return TranscriptionResult::ProcessFailure {
                    reason: FailureReason::MissingDependency {
                        tool: self.config.program.clone(),
                    },
                    raw_output: format!("{}: {}", self.config.program, e),
                };
            }
            Err(e) => {
                return TranscriptionResult::ProcessFailure {
                    reason: FailureReason::TranscriptionError,
                    raw_output: format!("failed to launch {}: {}", self.config.program, e),
                };
            }
        };

        // Dropping the timed-out future drops the child, which kills it.
        let output = match tokio::time::timeout(self.config.timeout, child.wait_with_output()).await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return TranscriptionResult::ProcessFailure {
                    reason: FailureReason::TranscriptionError,
                    raw_output: format!("failed waiting for {}: {}", self.config.program, e),
                };
            }
            Err(_) => {
                tracing::warn!(timeout_secs = self.config.timeout.as_secs(), "Transcription timed out");
                return TranscriptionResult::ProcessFailure {
                    reason: FailureReason::TranscriptionError,
                    raw_output: format!(
                        "transcription timed out after {}s",
                        self.config.timeout.as_secs()
                    ),
                };
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            let reason = classify_failure(&combined, &self.config.dependency_signature);
            tracing::warn!(
                status = ?output.status.code(),
                reason = %reason,
                "Transcription process failed"
            );
            return TranscriptionResult::ProcessFailure {
                reason,
                raw_output: combined,
            };
        }

        match tokio::fs::read_to_string(&transcript.0).await {
            Ok(text) => TranscriptionResult::from_transcript(&text),
            Err(e) => {
                tracing::warn!(path = %transcript.0.display(), error = %e, "Transcript unreadable");
                TranscriptionResult::ProcessFailure {
                    reason: FailureReason::OutputUnreadable,
                    raw_output: format!("{}\n{}", combined, e),
                }
            }
        }
    }
}

impl TranscriptionInvoker for WhisperProcess {
    async fn transcribe(&self, artifact: AudioArtifact) -> TranscriptionResult {
        let start = Instant::now();
        tracing::debug!(
            path = %artifact.path().display(),
            audio_ms = artifact.duration_ms(),
            "Starting transcription"
        );

        let result = self.run(artifact.path()).await;
        artifact.discard();

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            outcome = match &result {
                TranscriptionResult::Text(_) => "text",
                TranscriptionResult::Empty => "empty",
                TranscriptionResult::ProcessFailure { .. } => "failure",
            },
            "Transcription finished"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_failure_signature_case_insensitive() {
        assert_eq!(
            classify_failure("RuntimeError: FFmpeg not found in PATH", "ffmpeg"),
            FailureReason::MissingDependency {
                tool: "ffmpeg".into()
            }
        );
    }

    #[test]
    fn test_classify_failure_generic() {
        assert_eq!(
            classify_failure("CUDA out of memory", "ffmpeg"),
            FailureReason::TranscriptionError
        );
        assert_eq!(classify_failure("anything", ""), FailureReason::TranscriptionError);
    }

    #[test]
    fn test_config_from_transcription_config() {
        let config = WhisperConfig::from(&TranscriptionConfig {
            output_dir: "/tmp/quill-out".into(),
            timeout_secs: 7,
            ..TranscriptionConfig::default()
        });
        assert_eq!(config.program, "python3");
        assert_eq!(config.args, vec!["-m", "whisper"]);
        assert_eq!(config.model, "tiny");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/quill-out"));
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.extra_path.len(), 2);
        assert!(!config.extra_path[0].starts_with("~"));
    }

    #[test]
    fn test_transcript_path_uses_audio_stem() {
        let process = WhisperProcess::new(WhisperConfig {
            output_dir: PathBuf::from("/tmp/out"),
            ..WhisperConfig::default()
        });
        assert_eq!(
            process.transcript_path(Path::new("/var/rec/recording.wav")),
            PathBuf::from("/tmp/out/recording.txt")
        );
    }

    #[test]
    fn test_child_path_prepends_extra_dirs() {
        let process = WhisperProcess::new(WhisperConfig {
            extra_path: vec![PathBuf::from("/opt/quill/bin")],
            ..WhisperConfig::default()
        });
        let path = process.child_path().unwrap();
        let first = std::env::split_paths(&path).next().unwrap();
        assert_eq!(first, PathBuf::from("/opt/quill/bin"));
    }

    /// Scripted stand-ins for the Whisper CLI. `sh -c <script> whisper` makes
    /// the audio path `$1` and the output dir `$9`.
    #[cfg(unix)]
    mod scripted {
        use super::*;
        use quill_audio::{AudioCaptureService, MockAudioCapture};

        struct Fixture {
            _dir: tempfile::TempDir,
            audio_dir: PathBuf,
            output_dir: PathBuf,
        }

        fn fixture() -> Fixture {
            let dir = tempfile::tempdir().unwrap();
            let audio_dir = dir.path().join("audio");
            let output_dir = dir.path().join("out");
            Fixture {
                audio_dir,
                output_dir,
                _dir: dir,
            }
        }

        fn scripted(fixture: &Fixture, script: &str) -> WhisperProcess {
            WhisperProcess::new(WhisperConfig {
                program: "sh".into(),
                args: vec!["-c".into(), script.into(), "whisper".into()],
                output_dir: fixture.output_dir.clone(),
                extra_path: Vec::new(),
                timeout: Duration::from_secs(10),
                ..WhisperConfig::default()
            })
        }

        async fn artifact(fixture: &Fixture) -> AudioArtifact {
            let capture = MockAudioCapture::new(fixture.audio_dir.join("recording.wav"));
            capture.start().await.unwrap();
            capture.stop().unwrap().wait().await.unwrap()
        }

        fn leftovers(dir: &Path) -> usize {
            std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
        }

        #[tokio::test]
        async fn test_hello_world_transcript() {
            let fx = fixture();
            let process = scripted(&fx, r#"printf 'hello world\n' > "$9/recording.txt""#);
            let result = process.transcribe(artifact(&fx).await).await;
            assert_eq!(result, TranscriptionResult::Text("hello world".into()));
            assert_eq!(leftovers(&fx.audio_dir), 0);
            assert_eq!(leftovers(&fx.output_dir), 0);
        }

        #[tokio::test]
        async fn test_empty_transcript() {
            let fx = fixture();
            let process = scripted(&fx, r#": > "$9/recording.txt""#);
            let result = process.transcribe(artifact(&fx).await).await;
            assert_eq!(result, TranscriptionResult::Empty);
            assert_eq!(leftovers(&fx.output_dir), 0);
        }

        #[tokio::test]
        async fn test_missing_ffmpeg_is_missing_dependency() {
            let fx = fixture();
            let process = scripted(
                &fx,
                "echo 'Traceback' ; echo 'FileNotFoundError: ffmpeg' >&2 ; exit 1",
            );
            let result = process.transcribe(artifact(&fx).await).await;
            match result {
                TranscriptionResult::ProcessFailure { reason, raw_output } => {
                    assert_eq!(
                        reason,
                        FailureReason::MissingDependency {
                            tool: "ffmpeg".into()
                        }
                    );
                    assert!(raw_output.contains("Traceback"));
                    assert!(raw_output.contains("ffmpeg"));
                }
                other => panic!("unexpected result: {:?}", other),
            }
            assert_eq!(leftovers(&fx.audio_dir), 0);
        }

        #[tokio::test]
        async fn test_generic_failure() {
            let fx = fixture();
            let process = scripted(&fx, "echo 'model download failed' >&2 ; exit 1");
            let result = process.transcribe(artifact(&fx).await).await;
            assert!(matches!(
                result,
                TranscriptionResult::ProcessFailure {
                    reason: FailureReason::TranscriptionError,
                    ..
                }
            ));
        }

        #[tokio::test]
        async fn test_success_without_transcript_is_unreadable() {
            let fx = fixture();
            let process = scripted(&fx, "exit 0");
            let result = process.transcribe(artifact(&fx).await).await;
            assert!(matches!(
                result,
                TranscriptionResult::ProcessFailure {
                    reason: FailureReason::OutputUnreadable,
                    ..
                }
            ));
        }

        #[tokio::test]
        async fn test_stale_transcript_is_not_reused() {
            let fx = fixture();
            std::fs::create_dir_all(&fx.output_dir).unwrap();
            std::fs::write(fx.output_dir.join("recording.txt"), "old words").unwrap();
            let process = scripted(&fx, "exit 0");
            let result = process.transcribe(artifact(&fx).await).await;
            assert!(matches!(result, TranscriptionResult::ProcessFailure { .. }));
            assert_eq!(leftovers(&fx.output_dir), 0);
        }

        #[tokio::test]
        async fn test_argument_contract() {
            let fx = fixture();
            let process = scripted(
                &fx,
                r#"printf '%s|' "$2" "$3" "$4" "$5" "$6" "$7" "$8" > "$9/recording.txt""#,
            );
            let result = process.transcribe(artifact(&fx).await).await;
            assert_eq!(
                result,
                TranscriptionResult::Text(
                    "--model|tiny|--output_format|txt|--language|en|--output_dir|".into()
                )
            );
        }

        #[tokio::test]
        async fn test_audio_path_is_first_argument() {
            let fx = fixture();
            let process = scripted(
                &fx,
                r#"test -f "$1" && basename "$1" > "$9/recording.txt""#,
            );
            let result = process.transcribe(artifact(&fx).await).await;
            assert_eq!(result, TranscriptionResult::Text("recording.wav".into()));
        }

        #[tokio::test]
        async fn test_program_not_found_is_missing_dependency() {
            let fx = fixture();
            let process = WhisperProcess::new(WhisperConfig {
                program: "quill-no-such-whisper-binary".into(),
                args: Vec::new(),
                output_dir: fx.output_dir.clone(),
                ..WhisperConfig::default()
            });
            let result = process.transcribe(artifact(&fx).await).await;
            assert!(matches!(
                result,
                TranscriptionResult::ProcessFailure {
                    reason: FailureReason::MissingDependency { .. },
                    ..
                }
            ));
            assert_eq!(leftovers(&fx.audio_dir), 0);
        }

        #[tokio::test]
        async fn test_timeout_kills_child() {
            let fx = fixture();
            let mut process = scripted(&fx, "sleep 30");
            process.config.timeout = Duration::from_millis(200);
            let start = Instant::now();
            let result = process.transcribe(artifact(&fx).await).await;
            assert!(start.elapsed() < Duration::from_secs(10));
            match result {
                TranscriptionResult::ProcessFailure { reason, raw_output } => {
                    assert_eq!(reason, FailureReason::TranscriptionError);
                    assert!(raw_output.contains("timed out"));
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }
}
