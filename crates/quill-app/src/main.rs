//! Quill application binary - composition root.
//!
//! Ties together all Quill crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Build the pipeline collaborators (microphone, Whisper process, clipboard injector)
//! 3. Spawn the dictation controller
//! 4. Feed it from the global hotkey (Windows) and the console driver
//! 5. Log controller events until Ctrl-C or `quit`

mod cli;

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use quill_audio::{MicrophoneRecorder, RecorderConfig};
use quill_core::config::QuillConfig;
use quill_core::events::DictationEvent;
use quill_dictation::{
    AlwaysGranted, ClipboardInjector, ControllerSettings, DictationCommand, DictationController,
    EnigoPaste, HotkeyConfig, HotkeyService, InjectError, InjectTimings, MemoryClipboard,
    PasteTrigger, SystemClipboard,
};
use quill_whisper::{WhisperConfig, WhisperProcess};

use cli::{CliArgs, Command};

const HOTKEY_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Stand-in paste for builds without keystroke synthesis: prints what would
/// have been pasted.
struct ConsolePaste {
    clipboard: MemoryClipboard,
}

impl PasteTrigger for ConsolePaste {
    fn paste(&self) -> Result<(), InjectError> {
        match self.clipboard.contents() {
            Some(text) => {
                println!("{}", text);
                Ok(())
            }
            None => Err(InjectError::Paste("nothing staged".into())),
        }
    }
}

/// Real clipboard and paste when available, console output otherwise.
fn build_injector(config: &QuillConfig) -> ClipboardInjector {
    let timings = InjectTimings::from(&config.inject);
    match SystemClipboard::new() {
        Ok(clipboard) => {
            ClipboardInjector::new(clipboard, EnigoPaste::new(timings.key_hold), timings)
        }
        Err(e) => {
            tracing::warn!(error = %e, "System clipboard unavailable; transcripts will be printed");
            let clipboard = MemoryClipboard::new();
            let paste = ConsolePaste {
                clipboard: clipboard.clone(),
            };
            ClipboardInjector::new(clipboard, paste, InjectTimings::immediate())
        }
    }
}

/// Log every controller event; optionally mirror it to stdout as JSON.
async fn log_events(events: BroadcastStream<DictationEvent>, json: bool) {
    tokio::pin!(events);
    while let Some(item) = events.next().await {
        let event = match item {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Event logger fell behind");
                continue;
            }
        };

        match &event {
            DictationEvent::RemediationNotice { tool, message, .. } => {
                tracing::warn!(tool = %tool, "{}", message)
            }
            DictationEvent::CycleFailed { kind, status, .. } => {
                tracing::info!(kind = %kind, "{}", status)
            }
            other => tracing::info!(event = other.event_name(), "Dictation event"),
        }

        if json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!(error = %e, "Failed to serialize event"),
            }
        }
    }
}

/// Poll the global hotkey on a blocking thread and forward its edges.
fn spawn_hotkey_listener(config: HotkeyConfig, commands: mpsc::Sender<DictationCommand>) {
    // HotkeyService holds OS handles that are not Send, so it lives on its own thread.
    tokio::task::spawn_blocking(move || {
        let service = match HotkeyService::new(config) {
            Ok(service) => service,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to register dictation hotkey");
                return;
            }
        };
        if !service.is_supported() {
            tracing::info!("Global hotkey unavailable on this platform; use the console driver");
            return;
        }

        while !commands.is_closed() {
            if let Some(event) = service.poll() {
                tracing::debug!(?event, "Hotkey");
                if commands.blocking_send(event.into()).is_err() {
                    break;
                }
            }
            std::thread::sleep(HOTKEY_POLL_INTERVAL);
        }
    });
}

/// Map one console line to a controller command. `None` means quit.
fn parse_console_line(line: &str) -> Option<Option<DictationCommand>> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "press" => Some(Some(DictationCommand::HotkeyPressed)),
        "r" | "release" => Some(Some(DictationCommand::HotkeyReleased)),
        "t" | "toggle" | "" => Some(Some(DictationCommand::Toggle)),
        "q" | "quit" | "exit" => None,
        other => {
            tracing::warn!(input = %other, "Unknown command (press, release, toggle, quit)");
            Some(None)
        }
    }
}

/// Read commands from stdin on a plain thread; blocking reads cannot be
/// cancelled, so this thread is left detached at exit.
fn spawn_console_driver(commands: mpsc::Sender<DictationCommand>, quit: oneshot::Sender<()>) {
    let spawned = std::thread::Builder::new()
        .name("quill-console".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match parse_console_line(&line) {
                    Some(Some(command)) => {
                        if commands.blocking_send(command).is_err() {
                            return;
                        }
                    }
                    Some(None) => {}
                    None => {
                        let _ = quit.send(());
                        return;
                    }
                }
            }
            tracing::debug!("Console input closed");
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "Console driver unavailable");
    }
}

async fn run(config: QuillConfig, json_events: bool) -> Result<(), Box<dyn std::error::Error>> {
    let recorder = MicrophoneRecorder::new(RecorderConfig {
        artifact_path: config.audio.artifact_path(),
        device_name: config.audio.device_name.clone(),
    });
    let transcriber = WhisperProcess::new(WhisperConfig::from(&config.transcription));
    let injector = build_injector(&config);

    // No up-front permission probe; denials show up as capture or paste errors.
    let handle = DictationController::new(
        recorder,
        transcriber,
        injector,
        AlwaysGranted,
        ControllerSettings::from(&config.dictation),
    )
    .spawn();

    let logger = tokio::spawn(log_events(
        BroadcastStream::new(handle.subscribe()),
        json_events,
    ));

    spawn_hotkey_listener(HotkeyConfig::from(&config.dictation), handle.commands());

    let (quit_tx, quit_rx) = oneshot::channel();
    spawn_console_driver(handle.commands(), quit_tx);
    tracing::info!(
        hotkey = %config.dictation.hotkey,
        "Ready. Hold the hotkey, or type press/release/toggle/quit"
    );

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Ctrl-C handler failed");
            }
            tracing::info!("Interrupt received, shutting down");
        }
        Ok(()) = quit_rx => tracing::info!("Quit requested"),
    }

    handle.shutdown().await?;
    let _ = logger.await;
    Ok(())
}

async fn test_insert(config: &QuillConfig, text: String) -> Result<(), Box<dyn std::error::Error>> {
    let injector = Arc::new(build_injector(config));
    tracing::info!(text_len = text.len(), "Test insert");
    injector.deliver(text).await?;
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !force {
        return Err(format!("{} already exists (use --force to overwrite)", path.display()).into());
    }
    QuillConfig::default().save(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let config_file = args.resolve_config_path();
    let (config, load_error) = match QuillConfig::load(&config_file) {
        Ok(config) => (config, None),
        Err(e) => (QuillConfig::default(), Some(e)),
    };

    // Tracing.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::new(&level))
        .init();

    tracing::info!("Starting Quill v{}", env!("CARGO_PKG_VERSION"));
    match load_error {
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Using default configuration"
        ),
    }

    match args.command() {
        Command::Run => run(config, args.json_events).await,
        Command::TestInsert { text } => test_insert(&config, text).await,
        Command::InitConfig { force } => init_config(&config_file, force),
    }
}
