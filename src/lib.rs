mod audio;
pub mod effects;
pub mod music;
pub mod pomodoro;
pub mod providers;
pub mod settings;
pub mod timer;
mod utils;

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub use audio::AudioEngineHandle;
pub use pomodoro::{Pomodoro, PomodoroSnapshot};
pub use utils::format_time;

use providers::{FactSource, FactsClient, PlaylistSource, SpotifyClient};
use settings::{Credentials, Settings};
use timer::{
    commands::{parse_command, Command, HELP},
    PomodoroController, Providers,
};

fn providers_from(credentials: Credentials) -> Providers {
    if credentials.spotify.is_none() {
        log::warn!("Spotify credentials missing; focus and break playlists will stay empty");
    }
    if credentials.fact_api_key.is_none() {
        log::warn!("Fact API key missing; breaks will have no fact");
    }

    Providers {
        playlists: credentials
            .spotify
            .map(|creds| Arc::new(SpotifyClient::new(creds)) as Arc<dyn PlaylistSource>),
        facts: credentials
            .fact_api_key
            .map(|key| Arc::new(FactsClient::new(key)) as Arc<dyn FactSource>),
    }
}

/// Terminal front end: reads commands from stdin and prints a status line
/// whenever the state changes.
pub async fn run() -> anyhow::Result<()> {
    // Info by default; RUST_LOG overrides.
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    log::info!("Focusbeats starting up...");

    let settings = Settings::from_env()?;
    let providers = providers_from(Credentials::from_env());

    let (audio_tx, audio_rx) = mpsc::unbounded_channel();
    let engine = AudioEngineHandle::new(audio_tx, settings.volume);
    let controller = PomodoroController::spawn(&settings, engine, audio_rx, providers);

    println!("{}", HELP);
    println!("{}", controller.snapshot().status_line());

    let mut updates = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                match parse_command(&line) {
                    Some(Command::Intent(intent)) => controller.send(intent)?,
                    Some(Command::Help) => println!("{}", HELP),
                    Some(Command::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => println!("Unknown command '{}', type ? for help", line.trim()),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                println!("{}", snapshot.status_line());
            }
        }
    }

    controller.shutdown().await?;
    log::info!("Focusbeats stopped");
    Ok(())
}
