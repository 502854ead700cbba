use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use tokio::{
    sync::{mpsc, watch, Mutex},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    effects::FactTicket,
    music::{AudioEvent, AudioOutput, Playlist},
    pomodoro::{Pomodoro, PomodoroSnapshot},
    providers::{AccessToken, FactSource, PlaylistSource},
    settings::Settings,
};

use super::Mode;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Something the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ToggleTimer,
    Reset,
    SwitchMode,
    TogglePlayback,
    SkipTrack,
}

enum ControllerMessage {
    Intent(Intent),
    /// Tagged with the ticker generation that produced it.
    Tick(u64),
    PlaylistLoaded(Mode, Playlist),
    FactFetched(FactTicket, Option<String>),
}

/// External data providers. `None` means the credentials were missing and
/// the feature stays empty.
#[derive(Clone, Default)]
pub struct Providers {
    pub playlists: Option<Arc<dyn PlaylistSource>>,
    pub facts: Option<Arc<dyn FactSource>>,
}

/// Handle to the task that owns the [`Pomodoro`] core.
///
/// Intents, clock ticks, provider responses and audio events are all queued
/// to that one task and applied in arrival order.
#[derive(Clone)]
pub struct PomodoroController {
    tx: mpsc::UnboundedSender<ControllerMessage>,
    snapshot: watch::Receiver<PomodoroSnapshot>,
    cancel: CancellationToken,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl PomodoroController {
    pub fn spawn<O>(
        settings: &Settings,
        output: O,
        audio_events: mpsc::UnboundedReceiver<AudioEvent>,
        providers: Providers,
    ) -> Self
    where
        O: AudioOutput + 'static,
    {
        let core = Pomodoro::new(settings.durations(), output, settings.skip_policy());
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(core.snapshot());
        let cancel = CancellationToken::new();

        match providers.playlists {
            Some(source) => {
                let ids = [
                    (Mode::Focus, settings.playlist_id(Mode::Focus).to_string()),
                    (Mode::Break, settings.playlist_id(Mode::Break).to_string()),
                ];
                tokio::spawn(load_playlists(source, ids, tx.clone(), cancel.clone()));
            }
            None => log_warn!("No playlist provider configured; music stays empty"),
        }

        let worker = ControllerLoop {
            core,
            rx,
            audio_events,
            tx: tx.clone(),
            snapshot_tx,
            facts: providers.facts,
            cancel: cancel.clone(),
            ticker: None,
            ticker_generation: 0,
            tick_interval: settings.tick_interval(),
        };
        let handle = tokio::spawn(worker.run());

        Self {
            tx,
            snapshot: snapshot_rx,
            cancel,
            worker: Arc::new(Mutex::new(Some(handle))),
        }
    }

    pub fn send(&self, intent: Intent) -> Result<()> {
        self.tx
            .send(ControllerMessage::Intent(intent))
            .map_err(|_| anyhow!("pomodoro controller has stopped"))
    }

    pub fn snapshot(&self) -> PomodoroSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PomodoroSnapshot> {
        self.snapshot.clone()
    }

    /// Stops the ticker and the audio, drops in-flight provider responses
    /// and waits for the owner task to finish.
    pub async fn shutdown(&self) -> Result<()> {
        self.cancel.cancel();
        if let Some(handle) = self.worker.lock().await.take() {
            handle
                .await
                .context("pomodoro controller task failed to join")?;
        }
        Ok(())
    }
}

struct ControllerLoop<O> {
    core: Pomodoro<O>,
    rx: mpsc::UnboundedReceiver<ControllerMessage>,
    audio_events: mpsc::UnboundedReceiver<AudioEvent>,
    tx: mpsc::UnboundedSender<ControllerMessage>,
    snapshot_tx: watch::Sender<PomodoroSnapshot>,
    facts: Option<Arc<dyn FactSource>>,
    cancel: CancellationToken,
    ticker: Option<JoinHandle<()>>,
    ticker_generation: u64,
    tick_interval: Duration,
}

impl<O: AudioOutput> ControllerLoop<O> {
    async fn run(mut self) {
        log_info!("pomodoro controller started");

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                Some(message) = self.rx.recv() => self.handle(message),
                Some(event) = self.audio_events.recv() => self.core.audio_event(event),
            }

            self.sync_ticker();
            self.publish();
        }

        self.cancel_ticker();
        self.core.shutdown();
        self.publish();
        log_info!("pomodoro controller stopped");
    }

    fn handle(&mut self, message: ControllerMessage) {
        match message {
            ControllerMessage::Tick(generation) => {
                if generation != self.ticker_generation {
                    return;
                }
                if let Some(ticket) = self.core.tick() {
                    self.request_fact(ticket);
                }
            }
            ControllerMessage::Intent(intent) => match intent {
                Intent::ToggleTimer => self.core.toggle_timer(),
                Intent::Reset => self.core.reset(),
                Intent::SwitchMode => {
                    if let Some(ticket) = self.core.switch_mode() {
                        self.request_fact(ticket);
                    }
                }
                Intent::TogglePlayback => self.core.toggle_playback(),
                Intent::SkipTrack => self.core.skip_track(),
            },
            ControllerMessage::PlaylistLoaded(mode, playlist) => {
                self.core.playlist_loaded(mode, playlist);
            }
            ControllerMessage::FactFetched(ticket, fact) => {
                self.core.fact_received(ticket, fact);
            }
        }
    }

    fn request_fact(&self, ticket: FactTicket) {
        let Some(source) = self.facts.clone() else {
            log_info!("No fact provider configured; skipping break fact");
            return;
        };
        let tx = self.tx.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let fact = tokio::select! {
                _ = cancel.cancelled() => return,
                result = source.random_fact() => match result {
                    Ok(fact) => fact,
                    Err(err) => {
                        log_error!("Error fetching random fact: {}", err);
                        None
                    }
                },
            };
            let _ = tx.send(ControllerMessage::FactFetched(ticket, fact));
        });
    }

    /// The ticker runs exactly while the countdown is active.
    fn sync_ticker(&mut self) {
        let active = self.core.is_active();
        if active && self.ticker.is_none() {
            self.spawn_ticker();
        } else if !active && self.ticker.is_some() {
            self.cancel_ticker();
        }
    }

    fn spawn_ticker(&mut self) {
        self.ticker_generation += 1;
        let generation = self.ticker_generation;
        let tx = self.tx.clone();
        let period = self.tick_interval;

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(ControllerMessage::Tick(generation)).is_err() {
                    break;
                }
            }
        }));
    }

    fn cancel_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
        // Ticks already queued by the old ticker are ignored from here on.
        self.ticker_generation += 1;
    }

    fn publish(&self) {
        let next = self.core.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

async fn load_playlists(
    source: Arc<dyn PlaylistSource>,
    ids: [(Mode, String); 2],
    tx: mpsc::UnboundedSender<ControllerMessage>,
    cancel: CancellationToken,
) {
    let token = tokio::select! {
        _ = cancel.cancelled() => return,
        result = source.authorize() => result,
    };
    let token = match token {
        Ok(token) => token,
        Err(err) => {
            log_error!("Failed to fetch access token: {}", err);
            return;
        }
    };

    let [(first_mode, first_id), (second_mode, second_id)] = ids;
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = async {
            tokio::join!(
                fetch_playlist(source.as_ref(), &token, first_mode, &first_id, &tx),
                fetch_playlist(source.as_ref(), &token, second_mode, &second_id, &tx),
            )
        } => {}
    }
}

async fn fetch_playlist(
    source: &dyn PlaylistSource,
    token: &AccessToken,
    mode: Mode,
    playlist_id: &str,
    tx: &mpsc::UnboundedSender<ControllerMessage>,
) {
    match source.fetch_playlist(token, playlist_id).await {
        Ok(playlist) => {
            let _ = tx.send(ControllerMessage::PlaylistLoaded(mode, playlist));
        }
        Err(err) => log_error!("Failed to fetch {:?} playlist: {}", mode, err),
    }
}
