//! rodio-backed output for preview clips.
//!
//! rodio's `OutputStream` is not `Send`, so the stream and the sink live on a
//! dedicated thread fed through a command channel. Clip bytes are downloaded
//! on the tokio runtime and handed to that thread once complete.

use std::io::Cursor;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    mpsc::{self, RecvTimeoutError, Sender},
    Arc, Mutex,
};
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tokio::sync::mpsc::UnboundedSender;

use crate::music::{AudioEvent, AudioOutput, PlaybackError, PlaybackId};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// How often the audio thread checks whether the current clip has drained.
const END_POLL_INTERVAL: Duration = Duration::from_millis(200);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);
/// Stored in `latest` when nothing should be playing.
const NO_CLIP: PlaybackId = 0;

enum AudioCommand {
    Play { id: PlaybackId, bytes: Vec<u8> },
    Pause,
    Stop,
}

pub struct AudioEngineHandle {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
    events: UnboundedSender<AudioEvent>,
    /// Id of the most recent load request; older downloads are dropped.
    latest: Arc<AtomicU64>,
    http: reqwest::Client,
    volume: f32,
}

impl AudioEngineHandle {
    pub fn new(events: UnboundedSender<AudioEvent>, volume: f32) -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            events,
            latest: Arc::new(AtomicU64::new(NO_CLIP)),
            http: reqwest::Client::new(),
            volume: volume.clamp(0.0, 1.0),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, PlaybackError> {
        let mut guard = self
            .tx
            .lock()
            .map_err(|e| PlaybackError::EngineUnavailable(e.to_string()))?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();
        let events = self.events.clone();
        let latest = Arc::clone(&self.latest);
        let volume = self.volume;

        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let mut stream: Option<(OutputStream, OutputStreamHandle)> = None;
                let mut sink: Option<Sink> = None;
                let mut current: Option<PlaybackId> = None;

                loop {
                    match rx.recv_timeout(END_POLL_INTERVAL) {
                        Ok(AudioCommand::Play { id, bytes }) => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            current = None;
                            if latest.load(Ordering::SeqCst) != id {
                                continue;
                            }
                            match start_clip(&mut stream, bytes, volume) {
                                Ok(new_sink) => {
                                    sink = Some(new_sink);
                                    current = Some(id);
                                    let _ = events.send(AudioEvent::Started(id));
                                }
                                Err(err) => {
                                    log_warn!("clip {} failed to start: {}", id, err);
                                    let _ = events.send(AudioEvent::Failed {
                                        id,
                                        reason: err.to_string(),
                                    });
                                }
                            }
                        }
                        Ok(AudioCommand::Pause) => {
                            if let Some(ref s) = sink {
                                s.pause();
                            }
                        }
                        Ok(AudioCommand::Stop) => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            current = None;
                        }
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }

                    if let (Some(id), Some(s)) = (current, sink.as_ref()) {
                        if s.empty() {
                            current = None;
                            let _ = events.send(AudioEvent::Ended(id));
                        }
                    }
                }

                log_info!("audio engine thread exiting");
            })
            .map_err(|e| PlaybackError::EngineUnavailable(e.to_string()))?;

        let tx_clone = tx.clone();
        *guard = Some(tx);
        Ok(tx_clone)
    }

    fn send_if_running(&self, command: AudioCommand) {
        if let Ok(Some(tx)) = self.tx.lock().map(|g| g.clone()) {
            let _ = tx.send(command);
        }
    }
}

impl AudioOutput for AudioEngineHandle {
    fn load(&mut self, id: PlaybackId, url: &str) -> Result<(), PlaybackError> {
        let tx = self.ensure_thread()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| PlaybackError::EngineUnavailable(e.to_string()))?;

        self.latest.store(id, Ordering::SeqCst);

        let http = self.http.clone();
        let url = url.to_string();
        let events = self.events.clone();
        let latest = Arc::clone(&self.latest);

        runtime.spawn(async move {
            match download(&http, &url).await {
                Ok(bytes) => {
                    if latest.load(Ordering::SeqCst) != id {
                        log_info!("dropping superseded clip {}", id);
                        return;
                    }
                    if tx.send(AudioCommand::Play { id, bytes }).is_err() {
                        let _ = events.send(AudioEvent::Failed {
                            id,
                            reason: "audio engine stopped".into(),
                        });
                    }
                }
                Err(err) => {
                    if latest.load(Ordering::SeqCst) != id {
                        log_info!("ignoring failed download of superseded clip {}", id);
                        return;
                    }
                    log_error!("clip {} download failed: {}", id, err);
                    let _ = events.send(AudioEvent::Failed {
                        id,
                        reason: err.to_string(),
                    });
                }
            }
        });

        Ok(())
    }

    fn pause(&mut self) {
        self.latest.store(NO_CLIP, Ordering::SeqCst);
        self.send_if_running(AudioCommand::Pause);
    }

    fn stop(&mut self) {
        self.latest.store(NO_CLIP, Ordering::SeqCst);
        self.send_if_running(AudioCommand::Stop);
    }
}

async fn download(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, PlaybackError> {
    let response = http
        .get(url)
        .timeout(DOWNLOAD_TIMEOUT)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| PlaybackError::Download(e.to_string()))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PlaybackError::Download(e.to_string()))?;
    Ok(bytes.to_vec())
}

fn start_clip(
    stream: &mut Option<(OutputStream, OutputStreamHandle)>,
    bytes: Vec<u8>,
    volume: f32,
) -> Result<Sink, PlaybackError> {
    if stream.is_none() {
        let pair = OutputStream::try_default().map_err(|e| {
            PlaybackError::EngineUnavailable(format!("Failed to create audio output stream: {}", e))
        })?;
        *stream = Some(pair);
    }
    let Some((_, handle)) = stream.as_ref() else {
        return Err(PlaybackError::EngineUnavailable("no output stream".into()));
    };

    let source =
        Decoder::new(Cursor::new(bytes)).map_err(|e| PlaybackError::Decode(e.to_string()))?;
    let sink = Sink::try_new(handle).map_err(|e| {
        PlaybackError::EngineUnavailable(format!("Failed to create audio sink: {}", e))
    })?;
    sink.set_volume(volume);
    sink.append(source);
    sink.play();
    Ok(sink)
}
