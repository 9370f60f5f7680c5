//! Controller unit for the media keys pipeline.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{MediaKeyEvent, MediaKeyRecord, MediaKeysError};
use crate::native::{InputDriver, RawHandle};

/// Commands accepted by the controller task.
pub(crate) enum MediaKeysCommand {
    StartListening {
        response_tx: oneshot::Sender<Result<(), MediaKeysError>>,
    },
    StopListening {
        response_tx: oneshot::Sender<Result<(), MediaKeysError>>,
    },
    Shutdown {
        response_tx: oneshot::Sender<Result<(), MediaKeysError>>,
    },
}

/// Translate one decoded record into the events it implies.
///
/// A hardware repeat collapses to a bare press; a fresh down edge is both a
/// down and a press, matching how hosts consume media keys (act on press,
/// track held state via down/up).
pub(crate) fn translate(record: &MediaKeyRecord) -> Vec<MediaKeyEvent> {
    if record.is_repeat {
        vec![MediaKeyEvent::KeyPress(record.key)]
    } else if record.pressed {
        vec![
            MediaKeyEvent::KeyDown(record.key),
            MediaKeyEvent::KeyPress(record.key),
        ]
    } else {
        vec![MediaKeyEvent::KeyUp(record.key)]
    }
}

pub(crate) struct MediaKeysController<D: InputDriver> {
    driver: Arc<D>,
    handle: RawHandle,
    commands: mpsc::Receiver<MediaKeysCommand>,
    records: mpsc::Receiver<MediaKeyRecord>,
    events: Option<mpsc::Sender<MediaKeyEvent>>,
    listener: Option<JoinHandle<()>>,
    listener_down: bool,
}

impl<D: InputDriver> MediaKeysController<D> {
    pub(crate) fn new(
        driver: Arc<D>,
        handle: RawHandle,
        commands: mpsc::Receiver<MediaKeysCommand>,
        records: mpsc::Receiver<MediaKeyRecord>,
        events: mpsc::Sender<MediaKeyEvent>,
        listener: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            driver,
            handle,
            commands,
            records,
            events: Some(events),
            listener,
            listener_down: false,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Media keys controller started");

        loop {
            let listener_up = !self.listener_down;

            // Commands take priority over records so a shutdown request is
            // never misread as a listener failure when both arrive together.
            tokio::select! {
                biased;

                command = self.commands.recv() => {
                    match command {
                        Some(command) => {
                            if self.handle_command(command).await {
                                break;
                            }
                        }
                        None => {
                            debug!("Command channel closed, shutting down media keys pipeline");
                            if let Err(e) = self.shutdown().await {
                                warn!("Implicit media keys shutdown failed: {}", e);
                            }
                            break;
                        }
                    }
                }
                record = self.records.recv(), if listener_up => {
                    match record {
                        Some(record) => self.handle_record(record).await,
                        None => self.mark_listener_failed(),
                    }
                }
            }
        }

        info!("Media keys controller stopped");
    }

    /// Returns true when the controller should exit its loop.
    async fn handle_command(&mut self, command: MediaKeysCommand) -> bool {
        match command {
            MediaKeysCommand::StartListening { response_tx } => {
                let result = if self.listener_down {
                    Err(MediaKeysError::ListenerFailed)
                } else {
                    self.driver.start_listening(self.handle);
                    Ok(())
                };
                let _ = response_tx.send(result);
                false
            }
            MediaKeysCommand::StopListening { response_tx } => {
                let result = if self.listener_down {
                    Err(MediaKeysError::ListenerFailed)
                } else {
                    self.driver.stop_listening(self.handle);
                    Ok(())
                };
                let _ = response_tx.send(result);
                false
            }
            MediaKeysCommand::Shutdown { response_tx } => {
                let result = self.shutdown().await;
                let _ = response_tx.send(result);
                true
            }
        }
    }

    async fn handle_record(&mut self, record: MediaKeyRecord) {
        debug!(
            "Media key record: {} pressed={} repeat={}",
            record.key, record.pressed, record.is_repeat
        );
        for event in translate(&record) {
            self.emit(event).await;
        }
    }

    async fn emit(&mut self, event: MediaKeyEvent) {
        if let Some(events) = &self.events {
            if events.send(event).await.is_err() {
                debug!("Event receiver dropped, discarding further media key events");
                self.events = None;
            }
        }
    }

    fn mark_listener_failed(&mut self) {
        error!("Media keys listener exited unexpectedly");
        self.listener_down = true;
        self.events = None;
    }

    async fn shutdown(&mut self) -> Result<(), MediaKeysError> {
        self.events = None;

        if self.listener_down {
            if let Some(listener) = self.listener.take() {
                let _ = listener.await;
            }
            return Err(MediaKeysError::ListenerFailed);
        }

        self.driver.destroy(self.handle);

        while let Some(record) = self.records.recv().await {
            debug!("Discarding in-flight record during shutdown: {}", record.key);
        }

        if let Some(listener) = self.listener.take() {
            listener
                .await
                .map_err(|e| MediaKeysError::ChannelError(e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_keys::{MediaKeyCode, MediaKeyMessage};
    use crate::native::DriverRecord;
    use chrono::Local;

    fn record(key: MediaKeyCode, pressed: bool, repeat: bool) -> MediaKeyRecord {
        MediaKeyMessage {
            is_destroy_notification: false,
            pressed_down: pressed,
            key_code: key.code(),
            key_flags: 0,
            key_repeat: repeat,
        }
        .decode(Local::now())
    }

    #[test]
    fn fresh_press_is_down_then_press() {
        let events = translate(&record(MediaKeyCode::PLAY, true, false));
        assert_eq!(
            events,
            vec![
                MediaKeyEvent::KeyDown(MediaKeyCode::PLAY),
                MediaKeyEvent::KeyPress(MediaKeyCode::PLAY),
            ]
        );
    }

    #[test]
    fn hardware_repeat_is_a_bare_press() {
        let events = translate(&record(MediaKeyCode::NEXT, true, true));
        assert_eq!(events, vec![MediaKeyEvent::KeyPress(MediaKeyCode::NEXT)]);
    }

    #[test]
    fn release_is_up() {
        let events = translate(&record(MediaKeyCode::PREVIOUS, false, false));
        assert_eq!(events, vec![MediaKeyEvent::KeyUp(MediaKeyCode::PREVIOUS)]);
    }

    #[test]
    fn unknown_key_codes_pass_through() {
        let events = translate(&record(MediaKeyCode::from_code(42), true, false));
        assert_eq!(
            events,
            vec![
                MediaKeyEvent::KeyDown(MediaKeyCode::from_code(42)),
                MediaKeyEvent::KeyPress(MediaKeyCode::from_code(42)),
            ]
        );
    }
}
