//! Controller unit for the remote control pipeline.
//!
//! Owns the native handle and the autorepeat timers, consumes decoded
//! records from the listener and commands from the facade, and emits
//! semantic events to the host.

use std::future::poll_fn;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::autorepeat::Autorepeat;
use super::{RemoteError, RemoteEvent, RemoteRecord};
use crate::config::AutorepeatConfig;
use crate::native::{InputDriver, RawHandle};

/// Commands accepted by the controller task. Every command carries a reply
/// channel so the facade can surface failures to the caller.
pub(crate) enum RemoteCommand {
    StartListening {
        response_tx: oneshot::Sender<Result<(), RemoteError>>,
    },
    StopListening {
        response_tx: oneshot::Sender<Result<(), RemoteError>>,
    },
    Shutdown {
        response_tx: oneshot::Sender<Result<(), RemoteError>>,
    },
}

pub(crate) struct RemoteController<D: InputDriver> {
    driver: Arc<D>,
    handle: RawHandle,
    commands: mpsc::Receiver<RemoteCommand>,
    records: mpsc::Receiver<RemoteRecord>,
    /// Dropped on shutdown or listener failure so the host sees the stream
    /// close.
    events: Option<mpsc::Sender<RemoteEvent>>,
    autorepeat: Autorepeat,
    listener: Option<JoinHandle<()>>,
    listener_down: bool,
}

impl<D: InputDriver> RemoteController<D> {
    pub(crate) fn new(
        driver: Arc<D>,
        handle: RawHandle,
        commands: mpsc::Receiver<RemoteCommand>,
        records: mpsc::Receiver<RemoteRecord>,
        events: mpsc::Sender<RemoteEvent>,
        autorepeat: &AutorepeatConfig,
        listener: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            driver,
            handle,
            commands,
            records,
            events: Some(events),
            autorepeat: Autorepeat::new(autorepeat),
            listener,
            listener_down: false,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Remote controller started");

        loop {
            let listener_up = !self.listener_down;
            let autorepeat_armed = !self.autorepeat.is_idle();

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
                            // Facade dropped without an explicit shutdown.
                            debug!("Command channel closed, shutting down remote pipeline");
                            if let Err(e) = self.shutdown().await {
                                warn!("Implicit remote shutdown failed: {}", e);
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
                fired = poll_fn(|cx| self.autorepeat.poll_fired(cx)), if autorepeat_armed => {
                    if let Some(button) = fired {
                        self.emit(RemoteEvent::ButtonPress(button)).await;
                        self.autorepeat.rearm(button);
                    }
                }
            }
        }

        info!("Remote controller stopped");
    }

    /// Returns true when the controller should exit its loop.
    async fn handle_command(&mut self, command: RemoteCommand) -> bool {
        match command {
            RemoteCommand::StartListening { response_tx } => {
                let result = if self.listener_down {
                    Err(RemoteError::ListenerFailed)
                } else {
                    self.driver.start_listening(self.handle);
                    Ok(())
                };
                let _ = response_tx.send(result);
                false
            }
            RemoteCommand::StopListening { response_tx } => {
                let result = if self.listener_down {
                    Err(RemoteError::ListenerFailed)
                } else {
                    self.driver.stop_listening(self.handle);
                    Ok(())
                };
                let _ = response_tx.send(result);
                false
            }
            RemoteCommand::Shutdown { response_tx } => {
                let result = self.shutdown().await;
                let _ = response_tx.send(result);
                true
            }
        }
    }

    async fn handle_record(&mut self, record: RemoteRecord) {
        if record.pressed {
            debug!("Button down: {}", record.button);
            self.emit(RemoteEvent::ButtonDown(record.button)).await;
            // The first press fires with the down edge; the armed timer only
            // covers the repeats.
            self.emit(RemoteEvent::ButtonPress(record.button)).await;
            self.autorepeat.press(record.button);
        } else {
            debug!("Button up: {}", record.button);
            self.autorepeat.release(record.button);
            self.emit(RemoteEvent::ButtonUp(record.button)).await;
        }
    }

    async fn emit(&mut self, event: RemoteEvent) {
        if let Some(events) = &self.events {
            if events.send(event).await.is_err() {
                debug!("Event receiver dropped, discarding further remote events");
                self.events = None;
            }
        }
    }

    /// The listener exited without a shutdown request. The native handle is
    /// in an unknown state, so no further foreign calls are made against it.
    fn mark_listener_failed(&mut self) {
        error!("Remote listener exited unexpectedly");
        self.listener_down = true;
        self.autorepeat.clear();
        self.events = None;
    }

    /// Tear down the pipeline: destroy the native handle exactly once, wait
    /// for the listener to observe the sentinel and exit, then acknowledge.
    /// Records still in flight during teardown are discarded.
    async fn shutdown(&mut self) -> Result<(), RemoteError> {
        self.autorepeat.clear();
        self.events = None;

        if self.listener_down {
            if let Some(listener) = self.listener.take() {
                let _ = listener.await;
            }
            return Err(RemoteError::ListenerFailed);
        }

        self.driver.destroy(self.handle);

        while let Some(record) = self.records.recv().await {
            debug!("Discarding in-flight record during shutdown: {}", record.button);
        }

        if let Some(listener) = self.listener.take() {
            listener
                .await
                .map_err(|e| RemoteError::ChannelError(e.to_string()))?;
        }

        Ok(())
    }
}
