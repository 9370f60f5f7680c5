//! Host-facing facade for the media keys pipeline.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::info;

use super::controller::{MediaKeysCommand, MediaKeysController};
use super::{MediaKeyEvent, MediaKeyMessage, MediaKeysError};
use crate::config::MediaKeysConfig;
use crate::listener;
use crate::native::media_keys_lib::MediaKeysLibrary;
use crate::native::InputDriver;
use crate::platform::PlatformSupport;

const COMMAND_CHANNEL_CAPACITY: usize = 16;
const RECORD_CHANNEL_CAPACITY: usize = 256;

/// Handle to a running media keys pipeline.
///
/// Same lifecycle as the remote control facade: `open` loads the wrapper
/// library and spawns the listener and controller tasks, `shutdown` tears
/// everything down and waits for the tasks to finish.
pub struct MediaKeysHandle {
    commands: mpsc::Sender<MediaKeysCommand>,
    controller: Option<JoinHandle<()>>,
}

impl MediaKeysHandle {
    /// Open the configured wrapper library and start the pipeline.
    pub fn open(
        config: &MediaKeysConfig,
        platform: PlatformSupport,
        events: mpsc::Sender<MediaKeyEvent>,
    ) -> Result<Self, MediaKeysError> {
        if !platform.media_keys {
            return Err(MediaKeysError::Unsupported);
        }

        let driver = MediaKeysLibrary::open(&config.library_path)?;
        Self::spawn(Arc::new(driver), config, events)
    }

    /// Start the pipeline on top of an already-constructed driver. The
    /// config carries no media keys tuning today; the keyboard repeats in
    /// hardware, so there is no timer counterpart to the remote control
    /// autorepeat settings.
    pub fn spawn<D>(
        driver: Arc<D>,
        _config: &MediaKeysConfig,
        events: mpsc::Sender<MediaKeyEvent>,
    ) -> Result<Self, MediaKeysError>
    where
        D: InputDriver<Record = MediaKeyMessage>,
    {
        let handle = driver.create()?;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (record_tx, record_rx) = mpsc::channel(RECORD_CHANNEL_CAPACITY);

        let listener = listener::spawn(Arc::clone(&driver), handle, record_tx);
        let controller = MediaKeysController::new(
            driver,
            handle,
            command_rx,
            record_rx,
            events,
            Some(listener),
        );
        let controller = tokio::spawn(controller.run());

        info!("Media keys pipeline started");
        Ok(Self {
            commands: command_tx,
            controller: Some(controller),
        })
    }

    /// Ask the native side to start delivering media key records.
    pub async fn start_listening(&self) -> Result<(), MediaKeysError> {
        self.send(|response_tx| MediaKeysCommand::StartListening { response_tx })
            .await
    }

    /// Ask the native side to stop delivering media key records.
    pub async fn stop_listening(&self) -> Result<(), MediaKeysError> {
        self.send(|response_tx| MediaKeysCommand::StopListening { response_tx })
            .await
    }

    /// Tear down the pipeline and wait for its tasks to finish. No events
    /// are delivered after this returns.
    pub async fn shutdown(&mut self) -> Result<(), MediaKeysError> {
        let controller = self
            .controller
            .take()
            .ok_or(MediaKeysError::AlreadyShutDown)?;

        let (response_tx, response_rx) = oneshot::channel();
        let result = match self
            .commands
            .send(MediaKeysCommand::Shutdown { response_tx })
            .await
        {
            Ok(()) => match response_rx.await {
                Ok(result) => result,
                Err(e) => Err(MediaKeysError::ChannelError(e.to_string())),
            },
            Err(e) => Err(MediaKeysError::ChannelError(e.to_string())),
        };

        controller
            .await
            .map_err(|e| MediaKeysError::ChannelError(e.to_string()))?;
        result
    }

    async fn send<F>(&self, make: F) -> Result<(), MediaKeysError>
    where
        F: FnOnce(oneshot::Sender<Result<(), MediaKeysError>>) -> MediaKeysCommand,
    {
        if self.controller.is_none() {
            return Err(MediaKeysError::AlreadyShutDown);
        }

        let (response_tx, response_rx) = oneshot::channel();
        self.commands
            .send(make(response_tx))
            .await
            .map_err(|e| MediaKeysError::ChannelError(e.to_string()))?;
        response_rx
            .await
            .map_err(|e| MediaKeysError::ChannelError(e.to_string()))?
    }
}
