//! Host-facing facade for the remote control pipeline.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::info;

use super::controller::{RemoteCommand, RemoteController};
use super::{RemoteError, RemoteEvent, RemoteMessage};
use crate::config::RemoteControlConfig;
use crate::listener;
use crate::native::remote_lib::RemoteLibrary;
use crate::native::InputDriver;
use crate::platform::PlatformSupport;

const COMMAND_CHANNEL_CAPACITY: usize = 16;
const RECORD_CHANNEL_CAPACITY: usize = 256;

/// Handle to a running remote control pipeline.
///
/// Created with [`RemoteControlHandle::open`], which loads the wrapper
/// library, creates the native object and spawns the listener and controller
/// tasks. Events arrive on the `events` channel passed to `open`; the
/// channel closing without a prior [`shutdown`](Self::shutdown) call means
/// the listener failed and the pipeline is unusable.
pub struct RemoteControlHandle {
    commands: mpsc::Sender<RemoteCommand>,
    controller: Option<JoinHandle<()>>,
}

impl RemoteControlHandle {
    /// Open the configured wrapper library and start the pipeline.
    ///
    /// Fails with [`RemoteError::Unsupported`] when the platform has no
    /// remote control support, and with a native error when the library
    /// cannot be loaded or refuses to create a handle.
    pub fn open(
        config: &RemoteControlConfig,
        platform: PlatformSupport,
        events: mpsc::Sender<RemoteEvent>,
    ) -> Result<Self, RemoteError> {
        if !platform.remote_control {
            return Err(RemoteError::Unsupported);
        }

        let driver = RemoteLibrary::open(&config.library_path)?;
        Self::spawn(Arc::new(driver), config, events)
    }

    /// Start the pipeline on top of an already-constructed driver.
    pub fn spawn<D>(
        driver: Arc<D>,
        config: &RemoteControlConfig,
        events: mpsc::Sender<RemoteEvent>,
    ) -> Result<Self, RemoteError>
    where
        D: InputDriver<Record = RemoteMessage>,
    {
        let handle = driver.create()?;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (record_tx, record_rx) = mpsc::channel(RECORD_CHANNEL_CAPACITY);

        let listener = listener::spawn(Arc::clone(&driver), handle, record_tx);
        let controller = RemoteController::new(
            driver,
            handle,
            command_rx,
            record_rx,
            events,
            &config.autorepeat,
            Some(listener),
        );
        let controller = tokio::spawn(controller.run());

        info!("Remote control pipeline started");
        Ok(Self {
            commands: command_tx,
            controller: Some(controller),
        })
    }

    /// Ask the native side to start delivering input records.
    pub async fn start_listening(&self) -> Result<(), RemoteError> {
        self.send(|response_tx| RemoteCommand::StartListening { response_tx })
            .await
    }

    /// Ask the native side to stop delivering input records. The pipeline
    /// stays alive and listening can be resumed later.
    pub async fn stop_listening(&self) -> Result<(), RemoteError> {
        self.send(|response_tx| RemoteCommand::StopListening { response_tx })
            .await
    }

    /// Tear down the pipeline: destroy the native handle, wait for the
    /// listener and controller tasks to finish, then return. No events are
    /// delivered after this returns.
    pub async fn shutdown(&mut self) -> Result<(), RemoteError> {
        let controller = self
            .controller
            .take()
            .ok_or(RemoteError::AlreadyShutDown)?;

        let (response_tx, response_rx) = oneshot::channel();
        let result = match self
            .commands
            .send(RemoteCommand::Shutdown { response_tx })
            .await
        {
            Ok(()) => match response_rx.await {
                Ok(result) => result,
                Err(e) => Err(RemoteError::ChannelError(e.to_string())),
            },
            Err(e) => Err(RemoteError::ChannelError(e.to_string())),
        };

        controller
            .await
            .map_err(|e| RemoteError::ChannelError(e.to_string()))?;
        result
    }

    async fn send<F>(&self, make: F) -> Result<(), RemoteError>
    where
        F: FnOnce(oneshot::Sender<Result<(), RemoteError>>) -> RemoteCommand,
    {
        if self.controller.is_none() {
            return Err(RemoteError::AlreadyShutDown);
        }

        let (response_tx, response_rx) = oneshot::channel();
        self.commands
            .send(make(response_tx))
            .await
            .map_err(|e| RemoteError::ChannelError(e.to_string()))?;
        response_rx
            .await
            .map_err(|e| RemoteError::ChannelError(e.to_string()))?
    }
}
