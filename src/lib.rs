//! Bridge between blocking native input wrapper libraries and an async
//! event stream.
//!
//! Two device families are supported, each with its own pipeline:
//!
//! ```text
//! wrapper library --(blocking get_message)--> listener task
//!     listener --(decoded records, mpsc)--> controller task
//!     controller --(semantic events, mpsc)--> host
//! ```
//!
//! The listener runs the blocking read loop on the blocking thread pool and
//! does nothing but decode and forward. The controller owns the native
//! handle, serves facade commands and, for the remote control family, runs
//! the software autorepeat timers. Shutdown destroys the native handle,
//! which forces the blocked read to return a sentinel, and is only
//! acknowledged once both tasks have exited.
//!
//! ```no_run
//! use remotekeys::config::BridgeConfig;
//! use remotekeys::platform::PlatformSupport;
//! use remotekeys::remote::RemoteControlHandle;
//! use tokio::sync::mpsc;
//!
//! # async fn run() -> Result<(), remotekeys::remote::RemoteError> {
//! let config = BridgeConfig::default();
//! let (event_tx, mut event_rx) = mpsc::channel(config.event_capacity);
//!
//! let mut remote =
//!     RemoteControlHandle::open(&config.remote_control, PlatformSupport::detect(), event_tx)?;
//! remote.start_listening().await?;
//!
//! while let Some(event) = event_rx.recv().await {
//!     println!("{:?}", event);
//! }
//!
//! remote.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod listener;
pub mod media_keys;
pub mod native;
pub mod platform;
pub mod remote;
