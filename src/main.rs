use color_eyre::Result;
use remotekeys::config::BridgeConfig;
use remotekeys::media_keys::MediaKeysHandle;
use remotekeys::platform::PlatformSupport;
use remotekeys::remote::RemoteControlHandle;
use tokio::sync::mpsc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config_path = BridgeConfig::default_path();
    let config = BridgeConfig::load_or_create(&config_path)?;
    info!("Loaded config from {}", config_path.display());

    let platform = PlatformSupport::detect();
    info!(
        "Platform support: remote_control={} media_keys={}",
        platform.remote_control, platform.media_keys
    );

    let (remote_tx, mut remote_rx) = mpsc::channel(config.event_capacity);
    let (media_tx, mut media_rx) = mpsc::channel(config.event_capacity);

    let mut remote = match RemoteControlHandle::open(&config.remote_control, platform, remote_tx) {
        Ok(handle) => {
            handle.start_listening().await?;
            Some(handle)
        }
        Err(e) => {
            warn!("Remote control unavailable: {}", e);
            None
        }
    };

    let mut media_keys = match MediaKeysHandle::open(&config.media_keys, platform, media_tx) {
        Ok(handle) => {
            handle.start_listening().await?;
            Some(handle)
        }
        Err(e) => {
            warn!("Media keys unavailable: {}", e);
            None
        }
    };

    if remote.is_none() && media_keys.is_none() {
        warn!("No input pipelines available, exiting");
        return Ok(());
    }

    info!("Listening for input events, press ctrl-c to exit");

    let mut remote_open = remote.is_some();
    let mut media_open = media_keys.is_some();
    loop {
        tokio::select! {
            event = remote_rx.recv(), if remote_open => {
                match event {
                    Some(event) => info!("Remote: {:?}", event),
                    None => {
                        error!("Remote event stream closed");
                        remote_open = false;
                    }
                }
            }
            event = media_rx.recv(), if media_open => {
                match event {
                    Some(event) => info!("Media keys: {:?}", event),
                    None => {
                        error!("Media keys event stream closed");
                        media_open = false;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }

        if !remote_open && !media_open {
            error!("All event streams closed, exiting");
            break;
        }
    }

    if let Some(handle) = remote.as_mut() {
        if let Err(e) = handle.shutdown().await {
            error!("Remote shutdown failed: {}", e);
        }
    }
    if let Some(handle) = media_keys.as_mut() {
        if let Err(e) = handle.shutdown().await {
            error!("Media keys shutdown failed: {}", e);
        }
    }

    info!("Goodbye");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
