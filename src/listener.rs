//! Listener unit: the blocking read loop bridging a native wrapper library
//! into the async pipeline.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::native::{DriverRecord, InputDriver, RawHandle};

const STATS_INTERVAL_SECS: i64 = 10;

/// Spawn the blocking read loop for `handle` on the blocking thread pool.
///
/// The loop calls the driver's blocking read, decodes each record with an
/// arrival timestamp and forwards it over `records`. It exits when the
/// driver delivers the shutdown sentinel (pushed by `destroy`) or when the
/// receiving side of `records` is gone. The handle itself is never touched
/// beyond reading; destroying it is the controller's job.
pub(crate) fn spawn<D: InputDriver>(
    driver: Arc<D>,
    handle: RawHandle,
    records: mpsc::Sender<<D::Record as DriverRecord>::Decoded>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        info!("Listener started for handle {:#x}", handle.address());

        let mut record_count: u64 = 0;
        let mut last_stats = Local::now();

        loop {
            let record = driver.next_record(handle);

            if record.is_shutdown_sentinel() {
                info!(
                    "Listener received shutdown notification after {} records",
                    record_count
                );
                break;
            }

            let received_at = Local::now();
            record_count += 1;

            if records.blocking_send(record.decode(received_at)).is_err() {
                warn!("Record channel closed, stopping listener");
                break;
            }

            let elapsed = received_at.signed_duration_since(last_stats);
            if elapsed.num_seconds() >= STATS_INTERVAL_SECS {
                debug!(
                    "Listener stats: {} records total, last in {}s window",
                    record_count,
                    elapsed.num_seconds()
                );
                last_stats = received_at;
            }
        }

        debug!("Listener loop finished for handle {:#x}", handle.address());
    })
}
