use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Stops the acquisition loop behind `abort_signal` once `run_for_millis` elapses or,
/// without a time to live, on Ctrl+C. Abort the returned handle to disarm it.
pub(crate) fn listen_for_shutdown(
    abort_signal: Arc<Notify>,
    run_for_millis: Option<u64>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match run_for_millis {
            Some(time_to_live) => {
                tokio::time::sleep(Duration::from_millis(time_to_live)).await;
                log::debug!("Acquisition time of {time_to_live} ms elapsed");
            }
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Error while waiting for Ctrl+C: {e}");
                    return;
                }
                log::info!("Ctrl+C received, stopping accelerometer");
            }
        }
        // Stored as a permit if the loop isn't waiting right now
        abort_signal.notify_one();
    })
}
