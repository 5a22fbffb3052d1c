use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Notify;

/// Fires `notify` once, either after `run_for` elapses or when Ctrl+C is received.
pub(crate) struct ShutdownSignal {
    notify: Arc<Notify>,
}

impl ShutdownSignal {
    fn new(notify: Arc<Notify>) -> Self {
        Self { notify }
    }

    async fn listen_for_shutdown(&self, run_for: Option<Duration>) {
        match run_for {
            Some(time_to_live) => {
                tokio::time::sleep(time_to_live).await;
                info!("Recording time elapsed. Sending stop signal...");
            }
            None => {
                if let Err(e) = signal::ctrl_c().await {
                    error!("Error while waiting for Ctrl+C: {}", e);
                    return;
                }
                info!("Ctrl+C received. Sending stop signal...");
            }
        }
        // notify_one keeps a permit, so a waiter that subscribes late still wakes up
        self.notify.notify_one();
    }
}

pub(crate) fn listen_for_shutdown(
    notify: Arc<Notify>,
    run_for: Option<Duration>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let shutdown_signal = ShutdownSignal::new(notify);
        shutdown_signal.listen_for_shutdown(run_for).await;
    })
}
