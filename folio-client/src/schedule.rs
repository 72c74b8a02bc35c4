//! Timers as cancellable tasks.
//!
//! The runtime's sleep function is passed in, so the same code runs on top of
//! `wasm-timer` in the browser and of `tokio` elsewhere.

use std::{future::Future, time::Duration};

use futures::{channel::oneshot, pin_mut, select, FutureExt};

/// Stops the associated task when dropped
#[derive(Debug)]
pub struct Canceller(oneshot::Sender<()>);

#[derive(Debug)]
pub struct Cancellation(oneshot::Receiver<()>);

pub fn cancellable() -> (Canceller, Cancellation) {
    let (tx, rx) = oneshot::channel();
    (Canceller(tx), Cancellation(rx))
}

impl Canceller {
    pub fn cancel(self) {}
}

/// Calls `tick` every `period` until cancelled
pub async fn run_every<S, F, T>(period: Duration, mut sleep: S, cancel: Cancellation, mut tick: T)
where
    S: FnMut(Duration) -> F,
    F: Future<Output = ()>,
    T: FnMut(),
{
    let mut cancellation = cancel.0.fuse();
    loop {
        let delay = sleep(period).fuse();
        pin_mut!(delay);
        select! {
            _ = cancellation => {
                tracing::debug!(?period, "periodic task cancelled");
                return;
            }
            _ = delay => tick(),
        }
    }
}
