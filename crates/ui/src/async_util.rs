//! Async utilities used by the regeneration pipeline.

use std::time::Duration;

pub use smol::{
    Timer,
    channel::{Receiver, Sender, bounded, unbounded},
};

/// Runs `f` on the blocking worker pool, so the calling executor never blocks on it.
pub async fn run_blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    smol::unblock(f).await
}

pub async fn delay(duration: Duration) {
    Timer::after(duration).await;
}
