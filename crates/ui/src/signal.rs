use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

use parking_lot::Mutex;

/// Observable state of a [`CoalescingSignal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalState {
    /// Nothing remembered and nobody waiting.
    Idle,
    /// A wake was raised with nobody waiting; the next `wait` completes immediately.
    Pending,
    /// A waiter is suspended.
    Waiting,
}

enum Slot {
    Idle,
    Pending,
    Waiting(Waker),
}

/// A single-slot, auto-resetting async wake.
///
/// Any number of [`signal`](Self::signal) calls made while nobody waits collapse
/// into one pending wake. Only one [`wait`](Self::wait) may be outstanding at a time.
pub struct CoalescingSignal {
    slot: Mutex<Slot>,
}

impl CoalescingSignal {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Idle),
        }
    }

    pub fn state(&self) -> SignalState {
        match *self.slot.lock() {
            Slot::Idle => SignalState::Idle,
            Slot::Pending => SignalState::Pending,
            Slot::Waiting(_) => SignalState::Waiting,
        }
    }

    /// Wakes the suspended waiter, or remembers one pending wake if there is none.
    pub fn signal(&self) {
        let waker = {
            let mut slot = self.slot.lock();
            match std::mem::replace(&mut *slot, Slot::Idle) {
                Slot::Waiting(waker) => Some(waker),
                Slot::Idle | Slot::Pending => {
                    *slot = Slot::Pending;
                    None
                }
            }
        };

        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Completes on the next wake, consuming a pending one without suspending.
    pub fn wait(&self) -> Wait<'_> {
        Wait {
            signal: self,
            registered: false,
        }
    }
}

impl Default for CoalescingSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CoalescingSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoalescingSignal")
            .field("state", &self.state())
            .finish()
    }
}

/// Future returned by [`CoalescingSignal::wait`].
#[must_use = "futures do nothing unless polled"]
pub struct Wait<'a> {
    signal: &'a CoalescingSignal,
    registered: bool,
}

impl Future for Wait<'_> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let signal = self.signal;
        let mut slot = signal.slot.lock();

        if self.registered {
            if let Slot::Waiting(waker) = &mut *slot {
                if !waker.will_wake(cx.waker()) {
                    *waker = cx.waker().clone();
                }
                return Poll::Pending;
            }
            // `signal` took our waker; a newer `Pending` belongs to the next wait.
            drop(slot);
            self.registered = false;
            return Poll::Ready(());
        }

        match *slot {
            Slot::Pending => {
                *slot = Slot::Idle;
                Poll::Ready(())
            }
            Slot::Idle => {
                *slot = Slot::Waiting(cx.waker().clone());
                drop(slot);
                self.registered = true;
                Poll::Pending
            }
            Slot::Waiting(_) => {
                debug_assert!(false, "CoalescingSignal supports a single waiter");
                *slot = Slot::Waiting(cx.waker().clone());
                drop(slot);
                self.registered = true;
                Poll::Pending
            }
        }
    }
}

impl Drop for Wait<'_> {
    fn drop(&mut self) {
        if !self.registered {
            return;
        }
        let mut slot = self.signal.slot.lock();
        if matches!(*slot, Slot::Waiting(_)) {
            *slot = Slot::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use futures::FutureExt as _;

    use super::*;

    #[test]
    fn test_signals_coalesce_into_one_wake() {
        let signal = CoalescingSignal::new();
        for _ in 0..5 {
            signal.signal();
        }
        assert_eq!(signal.state(), SignalState::Pending);

        assert_eq!(signal.wait().now_or_never(), Some(()));
        assert_eq!(signal.state(), SignalState::Idle);

        // The second wait suspends, and dropping it leaves the signal idle again.
        assert_eq!(signal.wait().now_or_never(), None);
        assert_eq!(signal.state(), SignalState::Idle);
    }

    #[test]
    fn test_wait_suspends_until_signal() {
        let signal = CoalescingSignal::new();
        let mut wait = Box::pin(signal.wait());
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);

        assert!(wait.as_mut().poll(&mut cx).is_pending());
        assert_eq!(signal.state(), SignalState::Waiting);
        assert!(wait.as_mut().poll(&mut cx).is_pending());

        signal.signal();
        assert_eq!(signal.state(), SignalState::Idle);
        assert!(wait.as_mut().poll(&mut cx).is_ready());
    }

    #[test]
    fn test_signal_after_wake_stays_pending_for_next_wait() {
        let signal = CoalescingSignal::new();
        let mut wait = Box::pin(signal.wait());
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);

        assert!(wait.as_mut().poll(&mut cx).is_pending());
        signal.signal();
        signal.signal();
        assert_eq!(signal.state(), SignalState::Pending);

        assert!(wait.as_mut().poll(&mut cx).is_ready());
        drop(wait);
        assert_eq!(signal.state(), SignalState::Pending);
        assert_eq!(signal.wait().now_or_never(), Some(()));
        assert_eq!(signal.state(), SignalState::Idle);
    }

    #[test]
    fn test_wake_from_another_thread() {
        let signal = Arc::new(CoalescingSignal::new());

        let thread = std::thread::spawn({
            let signal = signal.clone();
            move || {
                while signal.state() != SignalState::Waiting {
                    std::thread::sleep(Duration::from_millis(1));
                }
                signal.signal();
            }
        });

        smol::block_on(signal.wait());
        thread.join().unwrap();
        assert_eq!(signal.state(), SignalState::Idle);
    }
}
