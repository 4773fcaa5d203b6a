//! Background polling thread.
//!
//! Grounded on `obs_hotkey_thread`'s 25 ms `os_event_timedwait` loop, and
//! on `GlobalHotkeySet::listen_for_hotkeys`'s `thread::spawn` +
//! `std::sync::mpsc` background-loop idiom for the shutdown mechanism —
//! a channel send (or the sender dropping) takes the place of the
//! original's cancellation event.
//!
//! Deliberately generic over what a tick does: the worker doesn't know
//! about `Registry` or `KeyPoller` itself, it just runs a caller-supplied
//! closure on a fixed cadence. The façade supplies a closure that locks
//! the shared state and calls [`crate::polling::poll_tick`].

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_millis(25);

pub struct Worker {
    cancel: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Worker {
    pub fn spawn<F>(mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (cancel, rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || loop {
            match rx.recv_timeout(TICK_INTERVAL) {
                Ok(()) => break,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
                Err(mpsc::RecvTimeoutError::Timeout) => tick(),
            }
        });
        Self {
            cancel: Some(cancel),
            handle: Some(handle),
        }
    }

    /// Signals the cancellation event and joins the thread. Idempotent.
    /// Pending bindings are not synthesized as released; a caller
    /// relying on a final release must issue it themselves.
    pub fn shutdown(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        Mutex,
    };

    #[test]
    fn tick_runs_repeatedly_until_shutdown() {
        let count = Arc::new(Mutex::new(0u32));
        let counted = count.clone();
        let mut worker = Worker::spawn(move || {
            *counted.lock().unwrap() += 1;
        });

        thread::sleep(Duration::from_millis(120));
        worker.shutdown();
        let after_shutdown = *count.lock().unwrap();
        assert!(after_shutdown > 0);

        thread::sleep(Duration::from_millis(80));
        assert_eq!(*count.lock().unwrap(), after_shutdown);
    }

    #[test]
    fn dropping_worker_joins_thread() {
        let count = Arc::new(Mutex::new(0u32));
        let counted = count.clone();
        {
            let _worker = Worker::spawn(move || {
                *counted.lock().unwrap() += 1;
            });
            thread::sleep(Duration::from_millis(60));
        }
        let after_drop = *count.lock().unwrap();
        thread::sleep(Duration::from_millis(60));
        assert_eq!(*count.lock().unwrap(), after_drop);
    }
}
