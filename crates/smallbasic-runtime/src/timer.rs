//! The `Timer` class.
//!
//! A worker thread waits on a control channel and a ticker at the same
//! time. Every state change sends a wake-up through the control channel so
//! the worker rebuilds its ticker with the current interval. Tick handlers
//! run on the worker thread with no lock held, so they may pause or stop
//! their own timer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, never, select, tick, unbounded};

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::graphics_window::EventHandler;

pub const MIN_INTERVAL_MS: i64 = 10;
pub const MAX_INTERVAL_MS: i64 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
}

enum Control {
    Reconfigure,
    Shutdown,
}

struct Inner {
    state: TimerState,
    interval_ms: u64,
    once: bool,
    handler: Option<EventHandler>,
}

struct Shared {
    inner: Mutex<Inner>,
    ticks: AtomicU64,
}

impl Shared {
    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct Timer {
    shared: Arc<Shared>,
    control: Sender<Control>,
    worker: Option<JoinHandle<()>>,
}

impl Timer {
    pub fn new(config: &RuntimeConfig) -> RuntimeResult<Self> {
        let interval_ms = validate(config.timer_interval_ms as i64)?;
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                state: TimerState::Stopped,
                interval_ms,
                once: false,
                handler: None,
            }),
            ticks: AtomicU64::new(0),
        });
        let (control, receiver) = unbounded();
        let worker = std::thread::Builder::new()
            .name("smallbasic-timer".to_string())
            .spawn({
                let shared = Arc::clone(&shared);
                move || run(shared, receiver)
            })?;
        Ok(Self {
            shared,
            control,
            worker: Some(worker),
        })
    }

    fn wake(&self) {
        // The worker only goes away on drop.
        let _ = self.control.send(Control::Reconfigure);
    }

    pub fn interval(&self) -> u64 {
        self.shared.inner().interval_ms
    }

    /// Changes the tick interval; a running timer picks it up immediately
    pub fn set_interval(&self, interval_ms: i64) -> RuntimeResult<()> {
        let interval_ms = validate(interval_ms)?;
        self.shared.inner().interval_ms = interval_ms;
        tracing::debug!(interval_ms, "Timer interval changed");
        self.wake();
        Ok(())
    }

    pub fn on_tick(&self, handler: EventHandler) {
        self.shared.inner().handler = Some(handler);
    }

    /// Starts a stopped timer or continues a paused one
    pub fn resume(&self) {
        {
            let mut inner = self.shared.inner();
            if inner.state == TimerState::Running && !inner.once {
                return;
            }
            inner.state = TimerState::Running;
            inner.once = false;
        }
        self.wake();
    }

    pub fn pause(&self) {
        {
            let mut inner = self.shared.inner();
            if inner.state != TimerState::Running {
                return;
            }
            inner.state = TimerState::Paused;
        }
        self.wake();
    }

    pub fn stop(&self) {
        {
            let mut inner = self.shared.inner();
            inner.state = TimerState::Stopped;
            inner.once = false;
        }
        self.wake();
    }

    /// Fires a single tick after one interval, then stops
    pub fn execute_once(&self) {
        {
            let mut inner = self.shared.inner();
            inner.state = TimerState::Running;
            inner.once = true;
        }
        self.wake();
    }

    pub fn state(&self) -> TimerState {
        self.shared.inner().state
    }

    pub fn tick_count(&self) -> u64 {
        self.shared.ticks.load(Ordering::Relaxed)
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let _ = self.control.send(Control::Shutdown);
        if let Some(worker) = self.worker.take() {
            // A handler holding the last reference drops the timer on its own thread.
            if worker.thread().id() != std::thread::current().id() {
                let _ = worker.join();
            }
        }
    }
}

fn validate(interval_ms: i64) -> RuntimeResult<u64> {
    if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&interval_ms) {
        return Err(RuntimeError::invalid_argument(format!(
            "interval must be between {MIN_INTERVAL_MS} and {MAX_INTERVAL_MS} milliseconds, got {interval_ms}"
        )));
    }
    Ok(interval_ms as u64)
}

fn ticker(shared: &Shared) -> Receiver<std::time::Instant> {
    let inner = shared.inner();
    match inner.state {
        TimerState::Running => tick(Duration::from_millis(inner.interval_ms)),
        TimerState::Stopped | TimerState::Paused => never(),
    }
}

fn run(shared: Arc<Shared>, control: Receiver<Control>) {
    let mut ticks = ticker(&shared);
    loop {
        select! {
            recv(control) -> message => match message {
                Ok(Control::Reconfigure) => ticks = ticker(&shared),
                Ok(Control::Shutdown) | Err(_) => break,
            },
            recv(ticks) -> _ => {
                let handler = {
                    let mut inner = shared.inner();
                    if inner.state != TimerState::Running {
                        continue;
                    }
                    if inner.once {
                        inner.state = TimerState::Stopped;
                        inner.once = false;
                    }
                    inner.handler.clone()
                };
                let count = shared.ticks.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::trace!(count, "Timer tick");
                if let Some(handler) = handler {
                    handler();
                }
                if shared.inner().state != TimerState::Running {
                    ticks = never();
                }
            }
        }
    }
    tracing::debug!("Timer worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn timer() -> Timer {
        let config = RuntimeConfig {
            timer_interval_ms: 10,
            ..Default::default()
        };
        Timer::new(&config).unwrap()
    }

    fn wait_until(deadline_ms: u64, condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_millis(deadline_ms);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        condition()
    }

    #[test]
    fn test_interval_bounds() {
        let timer = timer();
        assert_eq!(timer.interval(), 10);
        assert!(timer.set_interval(9).unwrap_err().is_invalid_argument());
        assert!(timer.set_interval(100_000_001).unwrap_err().is_invalid_argument());
        timer.set_interval(100_000_000).unwrap();
        assert_eq!(timer.interval(), 100_000_000);
        assert!(Timer::new(&RuntimeConfig {
            timer_interval_ms: 5,
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_resume_pause_stop() {
        let timer = timer();
        assert_eq!(timer.state(), TimerState::Stopped);
        timer.pause();
        assert_eq!(timer.state(), TimerState::Stopped);

        timer.resume();
        assert_eq!(timer.state(), TimerState::Running);
        assert!(wait_until(2000, || timer.tick_count() >= 3));

        timer.pause();
        assert_eq!(timer.state(), TimerState::Paused);
        std::thread::sleep(Duration::from_millis(30));
        let paused_at = timer.tick_count();
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(timer.tick_count(), paused_at);

        timer.resume();
        assert!(wait_until(2000, || timer.tick_count() > paused_at));
        timer.stop();
        assert_eq!(timer.state(), TimerState::Stopped);
    }

    #[test]
    fn test_execute_once() {
        let timer = timer();
        timer.execute_once();
        assert!(wait_until(2000, || timer.state() == TimerState::Stopped));
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(timer.tick_count(), 1);
    }

    #[test]
    fn test_handler_can_stop_its_own_timer() {
        let timer = Arc::new(timer());
        let weak = Arc::downgrade(&timer);
        timer.on_tick(Arc::new(move || {
            if let Some(timer) = weak.upgrade() {
                timer.stop();
            }
        }));
        timer.resume();
        assert!(wait_until(2000, || timer.state() == TimerState::Stopped));
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(timer.tick_count(), 1);
    }

    #[test]
    fn test_running_timer_picks_up_new_interval() {
        let timer = timer();
        timer.set_interval(100_000).unwrap();
        timer.resume();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(timer.tick_count(), 0);
        timer.set_interval(10).unwrap();
        assert!(wait_until(2000, || timer.tick_count() >= 1));
    }
}
