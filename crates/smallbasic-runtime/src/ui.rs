//! Dispatch onto the thread that owns the drawing surface.
//!
//! Host toolkits insist that window mutations come from one designated
//! thread. [`UiThread`] owns the [`Surface`] on a dedicated thread and runs
//! jobs sent to it over a channel one at a time. Callers either wait for
//! the job's result ([`UiThread::invoke`]) or fire and forget
//! ([`UiThread::post`]).

use std::thread::{self, JoinHandle, ThreadId};

use crossbeam_channel::{Sender, unbounded};

use crate::error::{RuntimeError, RuntimeResult};
use crate::surface::Surface;

type Job = Box<dyn FnOnce(&mut dyn Surface) + Send>;

pub struct UiThread {
    sender: Option<Sender<Job>>,
    thread: Option<JoinHandle<()>>,
    thread_id: ThreadId,
}

impl UiThread {
    pub fn spawn(surface: Box<dyn Surface>) -> RuntimeResult<Self> {
        let (sender, receiver) = unbounded::<Job>();
        let thread = thread::Builder::new()
            .name("smallbasic-ui".to_string())
            .spawn(move || {
                let mut surface = surface;
                tracing::debug!("UI thread started");
                for job in receiver {
                    job(surface.as_mut());
                }
                tracing::debug!("UI thread stopped");
            })?;
        let thread_id = thread.thread().id();
        Ok(Self {
            sender: Some(sender),
            thread: Some(thread),
            thread_id,
        })
    }

    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    fn send(&self, job: Job) -> RuntimeResult<()> {
        self.sender
            .as_ref()
            .ok_or_else(RuntimeError::disconnected)?
            .send(job)
            .map_err(|_| RuntimeError::disconnected())
    }

    /// Run `f` on the UI thread and wait for its result.
    ///
    /// Calling this from the UI thread itself would wait on its own queue, so
    /// it fails instead.
    pub fn invoke<R, F>(&self, f: F) -> RuntimeResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn Surface) -> RuntimeResult<R> + Send + 'static,
    {
        if self.is_ui_thread() {
            return Err(RuntimeError::invalid_argument(
                "blocking surface call from the UI thread",
            ));
        }
        let (reply, result) = crossbeam_channel::bounded(1);
        self.send(Box::new(move |surface| {
            let _ = reply.send(f(surface));
        }))?;
        result.recv().map_err(|_| RuntimeError::disconnected())?
    }

    /// Queue `f` on the UI thread without waiting
    pub fn post<F>(&self, f: F) -> RuntimeResult<()>
    where
        F: FnOnce(&mut dyn Surface) + Send + 'static,
    {
        self.send(Box::new(f))
    }
}

impl Drop for UiThread {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            if !self.is_ui_thread() && thread.join().is_err() {
                tracing::warn!("UI thread panicked");
            }
        }
    }
}
