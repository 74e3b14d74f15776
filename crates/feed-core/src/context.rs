//! Execution contexts that decode results are delivered on.
//!
//! A decoder never hands its result to the caller on the stack it parsed
//! on. It packages the continuation as a [`Job`] and dispatches it onto a
//! [`CallbackContext`] the caller nominated: a tokio runtime, or a
//! [`SerialQueue`] whose [`QueueRunner`] the owning thread drains (the
//! usual shape for UI loops).

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A handle that runs jobs on some execution context other than the caller's.
pub trait CallbackContext: Send + Sync {
    fn dispatch(&self, job: Job);
}

impl CallbackContext for tokio::runtime::Handle {
    fn dispatch(&self, job: Job) {
        drop(self.spawn(async move { job() }));
    }
}

impl<T> CallbackContext for Arc<T>
where
    T: CallbackContext + ?Sized,
{
    fn dispatch(&self, job: Job) {
        (**self).dispatch(job)
    }
}

impl<T> CallbackContext for &T
where
    T: CallbackContext + ?Sized,
{
    fn dispatch(&self, job: Job) {
        (**self).dispatch(job)
    }
}

/// Sending half of a serial job queue. Jobs run in submission order on
/// whichever thread drains the paired [`QueueRunner`].
#[derive(Clone, Debug)]
pub struct SerialQueue {
    label: Arc<str>,
    sender: Sender<Job>,
}

/// Receiving half of a [`SerialQueue`]; owned by the thread results should
/// land on.
#[derive(Debug)]
pub struct QueueRunner {
    label: Arc<str>,
    receiver: Receiver<Job>,
}

impl SerialQueue {
    pub fn new(label: impl Into<String>) -> (SerialQueue, QueueRunner) {
        let label: Arc<str> = Arc::from(label.into());
        let (sender, receiver) = crossbeam_channel::unbounded();
        (
            SerialQueue {
                label: label.clone(),
                sender,
            },
            QueueRunner { label, receiver },
        )
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl CallbackContext for SerialQueue {
    fn dispatch(&self, job: Job) {
        if self.sender.send(job).is_err() {
            tracing::warn!(queue = %self.label, "queue runner is gone; job dropped");
        }
    }
}

impl QueueRunner {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Runs every job already queued and returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Waits up to `timeout` for one job and runs it.
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => {
                job();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Runs jobs until every [`SerialQueue`] handle has been dropped.
    pub fn run(self) {
        for job in self.receiver.iter() {
            job();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn serial_queue_runs_jobs_in_submission_order() {
        let (queue, runner) = SerialQueue::new("main");
        let seen = Arc::new(Mutex::new(Vec::new()));
        for value in 0..3 {
            let seen = seen.clone();
            queue.dispatch(Box::new(move || seen.lock().expect("lock").push(value)));
        }
        assert!(seen.lock().expect("lock").is_empty());
        assert_eq!(runner.run_pending(), 3);
        assert_eq!(*seen.lock().expect("lock"), vec![0, 1, 2]);
    }

    #[test]
    fn run_next_times_out_on_empty_queue() {
        let (_queue, runner) = SerialQueue::new("idle");
        assert!(!runner.run_next(Duration::from_millis(10)));
    }

    #[test]
    fn dispatch_after_runner_dropped_discards_job() {
        let (queue, runner) = SerialQueue::new("gone");
        drop(runner);
        let ran = Arc::new(Mutex::new(false));
        let flag = ran.clone();
        queue.dispatch(Box::new(move || *flag.lock().expect("lock") = true));
        assert!(!*ran.lock().expect("lock"));
    }

    #[test]
    fn run_returns_once_all_senders_are_dropped() {
        let (queue, runner) = SerialQueue::new("drain");
        let counter = Arc::new(Mutex::new(0));
        let shared = Arc::new(queue);
        for _ in 0..2 {
            let counter = counter.clone();
            shared.dispatch(Box::new(move || *counter.lock().expect("lock") += 1));
        }
        drop(shared);
        runner.run();
        assert_eq!(*counter.lock().expect("lock"), 2);
    }
}
