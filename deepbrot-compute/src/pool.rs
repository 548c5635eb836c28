//! Fixed-size worker pool with a clearable FIFO queue.
//!
//! Tasks are boxed closures owning their captures; `clear` drops pending
//! tasks without running them. Cancellation of already-running tasks is
//! cooperative via the generation stamp, never preemptive.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker pool is shut down")]
    ShutDown,
}

pub struct WorkerPool {
    sender: Option<Sender<Task>>,
    /// Second consumer handle used only to drain pending tasks.
    drain: Receiver<Task>,
    /// Running plus pending tasks.
    active: Arc<AtomicUsize>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `threads` workers sharing one bounded FIFO of `capacity`
    /// pending tasks.
    pub fn new(threads: usize, capacity: usize) -> Self {
        let (sender, receiver) = bounded::<Task>(capacity);
        let active = Arc::new(AtomicUsize::new(0));

        let workers = (0..threads)
            .map(|i| {
                let receiver = receiver.clone();
                let active = Arc::clone(&active);
                thread::Builder::new()
                    .name(format!("deepbrot-worker-{i}"))
                    .spawn(move || {
                        while let Ok(task) = receiver.recv() {
                            task();
                            active.fetch_sub(1, Ordering::SeqCst);
                        }
                    })
                    .expect("failed to spawn worker thread")
            })
            .collect();

        Self {
            sender: Some(sender),
            drain: receiver,
            active,
            workers,
        }
    }

    /// Append a task. Blocks while the queue is at capacity; fails once
    /// the pool has been shut down.
    pub fn enqueue(&self, task: impl FnOnce() + Send + 'static) -> Result<(), PoolError> {
        let sender = self.sender.as_ref().ok_or(PoolError::ShutDown)?;
        self.active.fetch_add(1, Ordering::SeqCst);
        if sender.send(Box::new(task)).is_err() {
            self.active.fetch_sub(1, Ordering::SeqCst);
            return Err(PoolError::ShutDown);
        }
        Ok(())
    }

    /// Drop every pending task without running it. Tasks already being
    /// executed are not interrupted.
    pub fn clear(&self) {
        while let Ok(task) = self.drain.try_recv() {
            drop(task);
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Number of tasks currently running plus pending.
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Drop pending work and join the workers. Subsequent `enqueue`
    /// calls fail.
    pub fn shutdown(&mut self) {
        self.clear();
        // Disconnecting the sender wakes every idle worker
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
