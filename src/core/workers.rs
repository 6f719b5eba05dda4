//! Bounded thread pool for thumbnail decode/fetch jobs
//!
//! Uses work-stealing deques:
//! - Jobs enter through a global injector
//! - Idle workers steal from each other
//!
//! Epoch mechanism lets `ImagePipeline::stop_loading_all` drop every queued job
//! at once without tearing the threads down.

use crossbeam::deque::{Injector, Worker};
use log::trace;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Worker pool with work-stealing and epoch-based cancellation of queued jobs.
///
/// # Example
/// ```ignore
/// let workers = Workers::new(2, 0);
/// let epoch = workers.current_epoch();
/// workers.execute_with_epoch(epoch, move || decode_thumbnail());
/// workers.advance_epoch(); // queued jobs from older epochs are skipped
/// ```
pub struct Workers {
    injector: Arc<Injector<Job>>,
    handles: Vec<thread::JoinHandle<()>>,
    current_epoch: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
    priority: i32,
}

impl Workers {
    /// Spawn `num_threads` workers (at least one).
    ///
    /// `priority` is advisory: std has no portable thread priority API, so it
    /// is carried in thread names and logs for diagnostics.
    pub fn new(num_threads: usize, priority: i32) -> Self {
        let num_threads = num_threads.max(1);
        let injector: Arc<Injector<Job>> = Arc::new(Injector::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers_local: Vec<Worker<Job>> = Vec::new();
        let mut stealers = Vec::new();
        let mut handles = Vec::new();

        for _ in 0..num_threads {
            let worker: Worker<Job> = Worker::new_fifo();
            stealers.push(worker.stealer());
            workers_local.push(worker);
        }

        for (worker_id, worker) in workers_local.into_iter().enumerate() {
            let injector = Arc::clone(&injector);
            let shutdown = Arc::clone(&shutdown);
            let stealers = stealers.clone();

            let handle = thread::Builder::new()
                .name(format!("mediashelf-worker-{}-p{}", worker_id, priority))
                .spawn(move || {
                    trace!("Worker {} started", worker_id);

                    loop {
                        // 1. Own queue
                        if let Some(job) = worker.pop() {
                            job();
                            continue;
                        }

                        // 2. Global injector
                        if let Some(job) = injector.steal_batch_and_pop(&worker).success() {
                            job();
                            continue;
                        }

                        // 3. Other workers
                        if let Some(job) = stealers.iter().find_map(|s| s.steal().success()) {
                            job();
                            continue;
                        }

                        if shutdown.load(Ordering::Relaxed) {
                            break;
                        }

                        thread::sleep(std::time::Duration::from_millis(1));
                    }

                    trace!("Worker {} stopped", worker_id);
                });

            match handle {
                Ok(h) => handles.push(h),
                Err(e) => log::error!("Failed to spawn worker thread {}: {}", worker_id, e),
            }
        }

        trace!("Workers initialized: {} threads (priority {})", handles.len(), priority);

        Self {
            injector,
            handles,
            current_epoch: Arc::new(AtomicU64::new(0)),
            shutdown,
            priority,
        }
    }

    pub fn num_threads(&self) -> usize {
        self.handles.len()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn current_epoch(&self) -> u64 {
        self.current_epoch.load(Ordering::Acquire)
    }

    /// Invalidate every queued job. Running jobs are unaffected.
    pub fn advance_epoch(&self) -> u64 {
        let epoch = self.current_epoch.fetch_add(1, Ordering::AcqRel) + 1;
        trace!("Workers epoch advanced to {}", epoch);
        epoch
    }

    /// Queue `f`; it runs only if the epoch still equals `epoch` when a worker
    /// picks it up.
    pub fn execute_with_epoch<F>(&self, epoch: u64, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let current_epoch = Arc::clone(&self.current_epoch);

        let wrapped = move || {
            if current_epoch.load(Ordering::Acquire) == epoch {
                f();
            }
        };

        self.injector.push(Box::new(wrapped));
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        use std::time::{Duration, Instant};

        let num_threads = self.handles.len();
        trace!("Workers shutting down ({} threads)...", num_threads);

        // Queued jobs are not worth finishing on shutdown
        self.current_epoch.fetch_add(1, Ordering::AcqRel);
        self.shutdown.store(true, Ordering::SeqCst);

        // A job blocked in a slow download may outlive this; don't hang the caller.
        let deadline = Instant::now() + Duration::from_millis(500);

        let handles = std::mem::take(&mut self.handles);
        for handle in handles {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    trace!("Shutdown timeout reached, detaching remaining workers");
                    return;
                }
                thread::sleep(Duration::from_millis(1));
            }
            let _ = handle.join();
        }

        trace!("All {} workers stopped", num_threads);
    }
}
