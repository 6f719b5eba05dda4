//! Thumbnail pipeline: cache lookup, worker dispatch, stale-result dropping
//!
//! **Why**: List views rebind the same slot to new items while earlier loads are
//! still running. A slot must end up showing the image for its *latest* request
//! only, without blocking the UI thread.
//!
//! **Used by**: UI code (one pipeline per UI thread)
//!
//! # Threading
//!
//! The pipeline itself lives on the UI thread. It holds targets as `Rc`/`Weak`,
//! which makes it `!Send`: calling it from another thread does not compile.
//! Workers only see a `LoadTask` and hand it back through a channel; `poll()`
//! drains that channel and applies results on the UI thread.
//!
//! # Validity
//!
//! `bindings` maps each target to the key it currently wants. It is updated on
//! the UI thread before dispatch, and every delivery is checked against it, so a
//! newer `set()` always wins over an older load finishing late.
//!
//! # Interruption
//!
//! With `interrupt_stale_workers`, running loads register their cancel token per
//! target in `ActiveLoads`; rebinding or stopping a target cancels its running
//! load. Processors observe the token before decoding and the worker checks it
//! again before handing the result back.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, trace, warn};

use crate::config::PipelineConfig;
use crate::core::image_cache::ImageCache;
use crate::core::workers::Workers;
use crate::entities::{
    CancelToken, ErrorHandling, ImageProcessor, ImageTarget, LoadObject, LoadResult, LoadStatus, LoadTask, TargetId,
    Thumbnail,
};

/// Sleep applied before each load when `artificial_delay` is on
pub const ARTIFICIAL_DELAY: Duration = Duration::from_millis(400);

/// What `set()` did synchronously
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// No key could be produced; error policy applied
    NoKey,
    /// Served from cache, result applied
    CacheHit,
    /// Placeholder shown, load dispatched to a worker
    Loading,
    /// Loaded inline and delivered
    Delivered,
}

/// Target identity from the `Rc` allocation address
pub fn target_id(target: &Rc<dyn ImageTarget>) -> TargetId {
    TargetId(Rc::as_ptr(target) as *const () as usize)
}

/// What a target is currently waiting for
struct Binding {
    target: Weak<dyn ImageTarget>,
    key: String,
    cancel: CancelToken,
}

/// Running loads per target. One lock guards every read-modify-write so two
/// workers can't clobber each other's ownership of a target.
#[derive(Debug, Default)]
struct ActiveLoads {
    running: Mutex<HashMap<TargetId, (u64, CancelToken)>>,
}

impl ActiveLoads {
    /// Record a starting load. Task ids grow with every `set()`, so the higher
    /// id is the newer request; an older one arriving late cancels itself.
    fn register(&self, target: TargetId, task_id: u64, token: &CancelToken) {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        match running.get(&target) {
            Some((current, _)) if *current > task_id => {
                token.cancel();
            }
            _ => {
                if let Some((_, older)) = running.insert(target, (task_id, token.clone())) {
                    older.cancel();
                }
            }
        }
    }

    fn release(&self, target: TargetId, task_id: u64) {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if running.get(&target).is_some_and(|(id, _)| *id == task_id) {
            running.remove(&target);
        }
    }

    fn cancel(&self, target: TargetId) {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((id, token)) = running.remove(&target) {
            trace!("Interrupting task {} for {:?}", id, target);
            token.cancel();
        }
    }

    fn cancel_all(&self) {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        for (_, (_, token)) in running.drain() {
            token.cancel();
        }
    }
}

/// Run the processor on `task`, turning a panic into an error status
fn run_load(task: &mut LoadTask, artificial_delay: bool) {
    if artificial_delay {
        std::thread::sleep(ARTIFICIAL_DELAY);
    }
    let processor = Arc::clone(task.processor());
    let result = catch_unwind(AssertUnwindSafe(|| processor.load(task)));
    if let Err(e) = result {
        error!("Processor {} panicked for {}: {:?}", processor.name(), task.key(), e);
        task.result = LoadResult::failed(LoadStatus::Error);
    }
}

/// Orchestrates thumbnail loads for UI targets
pub struct ImagePipeline {
    config: PipelineConfig,
    cache: Arc<ImageCache>,
    workers: Option<Workers>,
    placeholder: Option<Thumbnail>,
    bindings: HashMap<TargetId, Binding>,
    active: Arc<ActiveLoads>,
    done_tx: Sender<LoadTask>,
    done_rx: Receiver<LoadTask>,
    next_task_id: u64,
}

impl ImagePipeline {
    /// Pipeline with its own cache sized from `config`
    pub fn new(config: PipelineConfig) -> Self {
        let cache = Arc::new(ImageCache::new(config.cache_size_bytes));
        Self::with_cache(config, cache)
    }

    /// Pipeline sharing an existing cache (e.g. several UI screens)
    pub fn with_cache(config: PipelineConfig, cache: Arc<ImageCache>) -> Self {
        let workers = if config.runs_inline() {
            None
        } else {
            Some(Workers::new(config.worker_count as usize, config.worker_priority))
        };
        let (done_tx, done_rx) = unbounded();

        debug!(
            "ImagePipeline created: cache={} ({} bytes), workers={}, interrupt={}",
            config.use_cache, config.cache_size_bytes, config.worker_count, config.interrupt_stale_workers
        );

        Self {
            config,
            cache,
            workers,
            placeholder: None,
            bindings: HashMap::new(),
            active: Arc::new(ActiveLoads::default()),
            done_tx,
            done_rx,
            next_task_id: 0,
        }
    }

    /// Visual shown while loading and on failure
    pub fn with_placeholder(mut self, placeholder: Thumbnail) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    /// Request `object` for `target` through `processor`.
    ///
    /// Applies a cache hit synchronously; otherwise shows the placeholder and
    /// dispatches the load (inline when no workers are configured).
    pub fn set(
        &mut self,
        target: &Rc<dyn ImageTarget>,
        processor: Arc<dyn ImageProcessor>,
        object: LoadObject,
    ) -> SetOutcome {
        self.purge_dead_targets();
        let id = target_id(target);

        if self.config.interrupt_stale_workers {
            self.interrupt(id);
        }

        let key = if processor.can_handle(&object) {
            processor.key(&object)
        } else {
            None
        };

        let Some(key) = key else {
            debug!("No key from {} for {:?}", processor.name(), object);
            self.bindings.remove(&id);
            let mut task = LoadTask::new(self.next_id(), id, String::new(), processor, object);
            task.result = LoadResult::failed(LoadStatus::BadObject);
            return self.handle_failure(target, task).unwrap_or(SetOutcome::NoKey);
        };

        if self.config.use_cache {
            if let Some(hit) = self.cache.get(&key) {
                trace!("Cache hit for {}", key);
                self.bindings.remove(&id);
                let mut task = LoadTask::new(self.next_id(), id, key, Arc::clone(&processor), object);
                task.result = LoadResult::ok(hit);
                processor.apply_result(target.as_ref(), &task);
                return SetOutcome::CacheHit;
            }
        }

        processor.apply_placeholder(target.as_ref(), self.placeholder.as_ref());
        let task = LoadTask::new(self.next_id(), id, key, processor, object);
        self.bindings.insert(
            id,
            Binding {
                target: Rc::downgrade(target),
                key: task.key().to_string(),
                cancel: task.cancel_token().clone(),
            },
        );
        self.dispatch(task)
    }

    fn dispatch(&mut self, mut task: LoadTask) -> SetOutcome {
        let Some(workers) = &self.workers else {
            run_load(&mut task, self.config.artificial_delay);
            self.deliver(task);
            return SetOutcome::Delivered;
        };

        let active = self.config.interrupt_stale_workers.then(|| Arc::clone(&self.active));
        let delay = self.config.artificial_delay;
        let done_tx = self.done_tx.clone();

        trace!("Dispatching task {} ({})", task.id(), task.key());
        workers.execute_with_epoch(workers.current_epoch(), move || {
            if task.is_cancelled() {
                trace!("Task {} cancelled before start", task.id());
                return;
            }
            if let Some(active) = &active {
                active.register(task.target(), task.id(), task.cancel_token());
            }
            run_load(&mut task, delay);
            if let Some(active) = &active {
                active.release(task.target(), task.id());
            }
            if task.is_cancelled() {
                trace!("Task {} cancelled after load, dropping result", task.id());
                task.discard_payload();
                return;
            }
            // Receiver gone means the pipeline was dropped
            if let Err(e) = done_tx.send(task) {
                e.into_inner().discard_payload();
            }
        });
        SetOutcome::Loading
    }

    /// Apply a finished task if its target still wants that key.
    /// Returns false for stale deliveries.
    fn deliver(&mut self, mut task: LoadTask) -> bool {
        let id = task.target();
        let wanted = self.bindings.get(&id).is_some_and(|b| b.key == task.key());
        if !wanted {
            debug!("Dropping stale result for {:?} ({})", id, task.key());
            task.discard_payload();
            return false;
        }

        // Cleared regardless of outcome
        let Some(binding) = self.bindings.remove(&id) else {
            return false;
        };
        let Some(target) = binding.target.upgrade() else {
            trace!("Target {:?} gone, dropping {}", id, task.key());
            task.discard_payload();
            return false;
        };

        if task.result.status == LoadStatus::Ok {
            if self.config.use_cache {
                if let Some(payload) = &task.result.payload {
                    self.cache.put(task.key(), payload.clone());
                }
            }
            let processor = Arc::clone(task.processor());
            processor.apply_result(target.as_ref(), &task);
        } else {
            self.handle_failure(&target, task);
        }
        true
    }

    /// Error policy: the processor may handle it, reissue, or fall through to
    /// the placeholder. Returns the reissued load's outcome, if any.
    fn handle_failure(&mut self, target: &Rc<dyn ImageTarget>, task: LoadTask) -> Option<SetOutcome> {
        let processor = Arc::clone(task.processor());
        match processor.handle_load_error(target.as_ref(), &task) {
            ErrorHandling::Handled => None,
            ErrorHandling::Reissue { processor, object } => Some(self.set(target, processor, object)),
            ErrorHandling::Unhandled => {
                warn!("Load failed ({:?}) for {}, showing placeholder", task.result.status, task.key());
                processor.apply_placeholder(target.as_ref(), self.placeholder.as_ref());
                None
            }
        }
    }

    /// Deliver every finished load. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(task) = self.done_rx.try_recv() {
            if self.deliver(task) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Poll until no target is waiting or `timeout` elapses. Returns true if idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.poll();
            self.purge_dead_targets();
            if self.bindings.is_empty() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            if let Ok(task) = self.done_rx.recv_timeout(deadline - now) {
                self.deliver(task);
            }
        }
    }

    /// Forget what `target` is waiting for; cancel its running load when
    /// interruption is enabled. Safe to call when nothing is loading.
    pub fn stop_loading(&mut self, target: &Rc<dyn ImageTarget>) {
        let id = target_id(target);
        if self.config.interrupt_stale_workers {
            self.interrupt(id);
        }
        self.bindings.remove(&id);
    }

    /// Cancel both the queued load bound to `id` and whatever is running for it
    fn interrupt(&self, id: TargetId) {
        if let Some(binding) = self.bindings.get(&id) {
            binding.cancel.cancel();
        }
        self.active.cancel(id);
    }

    /// Forget every binding. With interruption enabled this also drops all
    /// queued jobs and cancels running ones, including unrelated work.
    pub fn stop_loading_all(&mut self) {
        debug!("Stopping all loads ({} waiting)", self.bindings.len());
        if self.config.interrupt_stale_workers {
            if let Some(workers) = &self.workers {
                workers.advance_epoch();
            }
            for binding in self.bindings.values() {
                binding.cancel.cancel();
            }
            self.active.cancel_all();
        }
        self.bindings.clear();
    }

    pub fn is_loading(&self, target: &Rc<dyn ImageTarget>) -> bool {
        self.bindings.contains_key(&target_id(target))
    }

    /// Targets currently waiting for a result
    pub fn pending(&self) -> usize {
        self.bindings.len()
    }

    fn purge_dead_targets(&mut self) {
        self.bindings.retain(|_, b| b.target.strong_count() > 0);
    }

    fn next_id(&mut self) -> u64 {
        self.next_task_id += 1;
        self.next_task_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ChainProcessor, ChainState, ChainStep};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone)]
    enum Shown {
        Image(Thumbnail),
        Placeholder,
    }

    #[derive(Default)]
    struct RecordingTarget {
        shown: RefCell<Vec<Shown>>,
    }

    impl RecordingTarget {
        fn last_image(&self) -> Option<Thumbnail> {
            match self.shown.borrow().last() {
                Some(Shown::Image(t)) => Some(t.clone()),
                _ => None,
            }
        }

        fn count(&self) -> usize {
            self.shown.borrow().len()
        }
    }

    impl ImageTarget for RecordingTarget {
        fn show_image(&self, image: &Thumbnail) {
            self.shown.borrow_mut().push(Shown::Image(image.clone()));
        }

        fn show_placeholder(&self, _placeholder: Option<&Thumbnail>) {
            self.shown.borrow_mut().push(Shown::Placeholder);
        }
    }

    /// Path-driven fake: "ok:*" succeeds, "fail:*" errors, "slow:*" succeeds
    /// after ~200ms (bailing out early if cancelled), "panic:*" panics.
    #[derive(Default)]
    struct ScriptedProcessor {
        produced: Mutex<HashMap<String, Thumbnail>>,
        started: AtomicUsize,
    }

    impl ScriptedProcessor {
        fn produced(&self, key: &str) -> Option<Thumbnail> {
            self.produced.lock().unwrap().get(key).cloned()
        }
    }

    impl ImageProcessor for ScriptedProcessor {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn can_handle(&self, object: &LoadObject) -> bool {
            matches!(object, LoadObject::Path(_))
        }

        fn key(&self, object: &LoadObject) -> Option<String> {
            match object {
                LoadObject::Path(p) if !p.as_os_str().is_empty() => Some(p.to_string_lossy().into_owned()),
                _ => None,
            }
        }

        fn load(&self, task: &mut LoadTask) {
            self.started.fetch_add(1, Ordering::SeqCst);
            let key = task.key().to_string();
            if key.starts_with("panic:") {
                panic!("scripted panic");
            }
            if key.starts_with("fail:") {
                task.result = LoadResult::failed(LoadStatus::Error);
                return;
            }
            if key.starts_with("slow:") {
                for _ in 0..20 {
                    if task.is_cancelled() {
                        task.result = LoadResult::failed(LoadStatus::Unfinished);
                        return;
                    }
                    std::thread::sleep(Duration::from_millis(10));
                }
            }
            let thumb = Thumbnail::solid(2, 2, [1, 1, 1, 255]);
            self.produced.lock().unwrap().insert(key, thumb.clone());
            task.result = LoadResult::ok(thumb);
        }
    }

    fn path(p: &str) -> LoadObject {
        LoadObject::Path(PathBuf::from(p))
    }

    fn setup() -> (Rc<RecordingTarget>, Rc<dyn ImageTarget>, Arc<ScriptedProcessor>) {
        let rec = Rc::new(RecordingTarget::default());
        let target: Rc<dyn ImageTarget> = rec.clone();
        (rec, target, Arc::new(ScriptedProcessor::default()))
    }

    #[test]
    fn test_inline_load_then_cache_hit() {
        let (rec, target, proc_) = setup();
        let mut pipeline = ImagePipeline::new(PipelineConfig::inline());

        assert_eq!(pipeline.set(&target, proc_.clone(), path("ok:a")), SetOutcome::Delivered);
        let first = rec.last_image().expect("image shown");
        assert!(first.ptr_eq(&proc_.produced("ok:a").unwrap()));
        assert!(pipeline.cache().contains("ok:a"));
        assert_eq!(pipeline.pending(), 0);

        assert_eq!(pipeline.set(&target, proc_.clone(), path("ok:a")), SetOutcome::CacheHit);
        assert!(rec.last_image().unwrap().ptr_eq(&first));
        assert_eq!(proc_.started.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cache_disabled_always_loads() {
        let (_rec, target, proc_) = setup();
        let config = PipelineConfig {
            use_cache: false,
            ..PipelineConfig::inline()
        };
        let mut pipeline = ImagePipeline::new(config);
        pipeline.set(&target, proc_.clone(), path("ok:a"));
        pipeline.set(&target, proc_.clone(), path("ok:a"));
        assert_eq!(proc_.started.load(Ordering::SeqCst), 2);
        assert!(pipeline.cache().is_empty());
    }

    #[test]
    fn test_no_key_shows_placeholder() {
        let (rec, target, proc_) = setup();
        let mut pipeline = ImagePipeline::new(PipelineConfig::inline());
        assert_eq!(pipeline.set(&target, proc_.clone(), path("")), SetOutcome::NoKey);
        assert!(matches!(rec.shown.borrow().as_slice(), [Shown::Placeholder]));
        assert_eq!(proc_.started.load(Ordering::SeqCst), 0);
        assert!(!pipeline.is_loading(&target));
    }

    #[test]
    fn test_error_falls_back_to_placeholder() {
        let (rec, target, proc_) = setup();
        let mut pipeline = ImagePipeline::new(PipelineConfig::inline());
        pipeline.set(&target, proc_, path("fail:a"));
        // Placeholder while loading, then again as the failure visual
        assert_eq!(rec.count(), 2);
        assert!(rec.last_image().is_none());
        assert!(pipeline.cache().is_empty());
    }

    #[test]
    fn test_panicking_processor_surfaces_as_error() {
        let (rec, target, proc_) = setup();
        let mut pipeline = ImagePipeline::new(PipelineConfig::inline());
        pipeline.set(&target, proc_, path("panic:a"));
        assert!(rec.last_image().is_none());
        assert_eq!(pipeline.pending(), 0);
    }

    #[test]
    fn test_chain_falls_through_to_next_step() {
        let (rec, target, proc_) = setup();
        let scripted: Arc<dyn ImageProcessor> = proc_.clone();
        let chain = ChainState::new(vec![
            ChainStep::new(Arc::clone(&scripted), path("fail:poster")),
            ChainStep::new(Arc::clone(&scripted), path("")),
            ChainStep::new(Arc::clone(&scripted), path("ok:backdrop")),
        ]);
        let mut pipeline = ImagePipeline::new(PipelineConfig::inline());
        pipeline.set(&target, Arc::new(ChainProcessor::new()), LoadObject::Chain(chain));

        let shown = rec.last_image().expect("fallback image");
        assert!(shown.ptr_eq(&proc_.produced("ok:backdrop").unwrap()));
        assert!(pipeline.cache().contains("ok:backdrop"));
        assert!(!pipeline.cache().contains("fail:poster"));
    }

    #[test]
    fn test_chain_exhausted_shows_placeholder() {
        let (rec, target, proc_) = setup();
        let scripted: Arc<dyn ImageProcessor> = proc_;
        let chain = ChainState::new(vec![
            ChainStep::new(Arc::clone(&scripted), path("fail:one")),
            ChainStep::new(Arc::clone(&scripted), path("fail:two")),
        ]);
        let mut pipeline = ImagePipeline::new(PipelineConfig::inline());
        pipeline.set(&target, Arc::new(ChainProcessor::new()), LoadObject::Chain(chain));
        assert!(rec.last_image().is_none());
        assert!(matches!(rec.shown.borrow().last(), Some(Shown::Placeholder)));
    }

    #[test]
    fn test_async_delivery_through_poll() {
        let (rec, target, proc_) = setup();
        let mut pipeline = ImagePipeline::new(PipelineConfig::default());
        assert_eq!(pipeline.set(&target, proc_.clone(), path("ok:a")), SetOutcome::Loading);
        assert!(pipeline.is_loading(&target));
        assert!(matches!(rec.shown.borrow().as_slice(), [Shown::Placeholder]));

        assert!(pipeline.wait_idle(Duration::from_secs(5)));
        assert!(rec.last_image().unwrap().ptr_eq(&proc_.produced("ok:a").unwrap()));
        assert!(!pipeline.is_loading(&target));
    }

    #[test]
    fn test_newer_set_wins_over_slow_older_load() {
        let (rec, target, proc_) = setup();
        let mut pipeline = ImagePipeline::new(PipelineConfig::default());

        pipeline.set(&target, proc_.clone(), path("slow:old"));
        pipeline.set(&target, proc_.clone(), path("ok:new"));
        assert!(pipeline.wait_idle(Duration::from_secs(5)));

        // Let the slow load finish and get delivered (and rejected)
        std::thread::sleep(Duration::from_millis(400));
        pipeline.poll();

        let new = proc_.produced("ok:new").unwrap();
        assert!(rec.last_image().unwrap().ptr_eq(&new));
        let old = proc_.produced("slow:old").expect("old load completed");
        assert!(old.is_disposed());
        assert!(!pipeline.cache().contains("slow:old"));
        assert!(rec.shown.borrow().iter().all(|s| match s {
            Shown::Image(t) => !t.ptr_eq(&old),
            Shown::Placeholder => true,
        }));
    }

    fn never_showed(rec: &RecordingTarget, thumb: &Thumbnail) -> bool {
        rec.shown.borrow().iter().all(|s| match s {
            Shown::Image(t) => !t.ptr_eq(thumb),
            Shown::Placeholder => true,
        })
    }

    #[test]
    fn test_cache_hit_rebind_wins_over_slow_older_load() {
        let (rec, target, proc_) = setup();
        let mut pipeline = ImagePipeline::new(PipelineConfig::default());
        let cached = Thumbnail::solid(3, 3, [7, 7, 7, 255]);
        pipeline.cache().put("ok:cached", cached.clone());

        assert_eq!(pipeline.set(&target, proc_.clone(), path("slow:old")), SetOutcome::Loading);
        assert_eq!(pipeline.set(&target, proc_.clone(), path("ok:cached")), SetOutcome::CacheHit);
        assert!(!pipeline.is_loading(&target));

        std::thread::sleep(Duration::from_millis(400));
        pipeline.poll();

        assert!(rec.last_image().unwrap().ptr_eq(&cached));
        let old = proc_.produced("slow:old").expect("old load completed");
        assert!(old.is_disposed());
        assert!(never_showed(&rec, &old));
        assert!(!pipeline.cache().contains("slow:old"));
    }

    #[test]
    fn test_placeholder_rebind_wins_over_slow_older_load() {
        let (rec, target, proc_) = setup();
        let mut pipeline = ImagePipeline::new(PipelineConfig::default());

        pipeline.set(&target, proc_.clone(), path("slow:old"));
        assert_eq!(pipeline.set(&target, proc_.clone(), path("")), SetOutcome::NoKey);
        assert!(!pipeline.is_loading(&target));

        std::thread::sleep(Duration::from_millis(400));
        pipeline.poll();

        assert!(matches!(rec.shown.borrow().last(), Some(Shown::Placeholder)));
        let old = proc_.produced("slow:old").expect("old load completed");
        assert!(old.is_disposed());
        assert!(never_showed(&rec, &old));
        assert!(!pipeline.cache().contains("slow:old"));
    }

    #[test]
    fn test_older_fast_result_dropped_when_already_rebound() {
        let (rec, target, proc_) = setup();
        let mut pipeline = ImagePipeline::new(PipelineConfig::default());

        pipeline.set(&target, proc_.clone(), path("ok:first"));
        // Don't poll: the first result waits in the channel while we rebind
        std::thread::sleep(Duration::from_millis(100));
        pipeline.set(&target, proc_.clone(), path("slow:second"));
        assert!(pipeline.wait_idle(Duration::from_secs(5)));

        let second = proc_.produced("slow:second").unwrap();
        assert!(rec.last_image().unwrap().ptr_eq(&second));
        assert!(proc_.produced("ok:first").unwrap().is_disposed());
    }

    #[test]
    fn test_stop_loading_drops_result() {
        let (rec, target, proc_) = setup();
        let mut pipeline = ImagePipeline::new(PipelineConfig::default());
        pipeline.set(&target, proc_.clone(), path("slow:a"));
        pipeline.stop_loading(&target);
        pipeline.stop_loading(&target);
        assert_eq!(pipeline.pending(), 0);

        std::thread::sleep(Duration::from_millis(400));
        assert_eq!(pipeline.poll(), 0);
        assert!(rec.last_image().is_none());
    }

    #[test]
    fn test_interrupt_cancels_running_load() {
        let (rec, target, proc_) = setup();
        let config = PipelineConfig {
            interrupt_stale_workers: true,
            worker_count: 1,
            ..PipelineConfig::default()
        };
        let mut pipeline = ImagePipeline::new(config);

        pipeline.set(&target, proc_.clone(), path("slow:a"));
        std::thread::sleep(Duration::from_millis(50));
        pipeline.stop_loading(&target);

        std::thread::sleep(Duration::from_millis(400));
        pipeline.poll();
        // Cancelled mid-load: never produced a payload
        assert!(proc_.produced("slow:a").is_none());
        assert!(rec.last_image().is_none());
    }

    #[test]
    fn test_stop_loading_all_skips_queued_work() {
        let config = PipelineConfig {
            interrupt_stale_workers: true,
            worker_count: 1,
            ..PipelineConfig::default()
        };
        let mut pipeline = ImagePipeline::new(config);
        let proc_ = Arc::new(ScriptedProcessor::default());

        let targets: Vec<Rc<RecordingTarget>> = (0..4).map(|_| Rc::new(RecordingTarget::default())).collect();
        for (i, rec) in targets.iter().enumerate() {
            let target: Rc<dyn ImageTarget> = rec.clone();
            pipeline.set(&target, proc_.clone(), path(&format!("slow:{}", i)));
        }
        pipeline.stop_loading_all();
        assert_eq!(pipeline.pending(), 0);

        std::thread::sleep(Duration::from_millis(500));
        assert_eq!(pipeline.poll(), 0);
        assert!(proc_.started.load(Ordering::SeqCst) <= 1);
        assert!(targets.iter().all(|t| t.last_image().is_none()));
    }

    #[test]
    fn test_dropped_target_is_forgotten() {
        let mut pipeline = ImagePipeline::new(PipelineConfig::default());
        let proc_ = Arc::new(ScriptedProcessor::default());
        {
            let (_rec, target, _) = setup();
            pipeline.set(&target, proc_.clone(), path("slow:gone"));
        }
        assert!(pipeline.wait_idle(Duration::from_secs(1)));
        std::thread::sleep(Duration::from_millis(400));
        assert_eq!(pipeline.poll(), 0);
    }

    #[test]
    fn test_targets_are_independent() {
        let mut pipeline = ImagePipeline::new(PipelineConfig::default());
        let proc_ = Arc::new(ScriptedProcessor::default());
        let (rec_a, target_a, _) = setup();
        let (rec_b, target_b, _) = setup();

        pipeline.set(&target_a, proc_.clone(), path("slow:a"));
        pipeline.set(&target_b, proc_.clone(), path("ok:b"));
        assert!(pipeline.wait_idle(Duration::from_secs(5)));

        assert!(rec_a.last_image().unwrap().ptr_eq(&proc_.produced("slow:a").unwrap()));
        assert!(rec_b.last_image().unwrap().ptr_eq(&proc_.produced("ok:b").unwrap()));
    }
}
