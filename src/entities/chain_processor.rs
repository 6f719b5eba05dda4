//! Fallback chain: try (processor, object) steps in order until one loads.
//!
//! Loading delegates to the current step. On failure the chain does not retry
//! the same task; it asks the pipeline to issue a brand new load with the
//! cursor advanced. The last step's own error policy has the final say.

use std::sync::Arc;

use log::debug;

use super::processor::{ErrorHandling, ImageProcessor, ImageTarget};
use super::task::{ChainState, ChainStep, LoadObject, LoadResult, LoadStatus, LoadTask};

#[derive(Debug, Default, Clone, Copy)]
pub struct ChainProcessor;

impl ChainProcessor {
    pub fn new() -> Self {
        Self
    }
}

fn chain_of(object: &LoadObject) -> Option<&ChainState> {
    match object {
        LoadObject::Chain(chain) => Some(chain),
        _ => None,
    }
}

/// Sub-task for the chain's current step, carrying the parent's result
fn step_task(task: &LoadTask, step: &ChainStep) -> LoadTask {
    let mut sub = task.subtask(Arc::clone(&step.processor), step.object.clone());
    sub.result = task.result.clone();
    sub
}

impl ImageProcessor for ChainProcessor {
    fn name(&self) -> &'static str {
        "chain"
    }

    // Any chain is accepted, even one whose current step is unusable, so the
    // error path can still advance it.
    fn can_handle(&self, object: &LoadObject) -> bool {
        chain_of(object).is_some()
    }

    fn key(&self, object: &LoadObject) -> Option<String> {
        let step = chain_of(object)?.current()?;
        if !step.processor.can_handle(&step.object) {
            return None;
        }
        step.processor.key(&step.object)
    }

    fn load(&self, task: &mut LoadTask) {
        let Some(step) = chain_of(task.object()).and_then(|c| c.current()).cloned() else {
            task.result = LoadResult::failed(LoadStatus::BadObject);
            return;
        };
        let mut sub = task.subtask(Arc::clone(&step.processor), step.object.clone());
        step.processor.load(&mut sub);
        task.result = sub.result;
    }

    fn handle_load_error(&self, target: &dyn ImageTarget, task: &LoadTask) -> ErrorHandling {
        let Some(chain) = chain_of(task.object()) else {
            return ErrorHandling::Unhandled;
        };
        if let Some(next) = chain.advanced() {
            debug!("Chain step {} failed for {:?}, advancing", chain.cursor(), task.target());
            return ErrorHandling::Reissue {
                processor: Arc::clone(task.processor()),
                object: LoadObject::Chain(next),
            };
        }
        match chain.current() {
            Some(step) => step.processor.handle_load_error(target, &step_task(task, step)),
            None => ErrorHandling::Unhandled,
        }
    }

    fn apply_result(&self, target: &dyn ImageTarget, task: &LoadTask) {
        match chain_of(task.object()).and_then(|c| c.current()) {
            Some(step) => step.processor.apply_result(target, &step_task(task, step)),
            None => {
                if let Some(image) = &task.result.payload {
                    target.show_image(image);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::task::{RemoteImage, TargetId};
    use crate::entities::thumbnail::Thumbnail;
    use std::path::PathBuf;

    /// Succeeds only for paths containing "good"
    struct PickyProcessor;

    impl ImageProcessor for PickyProcessor {
        fn name(&self) -> &'static str {
            "picky"
        }
        fn can_handle(&self, object: &LoadObject) -> bool {
            matches!(object, LoadObject::Path(_))
        }
        fn key(&self, object: &LoadObject) -> Option<String> {
            match object {
                LoadObject::Path(p) => Some(p.to_string_lossy().into_owned()),
                _ => None,
            }
        }
        fn load(&self, task: &mut LoadTask) {
            task.result = match task.object() {
                LoadObject::Path(p) if p.to_string_lossy().contains("good") => {
                    LoadResult::ok(Thumbnail::solid(1, 1, [0, 0, 0, 255]))
                }
                _ => LoadResult::failed(LoadStatus::Error),
            };
        }
    }

    struct NullTarget;

    impl ImageTarget for NullTarget {
        fn show_image(&self, _image: &Thumbnail) {}
        fn show_placeholder(&self, _placeholder: Option<&Thumbnail>) {}
    }

    fn chain(paths: &[&str]) -> ChainState {
        let picky: Arc<dyn ImageProcessor> = Arc::new(PickyProcessor);
        ChainState::new(
            paths
                .iter()
                .map(|p| ChainStep::new(Arc::clone(&picky), LoadObject::Path(PathBuf::from(p))))
                .collect(),
        )
    }

    #[test]
    fn test_key_follows_current_step() {
        let c = chain(&["/a/bad.png", "/a/good.png"]);
        let chain_proc = ChainProcessor::new();
        assert_eq!(chain_proc.key(&LoadObject::Chain(c.clone())).as_deref(), Some("/a/bad.png"));
        let next = c.advanced().unwrap();
        assert_eq!(chain_proc.key(&LoadObject::Chain(next)).as_deref(), Some("/a/good.png"));
    }

    #[test]
    fn test_key_none_when_step_cannot_handle() {
        let picky: Arc<dyn ImageProcessor> = Arc::new(PickyProcessor);
        let c = ChainState::new(vec![ChainStep::new(
            picky,
            LoadObject::Remote(RemoteImage::new("http://x", "/x")),
        )]);
        assert!(ChainProcessor.key(&LoadObject::Chain(c.clone())).is_none());
        assert!(ChainProcessor.can_handle(&LoadObject::Chain(c)));
    }

    #[test]
    fn test_failure_reissues_advanced_chain() {
        let chain_proc: Arc<dyn ImageProcessor> = Arc::new(ChainProcessor);
        let c = chain(&["/a/bad.png", "/a/good.png"]);
        let mut task = LoadTask::new(1, TargetId(1), "/a/bad.png".into(), chain_proc.clone(), LoadObject::Chain(c));
        chain_proc.load(&mut task);
        assert_eq!(task.result.status, LoadStatus::Error);

        match chain_proc.handle_load_error(&NullTarget, &task) {
            ErrorHandling::Reissue { processor, object } => {
                assert_eq!(processor.name(), "chain");
                let LoadObject::Chain(next) = object else { panic!("expected chain") };
                assert_eq!(next.cursor(), 1);

                let mut retry = LoadTask::new(2, TargetId(1), "/a/good.png".into(), processor.clone(), LoadObject::Chain(next));
                processor.load(&mut retry);
                assert_eq!(retry.result.status, LoadStatus::Ok);
            }
            _ => panic!("expected reissue"),
        }
    }

    #[test]
    fn test_last_step_gets_final_say() {
        let chain_proc: Arc<dyn ImageProcessor> = Arc::new(ChainProcessor);
        let c = chain(&["/a/bad.png"]);
        let mut task = LoadTask::new(1, TargetId(1), "/a/bad.png".into(), chain_proc.clone(), LoadObject::Chain(c));
        chain_proc.load(&mut task);
        assert!(matches!(chain_proc.handle_load_error(&NullTarget, &task), ErrorHandling::Unhandled));
    }

    #[test]
    fn test_empty_chain_is_bad_object() {
        let chain_proc: Arc<dyn ImageProcessor> = Arc::new(ChainProcessor);
        let obj = LoadObject::Chain(ChainState::new(Vec::new()));
        assert!(chain_proc.key(&obj).is_none());
        let mut task = LoadTask::new(1, TargetId(1), String::new(), chain_proc.clone(), obj);
        chain_proc.load(&mut task);
        assert_eq!(task.result.status, LoadStatus::BadObject);
    }
}
