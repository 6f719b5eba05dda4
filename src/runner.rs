//! Command runner - entry point behind the CLI binary.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::{info, trace, warn};

use crate::cli::{self, Args, Command};
use crate::config::{AppConfig, CONFIG_FILE};
use crate::core::pipeline::{ImagePipeline, SetOutcome};
use crate::entities::{FileProcessor, ImageCrateDecoder, ImageProcessor, ImageTarget, LoadObject, Thumbnail};
use crate::paths::{self, PathConfig};
use crate::search::SearchPreprocessor;
use crate::store::{JsonVideoStore, VideoStore};

/// Run the parsed command.
///
/// # Returns
/// * `Ok(())` when the command completed (individual file failures are reported, not fatal)
/// * `Err` if configuration, globbing or the metadata store fail
pub fn run(args: Args, path_config: &PathConfig) -> Result<()> {
    info!("Config path: {}", paths::config_file(CONFIG_FILE, path_config).display());
    let config = AppConfig::load(path_config)?;
    trace!("Effective config: {:?}", config);

    match args.command {
        Command::Identify {
            patterns,
            input,
            record,
        } => identify(&config, path_config, &patterns, input.as_deref(), record),
        Command::Thumbs {
            patterns,
            size,
            workers,
            timeout_secs,
        } => thumbs(&config, &patterns, size.as_deref(), workers, Duration::from_secs(timeout_secs)),
    }
}

/// Expand glob patterns; strings without wildcards pass through untouched so
/// remote URIs (`smb://...`) and non-existent paths can still be identified.
fn expand_patterns(patterns: &[String]) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            out.push(pattern.clone());
            continue;
        }
        let paths = glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;
        let before = out.len();
        out.extend(paths.filter_map(Result::ok).map(|p| p.to_string_lossy().replace('\\', "/")));
        if out.len() == before {
            warn!("No files match pattern: {}", pattern);
        }
    }
    Ok(out)
}

fn identify(
    config: &AppConfig,
    path_config: &PathConfig,
    patterns: &[String],
    input: Option<&str>,
    record: bool,
) -> Result<()> {
    let preprocessor = SearchPreprocessor::new();
    let files = expand_patterns(patterns)?;
    if files.is_empty() && input.is_none() {
        bail!("Nothing to identify: pass file patterns or --input");
    }

    let mut results = Vec::new();
    if let Some(text) = input {
        let file = files.first().map(String::as_str).unwrap_or("");
        let info = preprocessor.parse_user_input(text, file);
        println!("{:?}\n  input: {}", text, info);
        results.push(info);
    } else {
        for file in &files {
            let info = preprocessor.parse_file(file);
            println!("{}\n  {}: {}", file, preprocessor.file_matcher_name(file), info);
            results.push(info);
        }
    }

    if record {
        paths::ensure_dirs(path_config)?;
        let store_path = paths::data_file(&config.store_file, path_config);
        let mut store = JsonVideoStore::open(&store_path)
            .with_context(|| format!("Failed to open metadata store: {}", store_path.display()))?;
        for info in results.iter().filter(|i| !i.file().is_empty()) {
            let id = store
                .apply_search_info(info)
                .with_context(|| format!("Failed to record {}", info.file()))?;
            trace!("Recorded {} as #{}", info.file(), id);
        }
        info!("Metadata store now holds {} records ({})", store.len(), store_path.display());
    }
    Ok(())
}

/// Target that remembers what the pipeline showed last
#[derive(Default)]
struct ReportTarget {
    image: Cell<Option<(u32, u32)>>,
    placeholders: Cell<usize>,
}

impl ImageTarget for ReportTarget {
    fn show_image(&self, image: &Thumbnail) {
        self.image.set(Some((image.width(), image.height())));
    }

    fn show_placeholder(&self, _placeholder: Option<&Thumbnail>) {
        self.image.set(None);
        self.placeholders.set(self.placeholders.get() + 1);
    }
}

fn thumbs(
    config: &AppConfig,
    patterns: &[String],
    size: Option<&str>,
    workers: Option<i32>,
    timeout: Duration,
) -> Result<()> {
    let mut pipeline_config = config.pipeline.clone();
    if let Some(text) = size {
        let Some(bounds) = cli::parse_size(text) else {
            bail!("Invalid size {:?}, expected WIDTHxHEIGHT", text);
        };
        pipeline_config.thumbnail_size = Some(bounds);
    }
    if let Some(n) = workers {
        pipeline_config.worker_count = n;
    }

    let files = expand_patterns(patterns)?;
    let processor: Arc<dyn ImageProcessor> =
        Arc::new(FileProcessor::new(Arc::new(ImageCrateDecoder), pipeline_config.thumbnail_size));
    let mut pipeline = ImagePipeline::new(pipeline_config).with_placeholder(Thumbnail::solid(1, 1, [64, 64, 64, 255]));

    let mut targets = Vec::with_capacity(files.len());
    for file in &files {
        let report = Rc::new(ReportTarget::default());
        let target: Rc<dyn ImageTarget> = report.clone();
        let outcome = pipeline.set(&target, Arc::clone(&processor), LoadObject::Path(file.into()));
        trace!("{} -> {:?}", file, outcome);
        targets.push((file, report, target, outcome));
    }

    if !pipeline.wait_idle(timeout) {
        warn!("{} loads still pending after {:?}", pipeline.pending(), timeout);
    }

    for (file, report, target, outcome) in &targets {
        let status = match (report.image.get(), outcome) {
            (Some((w, h)), SetOutcome::CacheHit) => format!("cached {}x{}", w, h),
            (Some((w, h)), _) => format!("ok {}x{}", w, h),
            (None, _) if pipeline.is_loading(target) => "pending".to_string(),
            (None, _) => "failed".to_string(),
        };
        println!("{}: {}", file, status);
    }

    let stats = pipeline.cache().stats();
    println!(
        "cache: {} entries, {} bytes, hits {} misses {} resurrections {} evictions {} (hit rate {:.0}%)",
        pipeline.cache().len(),
        pipeline.cache().approximate_size(),
        stats.hits(),
        stats.misses(),
        stats.resurrections(),
        stats.evictions(),
        stats.hit_rate() * 100.0
    );
    Ok(())
}
