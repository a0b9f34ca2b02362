//! Subcommand implementations and the file worker pool

use crate::{Cli, Commands};
use anyhow::Context;
use codesplit::config::{self, SplitterConfig};
use codesplit::discover::{collect_inputs, language_hint};
use codesplit::output::{ComponentRecord, TextSlice, render_json, to_records, to_slices};
use codesplit::ui::{self, Icons, ProgressManager, ProgressMessage};
use codesplit::{Component, Error, SegmentOptions, Segmenter, default_registry};
use crossbeam::channel::Sender;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Component as PathComponent, Path, PathBuf};
use std::time::Instant;

/// Per-batch counters; `defects` drives the exit code.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub processed: usize,
    pub failed: usize,
    pub defects: usize,
}

impl Outcome {
    fn record_failure(&mut self, path: &Path, err: &anyhow::Error) {
        self.failed += 1;
        match err.downcast_ref::<Error>() {
            Some(Error::InvariantViolation { components, .. }) => {
                self.defects += 1;
                tracing::debug!("offending component list for {}: {:?}", path.display(), components);
                ui::error(&format!("{}: {:#} (internal defect, please report)", path.display(), err));
            }
            _ => ui::error(&format!("{}: {:#}", path.display(), err)),
        }
        tracing::warn!("skipped {}", path.display());
    }
}

pub fn run(cli: &Cli) -> anyhow::Result<Outcome> {
    match &cli.command {
        Commands::List { inputs, json } => {
            let settings = Settings::resolve(cli)?;
            run_list(&settings, inputs, *json)
        }
        Commands::Split {
            inputs,
            out,
            flat,
            force,
            bare,
        } => {
            let settings = Settings::resolve(cli)?;
            let target = SplitTarget {
                out: out.clone(),
                subdirectories: settings.config.output.subdirectories && !flat,
                include_leading_comments: settings.config.output.include_leading_comments && !bare,
                force: *force,
            };
            run_split(&settings, inputs, &target)
        }
        Commands::Languages => {
            run_languages();
            Ok(Outcome::default())
        }
        Commands::Init { force } => {
            run_init(cli.config.as_deref(), *force)?;
            Ok(Outcome::default())
        }
    }
}

/// Config file merged with command-line overrides.
struct Settings {
    config: SplitterConfig,
    options: SegmentOptions,
    language: Option<String>,
    jobs: usize,
}

impl Settings {
    fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let config = match (config::load_config(cli.config.as_deref())?, &cli.config) {
            (Some(config), _) => config,
            (None, Some(path)) => anyhow::bail!("config file {} not found", path.display()),
            (None, None) => SplitterConfig::default(),
        };

        let mut options = config.segment_options()?;
        if !cli.kinds.is_empty() {
            options = options.with_kinds(config::parse_kinds(&cli.kinds)?);
        }
        if cli.no_comments {
            options = options.with_attach_comments(false);
        }
        if let Some(max) = cli.max_blank_lines {
            options = options.with_max_blank_lines(max);
        }

        let jobs = cli.jobs.filter(|jobs| *jobs > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        });
        tracing::debug!("segment options: {:?}, {} worker(s)", options, jobs);

        Ok(Self {
            config,
            options,
            language: cli.language.clone(),
            jobs,
        })
    }
}

/// One segmented input file.
struct SegmentedFile {
    language: String,
    source: String,
    components: Vec<Component>,
}

fn segment_file(segmenter: &Segmenter, settings: &Settings, path: &Path) -> anyhow::Result<SegmentedFile> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let hint = settings
        .language
        .clone()
        .or_else(|| language_hint(path))
        .with_context(|| format!("cannot infer the language of {} (use --language)", path.display()))?;

    let segmentation = segmenter.segment_with_fallback(&bytes, &hint, &settings.options)?;
    if !segmentation.clean {
        tracing::debug!("{} has syntax errors; see `other` components", path.display());
    }
    let source = String::from_utf8(bytes).context("source is not valid UTF-8")?;

    Ok(SegmentedFile {
        language: segmentation.language,
        source,
        components: segmentation.components,
    })
}

/// Run `work` over every file on `jobs` scoped threads. Results come back in
/// the order of `files`.
fn run_pool<T, F>(files: &[PathBuf], jobs: usize, progress: &Sender<ProgressMessage>, work: F) -> Vec<anyhow::Result<T>>
where
    T: Send + Counted,
    F: Fn(&Path) -> anyhow::Result<T> + Sync,
{
    let (job_tx, job_rx) = crossbeam::channel::unbounded::<usize>();
    let (result_tx, result_rx) = crossbeam::channel::unbounded::<(usize, anyhow::Result<T>)>();
    for index in 0..files.len() {
        job_tx.send(index).ok();
    }
    drop(job_tx);

    let workers = jobs.clamp(1, files.len().max(1));
    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let work = &work;
            scope.spawn(move || {
                for index in job_rx.iter() {
                    let path = &files[index];
                    let result = work(path);
                    let file = path.display().to_string();
                    let message = match &result {
                        Ok(value) => ProgressMessage::Processed {
                            file,
                            components: value.count(),
                        },
                        Err(_) => ProgressMessage::Failed { file },
                    };
                    progress.send(message).ok();
                    if result_tx.send((index, result)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut results: Vec<(usize, anyhow::Result<T>)> = result_rx.iter().collect();
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}

/// Number of components a worker result stands for, for progress reporting.
trait Counted {
    fn count(&self) -> usize;
}

impl Counted for SegmentedFile {
    fn count(&self) -> usize {
        self.components.len()
    }
}

impl Counted for usize {
    fn count(&self) -> usize {
        *self
    }
}

#[derive(Serialize)]
struct FileListing {
    path: String,
    language: String,
    components: Vec<ComponentRecord>,
}

fn run_list(settings: &Settings, inputs: &[PathBuf], json: bool) -> anyhow::Result<Outcome> {
    let segmenter = Segmenter::default();
    let files = collect_inputs(inputs, &settings.config.exclude, segmenter.registry())?;
    if files.is_empty() {
        ui::warn("No supported source files found");
        return Ok(Outcome::default());
    }
    if !json {
        ui::header(Icons::SEARCH, &format!("Segmenting {} file(s)", files.len()));
    }

    let started = Instant::now();
    let (progress, tx) = ProgressManager::new(files.len());
    let results = run_pool(&files, settings.jobs, &tx, |path| segment_file(&segmenter, settings, path));
    tx.send(ProgressMessage::Finished).ok();
    drop(tx);
    let totals = progress.finish();

    let mut outcome = Outcome::default();
    let mut listings = Vec::new();
    for (path, result) in files.iter().zip(results) {
        let file = match result {
            Ok(file) => file,
            Err(err) => {
                outcome.record_failure(path, &err);
                continue;
            }
        };
        outcome.processed += 1;

        if json {
            listings.push(FileListing {
                path: path.display().to_string(),
                language: file.language,
                components: to_records(&file.components),
            });
            continue;
        }
        ui::section(&path.display().to_string());
        ui::info("language", &file.language);
        if file.components.is_empty() {
            println!("  {}", ui::muted("no components"));
        } else {
            println!("{}", ui::component_table(&file.components));
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
    } else {
        println!();
        ui::summary_row("files", &totals.files.to_string());
        ui::summary_row("components", &totals.components.to_string());
        if totals.failed > 0 {
            ui::summary_row("failed", &totals.failed.to_string());
        }
        ui::timing(&format!("{:.2?}", started.elapsed()));
    }
    Ok(outcome)
}

/// Where and how `split` writes component files.
struct SplitTarget {
    out: PathBuf,
    subdirectories: bool,
    include_leading_comments: bool,
    force: bool,
}

fn run_split(settings: &Settings, inputs: &[PathBuf], target: &SplitTarget) -> anyhow::Result<Outcome> {
    let segmenter = Segmenter::default();
    let files = collect_inputs(inputs, &settings.config.exclude, segmenter.registry())?;
    if files.is_empty() {
        ui::warn("No supported source files found");
        return Ok(Outcome::default());
    }
    let sanitizer = Regex::new(r"[^A-Za-z0-9_]+")?;
    std::fs::create_dir_all(&target.out)
        .with_context(|| format!("failed to create {}", target.out.display()))?;

    ui::header(
        Icons::SCISSORS,
        &format!("Splitting {} file(s) into {}", files.len(), target.out.display()),
    );

    let destinations = plan_destinations(&files, target, &sanitizer)?;
    let destination_of: HashMap<&Path, &Destination> = files.iter().map(PathBuf::as_path).zip(&destinations).collect();

    let started = Instant::now();
    let (progress, tx) = ProgressManager::new(files.len());
    let results = run_pool(&files, settings.jobs, &tx, |path| {
        let file = segment_file(&segmenter, settings, path)?;
        let destination = destination_of
            .get(path)
            .with_context(|| format!("no output location planned for {}", path.display()))?;
        write_components(path, &file, destination, target, &sanitizer)
    });
    tx.send(ProgressMessage::Finished).ok();
    drop(tx);
    let totals = progress.finish();

    let mut outcome = Outcome::default();
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(written) => {
                outcome.processed += 1;
                tracing::debug!("{}: wrote {} component file(s)", path.display(), written);
            }
            Err(err) => outcome.record_failure(path, &err),
        }
    }

    ui::print_summary(started.elapsed(), totals);
    if outcome.processed > 0 {
        ui::success(&format!(
            "Wrote {} component file(s) to {}",
            totals.components,
            target.out.display()
        ));
    }
    Ok(outcome)
}

/// Output location of one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Destination {
    dir: PathBuf,
    /// Prepended to component file names in the flat layout
    prefix: String,
    /// Base name of the manifest
    stem: String,
}

/// Place every input under `target.out`, mirroring its directory relative to
/// the deepest directory shared by all inputs. Inputs that would still share
/// a location (`util.py` next to `util.js`) are told apart by their full
/// file name.
fn plan_destinations(files: &[PathBuf], target: &SplitTarget, sanitizer: &Regex) -> anyhow::Result<Vec<Destination>> {
    let mut parents = Vec::with_capacity(files.len());
    for file in files {
        let absolute = std::fs::canonicalize(file)
            .or_else(|_| std::path::absolute(file))
            .with_context(|| format!("failed to resolve {}", file.display()))?;
        parents.push(absolute.parent().map(Path::to_path_buf).unwrap_or_default());
    }
    let root = common_root(&parents);

    let keys: Vec<(PathBuf, String)> = files
        .iter()
        .zip(&parents)
        .map(|(file, parent)| {
            let relative: PathBuf = parent
                .strip_prefix(&root)
                .unwrap_or(parent)
                .components()
                .filter(|c| matches!(c, PathComponent::Normal(_)))
                .collect();
            let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("source").to_string();
            (relative, stem)
        })
        .collect();

    let mut seen: HashMap<&(PathBuf, String), usize> = HashMap::new();
    for key in &keys {
        *seen.entry(key).or_default() += 1;
    }

    Ok(files
        .iter()
        .zip(&keys)
        .map(|(file, key)| {
            let (relative, stem) = key;
            let stem = if seen.get(key).copied().unwrap_or(0) > 1 {
                let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
                sanitizer.replace_all(&name, "_").into_owned()
            } else {
                stem.clone()
            };
            let base = target.out.join(relative);
            if target.subdirectories {
                Destination {
                    dir: base.join(&stem),
                    prefix: String::new(),
                    stem,
                }
            } else {
                Destination {
                    dir: base,
                    prefix: format!("{}_", stem),
                    stem,
                }
            }
        })
        .collect())
}

/// Deepest directory containing every path in `dirs`.
fn common_root(dirs: &[PathBuf]) -> PathBuf {
    let Some((first, rest)) = dirs.split_first() else {
        return PathBuf::new();
    };
    let mut root = first.clone();
    for dir in rest {
        while !dir.starts_with(&root) {
            if !root.pop() {
                return PathBuf::new();
            }
        }
    }
    root
}

/// Write one file per component plus the JSON manifest. Nothing is written
/// when any target exists and `force` is off.
fn write_components(
    path: &Path,
    file: &SegmentedFile,
    destination: &Destination,
    target: &SplitTarget,
    sanitizer: &Regex,
) -> anyhow::Result<usize> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("txt");
    let dir = &destination.dir;

    let mut planned: Vec<(PathBuf, String)> = to_slices(&file.source, &file.components, target.include_leading_comments)
        .iter()
        .map(|slice| {
            let name = component_file_name(&destination.prefix, slice, extension, sanitizer);
            (dir.join(name), slice.text.clone())
        })
        .collect();
    let written = planned.len();
    planned.push((
        dir.join(format!("{}.components.json", destination.stem)),
        render_json(&to_records(&file.components))?,
    ));

    if !target.force {
        if let Some((existing, _)) = planned.iter().find(|(path, _)| path.exists()) {
            anyhow::bail!("{} already exists (use --force to overwrite)", existing.display());
        }
    }

    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    for (path, text) in &mut planned {
        if !text.ends_with('\n') {
            text.push('\n');
        }
        std::fs::write(&*path, text.as_bytes()).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(written)
}

/// `NNN-<kind>[-<name>].<ext>`, with the name reduced to a safe identifier.
fn component_file_name(prefix: &str, slice: &TextSlice, extension: &str, sanitizer: &Regex) -> String {
    let name = slice
        .name
        .as_deref()
        .map(|name| sanitizer.replace_all(name, "_").trim_matches('_').chars().take(48).collect::<String>())
        .filter(|name| !name.is_empty())
        .map(|name| format!("-{}", name))
        .unwrap_or_default();
    format!("{}{:03}-{}{}.{}", prefix, slice.index, slice.kind, name, extension)
}

fn run_languages() {
    let registry = default_registry();
    ui::header(Icons::FILE, "Supported languages");
    println!("{}", ui::language_table(&registry));
    println!(
        "{}",
        ui::dim("`.h` headers are parsed as C first and retried as C++ when C reports syntax errors")
    );
}

fn run_init(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config::default_config_path);
    config::write_config(&path, &SplitterConfig::default(), force)?;
    ui::success(&format!("Wrote {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesplit::ComponentKind;
    use tempfile::tempdir;

    fn settings() -> Settings {
        Settings {
            config: SplitterConfig::default(),
            options: SegmentOptions::default(),
            language: None,
            jobs: 2,
        }
    }

    #[test]
    fn test_component_file_name() {
        let sanitizer = Regex::new(r"[^A-Za-z0-9_]+").unwrap();
        let slice = TextSlice {
            index: 7,
            kind: ComponentKind::TypeDefinition,
            name: Some("Display for Point<T>".to_string()),
            text: String::new(),
        };
        assert_eq!(
            component_file_name("", &slice, "rs", &sanitizer),
            "007-type-Display_for_Point_T.rs"
        );

        let unnamed = TextSlice {
            index: 12,
            kind: ComponentKind::Comment,
            name: None,
            text: String::new(),
        };
        assert_eq!(component_file_name("lib_", &unnamed, "rs", &sanitizer), "lib_012-comment.rs");
    }

    #[test]
    fn test_pool_keeps_input_order() {
        let files: Vec<PathBuf> = (0..20).map(|i| PathBuf::from(format!("f{}.py", i))).collect();
        let (tx, rx) = crossbeam::channel::unbounded();
        let results = run_pool(&files, 4, &tx, |path| {
            let name = path.to_string_lossy();
            if name == "f3.py" {
                anyhow::bail!("boom");
            }
            Ok(name.len())
        });
        drop(tx);

        assert_eq!(results.len(), 20);
        assert!(results[3].is_err());
        assert_eq!(*results[12].as_ref().unwrap(), "f12.py".len());
        assert_eq!(rx.iter().count(), 20);
    }

    #[test]
    fn test_split_writes_components_and_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("shapes.py");
        std::fs::write(&input, "import math\n\n# Area helper\ndef area(r):\n    return math.pi * r * r\n").unwrap();

        let settings = settings();
        let file = segment_file(&Segmenter::default(), &settings, &input).unwrap();
        let target = SplitTarget {
            out: dir.path().join("out"),
            subdirectories: true,
            include_leading_comments: true,
            force: false,
        };
        let sanitizer = Regex::new(r"[^A-Za-z0-9_]+").unwrap();
        let destination = plan_destinations(&[input.clone()], &target, &sanitizer).unwrap().remove(0);

        let written = write_components(&input, &file, &destination, &target, &sanitizer).unwrap();
        assert_eq!(written, 2);

        let function = std::fs::read_to_string(target.out.join("shapes/001-function-area.py")).unwrap();
        assert!(function.starts_with("# Area helper\ndef area(r):"));
        assert!(target.out.join("shapes/000-import-math.py").exists());
        assert!(target.out.join("shapes/shapes.components.json").exists());

        let err = write_components(&input, &file, &destination, &target, &sanitizer).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let forced = SplitTarget { force: true, ..target };
        assert_eq!(write_components(&input, &file, &destination, &forced, &sanitizer).unwrap(), 2);
    }

    #[test]
    fn test_flat_layout_prefixes_stem() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("main.go");
        std::fs::write(&input, "package main\n\nfunc main() {}\n").unwrap();

        let file = segment_file(&Segmenter::default(), &settings(), &input).unwrap();
        let target = SplitTarget {
            out: dir.path().join("out"),
            subdirectories: false,
            include_leading_comments: false,
            force: false,
        };
        let sanitizer = Regex::new(r"[^A-Za-z0-9_]+").unwrap();
        let destination = plan_destinations(&[input.clone()], &target, &sanitizer).unwrap().remove(0);
        write_components(&input, &file, &destination, &target, &sanitizer).unwrap();

        assert!(target.out.join("main_000-declaration-main.go").exists());
        assert!(target.out.join("main_001-function-main.go").exists());
        assert!(target.out.join("main.components.json").exists());
    }

    #[test]
    fn test_split_mirrors_input_directories() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("pkg");
        for package in ["a", "b"] {
            std::fs::create_dir_all(input.join(package)).unwrap();
            std::fs::write(input.join(package).join("__init__.py"), "import os\n").unwrap();
        }
        std::fs::write(input.join("util.py"), "X = 1\n").unwrap();
        std::fs::write(input.join("util.js"), "const X = 1;\n").unwrap();

        let target = SplitTarget {
            out: dir.path().join("parts"),
            subdirectories: true,
            include_leading_comments: true,
            force: false,
        };
        let outcome = run_split(&settings(), &[input.clone()], &target).unwrap();
        assert_eq!(
            outcome,
            Outcome {
                processed: 4,
                failed: 0,
                defects: 0
            }
        );

        let out = &target.out;
        assert!(out.join("a/__init__/__init__.components.json").exists());
        assert!(out.join("b/__init__/000-import-os.py").exists());
        assert!(out.join("util_py/util_py.components.json").exists());
        assert!(out.join("util_js/util_js.components.json").exists());
    }

    #[test]
    fn test_flat_layout_keeps_same_stems_apart() {
        let dir = tempdir().unwrap();
        let files = vec![dir.path().join("x/mod.rs"), dir.path().join("y/mod.rs")];
        for file in &files {
            std::fs::create_dir_all(file.parent().unwrap()).unwrap();
            std::fs::write(file, "fn f() {}\n").unwrap();
        }
        let target = SplitTarget {
            out: dir.path().join("parts"),
            subdirectories: false,
            include_leading_comments: true,
            force: false,
        };
        let sanitizer = Regex::new(r"[^A-Za-z0-9_]+").unwrap();
        let destinations = plan_destinations(&files, &target, &sanitizer).unwrap();

        assert_eq!(destinations[0].dir, target.out.join("x"));
        assert_eq!(destinations[1].dir, target.out.join("y"));
        assert_eq!(destinations[0].prefix, "mod_");
    }

    #[test]
    fn test_invariant_violation_counts_as_defect() {
        let mut outcome = Outcome::default();
        let err = anyhow::Error::new(Error::InvariantViolation {
            message: "overlap".to_string(),
            components: Vec::new(),
        })
        .context("segmenting x.py");
        outcome.record_failure(Path::new("x.py"), &err);
        outcome.record_failure(Path::new("y.py"), &anyhow::anyhow!("unreadable"));
        assert_eq!(
            outcome,
            Outcome {
                processed: 0,
                failed: 2,
                defects: 1
            }
        );
    }
}
