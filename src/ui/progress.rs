use crate::ui::progress_message::ProgressMessage;
use crate::ui::{Icons, theme};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Totals gathered from progress messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressTotals {
    pub files: usize,
    pub components: usize,
    pub failed: usize,
}

/// Progress bar fed by worker threads over a channel.
pub struct ProgressManager {
    bar: ProgressBar,
    files: Arc<AtomicUsize>,
    components: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,
    handle: thread::JoinHandle<()>,
}

impl ProgressManager {
    pub fn new(total_files: usize) -> (Self, crossbeam::channel::Sender<ProgressMessage>) {
        let (tx, rx) = crossbeam::channel::unbounded::<ProgressMessage>();

        let bar = if console::Term::stdout().is_term() {
            let bar = ProgressBar::new(total_files as u64).with_message("Segmenting files");
            if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {wide_msg}") {
                bar.set_style(style.progress_chars("=> "));
            }
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            ProgressBar::hidden()
        };

        let files = Arc::new(AtomicUsize::new(0));
        let components = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));

        let bar_clone = bar.clone();
        let files_clone = files.clone();
        let components_clone = components.clone();
        let failed_clone = failed.clone();

        let handle = thread::spawn(move || {
            for msg in rx {
                match msg {
                    ProgressMessage::Processed { file, components } => {
                        files_clone.fetch_add(1, Ordering::Relaxed);
                        components_clone.fetch_add(components, Ordering::Relaxed);
                        bar_clone.inc(1);
                        bar_clone.set_message(file);
                    }
                    ProgressMessage::Failed { file } => {
                        failed_clone.fetch_add(1, Ordering::Relaxed);
                        bar_clone.inc(1);
                        bar_clone.set_message(format!("failed: {}", file));
                    }
                    ProgressMessage::Finished => {
                        bar_clone.finish_and_clear();
                        break;
                    }
                }
            }
        });

        (
            Self {
                bar,
                files,
                components,
                failed,
                handle,
            },
            tx,
        )
    }

    /// Wait for the progress thread and return what it counted. The sender
    /// must have sent `Finished` or been dropped.
    pub fn finish(self) -> ProgressTotals {
        if self.handle.join().is_err() {
            tracing::warn!("progress thread panicked");
        }
        self.bar.finish_and_clear();
        ProgressTotals {
            files: self.files.load(Ordering::Relaxed),
            components: self.components.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Print the closing summary line for a batch.
pub fn print_summary(duration: Duration, totals: ProgressTotals) {
    println!();
    let style = if totals.failed == 0 {
        theme().success.clone()
    } else {
        theme().warn.clone()
    };
    println!(
        "{} {}",
        Icons::CHECK.style(theme().success.clone()),
        format!("Complete in {}", HumanDuration(duration)).style(style)
    );
    println!(
        "  {} {}  {} {}  {} {}",
        Icons::FILE.style(theme().info.clone()),
        totals.files,
        Icons::PUZZLE.style(theme().info.clone()),
        totals.components,
        Icons::CROSS.style(theme().error.clone()),
        totals.failed
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_follow_messages() {
        let (progress, tx) = ProgressManager::new(3);
        tx.send(ProgressMessage::Processed {
            file: "a.py".to_string(),
            components: 4,
        })
        .unwrap();
        tx.send(ProgressMessage::Processed {
            file: "b.py".to_string(),
            components: 2,
        })
        .unwrap();
        tx.send(ProgressMessage::Failed {
            file: "c.py".to_string(),
        })
        .unwrap();
        drop(tx);

        let totals = progress.finish();
        assert_eq!(
            totals,
            ProgressTotals {
                files: 2,
                components: 6,
                failed: 1
            }
        );
    }
}
