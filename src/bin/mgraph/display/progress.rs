use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use molgraph::{ProcessObserver, ProcessReport, SkipReason};

pub struct RecordBar {
    bar: Option<ProgressBar>,
    start: Instant,
    skipped: usize,
}

impl RecordBar {
    fn new() -> Self {
        Self {
            bar: None,
            start: Instant::now(),
            skipped: 0,
        }
    }

    fn start(&mut self, total: Option<usize>) {
        let bar = match total {
            Some(n) => {
                let bar = ProgressBar::new(n as u64);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("  {spinner:.cyan} [{bar:36.cyan/blue}] {pos}/{len} {msg}")
                        .expect("invalid template")
                        .progress_chars("━╸─"),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::default_spinner()
                        .template("  {spinner:.cyan} {pos} molecules {msg}")
                        .expect("invalid template")
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
                );
                bar
            }
        };
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.set_message("Encoding molecules");
        self.bar = Some(bar);
    }

    fn advance(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn skip(&mut self) {
        self.skipped += 1;
        if let Some(bar) = &self.bar {
            bar.set_message(format!("Encoding molecules ({} skipped)", self.skipped));
        }
    }

    fn complete(&mut self, report: &ProcessReport) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }

        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<44} {:>5.1}s",
            format!("Encoded {} of {} molecules", report.kept, report.records),
            self.start.elapsed().as_secs_f64()
        );
        for (label, count) in [
            ("malformed", report.malformed),
            ("overlapping atoms", report.degenerate),
            ("rejected by filter", report.filtered),
        ] {
            if count > 0 {
                let _ = writeln!(stderr, "      \x1b[2m·\x1b[0m {count} {label}");
            }
        }
    }

    fn finish(mut self, from_cache: bool) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }

        let mut stderr = io::stderr().lock();
        if from_cache {
            let _ = writeln!(
                stderr,
                "  \x1b[32m✓\x1b[0m {:<44} {:>5.1}s",
                "Loaded processed cache",
                self.start.elapsed().as_secs_f64()
            );
        }
        let _ = writeln!(stderr);
    }
}

pub enum Progress {
    Interactive(RecordBar),
    Silent,
}

impl Progress {
    pub fn new(interactive: bool) -> Self {
        if interactive {
            Self::Interactive(RecordBar::new())
        } else {
            Self::Silent
        }
    }

    pub fn finish(self, from_cache: bool) {
        match self {
            Self::Interactive(bar) => bar.finish(from_cache),
            Self::Silent => {}
        }
    }
}

impl ProcessObserver for Progress {
    fn on_start(&mut self, total: Option<usize>) {
        if let Self::Interactive(bar) = self {
            bar.start(total);
        }
    }

    fn on_record(&mut self, _index: usize) {
        if let Self::Interactive(bar) = self {
            bar.advance();
        }
    }

    fn on_skip(&mut self, _index: usize, _reason: &SkipReason) {
        if let Self::Interactive(bar) = self {
            bar.skip();
        }
    }

    fn on_finish(&mut self, report: &ProcessReport) {
        if let Self::Interactive(bar) = self {
            bar.complete(report);
        }
    }
}
