//! Progress reporting for long scans.

use std::time::Instant;

pub trait Progress {
    fn set_total(&mut self, total: usize);
    fn tick(&mut self);

    /// Polled after every object; returning true stops the scan.
    fn is_cancelled(&self) -> bool {
        false
    }
}

pub struct NoProgress;

impl Progress for NoProgress {
    fn set_total(&mut self, _total: usize) {}
    fn tick(&mut self) {}
}

/// Prints a line to stderr every `step` objects.
pub struct StderrProgress {
    total: usize,
    done: usize,
    step: usize,
    started: Instant,
}

impl StderrProgress {
    pub fn new() -> Self {
        StderrProgress {
            total: 0,
            done: 0,
            step: 1,
            started: Instant::now(),
        }
    }

    pub fn done(&self) -> usize {
        self.done
    }
}

impl Default for StderrProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for StderrProgress {
    fn set_total(&mut self, total: usize) {
        self.total = total;
        self.step = (total / 20).max(1);
        self.started = Instant::now();
        eprintln!("Checking {total} objects...");
    }

    fn tick(&mut self) {
        self.done += 1;
        if self.done % self.step == 0 || self.done == self.total {
            let pct = if self.total == 0 {
                100
            } else {
                self.done * 100 / self.total
            };
            eprintln!(
                "  {}/{} ({pct}%), {:.2}s",
                self.done,
                self.total,
                self.started.elapsed().as_secs_f64()
            );
        }
    }
}
