// src/progress.rs
/// Lightweight progress reporting used by long-running operations (scrape run, find-and-replace).
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the total number of items (if known).
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one event page was reconciled and written.
    fn item_done(&mut self, _url: &str) {}

    /// Called when one event page was skipped.
    fn item_failed(&mut self, _url: &str, _reason: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Prints one line per step to stdout.
#[derive(Default)]
pub struct ConsoleProgress {
    total: usize,
    done: usize,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn step(&mut self) -> String {
        self.done += 1;
        if self.total > 0 {
            format!("[{}/{}]", self.done, self.total)
        } else {
            format!("[{}]", self.done)
        }
    }
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        println!("Processing {total} event(s)...");
    }

    fn log(&mut self, msg: &str) {
        println!("{msg}");
    }

    fn item_done(&mut self, url: &str) {
        let step = self.step();
        println!("{step} ok   {url}");
    }

    fn item_failed(&mut self, url: &str, reason: &str) {
        let step = self.step();
        println!("{step} skip {url}: {reason}");
    }

    fn finish(&mut self) {
        println!("Done.");
    }
}

/// Records calls, for tests.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingProgress {
    pub total: Option<usize>,
    pub done: Vec<String>,
    pub failed: Vec<String>,
    pub finished: bool,
}

#[cfg(test)]
impl Progress for RecordingProgress {
    fn begin(&mut self, total: usize) {
        self.total = Some(total);
    }
    fn item_done(&mut self, url: &str) {
        self.done.push(url.to_string());
    }
    fn item_failed(&mut self, url: &str, _reason: &str) {
        self.failed.push(url.to_string());
    }
    fn finish(&mut self) {
        self.finished = true;
    }
}
