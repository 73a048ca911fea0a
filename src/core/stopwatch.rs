use std::time::{Duration, Instant};

/// Wall-clock timing of the stages of a render, reported through `log`.
pub struct Stopwatch {
    name: String,
    splits: Vec<(String, Duration)>,
    start_total: Instant,
    start_split: Instant,
}

impl Stopwatch {
    pub fn new(name: &str) -> Stopwatch {
        let now = Instant::now();
        Stopwatch {
            name: name.to_owned(),
            splits: Vec::new(),
            start_total: now,
            start_split: now,
        }
    }

    pub fn total_elapsed(&self) -> Duration {
        self.start_total.elapsed()
    }

    /// Closes the current stage and starts the next one.
    pub fn record_split(&mut self, stage: &str) -> Duration {
        let now = Instant::now();
        let duration = now - self.start_split;
        self.start_split = now;
        self.splits.push((stage.to_owned(), duration));
        duration
    }

    pub fn splits(&self) -> &[(String, Duration)] {
        &self.splits
    }

    /**
     * One line for the total, then one indented line per stage, in the order
     * the stages were recorded.
     */
    pub fn report(&self) -> Vec<String> {
        std::iter::once(format!(
            "{}: {:?} total",
            self.name,
            self.total_elapsed()
        ))
        .chain(
            self.splits
                .iter()
                .map(|(stage, duration)| format!("  {}: {:?}", stage, duration)),
        )
        .collect()
    }

    pub fn log(&self) {
        for line in self.report() {
            log::info!("{}", line);
        }
    }
}
