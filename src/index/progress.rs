/// Receives build progress as a percentage
pub trait ProgressSink {
    fn report(&mut self, percent: u32);
}

impl<F: FnMut(u32)> ProgressSink for F {
    fn report(&mut self, percent: u32) {
        self(percent)
    }
}

/// Discards progress
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: u32) {}
}

/// Throttles reports to steps of at least `min_delta` percent and makes
/// sure 100 is reported exactly once.
pub struct Progress<'a> {
    sink: &'a mut dyn ProgressSink,
    min_delta: u32,
    last: Option<u32>,
}

impl<'a> Progress<'a> {
    pub fn new(sink: &'a mut dyn ProgressSink, min_delta: u32) -> Self {
        Self {
            sink,
            min_delta: min_delta.max(1),
            last: None,
        }
    }

    /// Report `done` of `total` steps complete
    pub fn update(&mut self, done: usize, total: usize) {
        let percent = if total == 0 {
            100
        } else {
            (done.min(total) * 100 / total) as u32
        };
        let due = match self.last {
            None => true,
            Some(last) => percent >= last + self.min_delta,
        };
        if due {
            self.sink.report(percent);
            self.last = Some(percent);
        }
    }

    pub fn finish(&mut self) {
        if self.last != Some(100) {
            self.sink.report(100);
            self.last = Some(100);
        }
    }
}
