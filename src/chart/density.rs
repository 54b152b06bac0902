// DensityWindow - rolling note-density cap
//
// Keeps the times of already-placed notes that fall within the trailing
// window. A note at time t is admitted only if the closed window [t - span, t]
// would still hold at most `cap` notes. Since placement is time-ascending,
// this bounds every sliding window of length `span`.

use std::collections::VecDeque;

pub struct DensityWindow {
    span: f64,
    cap: usize,
    times: VecDeque<f64>,
}

impl DensityWindow {
    pub fn new(span: f64, cap: usize) -> Self {
        Self {
            span,
            cap,
            times: VecDeque::with_capacity(cap + 1),
        }
    }

    /// Whether a note at `time` fits under the cap
    pub fn admits(&mut self, time: f64) -> bool {
        while let Some(&front) = self.times.front() {
            if time - front > self.span {
                self.times.pop_front();
            } else {
                break;
            }
        }
        self.times.len() < self.cap
    }

    /// Record a placed note
    pub fn record(&mut self, time: f64) {
        self.times.push_back(time);
    }
}
