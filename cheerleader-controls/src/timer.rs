use std::time::Duration;
use tokio::time::Instant;

/// Playback position clock. Runs while the output plays.
#[derive(Debug, Default)]
pub struct Timer {
    started: Option<Instant>,
    accumulated: Duration,
}

impl Timer {
    pub fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        if let Some(started) = self.started.take() {
            self.accumulated += started.elapsed();
        }
    }

    pub fn stop(&mut self) {
        self.started = None;
        self.accumulated = Duration::ZERO;
    }

    pub fn set_time(&mut self, time: Duration) {
        self.accumulated = time;
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self.started {
            Some(started) => self.accumulated + started.elapsed(),
            None => self.accumulated,
        }
    }
}
