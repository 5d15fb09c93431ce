use std::time::{Duration, Instant};

/// Counters shown while watching or replaying episodes
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub best_size: usize,
    pub episodes_played: u32,
    pub loop_breaks: usize,
    pub steps: usize,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            best_size: 0,
            episodes_played: 0,
            loop_breaks: 0,
            steps: 0,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn on_episode_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
        self.steps = 0;
    }

    pub fn on_step(&mut self, loop_broken: bool) {
        self.steps += 1;
        if loop_broken {
            self.loop_breaks += 1;
        }
    }

    pub fn on_episode_end(&mut self, final_size: usize) {
        self.episodes_played += 1;
        self.best_size = self.best_size.max(final_size);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
