//! Diagnostics: logger setup and a frame-rate counter.
//!
//! Enabled by the `diagnostics` feature flag. The runner calls
//! [`init_logger`] at startup and feeds every frame's duration to a
//! [`FrameRateCounter`], logging a summary once per sample window.

use std::fmt;

/// Install `env_logger` as the global logger.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Call this early,
/// before any log messages. A second call, or a logger installed by the host,
/// leaves the existing logger in place.
pub fn init_logger() {
    let result = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
    if result.is_err() {
        eprintln!("[greina] Warning: a logger is already set, keeping it.");
    }
}

// ── Frame-Rate Counter ───────────────────────────────────────────────────

/// Shortest allowed sample window, in seconds.
pub const MIN_SAMPLE_DURATION: f32 = 0.1;
/// Longest allowed sample window, in seconds.
pub const MAX_SAMPLE_DURATION: f32 = 2.0;

/// How a [`FrameRateReport`] expresses its numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// Frames per second, rounded to whole frames (halves to even).
    #[default]
    Fps,
    /// Milliseconds per frame, rounded to one decimal.
    Ms,
}

/// Best, average, and worst frame over one sample window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRateReport {
    pub mode: DisplayMode,
    pub best: f32,
    pub average: f32,
    pub worst: f32,
}

impl fmt::Display for FrameRateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            DisplayMode::Fps => write!(
                f,
                "FPS best {} avg {} worst {}",
                self.best, self.average, self.worst
            ),
            DisplayMode::Ms => write!(
                f,
                "MS best {:.1} avg {:.1} worst {:.1}",
                self.best, self.average, self.worst
            ),
        }
    }
}

/// Accumulates frame durations and reports once per sample window.
///
/// "Best" is the shortest frame and "worst" the longest, whichever unit the
/// report is in.
#[derive(Debug, Clone)]
pub struct FrameRateCounter {
    mode: DisplayMode,
    sample_duration: f32,
    frames: u32,
    duration: f32,
    best_duration: f32,
    worst_duration: f32,
}

impl Default for FrameRateCounter {
    fn default() -> Self {
        Self::new(DisplayMode::Fps, 1.0)
    }
}

impl FrameRateCounter {
    /// `sample_duration` is clamped to `0.1..=2.0` seconds.
    pub fn new(mode: DisplayMode, sample_duration: f32) -> Self {
        Self {
            mode,
            sample_duration: sample_duration.clamp(MIN_SAMPLE_DURATION, MAX_SAMPLE_DURATION),
            frames: 0,
            duration: 0.0,
            best_duration: f32::MAX,
            worst_duration: 0.0,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    pub fn sample_duration(&self) -> f32 {
        self.sample_duration
    }

    /// Add one frame of `frame_secs` seconds.
    ///
    /// Returns a report when the accumulated time reaches the sample window,
    /// then starts a new window.
    pub fn record(&mut self, frame_secs: f32) -> Option<FrameRateReport> {
        self.frames += 1;
        self.duration += frame_secs;
        self.best_duration = self.best_duration.min(frame_secs);
        self.worst_duration = self.worst_duration.max(frame_secs);

        if self.duration < self.sample_duration {
            return None;
        }

        let frames = self.frames as f32;
        let report = match self.mode {
            DisplayMode::Fps => FrameRateReport {
                mode: self.mode,
                best: (1.0 / self.best_duration).round_ties_even(),
                average: (frames / self.duration).round_ties_even(),
                worst: (1.0 / self.worst_duration).round_ties_even(),
            },
            DisplayMode::Ms => FrameRateReport {
                mode: self.mode,
                best: round_tenth(1000.0 * self.best_duration),
                average: round_tenth(1000.0 * self.duration / frames),
                worst: round_tenth(1000.0 * self.worst_duration),
            },
        };
        self.reset();
        Some(report)
    }

    fn reset(&mut self) {
        self.frames = 0;
        self.duration = 0.0;
        self.best_duration = f32::MAX;
        self.worst_duration = 0.0;
    }
}

fn round_tenth(value: f32) -> f32 {
    (value * 10.0).round_ties_even() / 10.0
}
