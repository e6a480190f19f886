//! # Config Hot-Reload
//!
//! [`ConfigWatcher`] watches a fractal config file and hands back a freshly
//! parsed [`FractalConfig`] whenever it changes on disk. The runner passes it
//! to [`Fractal::on_reconfigure`](crate::fractal::Fractal::on_reconfigure),
//! which tears the fractal down and rebuilds it at the new depth.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  ConfigWatcher                                         │
//! │                                                        │
//! │  watcher ──► background thread (notify crate)          │
//! │              watches the config file's directory       │
//! │              sends events over mpsc channel            │
//! │                                                        │
//! │  rx ◄──────── receives filesystem events               │
//! │  debounce ─── time of the last event for our file      │
//! └────────────────────────────────────────────────────────┘
//!
//! Per-frame: poll()
//!   1. Drain rx, touch the debouncer for events on our path
//!   2. Once 100ms have passed with no new event, re-read the file
//!   3. Parsed config → Some(config); parse error → logged, None
//! ```
//!
//! The directory is watched rather than the file so that atomic saves
//! (write to a temporary file, rename over the original) are still seen.
//!
//! If the watcher cannot be created the config can still be loaded; it just
//! won't hot-reload. Errors are logged, not returned.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::FractalConfig;
use crate::error::{FractalError, Result};

/// Quiet time required after the last filesystem event before reloading.
pub const DEBOUNCE_DURATION: Duration = Duration::from_millis(100);

/// Collapses a burst of events into one trigger after a quiet period.
#[derive(Debug, Clone, Copy, Default)]
pub struct Debouncer {
    last_event: Option<Instant>,
}

impl Debouncer {
    /// Record an event. Restarts the quiet period.
    pub fn touch(&mut self, now: Instant) {
        self.last_event = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }

    /// True once, when the quiet period after the last event has elapsed.
    pub fn take_ready(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(at) if now.duration_since(at) >= DEBOUNCE_DURATION => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}

/// Watches one config file and yields parsed configs when it changes.
pub struct ConfigWatcher {
    path: PathBuf,
    /// `None` if the watcher could not be created.
    watcher: Option<RecommendedWatcher>,
    rx: mpsc::Receiver<std::result::Result<notify::Event, notify::Error>>,
    debounce: Debouncer,
    rx_disconnected: bool,
}

impl ConfigWatcher {
    /// Start watching `path`. The file must exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path = path
            .canonicalize()
            .map_err(|e| FractalError::ConfigLoad(format!("{}: {e}", path.display())))?;

        let (tx, rx) = mpsc::channel();
        let watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        });
        let mut watcher = match watcher {
            Ok(w) => Some(w),
            Err(e) => {
                log::warn!("Failed to create file watcher: {e}. Config hot-reload disabled.");
                None
            }
        };

        let watching = match (watcher.as_mut(), path.parent()) {
            (Some(w), Some(dir)) => match w.watch(dir, RecursiveMode::NonRecursive) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Failed to watch '{}': {e}", dir.display());
                    false
                }
            },
            _ => false,
        };
        if watching {
            log::debug!("Watching '{}' for changes", path.display());
        } else {
            watcher = None;
        }

        Ok(Self {
            path,
            watcher,
            rx,
            debounce: Debouncer::default(),
            rx_disconnected: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether filesystem events are being received.
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some() && !self.rx_disconnected
    }

    /// Read the file now, regardless of events.
    pub fn reload(&self) -> Result<FractalConfig> {
        FractalConfig::load(&self.path)
    }

    /// Call once per frame. Returns the new config after a debounced change.
    pub fn poll(&mut self) -> Option<FractalConfig> {
        self.drain_events();
        if !self.debounce.take_ready(Instant::now()) {
            return None;
        }
        match self.reload() {
            Ok(config) => {
                log::info!("Reloaded fractal config from '{}'", self.path.display());
                Some(config)
            }
            Err(e) => {
                log::warn!("Hot-reload failed: {e}. Keeping the current fractal.");
                None
            }
        }
    }

    fn drain_events(&mut self) {
        if self.rx_disconnected {
            return;
        }
        loop {
            match self.rx.try_recv() {
                Ok(Ok(event)) => {
                    if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
                        && event.paths.iter().any(|p| self.is_our_path(p))
                    {
                        self.debounce.touch(Instant::now());
                    }
                }
                Ok(Err(e)) => log::warn!("File watcher error: {e}"),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    log::warn!("File watcher disconnected. Config hot-reload disabled.");
                    self.rx_disconnected = true;
                    break;
                }
            }
        }
    }

    fn is_our_path(&self, event_path: &Path) -> bool {
        let canonical = event_path
            .canonicalize()
            .unwrap_or_else(|_| event_path.to_path_buf());
        canonical == self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debouncer_waits_for_quiet_period() {
        let start = Instant::now();
        let mut debounce = Debouncer::default();
        assert!(!debounce.take_ready(start));

        debounce.touch(start);
        assert!(debounce.is_pending());
        assert!(!debounce.take_ready(start + Duration::from_millis(50)));

        // A second event restarts the window.
        debounce.touch(start + Duration::from_millis(80));
        assert!(!debounce.take_ready(start + Duration::from_millis(150)));
        assert!(debounce.take_ready(start + Duration::from_millis(180)));

        // Fires once per burst.
        assert!(!debounce.take_ready(start + Duration::from_millis(500)));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn missing_file_cannot_be_watched() {
        let err = ConfigWatcher::new("/nonexistent/fractal.json").err().unwrap();
        assert!(matches!(err, FractalError::ConfigLoad(_)));
    }

    #[test]
    fn reload_reads_current_contents() {
        let path = std::env::temp_dir().join(format!("greina-watch-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "depth": 3 }"#).unwrap();
        let watcher = ConfigWatcher::new(&path).unwrap();
        assert_eq!(watcher.reload().unwrap().depth, 3);

        std::fs::write(&path, r#"{ "depth": 5 }"#).unwrap();
        assert_eq!(watcher.reload().unwrap().depth, 5);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn edit_on_disk_yields_new_config() {
        let path = std::env::temp_dir().join(format!("greina-edit-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "depth": 2 }"#).unwrap();
        let mut watcher = ConfigWatcher::new(&path).unwrap();
        assert_eq!(watcher.path(), path.canonicalize().unwrap());
        if !watcher.is_watching() {
            // No filesystem notifications on this platform.
            let _ = std::fs::remove_file(&path);
            return;
        }

        std::fs::write(&path, r#"{ "depth": 7, "submesh_index": 1 }"#).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut reloaded = None;
        while reloaded.is_none() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
            reloaded = watcher.poll();
        }
        let _ = std::fs::remove_file(&path);

        let config = reloaded.expect("no reload within 5 s of editing the file");
        assert_eq!(config.depth, 7);
        assert_eq!(config.submesh_index, 1);
        // One reload per burst of events.
        std::thread::sleep(DEBOUNCE_DURATION * 2);
        assert!(watcher.poll().is_none());
    }

    #[test]
    fn poll_without_events_yields_nothing() {
        let path = std::env::temp_dir().join(format!("greina-idle-{}.json", std::process::id()));
        std::fs::write(&path, "{}").unwrap();
        let mut watcher = ConfigWatcher::new(&path).unwrap();
        assert!(watcher.poll().is_none());
        let _ = std::fs::remove_file(&path);
    }
}
