use std::time::{Duration, Instant};
use winit::window::Window;

const TITLE_REFRESH: Duration = Duration::from_millis(500);

/// Editor counters shown in the window title next to the frame rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TitleStats {
    pub entries: usize,
    pub pending_loads: usize,
}

/// Counts presented frames and rewrites the window title twice a second.
pub struct FrameTiming {
    window_start: Instant,
    frames: u32,
    present_ms: f32,
    base_title: String,
}

impl FrameTiming {
    pub fn new(base_title: String) -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
            present_ms: 0.0,
            base_title,
        }
    }

    pub fn set_present_ms(&mut self, present_ms: f32) {
        self.present_ms = present_ms;
    }

    /// Counts a frame. Returns the frame rate once a refresh window closes.
    fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frames = self.frames.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < TITLE_REFRESH {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }

    pub fn update(&mut self, window: &Window, now: Instant, stats: TitleStats) {
        if let Some(fps) = self.tick(now) {
            window.set_title(&self.title(fps, stats));
        }
    }

    fn title(&self, fps: f32, stats: TitleStats) -> String {
        let mut title = format!("{} - {} objects", self.base_title, stats.entries);
        if stats.pending_loads > 0 {
            title.push_str(&format!(" - loading {}", stats.pending_loads));
        }
        title.push_str(&format!(
            " - {:.1} fps (present {:.2} ms)",
            fps, self.present_ms
        ));
        title
    }
}
