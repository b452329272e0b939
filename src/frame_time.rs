use bevy_ecs::prelude::Resource;
use instant::Instant;
use std::time::Duration;

/// Per-frame delta. In immersive mode the XR frame callback reports time
/// itself (manual), so the instant-based clock is bypassed there.
#[derive(Resource)]
pub struct FrameTime {
    pub delta: Duration,
    last: Instant,
    manual: bool,
}

impl FrameTime {
    pub fn new(manual: bool) -> Self {
        Self {
            delta: Duration::ZERO,
            last: Instant::now(),
            manual,
        }
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        if !self.manual {
            self.delta = now - self.last;
        }
        self.last = now;
    }

    pub fn set_manual_delta(&mut self, delta: Duration) {
        self.delta = delta;
    }
}
