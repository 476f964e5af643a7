//! Pointer position tracking relative to the effect container.

/// Weight kept from the previous smoothed position on each frame.
pub const SMOOTHING_DECAY: f32 = 0.92;

/// Container bounds in CSS pixels, relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ContainerRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Maps a viewport position to fractions of the container (0..1 inside it).
    /// `None` for an empty container.
    pub fn normalize(&self, client_x: f64, client_y: f64) -> Option<[f32; 2]> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return None;
        }
        let x = (client_x - self.left) / self.width;
        let y = (client_y - self.top) / self.height;
        (x.is_finite() && y.is_finite()).then_some([x as f32, y as f32])
    }
}

/// Raw and smoothed pointer positions in container fractions.
///
/// Only the smoothed position is meant to reach the shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    raw: [f32; 2],
    smoothed: [f32; 2],
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            raw: [0.5, 0.5],
            smoothed: [0.5, 0.5],
        }
    }
}

impl PointerState {
    pub fn record(&mut self, position: [f32; 2]) {
        self.raw = position;
    }

    /// Moves the smoothed position one step towards the raw one.
    pub fn step(&mut self) -> [f32; 2] {
        let s = SMOOTHING_DECAY;
        for axis in 0..2 {
            let (from, to) = (self.smoothed[axis], self.raw[axis]);
            let next = from * s + to * (1.0 - s);
            // Rounding must not carry the value past the target.
            self.smoothed[axis] = next.clamp(from.min(to), from.max(to));
        }
        self.smoothed
    }

    pub fn raw(&self) -> [f32; 2] {
        self.raw
    }

    pub fn smoothed(&self) -> [f32; 2] {
        self.smoothed
    }
}
