//! Placement of the virtual light source relative to the drawing surface.
//!
//! Coordinates are in device pixels with the origin at the top-left corner and
//! y growing downwards, matching the flipped `gl_FragCoord` used by the
//! fragment stage.

use serde::Deserialize;

/// Fraction of the surface dimension by which the anchor sits outside the
/// visible area.
pub const OUTSIDE_FRACTION: f32 = 0.2;

/// Named edge or corner the rays emanate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum RaysOrigin {
    TopLeft,
    #[default]
    TopCenter,
    TopRight,
    Left,
    Right,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl RaysOrigin {
    pub const ALL: [RaysOrigin; 8] = [
        RaysOrigin::TopLeft,
        RaysOrigin::TopCenter,
        RaysOrigin::TopRight,
        RaysOrigin::Left,
        RaysOrigin::Right,
        RaysOrigin::BottomLeft,
        RaysOrigin::BottomCenter,
        RaysOrigin::BottomRight,
    ];

    /// Parses a kebab-case origin name. Unknown names fall back to
    /// [`RaysOrigin::TopCenter`].
    pub fn parse_lossy(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "top-left" => RaysOrigin::TopLeft,
            "top-center" => RaysOrigin::TopCenter,
            "top-right" => RaysOrigin::TopRight,
            "left" | "left-center" => RaysOrigin::Left,
            "right" | "right-center" => RaysOrigin::Right,
            "bottom-left" => RaysOrigin::BottomLeft,
            "bottom-center" => RaysOrigin::BottomCenter,
            "bottom-right" => RaysOrigin::BottomRight,
            other => {
                log::warn!("unknown rays origin {other:?}, using top-center");
                RaysOrigin::TopCenter
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RaysOrigin::TopLeft => "top-left",
            RaysOrigin::TopCenter => "top-center",
            RaysOrigin::TopRight => "top-right",
            RaysOrigin::Left => "left",
            RaysOrigin::Right => "right",
            RaysOrigin::BottomLeft => "bottom-left",
            RaysOrigin::BottomCenter => "bottom-center",
            RaysOrigin::BottomRight => "bottom-right",
        }
    }
}

impl From<String> for RaysOrigin {
    fn from(name: String) -> Self {
        RaysOrigin::parse_lossy(&name)
    }
}

impl From<&str> for RaysOrigin {
    fn from(name: &str) -> Self {
        RaysOrigin::parse_lossy(name)
    }
}

impl std::fmt::Display for RaysOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anchor point and unit direction of the ray axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayPlacement {
    pub anchor: [f32; 2],
    pub direction: [f32; 2],
}

/// Places the source just outside the surface edge named by `origin`, pointing
/// inwards.
pub fn anchor_and_direction(origin: RaysOrigin, width: f32, height: f32) -> RayPlacement {
    let out = OUTSIDE_FRACTION;
    let (anchor, direction) = match origin {
        RaysOrigin::TopLeft => ([0.0, -out * height], [0.0, 1.0]),
        RaysOrigin::TopCenter => ([0.5 * width, -out * height], [0.0, 1.0]),
        RaysOrigin::TopRight => ([width, -out * height], [0.0, 1.0]),
        RaysOrigin::Left => ([-out * width, 0.5 * height], [1.0, 0.0]),
        RaysOrigin::Right => ([width + out * width, 0.5 * height], [-1.0, 0.0]),
        RaysOrigin::BottomLeft => ([0.0, height + out * height], [0.0, -1.0]),
        RaysOrigin::BottomCenter => ([0.5 * width, height + out * height], [0.0, -1.0]),
        RaysOrigin::BottomRight => ([width, height + out * height], [0.0, -1.0]),
    };
    RayPlacement { anchor, direction }
}
