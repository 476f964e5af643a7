//! The uniform set read by the ray shader.
//!
//! Values live in a fixed array indexed by [`Uniform`] and are overwritten in
//! place. Every write that changes a value marks its slot dirty so the GPU side
//! only re-uploads what moved since the last frame.

use crate::color::color_to_linear_triple;
use crate::config::EffectConfig;
use crate::geometry::RaysOrigin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uniform {
    Time,
    Resolution,
    RayPos,
    RayDir,
    RaysColor,
    RaysSpeed,
    LightSpread,
    RayLength,
    Pulsating,
    FadeDistance,
    Saturation,
    MousePos,
    MouseInfluence,
    NoiseAmount,
    Distortion,
}

impl Uniform {
    pub const COUNT: usize = 15;

    pub const ALL: [Uniform; Uniform::COUNT] = [
        Uniform::Time,
        Uniform::Resolution,
        Uniform::RayPos,
        Uniform::RayDir,
        Uniform::RaysColor,
        Uniform::RaysSpeed,
        Uniform::LightSpread,
        Uniform::RayLength,
        Uniform::Pulsating,
        Uniform::FadeDistance,
        Uniform::Saturation,
        Uniform::MousePos,
        Uniform::MouseInfluence,
        Uniform::NoiseAmount,
        Uniform::Distortion,
    ];

    /// Name of the uniform in the GLSL source.
    pub const fn name(self) -> &'static str {
        match self {
            Uniform::Time => "iTime",
            Uniform::Resolution => "iResolution",
            Uniform::RayPos => "rayPos",
            Uniform::RayDir => "rayDir",
            Uniform::RaysColor => "raysColor",
            Uniform::RaysSpeed => "raysSpeed",
            Uniform::LightSpread => "lightSpread",
            Uniform::RayLength => "rayLength",
            Uniform::Pulsating => "pulsating",
            Uniform::FadeDistance => "fadeDistance",
            Uniform::Saturation => "saturation",
            Uniform::MousePos => "mousePos",
            Uniform::MouseInfluence => "mouseInfluence",
            Uniform::NoiseAmount => "noiseAmount",
            Uniform::Distortion => "distortion",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    const fn kind(self) -> UniformKind {
        match self {
            Uniform::Resolution | Uniform::RayPos | Uniform::RayDir | Uniform::MousePos => {
                UniformKind::Vec2
            }
            Uniform::RaysColor => UniformKind::Vec3,
            _ => UniformKind::Float,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UniformKind {
    Float,
    Vec2,
    Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
}

impl UniformValue {
    fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
        }
    }

    fn zero(kind: UniformKind) -> Self {
        match kind {
            UniformKind::Float => UniformValue::Float(0.0),
            UniformKind::Vec2 => UniformValue::Vec2([0.0; 2]),
            UniformKind::Vec3 => UniformValue::Vec3([0.0; 3]),
        }
    }
}

/// Bit set over [`Uniform`] slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtySet(u32);

impl DirtySet {
    pub const fn all() -> Self {
        DirtySet((1 << Uniform::COUNT) - 1)
    }

    pub fn insert(&mut self, slot: Uniform) {
        self.0 |= 1 << slot.index();
    }

    pub fn contains(self, slot: Uniform) -> bool {
        self.0 & (1 << slot.index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Uniform> {
        Uniform::ALL.into_iter().filter(move |u| self.contains(*u))
    }
}

/// One change produced by a configuration update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformWrite {
    Set(Uniform, UniformValue),
    /// The anchor and direction depend on the surface size, so an origin change
    /// is resolved by the surface that owns the resolution.
    Origin(RaysOrigin),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RayUniforms {
    values: [UniformValue; Uniform::COUNT],
    dirty: DirtySet,
}

impl RayUniforms {
    /// Builds the full set from `config`. Placement and resolution start at
    /// zero until the first resize; the pointer starts at the center.
    pub fn from_config(config: &EffectConfig) -> Self {
        let mut uniforms = Self {
            values: Uniform::ALL.map(|u| UniformValue::zero(u.kind())),
            dirty: DirtySet::all(),
        };
        uniforms.set(Uniform::RayDir, UniformValue::Vec2([0.0, 1.0]));
        uniforms.set(Uniform::MousePos, UniformValue::Vec2([0.5, 0.5]));
        for (slot, value) in config_values(config) {
            uniforms.set(slot, value);
        }
        uniforms.dirty = DirtySet::all();
        uniforms
    }

    /// Overwrites one slot. Returns whether the stored value changed.
    pub fn set(&mut self, slot: Uniform, value: UniformValue) -> bool {
        if value.kind() != slot.kind() {
            log::warn!("dropping {:?} write to {}", value, slot.name());
            return false;
        }
        let stored = &mut self.values[slot.index()];
        if *stored == value {
            return false;
        }
        *stored = value;
        self.dirty.insert(slot);
        true
    }

    pub fn get(&self, slot: Uniform) -> UniformValue {
        self.values[slot.index()]
    }

    pub fn float(&self, slot: Uniform) -> f32 {
        match self.get(slot) {
            UniformValue::Float(v) => v,
            _ => 0.0,
        }
    }

    pub fn vec2(&self, slot: Uniform) -> [f32; 2] {
        match self.get(slot) {
            UniformValue::Vec2(v) => v,
            _ => [0.0; 2],
        }
    }

    pub fn vec3(&self, slot: Uniform) -> [f32; 3] {
        match self.get(slot) {
            UniformValue::Vec3(v) => v,
            _ => [0.0; 3],
        }
    }

    pub fn dirty(&self) -> DirtySet {
        self.dirty
    }

    /// Returns the slots changed since the previous call and clears them.
    pub fn take_dirty(&mut self) -> DirtySet {
        std::mem::take(&mut self.dirty)
    }
}

fn config_values(c: &EffectConfig) -> [(Uniform, UniformValue); 10] {
    use UniformValue::{Float, Vec3};
    [
        (Uniform::RaysColor, Vec3(color_to_linear_triple(&c.color))),
        (Uniform::RaysSpeed, Float(c.speed)),
        (Uniform::LightSpread, Float(c.spread)),
        (Uniform::RayLength, Float(c.length)),
        (Uniform::Pulsating, Float(if c.pulsating { 1.0 } else { 0.0 })),
        (Uniform::FadeDistance, Float(c.fade_distance)),
        (Uniform::Saturation, Float(c.saturation)),
        (Uniform::MouseInfluence, Float(c.mouse_influence)),
        (Uniform::NoiseAmount, Float(c.noise_amount)),
        (Uniform::Distortion, Float(c.distortion)),
    ]
}

/// Appends to `out` the writes needed to move a surface configured with
/// `prev` to `next`. Unchanged fields produce nothing.
pub fn config_writes(prev: &EffectConfig, next: &EffectConfig, out: &mut Vec<UniformWrite>) {
    let before = config_values(prev);
    for (old, (slot, value)) in before.iter().zip(config_values(next)) {
        if old.1 != value {
            out.push(UniformWrite::Set(slot, value));
        }
    }
    if prev.origin != next.origin {
        out.push(UniformWrite::Origin(next.origin));
    }
}
