//! GLSL ES 3.00 sources for the ray effect.
//!
//! The fragment stage sums two ray fields rooted at `rayPos` and pointing
//! along `rayDir`. Each field is attenuated by angular spread, length and fade
//! falloff, optional pulsation and noise, then tinted by `raysColor`.

use crate::config::AlphaMode;

/// Clip-space corners of a triangle that covers the whole viewport.
pub const FULLSCREEN_TRIANGLE: [f32; 6] = [-1.0, -1.0, 3.0, -1.0, -1.0, 3.0];

/// Attribute slot bound to `position` before linking.
pub const POSITION_LOCATION: u32 = 0;

pub const VERTEX_SOURCE: &str = r#"#version 300 es
in vec2 position;
out vec2 vUv;
void main() {
    vUv = position * 0.5 + 0.5;
    gl_Position = vec4(position, 0.0, 1.0);
}
"#;

const FRAGMENT_BODY: &str = r#"
precision highp float;

uniform float iTime;
uniform vec2  iResolution;
uniform vec2  rayPos;
uniform vec2  rayDir;
uniform vec3  raysColor;
uniform float raysSpeed;
uniform float lightSpread;
uniform float rayLength;
uniform float pulsating;
uniform float fadeDistance;
uniform float saturation;
uniform vec2  mousePos;
uniform float mouseInfluence;
uniform float noiseAmount;
uniform float distortion;

in vec2 vUv;
out vec4 fragColor;

float hashNoise(vec2 st) {
    return fract(sin(dot(st, vec2(12.9898, 78.233))) * 43758.5453123);
}

float rayStrength(vec2 source, vec2 axis, vec2 coord, float seedA, float seedB, float speed) {
    vec2 toCoord = coord - source;
    float dist = length(toCoord);
    float cosAngle = dot(normalize(toCoord), axis);
    float bent = cosAngle + distortion * sin(iTime * 2.0 + dist * 0.01) * 0.2;
    float spreadFactor = pow(max(bent, 0.0), 1.0 / max(lightSpread, 0.001));

    float maxDist = iResolution.x * rayLength;
    float lengthFalloff = clamp((maxDist - dist) / maxDist, 0.0, 1.0);
    float fadeDist = iResolution.x * fadeDistance;
    float fadeFalloff = clamp((fadeDist - dist) / fadeDist, 0.5, 1.0);
    float pulse = pulsating > 0.5 ? (0.8 + 0.2 * sin(iTime * speed * 3.0)) : 1.0;

    float base = clamp(
        (0.45 + 0.15 * sin(bent * seedA + iTime * speed)) +
        (0.3 + 0.2 * cos(-bent * seedB + iTime * speed)),
        0.0, 1.0);
    return base * lengthFalloff * fadeFalloff * spreadFactor * pulse;
}

void main() {
    vec2 coord = vec2(gl_FragCoord.x, iResolution.y - gl_FragCoord.y);

    vec2 axis = rayDir;
    if (mouseInfluence > 0.0) {
        vec2 toMouse = normalize(mousePos * iResolution - rayPos);
        axis = normalize(mix(rayDir, toMouse, mouseInfluence));
    }

    vec4 rays1 = vec4(1.0) * rayStrength(rayPos, axis, coord, 36.2214, 21.11349, 1.5 * raysSpeed);
    vec4 rays2 = vec4(1.0) * rayStrength(rayPos, axis, coord, 22.3991, 18.0234, 1.1 * raysSpeed);
    vec4 result = rays1 * 0.5 + rays2 * 0.4;

    if (noiseAmount > 0.0) {
        result.rgb *= 1.0 - noiseAmount + noiseAmount * hashNoise(coord * 0.01 + iTime * 0.1);
    }

    float brightness = 1.0 - coord.y / iResolution.y;
    result.rgb *= vec3(0.1 + brightness * 0.8, 0.3 + brightness * 0.6, 0.5 + brightness * 0.5);

    if (saturation != 1.0) {
        float gray = dot(result.rgb, vec3(0.299, 0.587, 0.114));
        result.rgb = mix(vec3(gray), result.rgb, saturation);
    }

#ifdef OPAQUE_OUTPUT
    fragColor = vec4(result.rgb * raysColor, 1.0);
#else
    fragColor = vec4(result.rgb * raysColor, result.a);
#endif
}
"#;

/// Fragment source for the requested alpha mode. `#version` must stay on the
/// first line, so the mode define is spliced in after it.
pub fn fragment_source(alpha: AlphaMode) -> String {
    let define = match alpha {
        AlphaMode::Intensity => "",
        AlphaMode::Opaque => "#define OPAQUE_OUTPUT\n",
    };
    format!("#version 300 es\n{define}{FRAGMENT_BODY}")
}

/// CPU evaluation of the fragment stage, one pixel at a time.
pub mod reference {
    use crate::config::AlphaMode;
    use crate::uniforms::{RayUniforms, Uniform};

    const SEEDS: [(f32, f32, f32, f32); 2] = [
        (36.2214, 21.11349, 1.5, 0.5),
        (22.3991, 18.0234, 1.1, 0.4),
    ];

    fn normalize(v: [f32; 2]) -> [f32; 2] {
        let len = (v[0] * v[0] + v[1] * v[1]).sqrt();
        if len > 0.0 {
            [v[0] / len, v[1] / len]
        } else {
            [0.0, 0.0]
        }
    }

    fn hash_noise(st: [f32; 2]) -> f32 {
        let x = (st[0] * 12.9898 + st[1] * 78.233).sin() * 43_758.547;
        x - x.floor()
    }

    fn ray_strength(
        u: &RayUniforms,
        axis: [f32; 2],
        coord: [f32; 2],
        (seed_a, seed_b, speed_mul, _): (f32, f32, f32, f32),
    ) -> f32 {
        let time = u.float(Uniform::Time);
        let res = u.vec2(Uniform::Resolution);
        let source = u.vec2(Uniform::RayPos);
        let speed = speed_mul * u.float(Uniform::RaysSpeed);

        let to_coord = [coord[0] - source[0], coord[1] - source[1]];
        let dist = (to_coord[0] * to_coord[0] + to_coord[1] * to_coord[1]).sqrt();
        let dir = normalize(to_coord);
        let cos_angle = dir[0] * axis[0] + dir[1] * axis[1];
        let bent = cos_angle
            + u.float(Uniform::Distortion) * (time * 2.0 + dist * 0.01).sin() * 0.2;
        let spread = bent
            .max(0.0)
            .powf(1.0 / u.float(Uniform::LightSpread).max(0.001));

        let max_dist = res[0] * u.float(Uniform::RayLength);
        let length_falloff = ((max_dist - dist) / max_dist).clamp(0.0, 1.0);
        let fade_dist = res[0] * u.float(Uniform::FadeDistance);
        let fade_falloff = ((fade_dist - dist) / fade_dist).clamp(0.5, 1.0);
        let pulse = if u.float(Uniform::Pulsating) > 0.5 {
            0.8 + 0.2 * (time * speed * 3.0).sin()
        } else {
            1.0
        };
        let base = ((0.45 + 0.15 * (bent * seed_a + time * speed).sin())
            + (0.3 + 0.2 * (-bent * seed_b + time * speed).cos()))
        .clamp(0.0, 1.0);
        base * length_falloff * fade_falloff * spread * pulse
    }

    /// Color of the pixel at `coord` (top-left origin, device pixels), before
    /// framebuffer clamping.
    pub fn shade(u: &RayUniforms, coord: [f32; 2], alpha: AlphaMode) -> [f32; 4] {
        let res = u.vec2(Uniform::Resolution);
        let ray_dir = u.vec2(Uniform::RayDir);
        let influence = u.float(Uniform::MouseInfluence);

        let mut axis = ray_dir;
        if influence > 0.0 {
            let mouse = u.vec2(Uniform::MousePos);
            let source = u.vec2(Uniform::RayPos);
            let to_mouse = normalize([mouse[0] * res[0] - source[0], mouse[1] * res[1] - source[1]]);
            axis = normalize([
                ray_dir[0] + (to_mouse[0] - ray_dir[0]) * influence,
                ray_dir[1] + (to_mouse[1] - ray_dir[1]) * influence,
            ]);
        }

        let intensity: f32 = SEEDS
            .iter()
            .map(|seeds| ray_strength(u, axis, coord, *seeds) * seeds.3)
            .sum();
        let mut rgb = [intensity; 3];

        let noise = u.float(Uniform::NoiseAmount);
        if noise > 0.0 {
            let t = u.float(Uniform::Time) * 0.1;
            let n = hash_noise([coord[0] * 0.01 + t, coord[1] * 0.01 + t]);
            rgb.iter_mut().for_each(|c| *c *= 1.0 - noise + noise * n);
        }

        let brightness = 1.0 - coord[1] / res[1];
        rgb[0] *= 0.1 + brightness * 0.8;
        rgb[1] *= 0.3 + brightness * 0.6;
        rgb[2] *= 0.5 + brightness * 0.5;

        let saturation = u.float(Uniform::Saturation);
        if saturation != 1.0 {
            let gray = rgb[0] * 0.299 + rgb[1] * 0.587 + rgb[2] * 0.114;
            rgb.iter_mut()
                .for_each(|c| *c = gray + (*c - gray) * saturation);
        }

        let tint = u.vec3(Uniform::RaysColor);
        let a = match alpha {
            AlphaMode::Intensity => intensity,
            AlphaMode::Opaque => 1.0,
        };
        [rgb[0] * tint[0], rgb[1] * tint[1], rgb[2] * tint[2], a]
    }
}
