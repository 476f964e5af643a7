mod common;

use common::{gpu, shared_host};
use light_rays::uniforms::{DirtySet, Uniform, UniformValue, UniformWrite};
use light_rays::{AnchorPolicy, EffectConfig, RaysOrigin, Surface, SurfaceOptions};

fn options(pixel_ratio: f64) -> SurfaceOptions {
    SurfaceOptions {
        pixel_ratio,
        anchor_policy: AnchorPolicy::FollowConfig,
    }
}

#[test]
fn repeated_resize_is_idempotent() {
    let host = shared_host();
    let mut surface = Surface::new(gpu(&host), &EffectConfig::default(), options(1.5));
    surface.resize(640.0, 360.0);
    surface.render_frame(0.0);
    let before = surface.uniforms().clone();

    for _ in 0..50 {
        surface.resize(640.0, 360.0);
    }

    assert_eq!(surface.uniforms(), &before);
    assert!(surface.uniforms().dirty().is_empty());
    assert_eq!(host.borrow().gpu_resizes, vec![(960, 540)]);
}

#[test]
fn first_frame_uploads_everything() {
    let host = shared_host();
    let mut surface = Surface::new(gpu(&host), &EffectConfig::default(), options(1.0));
    surface.resize(100.0, 100.0);
    surface.render_frame(0.5);
    surface.render_frame(0.6);

    let h = host.borrow();
    assert_eq!(h.uploads[0], DirtySet::all());
    let second: Vec<Uniform> = h.uploads[1].iter().collect();
    assert_eq!(second, vec![Uniform::Time]);
    assert_eq!(h.draws, 2);
}

#[test]
fn set_uniforms_only_marks_changes() {
    let host = shared_host();
    let mut surface = Surface::new(gpu(&host), &EffectConfig::default(), options(1.0));
    surface.resize(200.0, 100.0);
    surface.render_frame(0.0);

    surface.set_uniforms(&[
        UniformWrite::Set(Uniform::NoiseAmount, UniformValue::Float(0.3)),
        UniformWrite::Set(Uniform::RaysSpeed, UniformValue::Float(1.0)),
    ]);
    let dirty: Vec<Uniform> = surface.uniforms().dirty().iter().collect();
    assert_eq!(dirty, vec![Uniform::NoiseAmount]);
}

#[test]
fn mismatched_writes_are_dropped() {
    let host = shared_host();
    let mut surface = Surface::new(gpu(&host), &EffectConfig::default(), options(1.0));
    surface.set_uniforms(&[UniformWrite::Set(
        Uniform::RaysColor,
        UniformValue::Float(0.0),
    )]);
    assert_eq!(surface.uniforms().vec3(Uniform::RaysColor), [1.0, 1.0, 1.0]);
}

#[test]
fn origin_writes_move_the_anchor() {
    let host = shared_host();
    let mut surface = Surface::new(gpu(&host), &EffectConfig::default(), options(1.0));
    surface.resize(400.0, 200.0);
    surface.set_uniforms(&[UniformWrite::Origin(RaysOrigin::Left)]);
    assert_eq!(surface.origin(), RaysOrigin::Left);
    assert_eq!(surface.uniforms().vec2(Uniform::RayPos), [-80.0, 100.0]);
    assert_eq!(surface.uniforms().vec2(Uniform::RayDir), [1.0, 0.0]);
}

#[test]
fn empty_container_keeps_a_one_pixel_buffer() {
    let host = shared_host();
    let mut surface = Surface::new(gpu(&host), &EffectConfig::default(), options(2.0));
    surface.resize(0.0, 0.0);
    assert_eq!(surface.pixel_size(), Some((1, 1)));
    assert_eq!(surface.uniforms().vec2(Uniform::Resolution), [1.0, 1.0]);
}

#[test]
fn destroy_is_idempotent_and_final() {
    let host = shared_host();
    let mut surface = Surface::new(gpu(&host), &EffectConfig::default(), options(1.0));
    surface.resize(100.0, 100.0);
    surface.destroy();
    surface.destroy();
    surface.render_frame(1.0);
    surface.resize(300.0, 300.0);
    drop(surface);

    let h = host.borrow();
    assert_eq!(h.contexts_released, 1);
    assert_eq!(h.draws, 0);
    assert_eq!(h.gpu_resizes, vec![(100, 100)]);
}

#[test]
fn dropping_releases_the_context() {
    let host = shared_host();
    {
        let mut surface = Surface::new(gpu(&host), &EffectConfig::default(), options(1.0));
        surface.resize(10.0, 10.0);
    }
    assert_eq!(host.borrow().contexts_released, 1);
}
