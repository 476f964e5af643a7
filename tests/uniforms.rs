use light_rays::uniforms::{config_writes, RayUniforms, Uniform, UniformValue, UniformWrite};
use light_rays::{EffectConfig, RaysOrigin};

#[test]
fn identical_configs_need_no_writes() {
    let mut out = Vec::new();
    config_writes(&EffectConfig::default(), &EffectConfig::default(), &mut out);
    assert!(out.is_empty());
}

#[test]
fn each_changed_field_yields_one_write() {
    let prev = EffectConfig::default();
    let next = EffectConfig {
        color: "#000000".into(),
        pulsating: true,
        origin: RaysOrigin::BottomLeft,
        class_name: "hero".into(),
        ..EffectConfig::default()
    };
    let mut out = Vec::new();
    config_writes(&prev, &next, &mut out);
    assert_eq!(
        out,
        vec![
            UniformWrite::Set(Uniform::RaysColor, UniformValue::Vec3([0.0, 0.0, 0.0])),
            UniformWrite::Set(Uniform::Pulsating, UniformValue::Float(1.0)),
            UniformWrite::Origin(RaysOrigin::BottomLeft),
        ]
    );
}

#[test]
fn equivalent_colors_do_not_write() {
    let prev = EffectConfig {
        color: "#FFFFFF".into(),
        ..EffectConfig::default()
    };
    let next = EffectConfig {
        color: "not a color".into(),
        ..EffectConfig::default()
    };
    let mut out = Vec::new();
    config_writes(&prev, &next, &mut out);
    assert!(out.is_empty());
}

#[test]
fn fresh_set_reflects_config() {
    let config = EffectConfig {
        speed: 2.5,
        fade_distance: 0.75,
        ..EffectConfig::default()
    };
    let uniforms = RayUniforms::from_config(&config);
    assert_eq!(uniforms.float(Uniform::RaysSpeed), 2.5);
    assert_eq!(uniforms.float(Uniform::FadeDistance), 0.75);
    assert_eq!(uniforms.float(Uniform::RayLength), 2.0);
    assert_eq!(uniforms.vec2(Uniform::MousePos), [0.5, 0.5]);
    assert_eq!(uniforms.vec2(Uniform::RayDir), [0.0, 1.0]);
    assert_eq!(uniforms.dirty().iter().count(), Uniform::COUNT);
}

#[test]
fn take_dirty_clears() {
    let mut uniforms = RayUniforms::from_config(&EffectConfig::default());
    uniforms.take_dirty();
    assert!(uniforms.dirty().is_empty());
    assert!(uniforms.set(Uniform::Time, UniformValue::Float(1.0)));
    assert!(!uniforms.set(Uniform::Time, UniformValue::Float(1.0)));
    assert!(uniforms.take_dirty().contains(Uniform::Time));
}
