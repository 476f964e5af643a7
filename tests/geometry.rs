use light_rays::{anchor_and_direction, RaysOrigin};

const SIZES: [(f32, f32); 5] = [
    (1920.0, 1080.0),
    (1080.0, 1920.0),
    (1.0, 1.0),
    (0.5, 3000.0),
    (333.3, 77.7),
];

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() < eps
}

#[test]
fn directions_are_unit_length() {
    for origin in RaysOrigin::ALL {
        for &(w, h) in &SIZES {
            let [dx, dy] = anchor_and_direction(origin, w, h).direction;
            assert!(approx_eq((dx * dx + dy * dy).sqrt(), 1.0, 1e-6), "{origin} at {w}x{h}");
        }
    }
}

#[test]
fn anchors_sit_outside_their_edge() {
    for origin in RaysOrigin::ALL {
        for &(w, h) in &SIZES {
            let [x, y] = anchor_and_direction(origin, w, h).anchor;
            let outside = match origin {
                RaysOrigin::TopLeft | RaysOrigin::TopCenter | RaysOrigin::TopRight => y < 0.0,
                RaysOrigin::BottomLeft | RaysOrigin::BottomCenter | RaysOrigin::BottomRight => {
                    y > h
                }
                RaysOrigin::Left => x < 0.0,
                RaysOrigin::Right => x > w,
            };
            assert!(outside, "{origin} anchor ({x}, {y}) inside {w}x{h}");
        }
    }
}

#[test]
fn directions_point_into_the_surface() {
    for origin in RaysOrigin::ALL {
        let (w, h) = (800.0, 600.0);
        let placement = anchor_and_direction(origin, w, h);
        let center = [w / 2.0, h / 2.0];
        let to_center = [
            center[0] - placement.anchor[0],
            center[1] - placement.anchor[1],
        ];
        let dot = to_center[0] * placement.direction[0] + to_center[1] * placement.direction[1];
        assert!(dot > 0.0, "{origin} points away from the surface");
    }
}

#[test]
fn anchors_overshoot_by_a_fifth() {
    let top = anchor_and_direction(RaysOrigin::TopCenter, 1000.0, 500.0);
    assert_eq!(top.anchor, [500.0, -100.0]);
    let right = anchor_and_direction(RaysOrigin::Right, 1000.0, 500.0);
    assert_eq!(right.anchor, [1200.0, 250.0]);
    assert_eq!(right.direction, [-1.0, 0.0]);
}

#[test]
fn names_round_trip_and_unknown_falls_back() {
    for origin in RaysOrigin::ALL {
        assert_eq!(RaysOrigin::parse_lossy(origin.as_str()), origin);
    }
    assert_eq!(RaysOrigin::parse_lossy("left-center"), RaysOrigin::Left);
    assert_eq!(RaysOrigin::parse_lossy(" Right-Center "), RaysOrigin::Right);
    assert_eq!(RaysOrigin::parse_lossy("middle"), RaysOrigin::TopCenter);
    assert_eq!(RaysOrigin::from(""), RaysOrigin::TopCenter);
}
