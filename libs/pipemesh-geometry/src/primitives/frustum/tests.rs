use super::*;
use approx::assert_relative_eq;

fn unit_pipe() -> Frustum {
    Frustum::cylinder(DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0), 0.5).expect("cylinder succeeds")
}

#[test]
fn test_cylinder_signed_distance() {
    let pipe = unit_pipe();
    // Centre: limited by the radius
    assert_relative_eq!(pipe.signed_distance(DVec3::new(1.0, 0.0, 0.0)), -0.5);
    // Beside the wall
    assert_relative_eq!(pipe.signed_distance(DVec3::new(1.0, 1.5, 0.0)), 1.0);
    // Beyond the top cap
    assert_relative_eq!(pipe.signed_distance(DVec3::new(3.0, 0.0, 0.0)), 1.0);
    // On the rim diagonal
    let d = pipe.signed_distance(DVec3::new(3.0, 1.5, 0.0));
    assert_relative_eq!(d, 2.0_f64.sqrt(), epsilon = 1e-12);
}

#[test]
fn test_cone_signed_distance() {
    let cone = Frustum::cone(DVec3::ZERO, DVec3::new(0.0, 0.0, 1.0), 1.0, 0.5)
        .expect("cone succeeds");
    // Point on the slanted wall halfway up
    assert!(cone.signed_distance(DVec3::new(0.75, 0.0, 0.5)).abs() < 1e-12);
    assert!(cone.signed_distance(DVec3::new(0.0, 0.0, 0.5)) < 0.0);
    assert!(cone.signed_distance(DVec3::new(0.9, 0.0, 0.9)) > 0.0);
}

#[test]
fn test_tilted_cylinder_matches_axis_frame() {
    let axis = DVec3::new(0.4, 0.0, 0.4);
    let pipe = Frustum::cylinder(DVec3::new(0.2, 0.0, 0.2), axis, 0.119).expect("cylinder");
    let mid = pipe.base() + axis * 0.5;
    assert_relative_eq!(pipe.signed_distance(mid), -0.119, epsilon = 1e-12);
    let side = mid + DVec3::Y * 0.2;
    assert_relative_eq!(pipe.signed_distance(side), 0.2 - 0.119, epsilon = 1e-12);
}

#[test]
fn test_zero_length_is_degenerate() {
    let err = Frustum::cylinder(DVec3::ZERO, DVec3::ZERO, 1.0).unwrap_err();
    assert!(matches!(err, ConstructionError::DegeneratePrimitive { primitive: "cylinder", .. }));
}

#[test]
fn test_non_positive_radius_is_degenerate() {
    assert!(Frustum::cylinder(DVec3::ZERO, DVec3::X, 0.0).is_err());
    assert!(Frustum::cylinder(DVec3::ZERO, DVec3::X, -1.0).is_err());
    assert!(Frustum::cone(DVec3::ZERO, DVec3::X, 0.0, 0.0).is_err());
    assert!(Frustum::cone(DVec3::ZERO, DVec3::X, -0.1, 0.5).is_err());
    assert!(Frustum::cone(DVec3::ZERO, DVec3::X, 0.0, 0.5).is_ok());
}

#[test]
fn test_bounding_box_axis_aligned() {
    let (min, max) = unit_pipe().bounding_box();
    assert_relative_eq!(min.x, 0.0);
    assert_relative_eq!(max.x, 2.0);
    assert_relative_eq!(min.y, -0.5);
    assert_relative_eq!(max.z, 0.5);
}

#[test]
fn test_bounding_box_contains_surface_samples() {
    let cone = Frustum::cone(DVec3::ZERO, DVec3::new(0.2, 0.0, 0.2), 0.15, 0.119)
        .expect("cone");
    let (min, max) = cone.bounding_box();
    for dir in [DVec3::X, DVec3::Y, DVec3::Z, -DVec3::X, -DVec3::Y, -DVec3::Z] {
        let p = cone.support(dir);
        assert!(p.cmpge(min - DVec3::splat(1e-12)).all());
        assert!(p.cmple(max + DVec3::splat(1e-12)).all());
    }
}

#[test]
fn test_support_picks_wider_disc() {
    let cone = Frustum::cone(DVec3::ZERO, DVec3::Z, 1.0, 0.25).expect("cone");
    assert_relative_eq!(cone.support(DVec3::X).x, 1.0);
    assert_relative_eq!(cone.support(DVec3::Z).z, 1.0);
}

#[test]
fn test_volume() {
    assert_relative_eq!(unit_pipe().volume(), PI * 0.25 * 2.0, epsilon = 1e-12);
    let cone = Frustum::cone(DVec3::ZERO, DVec3::Z, 1.0, 0.0).expect("cone");
    assert_relative_eq!(cone.volume(), PI / 3.0, epsilon = 1e-12);
}

#[test]
fn test_min_feature_size_ignores_apex() {
    let cone = Frustum::cone(DVec3::ZERO, DVec3::Z * 3.0, 0.0, 0.7).expect("cone");
    assert_relative_eq!(cone.min_feature_size(), 0.7);
    assert_relative_eq!(unit_pipe().min_feature_size(), 0.5);
}

#[test]
fn test_closest_patch() {
    let pipe = unit_pipe();
    assert_eq!(pipe.closest_patch(DVec3::new(1.0, 0.5, 0.0)), Patch::Lateral);
    assert_eq!(pipe.closest_patch(DVec3::new(0.0, 0.1, 0.0)), Patch::Base);
    assert_eq!(pipe.closest_patch(DVec3::new(2.0, 0.0, 0.2)), Patch::Top);
    assert!(Patch::Top.is_cap());
    assert!(!Patch::Lateral.is_cap());
}
