//! # Tests for Config Constants
//!
//! Unit tests verifying the consistency of configuration constants
//! and the validated mesher configuration.

use crate::constants::*;

// =============================================================================
// PRECISION TESTS
// =============================================================================

#[test]
fn test_epsilon_is_positive_and_small() {
    assert!(EPSILON > 0.0, "EPSILON must be positive");
    assert!(EPSILON < 1e-6, "EPSILON should be small for precision");
}

#[test]
fn test_contact_tolerance_is_relative() {
    assert!(CONTACT_TOLERANCE > EPSILON);
    assert!(CONTACT_TOLERANCE < 1e-3);
}

// =============================================================================
// PIPE GEOMETRY TESTS
// =============================================================================

#[test]
fn test_default_pipe_is_resolvable() {
    // The edge length must stay below the narrowest feature (branch radius)
    assert!(DEFAULT_EDGE_LENGTH < DEFAULT_RADIUS2);
    assert!(DEFAULT_RADIUS2 < DEFAULT_RADIUS1);
}

#[test]
fn test_default_lengths_are_positive() {
    for value in [DEFAULT_LEN1, DEFAULT_LEN2, DEFAULT_CONELEN] {
        assert!(value > 0.0);
    }
}

// =============================================================================
// OUTPUT TESTS
// =============================================================================

#[test]
fn test_output_names_share_stem() {
    let native = NATIVE_MESH_FILE.trim_end_matches(".msh");
    let interchange = INTERCHANGE_MESH_FILE.trim_end_matches(".xml");
    assert_eq!(native, "bifurcation");
    assert_eq!(native, interchange);
}

// =============================================================================
// MESHER TESTS
// =============================================================================

#[test]
fn test_snap_fraction_below_half() {
    assert!(SNAP_FRACTION > 0.0 && SNAP_FRACTION < 0.5);
}

#[test]
fn test_stuffing_config_default() {
    let cfg = StuffingConfig::default();
    assert_eq!(cfg.snap_fraction, SNAP_FRACTION);
    assert_eq!(cfg.smoothing_passes, SMOOTHING_PASSES);
}

#[test]
fn test_stuffing_config_rejects_invalid_fraction() {
    assert_eq!(
        StuffingConfig::new(0.0, 1).unwrap_err(),
        ConfigError::InvalidSnapFraction(0.0)
    );
    assert!(StuffingConfig::new(f64::NAN, 1).is_err());
    assert!(StuffingConfig::new(0.3, 0).is_ok());
}

#[test]
fn test_approx_zero() {
    assert!(approx_zero(0.0));
    assert!(approx_zero(-1e-12));
    assert!(!approx_zero(1e-3));
}
