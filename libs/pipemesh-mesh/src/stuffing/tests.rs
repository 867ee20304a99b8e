//! Tests for lattice stuffing.

use super::*;
use crate::quality::signed_volume;
use approx::assert_relative_eq;
use pipemesh_geometry::Frustum;
use std::collections::HashMap;
use std::f64::consts::PI;

// =============================================================================
// HELPERS
// =============================================================================

fn rod() -> Solid {
    Solid::from_part(Frustum::cylinder(DVec3::ZERO, DVec3::X, 0.25).expect("cylinder"))
}

/// Large enough to contain the unit tetrahedron used by the clipping tests.
fn block() -> Solid {
    let part = Frustum::cylinder(DVec3::new(-1.0, 0.0, 0.0), DVec3::X * 3.0, 1.0);
    Solid::from_part(part.expect("cylinder"))
}

fn rod_lattice(spacing: f64) -> Lattice {
    let (min, max) = rod().bounding_box();
    Lattice::covering(min, max, spacing, 2).expect("lattice")
}

fn unit_tet() -> [DVec3; 4] {
    [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z]
}

fn field(positions: [DVec3; 4], values: [f64; 4]) -> NodeField {
    NodeField {
        positions: positions.to_vec(),
        values: values.to_vec(),
    }
}

fn cuts_for(field: &NodeField) -> CutPoints {
    let mut cuts = CutPoints {
        base: field.len(),
        ..CutPoints::default()
    };
    for a in 0..field.len() {
        for b in (a + 1)..field.len() {
            let (va, vb) = (field.values[a], field.values[b]);
            if opposite(va, vb) {
                let t = va / (va - vb);
                cuts.ids.insert((a, b), cuts.base + cuts.positions.len());
                cuts.positions.push(field.positions[a].lerp(field.positions[b], t));
            }
        }
    }
    cuts
}

fn pieces_volume(field: &NodeField, cuts: &CutPoints, pieces: &[[usize; 4]]) -> f64 {
    let position = |n: usize| {
        if n < field.len() {
            field.positions[n]
        } else {
            cuts.position(n)
        }
    };
    pieces
        .iter()
        .map(|t| {
            let v = signed_volume(position(t[0]), position(t[1]), position(t[2]), position(t[3]));
            assert!(v > 0.0, "piece {t:?} is not positively oriented");
            v
        })
        .sum()
}

fn clip_one(values: [f64; 4]) -> (Clipped, f64) {
    let field = field(unit_tet(), values);
    let cuts = cuts_for(&field);
    let solid = block();
    let clipper = Clipper::new(&field, &cuts, &solid, 1e-15);
    let mut pieces = Vec::new();
    let outcome = clipper.clip([0, 1, 2, 3], &mut pieces);
    (outcome, pieces_volume(&field, &cuts, &pieces))
}

fn mesh_volume(stuffed: &Stuffed) -> f64 {
    stuffed
        .tetrahedra
        .iter()
        .map(|t| {
            let [a, b, c, d] = t.map(|n| stuffed.nodes[n]);
            signed_volume(a, b, c, d)
        })
        .sum()
}

fn face_counts(tetrahedra: &[[usize; 4]]) -> HashMap<[usize; 3], usize> {
    let mut counts = HashMap::new();
    for t in tetrahedra {
        for [a, b, c] in [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]] {
            let mut key = [t[a], t[b], t[c]];
            key.sort_unstable();
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
}

// =============================================================================
// CLIPPING
// =============================================================================

#[test]
fn test_clip_single_inside_vertex() {
    let (outcome, volume) = clip_one([-1.0, 1.0, 1.0, 1.0]);
    assert_eq!(outcome, Clipped::Pieces { degenerate: 0 });
    // Corner tet with half-length legs
    assert_relative_eq!(volume, 1.0 / 48.0, epsilon = 1e-12);
}

#[test]
fn test_clip_prism() {
    let (outcome, volume) = clip_one([-1.0, -1.0, 1.0, 1.0]);
    assert!(matches!(outcome, Clipped::Pieces { .. }));
    assert_relative_eq!(volume, 1.0 / 12.0, epsilon = 1e-12);
}

#[test]
fn test_clip_three_inside_vertices() {
    let (_, volume) = clip_one([-1.0, -1.0, -1.0, 1.0]);
    // Everything but the corner tet around the positive vertex
    assert_relative_eq!(volume, 1.0 / 6.0 - 1.0 / 48.0, epsilon = 1e-12);
}

#[test]
fn test_clip_through_surface_vertex() {
    let (outcome, volume) = clip_one([-1.0, 0.0, 1.0, 1.0]);
    assert!(matches!(outcome, Clipped::Pieces { .. }));
    // Plane through vertex 1 and the midpoints of edges 0-2 and 0-3
    assert_relative_eq!(volume, 1.0 / 24.0, epsilon = 1e-12);
}

#[test]
fn test_whole_and_outside() {
    assert_eq!(clip_one([-1.0, -1.0, 0.0, -2.0]), (Clipped::Whole, 1.0 / 6.0));
    assert_eq!(clip_one([1.0, 0.0, 1.0, 2.0]).0, Clipped::Outside);
}

#[test]
fn test_all_surface_vertices_use_centroid() {
    // Centroid (0.25, 0.25, 0.25) lies inside the block
    assert_eq!(clip_one([0.0; 4]).0, Clipped::Whole);

    let shifted = unit_tet().map(|p| p + DVec3::new(0.0, 2.0, 0.0));
    let field = field(shifted, [0.0; 4]);
    let cuts = cuts_for(&field);
    let solid = block();
    let mut pieces = Vec::new();
    let outcome = Clipper::new(&field, &cuts, &solid, 1e-15).clip([0, 1, 2, 3], &mut pieces);
    assert_eq!(outcome, Clipped::Outside);
    assert!(pieces.is_empty());
}

#[test]
fn test_inverted_tet_is_reported() {
    let [a, b, c, d] = unit_tet();
    let field = field([a, c, b, d], [-1.0; 4]);
    let cuts = cuts_for(&field);
    let solid = block();
    let mut pieces = Vec::new();
    let outcome = Clipper::new(&field, &cuts, &solid, 1e-15).clip([0, 1, 2, 3], &mut pieces);
    assert_eq!(outcome, Clipped::Inverted);
    assert!(pieces.is_empty());
}

#[test]
fn test_shared_face_is_split_identically() {
    // Two tets sharing face (1, 2, 3), cut by the same plane
    let positions = vec![
        DVec3::ZERO,
        DVec3::X,
        DVec3::Y,
        DVec3::Z,
        DVec3::splat(1.0),
    ];
    let field = NodeField {
        values: vec![-1.0, -1.0, 1.0, -0.5, 1.0],
        positions,
    };
    let cuts = cuts_for(&field);
    let solid = block();
    let clipper = Clipper::new(&field, &cuts, &solid, 1e-15);
    let mut pieces = Vec::new();
    clipper.clip([0, 1, 2, 3], &mut pieces);
    clipper.clip([1, 4, 2, 3], &mut pieces);

    let counts = face_counts(&pieces);
    assert!(counts.values().all(|c| *c <= 2));
    // The shared face contributes the same triangles from both sides
    let shared: Vec<_> = counts.iter().filter(|(_, c)| **c == 2).collect();
    assert!(!shared.is_empty());
}

// =============================================================================
// SAMPLING AND SNAPPING
// =============================================================================

#[test]
fn test_sample_zeroes_surface_nodes() {
    let lattice = Lattice::covering(DVec3::new(-1.0, -0.5, -0.5), DVec3::new(1.0, 0.5, 0.5), 0.25, 0)
        .expect("lattice");
    let solid = Solid::from_part(
        Frustum::cylinder(DVec3::new(-1.0, 0.0, 0.0), DVec3::X * 2.0, 0.5).expect("cylinder"),
    );
    let field = sample(&lattice, &solid);
    assert_eq!(field.len(), lattice.node_count());
    assert!(field.values.iter().any(|v| *v == 0.0));
    assert!(field.values.iter().any(|v| *v < 0.0));
    assert!(field.values.iter().any(|v| *v > 0.0));
}

#[test]
fn test_snapped_nodes_lie_on_surface() {
    let lattice = rod_lattice(0.05);
    let solid = rod();
    let original = sample(&lattice, &solid);
    let mut field = original.clone();
    let snapped = snap(&lattice, &solid, &mut field, 0.2);
    assert!(snapped > 0);

    let mut moved = 0;
    for node in 0..field.len() {
        if field.positions[node] != original.positions[node] {
            moved += 1;
            assert_eq!(field.values[node], 0.0);
            assert!(solid.signed_distance(field.positions[node]).abs() < 1e-6);
            // Never further than a fifth of the longest lattice edge
            let shift = (field.positions[node] - original.positions[node]).length();
            assert!(shift <= 0.2 * lattice.spacing() + 1e-12);
        }
    }
    assert_eq!(moved, snapped);
}

#[test]
fn test_cut_points_only_on_sign_changes() {
    let lattice = rod_lattice(0.05);
    let solid = rod();
    let mut field = sample(&lattice, &solid);
    snap(&lattice, &solid, &mut field, 0.2);
    let cuts = CutPoints::build(&lattice, &field);
    assert!(!cuts.is_empty());
    assert_eq!(cuts.base(), lattice.node_count());

    for (&(a, b), &id) in &cuts.ids {
        assert!(opposite(field.values[a], field.values[b]));
        assert_eq!(cuts.get(b, a), Some(id));
        // Linear cut points stay close to the true surface
        assert!(solid.signed_distance(cuts.position(id)).abs() < 0.5 * lattice.spacing());
    }
}

// =============================================================================
// STUFFING
// =============================================================================

#[test]
fn test_stuffed_rod_volume() {
    let lattice = rod_lattice(0.05);
    let (stuffed, report) = stuff(&lattice, &rod(), &StuffingConfig::default()).expect("stuffing");
    assert!(report.clipped > 0);
    assert!(stuffed.tetrahedra.len() > 1000);

    let exact = PI * 0.25 * 0.25;
    let volume = mesh_volume(&stuffed);
    assert!(
        (volume - exact).abs() / exact < 0.06,
        "volume {volume} too far from {exact}"
    );
}

#[test]
fn test_stuffed_mesh_is_conforming() {
    let lattice = rod_lattice(0.05);
    let solid = rod();
    let (stuffed, _) = stuff(&lattice, &solid, &StuffingConfig::default()).expect("stuffing");

    let counts = face_counts(&stuffed.tetrahedra);
    assert!(counts.values().all(|c| *c <= 2), "face shared by more than two tets");

    // Faces used once form the surface; they must lie on it
    for (face, _) in counts.iter().filter(|(_, c)| **c == 1) {
        let centroid = face.iter().map(|n| stuffed.nodes[*n]).sum::<DVec3>() / 3.0;
        assert!(solid.signed_distance(centroid).abs() < 0.25 * lattice.spacing());
    }

    // Every node is used
    let mut used = vec![false; stuffed.nodes.len()];
    for t in &stuffed.tetrahedra {
        for n in t {
            used[*n] = true;
        }
    }
    assert!(used.into_iter().all(|u| u));
}

#[test]
fn test_stuffing_is_deterministic() {
    let lattice = rod_lattice(0.05);
    let config = StuffingConfig::default();
    let first = stuff(&lattice, &rod(), &config).expect("first");
    let second = stuff(&lattice, &rod(), &config).expect("second");
    assert_eq!(first, second);
}
