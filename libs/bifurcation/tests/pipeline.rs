//! End-to-end runs of the bifurcation pipeline.

use bifurcation::{run, PipeParameters};
use pipemesh_geometry::ConstructionError;
use pipemesh_io::{read, CellKind};
use pipemesh_mesh::MeshGenerationError;

#[test]
fn default_parameters_produce_both_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let report = run(&PipeParameters::default(), dir.path()).expect("pipeline succeeds");

    assert_eq!(report.openings, 3);
    assert!(report.mesh.tetrahedra > 0);
    assert!(report.mesh.min_quality > 0.0);
    assert!(report.native_path.ends_with("bifurcation.msh"));
    assert!(report.interchange_path.ends_with("bifurcation.xml"));

    let native = read(&report.native_path).expect("read msh");
    let converted = read(&report.interchange_path).expect("read xml");
    assert_eq!(native.points.len(), report.mesh.nodes);
    assert_eq!(converted.points, native.points);
    assert_eq!(native.cell_count_of(CellKind::Tetra), report.mesh.tetrahedra);
    assert_eq!(converted.cell_count(), report.mesh.tetrahedra);
    assert_eq!(report.conversion.cells_written, report.mesh.tetrahedra);
}

#[test]
fn runs_are_reproducible() {
    let first = tempfile::tempdir().expect("first dir");
    let second = tempfile::tempdir().expect("second dir");
    let params = PipeParameters {
        edgelen: 0.04,
        ..PipeParameters::default()
    };
    let a = run(&params, first.path()).expect("first run");
    let b = run(&params, second.path()).expect("second run");
    assert_eq!(a.mesh, b.mesh);

    for name in ["bifurcation.msh", "bifurcation.xml"] {
        let left = std::fs::read(first.path().join(name)).expect("first output");
        let right = std::fs::read(second.path().join(name)).expect("second output");
        assert!(left == right, "{name} differs between runs");
    }
}

#[test]
fn edge_length_above_branch_radius_fails_meshing() {
    let dir = tempfile::tempdir().expect("temp dir");
    // Between the branch radius (0.119) and the main radius (0.15)
    let params = PipeParameters {
        edgelen: 0.12,
        ..PipeParameters::default()
    };
    let err = run(&params, dir.path()).unwrap_err();
    match err.as_mesh_generation() {
        Some(MeshGenerationError::ResolutionTooCoarse { feature_size, .. }) => {
            assert_eq!(*feature_size, params.radius2);
        }
        other => panic!("expected a coarse-resolution error, got {other:?}"),
    }
    assert!(!dir.path().join("bifurcation.msh").exists());
    assert!(!dir.path().join("bifurcation.xml").exists());
}

#[test]
fn zero_branch_length_fails_construction() {
    let dir = tempfile::tempdir().expect("temp dir");
    let params = PipeParameters {
        len2: 0.0,
        ..PipeParameters::default()
    };
    let err = run(&params, dir.path()).unwrap_err();
    assert!(matches!(
        err.as_construction(),
        Some(ConstructionError::DegeneratePrimitive { .. })
    ));
}

#[test]
fn unwritable_directory_fails_after_building() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("missing");
    let params = PipeParameters {
        edgelen: 0.04,
        ..PipeParameters::default()
    };
    let err = run(&params, &missing).unwrap_err();
    assert!(err.as_construction().is_none());
    assert!(err.as_mesh_generation().is_none());
}
