//! Engine session lifecycle and mesh output.

use pipemesh_geometry::DimTag;
use pipemesh_io::{CellKind, GEOMETRICAL};
use pipemesh_mesh::options::{MESH_SIZE_EXTEND_FROM_BOUNDARY, MESH_SIZE_MAX, MESH_SIZE_MIN};
use pipemesh_mesh::{EngineError, MeshGenerationError, Session};

fn fixed_size(session: &mut Session, edge: f64) {
    let options = session.options_mut();
    options.set_number(MESH_SIZE_EXTEND_FROM_BOUNDARY, 0.0).expect("valid");
    options.set_number(MESH_SIZE_MAX, edge).expect("valid");
    options.set_number(MESH_SIZE_MIN, edge).expect("valid");
}

#[test]
fn generation_requires_one_synchronized_volume() {
    let mut session = Session::initialize();
    assert_eq!(
        session.generate(2).unwrap_err(),
        MeshGenerationError::UnsupportedDimension { dim: 2 }
    );
    assert_eq!(session.generate(3).unwrap_err(), MeshGenerationError::NoVolume);

    session
        .occ()
        .add_cylinder(0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.2)
        .expect("cylinder");
    assert_eq!(
        session.generate(3).unwrap_err(),
        MeshGenerationError::NotSynchronized
    );

    session
        .occ()
        .add_cylinder(0.0, 3.0, 0.0, 1.0, 0.0, 0.0, 0.2)
        .expect("cylinder");
    session.occ().synchronize();
    assert_eq!(
        session.generate(3).unwrap_err(),
        MeshGenerationError::MultipleVolumes { count: 2 }
    );
}

#[test]
fn write_requires_a_mesh() {
    let session = Session::initialize();
    let dir = tempfile::tempdir().expect("temp dir");
    let err = session.write(dir.path().join("none.msh")).unwrap_err();
    assert!(matches!(
        err,
        EngineError::MeshGeneration(MeshGenerationError::NoMesh)
    ));
    assert!(!dir.path().join("none.msh").exists());
}

#[test]
fn fused_pipe_is_meshed_and_written() {
    let mut session = Session::initialize();
    let kernel = session.occ();
    let pipe = kernel
        .add_cylinder(0.0, 0.0, 0.0, 0.6, 0.0, 0.0, 0.15)
        .expect("pipe");
    let taper = kernel
        .add_cone(0.6, 0.0, 0.0, 0.3, 0.0, 0.0, 0.15, 0.1)
        .expect("cone");
    let (fused, _) = kernel
        .fuse(&[DimTag::volume(pipe)], &[DimTag::volume(taper)], true, true)
        .expect("fuse");
    kernel.synchronize();
    fixed_size(&mut session, 0.04);

    let mesh = session.generate(3).expect("mesh");
    assert_eq!(mesh.volume_tag, fused[0].tag);
    let stats = mesh.statistics();
    assert!(stats.tetrahedra > 0);
    // Two lateral walls and the two open ends; the shared disc is interior
    assert!(stats.surfaces >= 4);

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("pipe.msh");
    let written = session.write(&path).expect("write");
    assert_eq!(written, stats.tetrahedra + stats.triangles);

    let back = pipemesh_io::read(&path).expect("read back");
    assert_eq!(back.points.len(), stats.nodes);
    assert_eq!(back.cell_count_of(CellKind::Tetra), stats.tetrahedra);
    assert_eq!(back.cell_count_of(CellKind::Triangle), stats.triangles);
    assert!(back.cell_data.contains_key(GEOMETRICAL));
}

#[test]
fn failed_generation_discards_previous_mesh() {
    let mut session = Session::initialize();
    session
        .occ()
        .add_cylinder(0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.2)
        .expect("cylinder");
    session.occ().synchronize();
    fixed_size(&mut session, 0.05);
    session.generate(3).expect("first mesh");
    assert!(session.mesh().is_some());

    fixed_size(&mut session, 0.5);
    assert!(matches!(
        session.generate(3),
        Err(MeshGenerationError::ResolutionTooCoarse { .. })
    ));
    assert!(session.mesh().is_none());
}

#[test]
fn engine_recovers_after_a_panicking_session() {
    let handle = std::thread::spawn(|| {
        let _session = Session::initialize();
        panic!("session aborted");
    });
    assert!(handle.join().is_err());

    let mut session = Session::initialize();
    assert!(session.occ().entities(3).is_empty());
    assert!(session.mesh().is_none());
}

#[test]
fn second_session_is_refused_while_one_is_alive() {
    let session = Session::initialize();
    assert!(Session::try_initialize().is_none());
    drop(session);
}
