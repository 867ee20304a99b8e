//! # Engine Session
//!
//! The meshing engine is a process-wide context. A [`Session`] holds the
//! engine lock for its lifetime: creating one initializes the engine,
//! dropping it finalizes the engine on every exit path, panics included.
//!
//! ```text
//! Session::initialize()
//!   ├─ occ()          geometry kernel
//!   ├─ options_mut()  Mesh.* options
//!   ├─ generate(3)    volume mesh of the synchronized model
//!   └─ write(path)    MSH output
//! drop → finalize
//! ```

use crate::error::{EngineResult, MeshGenerationError, MeshResult};
use crate::generate::tetrahedralize;
use crate::options::Options;
use crate::tet_mesh::TetMesh;
use pipemesh_geometry::Kernel;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use tracing::info;

static ENGINE: Mutex<()> = Mutex::new(());

/// An initialized meshing engine.
///
/// Only one session exists at a time; [`Session::initialize`] blocks while
/// another one is alive and [`Session::try_initialize`] declines.
///
/// # Example
///
/// ```rust,no_run
/// use pipemesh_mesh::Session;
///
/// let mut session = Session::initialize();
/// let tag = session.occ().add_cylinder(0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.2).unwrap();
/// session.occ().synchronize();
/// session.generate(3).unwrap();
/// session.write("pipe.msh").unwrap();
/// # let _ = tag;
/// ```
pub struct Session {
    kernel: Kernel,
    options: Options,
    mesh: Option<TetMesh>,
    // Declared last so the model is discarded before the lock is released
    _guard: MutexGuard<'static, ()>,
}

impl Session {
    /// Initializes the engine with an empty model and default options.
    ///
    /// Blocks until any other live session is dropped. Calling this while
    /// the same thread still holds a session deadlocks; use
    /// [`Session::try_initialize`] where that can happen.
    pub fn initialize() -> Self {
        // A panic in an earlier session only poisons the lock; its state is
        // dropped with it, so the engine is clean again.
        let guard = ENGINE.lock().unwrap_or_else(PoisonError::into_inner);
        Self::with_guard(guard)
    }

    /// Initializes the engine unless another session is alive, in which
    /// case `None` is returned instead of blocking.
    pub fn try_initialize() -> Option<Self> {
        let guard = match ENGINE.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };
        Some(Self::with_guard(guard))
    }

    fn with_guard(guard: MutexGuard<'static, ()>) -> Self {
        info!("engine initialized");
        Self {
            kernel: Kernel::new(),
            options: Options::default(),
            mesh: None,
            _guard: guard,
        }
    }

    /// The geometry kernel.
    pub fn occ(&mut self) -> &mut Kernel {
        &mut self.kernel
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Generates a mesh of dimension `dim` for the synchronized model,
    /// replacing any previous mesh.
    ///
    /// # Errors
    ///
    /// [`MeshGenerationError::UnsupportedDimension`] unless `dim == 3`,
    /// [`MeshGenerationError::NotSynchronized`] after unsynchronized topology
    /// changes, [`MeshGenerationError::NoVolume`] /
    /// [`MeshGenerationError::MultipleVolumes`] unless the model holds
    /// exactly one volume, and any error of the mesher.
    pub fn generate(&mut self, dim: i32) -> MeshResult<&TetMesh> {
        self.mesh = None;
        if dim != 3 {
            return Err(MeshGenerationError::UnsupportedDimension { dim });
        }
        if !self.kernel.is_synchronized() {
            return Err(MeshGenerationError::NotSynchronized);
        }
        let (tag, solid) = match self.kernel.model().volumes() {
            [] => return Err(MeshGenerationError::NoVolume),
            [(tag, solid)] => (*tag, solid),
            volumes => {
                return Err(MeshGenerationError::MultipleVolumes {
                    count: volumes.len(),
                })
            }
        };
        let mesh = tetrahedralize(tag, solid, &self.options)?;
        Ok(self.mesh.insert(mesh))
    }

    /// The last generated mesh.
    pub fn mesh(&self) -> Option<&TetMesh> {
        self.mesh.as_ref()
    }

    /// Writes the current mesh, choosing the format from the extension
    /// (`.msh` for MSH 4.1 ASCII). Returns the number of cells written.
    ///
    /// # Errors
    ///
    /// [`MeshGenerationError::NoMesh`] before a successful generation, or
    /// the write error.
    pub fn write(&self, path: impl AsRef<Path>) -> EngineResult<usize> {
        let mesh = self.mesh.as_ref().ok_or(MeshGenerationError::NoMesh)?;
        let path = path.as_ref();
        let written = pipemesh_io::write(&mesh.to_mesh(), path)?;
        info!(path = %path.display(), cells = written, "wrote mesh");
        Ok(written)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        info!("engine finalized");
    }
}
