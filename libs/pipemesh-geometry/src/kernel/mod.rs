//! # Modeling Kernel
//!
//! Tagged store of volume entities with primitive constructors, a boolean
//! fuse and an explicit synchronization step.
//!
//! ## Lifecycle
//!
//! ```text
//! add_cylinder / add_cone ──► fuse ──► synchronize ──► SynchronizedModel
//!            (topology changes mark the kernel dirty)
//! ```
//!
//! Consumers that mesh the geometry read the [`SynchronizedModel`]; any
//! topology change made after the last [`Kernel::synchronize`] leaves that
//! snapshot stale, which [`Kernel::is_synchronized`] reports.

use crate::error::{ConstructionError, ConstructionResult};
use crate::handle::DimTag;
use crate::primitives::Frustum;
use crate::solid::Solid;
use config::constants::CONTACT_TOLERANCE;
use glam::DVec3;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Output of a boolean fuse: the resulting entities, and for every input
/// (objects first, then tools) the entities it ended up in.
pub type FuseOutput = (Vec<DimTag>, Vec<Vec<DimTag>>);

/// Snapshot of the kernel's volumes taken by [`Kernel::synchronize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynchronizedModel {
    volumes: Vec<(i32, Solid)>,
}

impl SynchronizedModel {
    /// Volume entities as `(tag, solid)` in ascending tag order.
    pub fn volumes(&self) -> &[(i32, Solid)] {
        &self.volumes
    }

    /// Handles of all volumes.
    pub fn entities(&self) -> Vec<DimTag> {
        self.volumes
            .iter()
            .map(|(tag, _)| DimTag::volume(*tag))
            .collect()
    }

    /// Returns true when the snapshot holds no entity.
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

/// The solid modeling context.
///
/// # Example
///
/// ```rust
/// use pipemesh_geometry::{DimTag, Kernel};
///
/// let mut kernel = Kernel::new();
/// let tag = kernel.add_cylinder(0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.2).unwrap();
/// assert!(!kernel.is_synchronized());
/// kernel.synchronize();
/// assert_eq!(kernel.model().entities(), vec![DimTag::volume(tag)]);
/// ```
#[derive(Debug, Clone)]
pub struct Kernel {
    volumes: BTreeMap<i32, Solid>,
    next_tag: i32,
    synchronized: bool,
    model: SynchronizedModel,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    /// Creates an empty kernel.
    pub fn new() -> Self {
        Self {
            volumes: BTreeMap::new(),
            next_tag: 1,
            synchronized: true,
            model: SynchronizedModel::default(),
        }
    }

    // =========================================================================
    // PRIMITIVES
    // =========================================================================

    /// Adds a cylinder with base centre `(x, y, z)`, axis `(dx, dy, dz)` and
    /// radius `r`. Returns the new volume tag.
    #[allow(clippy::too_many_arguments)]
    pub fn add_cylinder(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        dx: f64,
        dy: f64,
        dz: f64,
        r: f64,
    ) -> ConstructionResult<i32> {
        let part = Frustum::cylinder(DVec3::new(x, y, z), DVec3::new(dx, dy, dz), r)?;
        let tag = self.insert(Solid::from_part(part));
        debug!(tag, radius = r, "added cylinder");
        Ok(tag)
    }

    /// Adds a cone frustum with base centre `(x, y, z)`, axis `(dx, dy, dz)`,
    /// base radius `r1` and top radius `r2`. Returns the new volume tag.
    #[allow(clippy::too_many_arguments)]
    pub fn add_cone(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        dx: f64,
        dy: f64,
        dz: f64,
        r1: f64,
        r2: f64,
    ) -> ConstructionResult<i32> {
        let part = Frustum::cone(DVec3::new(x, y, z), DVec3::new(dx, dy, dz), r1, r2)?;
        let tag = self.insert(Solid::from_part(part));
        debug!(tag, r1, r2, "added cone");
        Ok(tag)
    }

    fn insert(&mut self, solid: Solid) -> i32 {
        let tag = self.next_tag;
        self.next_tag += 1;
        self.volumes.insert(tag, solid);
        self.synchronized = false;
        tag
    }

    // =========================================================================
    // BOOLEAN OPERATIONS
    // =========================================================================

    /// Fuses `objects` with `tools` into a single volume.
    ///
    /// When `remove_object` (`remove_tool`) is set, the object (tool) entities
    /// are deleted and their handles become invalid. A fuse that removes its
    /// objects gives the result the tag of the first object; otherwise the
    /// result gets a fresh tag.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::EmptyFuse`] without objects or tools
    /// - [`ConstructionError::UnsupportedDimension`] for non-volume handles
    /// - [`ConstructionError::UnknownEntity`] for dead handles
    /// - [`ConstructionError::DisjointFuse`] when the union is not connected
    pub fn fuse(
        &mut self,
        objects: &[DimTag],
        tools: &[DimTag],
        remove_object: bool,
        remove_tool: bool,
    ) -> ConstructionResult<FuseOutput> {
        if objects.is_empty() || tools.is_empty() {
            return Err(ConstructionError::EmptyFuse);
        }

        let mut inputs: Vec<DimTag> = Vec::with_capacity(objects.len() + tools.len());
        for handle in objects.iter().chain(tools) {
            if handle.dim != 3 {
                return Err(ConstructionError::UnsupportedDimension { dim: handle.dim });
            }
            if !self.volumes.contains_key(&handle.tag) {
                return Err(ConstructionError::UnknownEntity(*handle));
            }
            if !inputs.contains(handle) {
                inputs.push(*handle);
            }
        }

        let parts: Vec<Frustum> = inputs
            .iter()
            .filter_map(|handle| self.volumes.get(&handle.tag))
            .flat_map(|solid| solid.parts().iter().copied())
            .collect();
        let fused = Solid::from_parts(parts);

        let margin = CONTACT_TOLERANCE * fused.diagonal();
        let components = fused.components(margin);
        if components.len() != 1 {
            return Err(ConstructionError::DisjointFuse {
                components: components.len(),
            });
        }

        if remove_object {
            for handle in objects {
                self.volumes.remove(&handle.tag);
            }
        }
        if remove_tool {
            for handle in tools {
                self.volumes.remove(&handle.tag);
            }
        }

        let tag = if remove_object {
            objects[0].tag
        } else {
            let tag = self.next_tag;
            self.next_tag += 1;
            tag
        };
        let part_count = fused.parts().len();
        self.volumes.insert(tag, fused);
        self.synchronized = false;

        let result = DimTag::volume(tag);
        let map = objects
            .iter()
            .chain(tools)
            .map(|_| vec![result])
            .collect();
        info!(tag, parts = part_count, "fused volumes");
        Ok((vec![result], map))
    }

    /// Deletes entities. Either all handles are removed or, on error, none.
    ///
    /// # Errors
    ///
    /// [`ConstructionError::UnsupportedDimension`] for non-volume handles and
    /// [`ConstructionError::UnknownEntity`] for dead handles.
    pub fn remove(&mut self, handles: &[DimTag]) -> ConstructionResult<()> {
        for handle in handles {
            if handle.dim != 3 {
                return Err(ConstructionError::UnsupportedDimension { dim: handle.dim });
            }
            if !self.volumes.contains_key(&handle.tag) {
                return Err(ConstructionError::UnknownEntity(*handle));
            }
        }
        for handle in handles {
            self.volumes.remove(&handle.tag);
        }
        self.synchronized = false;
        debug!(count = handles.len(), "removed volumes");
        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Live entities of dimension `dim` (only volumes exist in this kernel).
    pub fn entities(&self, dim: i32) -> Vec<DimTag> {
        if dim != 3 {
            return Vec::new();
        }
        self.volumes.keys().map(|tag| DimTag::volume(*tag)).collect()
    }

    /// Looks up a live solid.
    pub fn solid(&self, handle: DimTag) -> ConstructionResult<&Solid> {
        if handle.dim != 3 {
            return Err(ConstructionError::UnsupportedDimension { dim: handle.dim });
        }
        self.volumes
            .get(&handle.tag)
            .ok_or(ConstructionError::UnknownEntity(handle))
    }

    // =========================================================================
    // SYNCHRONIZATION
    // =========================================================================

    /// Flushes the current entities into the model snapshot.
    pub fn synchronize(&mut self) -> &SynchronizedModel {
        self.model = SynchronizedModel {
            volumes: self
                .volumes
                .iter()
                .map(|(tag, solid)| (*tag, solid.clone()))
                .collect(),
        };
        self.synchronized = true;
        debug!(volumes = self.model.volumes.len(), "synchronized model");
        &self.model
    }

    /// Returns true when no topology change happened since the last
    /// synchronization.
    pub fn is_synchronized(&self) -> bool {
        self.synchronized
    }

    /// The last synchronized snapshot (possibly stale).
    pub fn model(&self) -> &SynchronizedModel {
        &self.model
    }
}
