//! Capped cone frustum primitive.
//!
//! A frustum is defined by a base point, an axis vector whose length is the
//! height, and the radii of its two end discs. Cylinders have equal radii;
//! a cone may close to an apex by setting one radius to zero.

use crate::error::{ConstructionError, ConstructionResult};
use crate::gjk::SupportMap;
use config::constants::EPSILON;
use glam::DVec3;
use std::f64::consts::PI;

/// Surface patch of a frustum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Patch {
    /// Curved side wall
    Lateral,
    /// End disc at the base point
    Base,
    /// End disc at `base + axis`
    Top,
}

impl Patch {
    /// Returns true for the two flat end discs.
    pub fn is_cap(self) -> bool {
        !matches!(self, Patch::Lateral)
    }

    /// Short lowercase name used in logs and entity labels.
    pub fn name(self) -> &'static str {
        match self {
            Patch::Lateral => "lateral",
            Patch::Base => "base",
            Patch::Top => "top",
        }
    }
}

/// A capped right circular cone frustum.
///
/// # Example
///
/// ```rust
/// use pipemesh_geometry::Frustum;
/// use glam::DVec3;
///
/// let pipe = Frustum::cylinder(DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0), 0.5).unwrap();
/// assert!(pipe.signed_distance(DVec3::new(1.0, 0.0, 0.0)) < 0.0);
/// assert!(pipe.signed_distance(DVec3::new(1.0, 1.0, 0.0)) > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    base: DVec3,
    axis: DVec3,
    radius_base: f64,
    radius_top: f64,
}

impl Frustum {
    /// Creates a cylinder of the given radius along `axis`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::DegeneratePrimitive`] when the axis is
    /// (nearly) zero or the radius is not positive.
    pub fn cylinder(base: DVec3, axis: DVec3, radius: f64) -> ConstructionResult<Self> {
        Self::validate_axis("cylinder", base, axis)?;
        if !(radius.is_finite() && radius > EPSILON) {
            return Err(ConstructionError::degenerate(
                "cylinder",
                format!("radius must be positive: {radius}"),
            ));
        }
        Ok(Self {
            base,
            axis,
            radius_base: radius,
            radius_top: radius,
        })
    }

    /// Creates a cone frustum going from `radius_base` at `base` to
    /// `radius_top` at `base + axis`.
    ///
    /// One of the radii may be zero (a pointed cone), not both.
    pub fn cone(
        base: DVec3,
        axis: DVec3,
        radius_base: f64,
        radius_top: f64,
    ) -> ConstructionResult<Self> {
        Self::validate_axis("cone", base, axis)?;
        if !(radius_base.is_finite() && radius_top.is_finite())
            || radius_base < 0.0
            || radius_top < 0.0
        {
            return Err(ConstructionError::degenerate(
                "cone",
                format!("radii must be non-negative: r1={radius_base}, r2={radius_top}"),
            ));
        }
        if radius_base <= EPSILON && radius_top <= EPSILON {
            return Err(ConstructionError::degenerate(
                "cone",
                "at least one radius must be non-zero",
            ));
        }
        Ok(Self {
            base,
            axis,
            radius_base,
            radius_top,
        })
    }

    fn validate_axis(primitive: &'static str, base: DVec3, axis: DVec3) -> ConstructionResult<()> {
        if !base.is_finite() || !axis.is_finite() {
            return Err(ConstructionError::degenerate(
                primitive,
                format!("non-finite placement: base={base}, axis={axis}"),
            ));
        }
        let length = axis.length();
        if length <= EPSILON {
            return Err(ConstructionError::degenerate(
                primitive,
                format!("length must be positive: {length}"),
            ));
        }
        Ok(())
    }

    /// Centre of the base disc.
    #[inline]
    pub fn base(&self) -> DVec3 {
        self.base
    }

    /// Axis vector from the base centre to the top centre.
    #[inline]
    pub fn axis(&self) -> DVec3 {
        self.axis
    }

    /// Centre of the top disc.
    #[inline]
    pub fn top(&self) -> DVec3 {
        self.base + self.axis
    }

    /// Distance between the two disc centres.
    #[inline]
    pub fn height(&self) -> f64 {
        self.axis.length()
    }

    /// Radius of the base disc.
    #[inline]
    pub fn radius_base(&self) -> f64 {
        self.radius_base
    }

    /// Radius of the top disc.
    #[inline]
    pub fn radius_top(&self) -> f64 {
        self.radius_top
    }

    /// Enclosed volume.
    pub fn volume(&self) -> f64 {
        let (r1, r2) = (self.radius_base, self.radius_top);
        PI * self.height() / 3.0 * (r1 * r1 + r1 * r2 + r2 * r2)
    }

    /// Smallest length scale of the part: its height or its smallest
    /// non-zero radius.
    pub fn min_feature_size(&self) -> f64 {
        [self.height(), self.radius_base, self.radius_top]
            .into_iter()
            .filter(|v| *v > EPSILON)
            .fold(f64::INFINITY, f64::min)
    }

    /// Exact signed distance to the frustum surface, negative inside.
    ///
    /// Closed form for a capped cone between two end points; it reduces the
    /// problem to the half-plane spanned by the axis and the query point.
    pub fn signed_distance(&self, p: DVec3) -> f64 {
        let (ra, rb) = (self.radius_base, self.radius_top);
        let rba = rb - ra;
        let baba = self.axis.length_squared();
        let pa = p - self.base;
        let paba = pa.dot(self.axis) / baba;

        let x = (pa - self.axis * paba).length();
        let cax = (x - if paba < 0.5 { ra } else { rb }).max(0.0);
        let cay = (paba - 0.5).abs() - 0.5;

        let k = rba * rba + baba;
        let f = ((rba * (x - ra) + paba * baba) / k).clamp(0.0, 1.0);
        let cbx = x - ra - f * rba;
        let cby = paba - f;

        let sign = if cbx < 0.0 && cay < 0.0 { -1.0 } else { 1.0 };
        sign * (cax * cax + cay * cay * baba)
            .min(cbx * cbx + cby * cby * baba)
            .sqrt()
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let n = self.axis / self.height();
        let spread = DVec3::new(
            (1.0 - n.x * n.x).max(0.0).sqrt(),
            (1.0 - n.y * n.y).max(0.0).sqrt(),
            (1.0 - n.z * n.z).max(0.0).sqrt(),
        );
        let base_extent = spread * self.radius_base;
        let top_extent = spread * self.radius_top;
        let top = self.top();
        (
            (self.base - base_extent).min(top - top_extent),
            (self.base + base_extent).max(top + top_extent),
        )
    }

    /// Surface patch closest to `p`.
    ///
    /// Distances are measured in the half-plane through the axis: to the two
    /// end discs and to the slanted side segment.
    pub fn closest_patch(&self, p: DVec3) -> Patch {
        let height = self.height();
        let n = self.axis / height;
        let pa = p - self.base;
        let t = pa.dot(n);
        let x = (pa - n * t).length();

        let disc_distance = |radius: f64, offset: f64| {
            if x <= radius {
                offset.abs()
            } else {
                (x - radius).hypot(offset)
            }
        };
        let base = disc_distance(self.radius_base, t);
        let top = disc_distance(self.radius_top, t - height);

        // Side segment from (radius_base, 0) to (radius_top, height)
        let side = glam::DVec2::new(self.radius_top - self.radius_base, height);
        let rel = glam::DVec2::new(x - self.radius_base, t);
        let s = (rel.dot(side) / side.length_squared()).clamp(0.0, 1.0);
        let lateral = (rel - side * s).length();

        if lateral <= base && lateral <= top {
            Patch::Lateral
        } else if base <= top {
            Patch::Base
        } else {
            Patch::Top
        }
    }

    /// Centre and radius of an end disc.
    pub fn cap(&self, patch: Patch) -> Option<(DVec3, f64)> {
        match patch {
            Patch::Lateral => None,
            Patch::Base => Some((self.base, self.radius_base)),
            Patch::Top => Some((self.top(), self.radius_top)),
        }
    }
}

/// Farthest point of a disc in direction `dir`.
fn disc_support(center: DVec3, normal: DVec3, radius: f64, dir: DVec3) -> DVec3 {
    let planar = dir - normal * dir.dot(normal);
    let length = planar.length();
    if length <= EPSILON {
        center
    } else {
        center + planar * (radius / length)
    }
}

impl SupportMap for Frustum {
    fn support(&self, dir: DVec3) -> DVec3 {
        let n = self.axis / self.height();
        let bottom = disc_support(self.base, n, self.radius_base, dir);
        let top = disc_support(self.top(), n, self.radius_top, dir);
        if top.dot(dir) > bottom.dot(dir) {
            top
        } else {
            bottom
        }
    }
}

#[cfg(test)]
mod tests;
