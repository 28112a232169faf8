//! Neighbourhood descriptors.
//!
//! A neighbourhood decides whether a scalar distance places two embedded
//! vectors in the recurrence relation. Only the fixed radius variant has an
//! optimised kernel; the others are carried as descriptors so configuration
//! and error reporting can name them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Neighbourhood {
    /// All points with `distance < radius` (strict).
    FixedRadius { radius: f32 },
    /// All points with `inner < distance < outer`.
    RadiusCorridor { inner: f32, outer: f32 },
    /// Fixed amount of nearest neighbours. Membership is rank-based, not
    /// distance-based; no scalar predicate exists for it.
    NearestNeighbours { k: u32 },
}

impl Neighbourhood {
    pub fn fixed_radius(radius: f32) -> Self {
        Neighbourhood::FixedRadius { radius }
    }

    pub fn radius_corridor(inner: f32, outer: f32) -> Result<Self> {
        if inner >= outer {
            return Err(Error::domain(format!(
                "radius corridor requires inner < outer, got [{inner}, {outer}]"
            )));
        }
        Ok(Neighbourhood::RadiusCorridor { inner, outer })
    }

    pub fn nearest_neighbours(k: u32) -> Self {
        Neighbourhood::NearestNeighbours { k }
    }

    /// Scalar membership predicate. Rank-based neighbourhoods never match by
    /// distance; callers reject them before distances are ever computed.
    pub fn contains(&self, distance: f32) -> bool {
        match *self {
            Neighbourhood::FixedRadius { radius } => distance < radius,
            Neighbourhood::RadiusCorridor { inner, outer } => {
                inner < distance && distance < outer
            }
            Neighbourhood::NearestNeighbours { .. } => false,
        }
    }

    /// Whether the recurrence relation induced by this neighbourhood (with a
    /// symmetric metric) is itself symmetric.
    pub fn preserves_symmetry(&self) -> bool {
        !matches!(self, Neighbourhood::NearestNeighbours { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Neighbourhood::FixedRadius { .. } => "fixed radius",
            Neighbourhood::RadiusCorridor { .. } => "radius corridor",
            Neighbourhood::NearestNeighbours { .. } => "fixed amount of nearest neighbours",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_radius_is_strict() {
        let hood = Neighbourhood::fixed_radius(1.0);
        assert!(hood.contains(0.999));
        assert!(!hood.contains(1.0));
        // r = 0 admits nothing, not even distance zero
        assert!(!Neighbourhood::fixed_radius(0.0).contains(0.0));
    }

    #[test]
    fn test_corridor_bounds_exclusive() {
        let hood = Neighbourhood::radius_corridor(0.1, 1.0).unwrap();
        assert!(!hood.contains(0.1));
        assert!(hood.contains(0.5));
        assert!(!hood.contains(1.0));
    }

    #[test]
    fn test_corridor_rejects_inverted_radii() {
        assert!(Neighbourhood::radius_corridor(1.0, 0.1).is_err());
        assert!(Neighbourhood::radius_corridor(1.0, 1.0).is_err());
    }
}
