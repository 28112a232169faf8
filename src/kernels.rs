//! Compute kernel registry.
//!
//! The original system resolved `(computation, neighbourhood, metric)`
//! triples to device code through a configuration file of kernel names. Here
//! the registry is a typed table: each entry pairs the triple with a
//! monomorphised materialisation function, so resolution happens once per
//! analysis and the tile loops carry no dispatch. Triples without an entry
//! (radius corridor and nearest-neighbour modes have no optimised kernels)
//! fail with an unsupported-configuration error at creation time.

use crate::error::{Error, Result};
use crate::matrix::TileBits;
use crate::metric::{DistanceKernel, Euclidean, Maximum, Metric, Taxicab};
use crate::neighbourhood::Neighbourhood;

/// What a kernel is resolved for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComputationKind {
    RecurrencePlot,
    Rqa,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeighbourhoodKind {
    FixedRadius,
    RadiusCorridor,
    NearestNeighbours,
}

impl From<&Neighbourhood> for NeighbourhoodKind {
    fn from(neighbourhood: &Neighbourhood) -> Self {
        match neighbourhood {
            Neighbourhood::FixedRadius { .. } => NeighbourhoodKind::FixedRadius,
            Neighbourhood::RadiusCorridor { .. } => NeighbourhoodKind::RadiusCorridor,
            Neighbourhood::NearestNeighbours { .. } => NeighbourhoodKind::NearestNeighbours,
        }
    }
}

/// Everything a materialisation kernel reads: the two flat vector buffers of
/// the tile's column and row ranges, the embedding dimension, and the
/// neighbourhood radius.
pub struct TileInput<'a> {
    pub vectors_x: &'a [f32],
    pub vectors_y: &'a [f32],
    pub dimension: usize,
    pub radius: f32,
}

pub type MaterialiseFn = fn(&TileInput<'_>, &mut TileBits);

/// A resolved kernel.
#[derive(Clone, Copy)]
pub struct Kernel {
    pub name: &'static str,
    pub materialise: MaterialiseFn,
}

/// The dispatch table. One row per supported triple; order is search order.
const REGISTRY: &[(ComputationKind, NeighbourhoodKind, Metric, Kernel)] = &[
    (
        ComputationKind::Rqa,
        NeighbourhoodKind::FixedRadius,
        Metric::Taxicab,
        Kernel {
            name: "rqa_fixed_radius_taxicab",
            materialise: materialise_fixed_radius::<Taxicab>,
        },
    ),
    (
        ComputationKind::Rqa,
        NeighbourhoodKind::FixedRadius,
        Metric::Euclidean,
        Kernel {
            name: "rqa_fixed_radius_euclidean",
            materialise: materialise_fixed_radius::<Euclidean>,
        },
    ),
    (
        ComputationKind::Rqa,
        NeighbourhoodKind::FixedRadius,
        Metric::Maximum,
        Kernel {
            name: "rqa_fixed_radius_maximum",
            materialise: materialise_fixed_radius::<Maximum>,
        },
    ),
    (
        ComputationKind::RecurrencePlot,
        NeighbourhoodKind::FixedRadius,
        Metric::Taxicab,
        Kernel {
            name: "rp_fixed_radius_taxicab",
            materialise: materialise_fixed_radius::<Taxicab>,
        },
    ),
    (
        ComputationKind::RecurrencePlot,
        NeighbourhoodKind::FixedRadius,
        Metric::Euclidean,
        Kernel {
            name: "rp_fixed_radius_euclidean",
            materialise: materialise_fixed_radius::<Euclidean>,
        },
    ),
    (
        ComputationKind::RecurrencePlot,
        NeighbourhoodKind::FixedRadius,
        Metric::Maximum,
        Kernel {
            name: "rp_fixed_radius_maximum",
            materialise: materialise_fixed_radius::<Maximum>,
        },
    ),
];

/// Resolve the kernel for a computation, or report the configuration as
/// unsupported.
pub fn select(
    computation: ComputationKind,
    metric: Metric,
    neighbourhood: &Neighbourhood,
) -> Result<Kernel> {
    let kind = NeighbourhoodKind::from(neighbourhood);
    REGISTRY
        .iter()
        .find(|(c, k, m, _)| *c == computation && *k == kind && *m == metric)
        .map(|(_, _, _, kernel)| *kernel)
        .ok_or_else(|| {
            Error::unsupported(format!(
                "no {} kernel for the {} neighbourhood with the {} metric",
                match computation {
                    ComputationKind::RecurrencePlot => "recurrence plot",
                    ComputationKind::Rqa => "RQA",
                },
                neighbourhood.name(),
                metric.name()
            ))
        })
}

/// Evaluate `distance < radius` for every cell of the tile. The metric is a
/// type parameter so each registry entry is a branch-free loop over the two
/// flat vector buffers.
fn materialise_fixed_radius<M: DistanceKernel>(input: &TileInput<'_>, bits: &mut TileBits) {
    let dimension = input.dimension;
    for i in 0..bits.dim_x() {
        let a = &input.vectors_x[i * dimension..(i + 1) * dimension];
        for j in 0..bits.dim_y() {
            let b = &input.vectors_y[j * dimension..(j + 1) * dimension];
            if M::distance(a, b) < input.radius {
                bits.set(i, j);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_radius_is_supported_for_all_metrics() {
        for computation in [ComputationKind::Rqa, ComputationKind::RecurrencePlot] {
            for metric in [Metric::Taxicab, Metric::Euclidean, Metric::Maximum] {
                let kernel = select(computation, metric, &Neighbourhood::fixed_radius(1.0));
                assert!(kernel.is_ok(), "{metric:?} missing for {computation:?}");
            }
        }
    }

    #[test]
    fn test_corridor_and_fan_are_unsupported() {
        let corridor = Neighbourhood::radius_corridor(0.1, 1.0).unwrap();
        let fan = Neighbourhood::nearest_neighbours(5);
        for neighbourhood in [corridor, fan] {
            let result = select(ComputationKind::Rqa, Metric::Euclidean, &neighbourhood);
            assert!(matches!(
                result,
                Err(crate::error::Error::Unsupported { .. })
            ));
        }
    }

    #[test]
    fn test_materialise_matches_enum_dispatch() {
        let vectors_x: Vec<f32> = (0..12).map(|i| (i as f32 * 0.37).cos()).collect();
        let vectors_y: Vec<f32> = (0..8).map(|i| (i as f32 * 0.71).sin()).collect();
        let dimension = 2;
        let radius = 0.8;

        for metric in [Metric::Taxicab, Metric::Euclidean, Metric::Maximum] {
            let kernel = select(
                ComputationKind::Rqa,
                metric,
                &Neighbourhood::fixed_radius(radius),
            )
            .unwrap();
            let input = TileInput {
                vectors_x: &vectors_x,
                vectors_y: &vectors_y,
                dimension,
                radius,
            };
            let mut bits = TileBits::new(6, 4);
            (kernel.materialise)(&input, &mut bits);

            for i in 0..6 {
                for j in 0..4 {
                    let distance =
                        metric.distance_in_vectors(&vectors_x, &vectors_y, dimension, i, j);
                    assert_eq!(bits.get(i, j), distance < radius, "{metric:?} at ({i}, {j})");
                }
            }
        }
    }

    #[test]
    fn test_zero_radius_admits_nothing() {
        let vectors: Vec<f32> = vec![1.0; 6];
        let input = TileInput {
            vectors_x: &vectors,
            vectors_y: &vectors,
            dimension: 2,
            radius: 0.0,
        };
        let kernel = select(
            ComputationKind::Rqa,
            Metric::Euclidean,
            &Neighbourhood::fixed_radius(0.0),
        )
        .unwrap();
        let mut bits = TileBits::new(3, 3);
        (kernel.materialise)(&input, &mut bits);
        for i in 0..3 {
            assert_eq!(bits.count_column(i), 0);
        }
    }
}
