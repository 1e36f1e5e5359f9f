//! Assembly - solved geometry + seat registry, built once from configuration
//!
//! Everything here is immutable after `build`. The built-in assembly is
//! memoized process-wide by `Assembly::shared`.

use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{debug, info};

use crate::bounds::{bounding_sphere, BoundingSphere};
use crate::config::Config;
use crate::layout::{
    emit_bench_arcs, emit_transforms, solve, BenchArc, LayoutError, LayoutSolution, SeatOrder,
    SeatTransform,
};
use crate::registry::{RegistryError, SeatRegistry};
use crate::seat_colors::{resolve_colors, Palette, SeatColors};
use crate::timeline::Snapshot;

/// Samples per bench centerline
const BENCH_ARC_SEGMENTS: usize = 16;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    #[error("layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("registry: {0}")]
    Registry(#[from] RegistryError),
    #[error("layout has {actual} seats but configuration declares {declared}")]
    SeatTotalMismatch { declared: usize, actual: usize },
    #[error("layout produced no seats")]
    NoSeats,
}

#[derive(Debug, Clone)]
pub struct Assembly {
    config: Config,
    order: SeatOrder,
    solution: LayoutSolution,
    transforms: Arc<[SeatTransform]>,
    bench_arcs: Vec<BenchArc>,
    registry: SeatRegistry,
    sphere: BoundingSphere,
}

static SHARED: OnceLock<Result<Arc<Assembly>, AssemblyError>> = OnceLock::new();

impl Assembly {
    /// Validate configuration, solve the layout, emit transforms and resolve
    /// seat blocks. Fails fast on any configuration mismatch.
    pub fn build(config: &Config) -> Result<Self, AssemblyError> {
        let layout = &config.layout;
        let order = SeatOrder::from_config(layout);

        if let Some(declared) = config.total_seats {
            if declared != order.total() {
                return Err(AssemblyError::SeatTotalMismatch {
                    declared,
                    actual: order.total(),
                });
            }
        }

        let solution = solve(layout)?;

        let transforms: Arc<[SeatTransform]> = emit_transforms(layout, &solution, &order).into();
        let sphere = bounding_sphere(&transforms).ok_or(AssemblyError::NoSeats)?;
        let bench_arcs = emit_bench_arcs(layout, &solution, BENCH_ARC_SEGMENTS);

        let registry = SeatRegistry::build(
            &config.alliances,
            &config.unallocated,
            &order,
            config.expected_order.as_deref(),
        )?;

        for spoke in order.spokes() {
            debug!("Spoke {} -> seats {:?}", spoke.name, spoke.indices());
        }
        info!(
            "Assembly built: {} seats, {} alliances, order {}",
            order.total(),
            registry.alliances().len(),
            order.fingerprint()
        );

        Ok(Self {
            config: config.clone(),
            order,
            solution,
            transforms,
            bench_arcs,
            registry,
            sphere,
        })
    }

    /// The built-in assembly, built on first use
    pub fn shared() -> Result<Arc<Assembly>, AssemblyError> {
        SHARED
            .get_or_init(|| Assembly::build(&Config::default()).map(Arc::new))
            .clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.config.palette
    }

    pub fn order(&self) -> &SeatOrder {
        &self.order
    }

    pub fn solution(&self) -> &LayoutSolution {
        &self.solution
    }

    pub fn transforms(&self) -> Arc<[SeatTransform]> {
        Arc::clone(&self.transforms)
    }

    pub fn seat(&self, index: usize) -> Option<&SeatTransform> {
        self.transforms.get(index)
    }

    pub fn bench_arcs(&self) -> &[BenchArc] {
        &self.bench_arcs
    }

    pub fn registry(&self) -> &SeatRegistry {
        &self.registry
    }

    pub fn sphere(&self) -> BoundingSphere {
        self.sphere
    }

    pub fn total_seats(&self) -> usize {
        self.transforms.len()
    }

    pub fn colors_for(&self, snapshot: &Snapshot) -> SeatColors {
        resolve_colors(snapshot, &self.registry, &self.config.palette)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BlockSegment;

    #[test]
    fn test_build_default() {
        let assembly = Assembly::build(&Config::default()).unwrap();
        assert_eq!(assembly.total_seats(), 243);
        assert_eq!(assembly.registry().total_seats(), 243);
        assert_eq!(assembly.bench_arcs().len(), 30);
        assert!(assembly.solution().report.converged);
        assert_eq!(assembly.seat(242).map(|s| s.spoke), Some(5));
        assert!(assembly.seat(243).is_none());
    }

    #[test]
    fn test_shared_is_memoized() {
        let a = Assembly::shared().unwrap();
        let b = Assembly::shared().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a.transforms(), &b.transforms()));
    }

    #[test]
    fn test_declared_total_mismatch() {
        let config = Config {
            total_seats: Some(240),
            ..Config::default()
        };
        assert_eq!(
            Assembly::build(&config).unwrap_err(),
            AssemblyError::SeatTotalMismatch {
                declared: 240,
                actual: 243
            }
        );
    }

    #[test]
    fn test_registry_errors_propagate() {
        let mut config = Config::default();
        config.alliances[2].block = vec![BlockSegment::Range { start: 0, len: 1 }];
        assert!(matches!(
            Assembly::build(&config),
            Err(AssemblyError::Registry(RegistryError::DuplicateSeat { seat: 0, .. }))
        ));

        let config = Config {
            expected_order: Some("v0:stale".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            Assembly::build(&config),
            Err(AssemblyError::Registry(RegistryError::OrderMismatch { .. }))
        ));
    }

    #[test]
    fn test_layout_errors_propagate() {
        let mut config = Config::default();
        config.layout.chair_width = -1.0;
        config.total_seats = None;
        assert!(matches!(Assembly::build(&config), Err(AssemblyError::Layout(_))));
    }

    #[test]
    fn test_shipped_config_and_timeline() {
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
        let config = Config::load(root.join("assembly.yaml")).unwrap();
        assert_eq!(config.layout, Config::default().layout);

        let assembly = Assembly::build(&config).unwrap();
        assert_eq!(assembly.registry().block("NDA").len(), 122);
        assert_eq!(assembly.registry().block("INDIA").len(), 121);

        let timeline =
            crate::timeline::Timeline::load(root.join("data/election_timeline.json")).unwrap();
        for snapshot in timeline.snapshots() {
            let colors = assembly.colors_for(snapshot);
            assert!(colors.over_allocations.is_empty(), "{}", snapshot.time);
            assert!(colors.unknown_alliances.is_empty());
        }
    }

    #[test]
    fn test_colors_for_snapshot() {
        let assembly = Assembly::shared().unwrap();
        let snapshot = Snapshot::new("14:00", &[("INDIA", 60, 10), ("NDA", 55, 8)]);
        let colors = assembly.colors_for(&snapshot);
        assert_eq!(colors.declared_count(), 133);
    }

    #[test]
    fn test_feed_counts_at_integer_limit() {
        let json = concat!(
            r#"[{"time":"10:00","alliances":"#,
            r#"[{"id":"NDA","wins":18446744073709551615,"leads":1}]}]"#
        );
        let timeline = crate::timeline::Timeline::from_json(json).unwrap();
        let assembly = Assembly::shared().unwrap();
        let colors = assembly.colors_for(&timeline.snapshots()[0]);
        assert_eq!(colors.declared_count(), 122);
        assert_eq!(colors.over_allocations.len(), 1);
        assert_eq!(colors.over_allocations[0].alliance, "NDA");
    }
}
