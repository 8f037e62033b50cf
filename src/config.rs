use std::path::Path;

use serde::Deserialize;

use crate::core::Frame;
use crate::error::{ScanrayError, ScanrayResult};
use crate::scheduler::Strategy;

/// Render parameters as loaded from a JSON config file. Every field is
/// optional; CLI flags override whatever the file provides and
/// [`RenderConfig::default`] fills the rest.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub child_ray_budget: u32,
    pub workers: usize,
    pub strategy: Strategy,
    pub scene: String,
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 200,
            samples_per_pixel: 100,
            child_ray_budget: 50,
            workers: 8,
            strategy: Strategy::PollingPool,
            scene: "three-spheres".to_string(),
            seed: 0,
        }
    }
}

impl RenderConfig {
    pub fn from_path(path: &Path) -> ScanrayResult<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| ScanrayError::serde(format!("{}: {e}", path.display())))
    }

    /// Validate and build the immutable frame parameters.
    pub fn frame(&self) -> ScanrayResult<Frame> {
        if self.workers == 0 {
            return Err(ScanrayError::validation("worker count must be >= 1"));
        }
        Frame::new(
            self.width,
            self.height,
            self.samples_per_pixel,
            self.child_ray_budget,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: RenderConfig =
            serde_json::from_str(r#"{"width": 64, "strategy": "barrier-rounds"}"#).unwrap();
        assert_eq!(cfg.width, 64);
        assert_eq!(cfg.strategy, Strategy::BarrierRounds);
        assert_eq!(cfg.height, RenderConfig::default().height);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<RenderConfig>(r#"{"widht": 64}"#).is_err());
    }

    #[test]
    fn strategy_names_are_kebab_case() {
        for (name, strategy) in [
            ("barrier-rounds", Strategy::BarrierRounds),
            ("static-partition", Strategy::StaticPartition),
            ("polling-pool", Strategy::PollingPool),
        ] {
            let cfg: RenderConfig =
                serde_json::from_str(&format!(r#"{{"strategy": "{name}"}}"#)).unwrap();
            assert_eq!(cfg.strategy, strategy);
        }
    }

    #[test]
    fn zero_workers_fails_validation() {
        let cfg = RenderConfig {
            workers: 0,
            ..RenderConfig::default()
        };
        assert!(cfg.frame().is_err());
    }
}
