//! Engine configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! strategy = "learned"
//! model_path = "./models/handover.json"
//! inference_timeout_ms = 500
//! max_record_age_ms = 5000
//! decode = "arg-max-with-hold"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::deciders::{DecodeRule, DistanceDecider, LearnedDecider};
use crate::domain::EngineError;
use crate::ports::{Decider, ModelLoader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    #[default]
    Distance,
    Learned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Scoring artifact for the learned strategy. Ignored by `distance`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
    #[serde(default = "default_inference_timeout_ms")]
    pub inference_timeout_ms: u64,
    /// Records older than this are left out of the snapshot. Unset accepts any age.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_record_age_ms: Option<u64>,
    #[serde(default)]
    pub decode: DecodeRule,
}

fn default_inference_timeout_ms() -> u64 {
    1000
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Configuration(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str)
            .map_err(|e| EngineError::Configuration(format!("TOML parse error: {e}")))
    }

    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self)
            .map_err(|e| EngineError::Configuration(format!("TOML serialise error: {e}")))
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.inference_timeout_ms)
    }

    pub fn max_record_age(&self) -> Option<Duration> {
        self.max_record_age_ms.map(Duration::from_millis)
    }

    /// Creates the configured decider. For `learned` the model is loaded and
    /// bound here; a missing path or a failed load is a configuration error.
    pub fn create_decider(&self, models: &dyn ModelLoader) -> Result<Box<dyn Decider>, EngineError> {
        match self.strategy {
            StrategyKind::Distance => Ok(Box::new(DistanceDecider::new())),
            StrategyKind::Learned => {
                if self.inference_timeout_ms == 0 {
                    return Err(EngineError::Configuration(
                        "inference_timeout_ms must be greater than zero".into(),
                    ));
                }
                let path = self.model_path.as_deref().ok_or_else(|| {
                    EngineError::Configuration("strategy 'learned' requires model_path".into())
                })?;
                let decider = LearnedDecider::new(self.decode, self.inference_timeout());
                decider.load(path, models)?;
                Ok(Box::new(decider))
            }
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Distance,
            model_path: None,
            inference_timeout_ms: default_inference_timeout_ms(),
            max_record_age_ms: None,
            decode: DecodeRule::ArgMaxCells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{JsonModelLoader, LinearModel};
    use crate::ports::{ScoreError, Scorer};
    use std::sync::Arc;

    struct StubLoader;

    impl ModelLoader for StubLoader {
        fn load(&self, _path: &Path) -> Result<Arc<dyn Scorer>, ScoreError> {
            Ok(Arc::new(LinearModel::new(vec![vec![1.0]], vec![0.0])?))
        }
    }

    #[test]
    fn test_default() {
        let c = EngineConfig::default();
        assert_eq!(c.strategy, StrategyKind::Distance);
        assert_eq!(c.inference_timeout(), Duration::from_secs(1));
        assert_eq!(c.max_record_age(), None);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
strategy = "learned"
model_path = "/tmp/model.json"
inference_timeout_ms = 250
max_record_age_ms = 5000
decode = "arg-max-with-hold"
"#;
        let c = EngineConfig::from_toml(toml).unwrap();
        assert_eq!(c.strategy, StrategyKind::Learned);
        assert_eq!(c.model_path, Some(PathBuf::from("/tmp/model.json")));
        assert_eq!(c.inference_timeout(), Duration::from_millis(250));
        assert_eq!(c.max_record_age(), Some(Duration::from_secs(5)));
        assert_eq!(c.decode, DecodeRule::ArgMaxWithHold);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let c = EngineConfig::from_toml("").unwrap();
        assert_eq!(c, EngineConfig::default());
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = EngineConfig {
            strategy: StrategyKind::Learned,
            model_path: Some(PathBuf::from("m.json")),
            ..Default::default()
        };
        let back = EngineConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_unknown_strategy() {
        let err = EngineConfig::from_toml(r#"strategy = "coin-flip""#).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_create_distance_decider() {
        let d = EngineConfig::default().create_decider(&StubLoader).unwrap();
        assert_eq!(d.name(), "distance");
    }

    #[test]
    fn test_create_learned_decider_binds_model() {
        let c = EngineConfig {
            strategy: StrategyKind::Learned,
            model_path: Some(PathBuf::from("any.json")),
            ..Default::default()
        };
        let d = c.create_decider(&StubLoader).unwrap();
        assert_eq!(d.name(), "learned");
        assert!(d.ensure_ready().is_ok());
    }

    #[test]
    fn test_learned_without_model_path() {
        let c = EngineConfig {
            strategy: StrategyKind::Learned,
            ..Default::default()
        };
        assert!(matches!(
            c.create_decider(&StubLoader),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn test_learned_with_unloadable_model() {
        let c = EngineConfig {
            strategy: StrategyKind::Learned,
            model_path: Some(PathBuf::from("/no/such/model.json")),
            ..Default::default()
        };
        assert!(matches!(
            c.create_decider(&JsonModelLoader),
            Err(EngineError::Configuration(_))
        ));
    }
}
