//! Engine configuration.
//!
//! Plain values with defaults; callers build them in code or deserialize
//! them from whatever format they already use.

use serde::{Deserialize, Serialize};

use crate::blockage::BlockageConfig;
use crate::layout::LayoutConfig;

/// Settings for the post-scheduling steps of [`compute`](crate::engine::compute).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Layered layout geometry.
    pub layout: LayoutConfig,
    /// Blockage reason formatting.
    pub blockage: BlockageConfig,
}

impl EngineConfig {
    /// Sets the layout geometry.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the blockage settings.
    pub fn with_blockage(mut self, blockage: BlockageConfig) -> Self {
        self.blockage = blockage;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.layout, LayoutConfig::default());
        assert_eq!(config.blockage.max_reasons, crate::blockage::DEFAULT_MAX_REASONS);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "layout": { "node_width": 240.0 }, "blockage": { "max_reasons": 5 } }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.layout.node_width, 240.0);
        assert_eq!(config.layout.node_height, LayoutConfig::default().node_height);
        assert_eq!(config.blockage.max_reasons, 5);

        let empty: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, EngineConfig::default());
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_layout(LayoutConfig::default().with_spacing(100.0, 40.0))
            .with_blockage(BlockageConfig::default().with_max_reasons(1));
        assert_eq!(config.layout.level_spacing, 100.0);
        assert_eq!(config.layout.node_spacing, 40.0);
        assert_eq!(config.blockage.max_reasons, 1);
    }
}
