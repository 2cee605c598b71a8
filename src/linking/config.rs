use serde::{Deserialize, Serialize};

/// Switches for the linking pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkingConfig {
    /// Emit tours that cover no photo as empty real links instead of dropping them
    pub emit_empty_tour_links: bool,

    /// Coalesce consecutive history links after building
    pub merge_history_links: bool,

    /// Fill in track positions for tour photos without their own
    pub propagate_gps: bool,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            emit_empty_tour_links: false,
            merge_history_links: true,
            propagate_gps: true,
        }
    }
}
