use serde::{Deserialize, Serialize};

use crate::normalize::BaselineMethod;

/// Settings for one analysis run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzeConfig {
    /// Baseline convention for the normalized series.
    pub baseline: BaselineMethod,
}
