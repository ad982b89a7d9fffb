use crate::DEFAULT_HIDE_EMPTY_LANES;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoardDefaultsConfig {
    /// Board configuration to open when none is given on the command line.
    /// Falls back to the user's default board.
    pub config_id: Option<String>,
    pub hide_empty_lanes: bool,
}

impl Default for BoardDefaultsConfig {
    fn default() -> Self {
        Self {
            config_id: None,
            hide_empty_lanes: DEFAULT_HIDE_EMPTY_LANES,
        }
    }
}
