use serde::{Deserialize, Serialize};

/// What happens to the current selection after a refused move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailedMovePolicy {
    /// Drop the selection; the player has to pick a piece again.
    #[default]
    Clear,
    /// Keep the piece selected so another destination can be tried.
    Retain,
}

/// Session rules that vary between hosts.
///
/// Every field has a default, so a host may pass a partial object
/// (e.g. `{ "forcedCapture": true }`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub failed_move: FailedMovePolicy,
    /// When set, a side that can capture must capture.
    pub forced_capture: bool,
}

impl GameConfig {
    pub fn with_failed_move(mut self, policy: FailedMovePolicy) -> Self {
        self.failed_move = policy;
        self
    }

    pub fn with_forced_capture(mut self, forced: bool) -> Self {
        self.forced_capture = forced;
        self
    }
}
