// Copyright (c) 2026 rezky_nightky

use serde::{Deserialize, Serialize};

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Mono,
    #[value(name = "16")]
    Color16,
    #[value(name = "256")]
    Color256,
    #[default]
    #[value(name = "truecolor")]
    TrueColor,
}

/// Which streak wins when two streaks of equal brightness overlap, and
/// where new overlap spawns are placed relative to existing ones.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityPriority {
    /// Newer streaks are drawn over older ones.
    #[default]
    Higher,
    /// Older streaks stay on top; newer ones slide in underneath.
    Lower,
}

impl VisibilityPriority {
    pub fn flipped(self) -> Self {
        match self {
            Self::Higher => Self::Lower,
            Self::Lower => Self::Higher,
        }
    }
}
