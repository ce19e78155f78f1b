//! Wizard steps and backward navigation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One screen of the certificate wizard, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Introduction,
    Information,
    Activity,
    Mode,
}

impl Step {
    /// All steps in order.
    pub const ALL: [Step; 4] = [Self::Introduction, Self::Information, Self::Activity, Self::Mode];

    /// Zero-based position in [`Step::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Introduction => 0,
            Self::Information => 1,
            Self::Activity => 2,
            Self::Mode => 3,
        }
    }

    /// The step `back()` leads to. The first step is its own predecessor.
    pub fn previous(self) -> Step {
        Self::ALL[self.index().saturating_sub(1)]
    }

    /// One-based position and total, for "Step 2/4" headers.
    pub fn position(self) -> (usize, usize) {
        (self.index() + 1, Self::ALL.len())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Introduction => "introduction",
            Self::Information => "information",
            Self::Activity => "activity",
            Self::Mode => "mode",
        };
        f.write_str(s)
    }
}
