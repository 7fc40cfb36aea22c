//! The four ordered grade levels and their store branches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Prefix shared by every grade branch name.
pub const BRANCH_PREFIX: &str = "proyectos_sanitizado_";

/// A grade level, ordered lowest to highest. `Fourth` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GradeLevel {
    #[serde(rename = "1r")]
    First,
    #[serde(rename = "2n")]
    Second,
    #[serde(rename = "3r")]
    Third,
    #[serde(rename = "4t")]
    Fourth,
}

impl GradeLevel {
    /// All levels in ascending order.
    pub const ALL: [GradeLevel; 4] = [Self::First, Self::Second, Self::Third, Self::Fourth];

    /// The tag stored in `nivel` and used in branch names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "1r",
            Self::Second => "2n",
            Self::Third => "3r",
            Self::Fourth => "4t",
        }
    }

    /// The level a student moves to on promotion, `None` for the terminal level.
    pub fn next(&self) -> Option<GradeLevel> {
        match self {
            Self::First => Some(Self::Second),
            Self::Second => Some(Self::Third),
            Self::Third => Some(Self::Fourth),
            Self::Fourth => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    /// Branch name under `proyectos/`, e.g. `proyectos_sanitizado_2n`.
    pub fn branch_name(&self) -> String {
        format!("{BRANCH_PREFIX}{}", self.as_str())
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradeLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GradeLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown grade level '{s}'")))
    }
}
