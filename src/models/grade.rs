use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Letter grades on the institutional 10-point scale. `P` marks a
/// pass/fail course and carries no grade points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
    E,
    F,
    P,
}

impl Grade {
    /// All grades on the scale, best first.
    pub const ALL: [Grade; 8] = [
        Grade::S,
        Grade::A,
        Grade::B,
        Grade::C,
        Grade::D,
        Grade::E,
        Grade::F,
        Grade::P,
    ];

    /// Grade points on the 10-point scale. `None` for pass/fail,
    /// which is excluded from CGPA weighting.
    pub fn points(&self) -> Option<f64> {
        match self {
            Grade::S => Some(10.0),
            Grade::A => Some(9.0),
            Grade::B => Some(8.0),
            Grade::C => Some(7.0),
            Grade::D => Some(6.0),
            Grade::E => Some(5.0),
            Grade::F => Some(0.0),
            Grade::P => None,
        }
    }

    pub fn counts_toward_cgpa(&self) -> bool {
        self.points().is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::F => "F",
            Grade::P => "P",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Grade {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "S" => Ok(Grade::S),
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            "E" => Ok(Grade::E),
            "F" => Ok(Grade::F),
            "P" => Ok(Grade::P),
            _ => Err(Error::InvalidGrade(s.trim().to_string())),
        }
    }
}
