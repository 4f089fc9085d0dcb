// src/spectral/variable.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of variables making up a complete spectrum.
pub const VARIABLE_COUNT: usize = 5;

/// Spectral variable encoded by the letter in a file name.
///
/// The declaration order is the slot order used by the per-timestamp matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Variable {
    /// `d`: mean wave direction (alpha1).
    D,
    /// `i`: principal wave direction (alpha2).
    I,
    /// `j`: first normalized polar coordinate (r1).
    J,
    /// `k`: second normalized polar coordinate (r2).
    K,
    /// `w`: spectral density.
    W,
}

impl Variable {
    pub const ALL: [Variable; VARIABLE_COUNT] =
        [Variable::D, Variable::I, Variable::J, Variable::K, Variable::W];

    pub const DENSITY: Variable = Variable::W;
    pub const ALPHA_1: Variable = Variable::D;
    pub const ALPHA_2: Variable = Variable::I;
    pub const R_1: Variable = Variable::J;
    pub const R_2: Variable = Variable::K;

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'd' => Some(Variable::D),
            'i' => Some(Variable::I),
            'j' => Some(Variable::J),
            'k' => Some(Variable::K),
            'w' => Some(Variable::W),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Variable::D => 'd',
            Variable::I => 'i',
            Variable::J => 'j',
            Variable::K => 'k',
            Variable::W => 'w',
        }
    }

    /// Index into a `[_; VARIABLE_COUNT]` slot array.
    pub fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
