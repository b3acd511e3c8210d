use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    UnmatchedOpen(char, usize),    // open symbol at this position was never closed
    UnmatchedClose(char, usize),   // close symbol at this position has no partner
    InvalidSymbol(char, usize),    // unknown notation character and position
    LengthMismatch { sequence: usize, structure: usize },
    InvalidRange { from: usize, to: usize, len: usize },
    InconsistentPair(usize),       // pt[pt[i]] != i
}

impl StructureError {
    /// True for both flavors of unbalanced bracket errors.
    pub fn is_unbalanced(&self) -> bool {
        matches!(self, StructureError::UnmatchedOpen(..) | StructureError::UnmatchedClose(..))
    }
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::UnmatchedOpen(c, i) => {
                write!(f, "Unmatched '{}' at position {}", c, i)
            }
            StructureError::UnmatchedClose(c, i) => {
                write!(f, "Unmatched '{}' at position {}", c, i)
            }
            StructureError::InvalidSymbol(c, i) => {
                write!(f, "Invalid symbol '{}' at position {}", c, i)
            }
            StructureError::LengthMismatch { sequence, structure } => {
                write!(f, "Sequence length ({}) and structure length ({}) do not match",
                    sequence, structure)
            }
            StructureError::InvalidRange { from, to, len } => {
                write!(f, "Invalid range [{}, {}] for pair table of length {}", from, to, len)
            }
            StructureError::InconsistentPair(i) => {
                write!(f, "Invalid entry at pair table position {}", i)
            }
        }
    }
}

impl std::error::Error for StructureError {}

