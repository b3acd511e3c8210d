//! The bracket alphabet used to encode pseudoknot levels.
//!
//! Level 0 are round brackets, which is where all nested pairs end up when
//! a pair table is written back to dot-bracket notation. Every further
//! level is one more independent class of matching symbols, so a single
//! string can carry up to `NUM_LEVELS` mutually crossing layers of pairs.

/// Opening symbols, indexed by level.
pub const BRACKET_LEFT: [char; NUM_LEVELS] = [
    '(', '[', '{', '<',
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M',
    'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Closing symbols, indexed by level.
pub const BRACKET_RIGHT: [char; NUM_LEVELS] = [
    ')', ']', '}', '>',
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm',
    'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub const NUM_LEVELS: usize = 30;

pub const UNPAIRED: char = '.';

/// Strand break symbols. The first one is used for output.
pub const BREAKS: [char; 2] = ['&', '+'];

/// The level of an opening symbol, if it is one.
pub fn open_level(c: char) -> Option<usize> {
    BRACKET_LEFT.iter().position(|&b| b == c)
}

/// The level of a closing symbol, if it is one.
pub fn close_level(c: char) -> Option<usize> {
    BRACKET_RIGHT.iter().position(|&b| b == c)
}

pub fn open_symbol(level: usize) -> char {
    BRACKET_LEFT[level]
}

pub fn close_symbol(level: usize) -> char {
    BRACKET_RIGHT[level]
}

pub fn is_break(c: char) -> bool {
    BREAKS.contains(&c)
}

pub fn num_levels() -> usize {
    NUM_LEVELS
}

/// The level of any bracket symbol, and whether it opens a pair.
pub fn level_of(c: char) -> Option<(usize, bool)> {
    open_level(c).map(|l| (l, true))
        .or_else(|| close_level(c).map(|l| (l, false)))
}
