use std::fmt;
use std::ops::Deref;
use std::ops::DerefMut;
use std::convert::TryFrom;
use log::warn;

use crate::brackets;
use crate::PairTable;
use crate::StructureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DotBracket {
    Unpaired,     // '.'
    Open(u8),     // '(', '[', '{', '<', 'A', ...
    Close(u8),    // ')', ']', '}', '>', 'a', ...
    Break,        // '&' or '+'
}

impl TryFrom<char> for DotBracket {
    type Error = StructureError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        if c == brackets::UNPAIRED {
            Ok(DotBracket::Unpaired)
        } else if brackets::is_break(c) {
            Ok(DotBracket::Break)
        } else {
            match brackets::level_of(c) {
                Some((l, true)) => Ok(DotBracket::Open(l as u8)),
                Some((l, false)) => Ok(DotBracket::Close(l as u8)),
                None => Err(StructureError::InvalidSymbol(c, 0)),
            }
        }
    }
}

impl From<DotBracket> for char {
    fn from(db: DotBracket) -> Self {
        match db {
            DotBracket::Open(l) => brackets::open_symbol(l as usize),
            DotBracket::Close(l) => brackets::close_symbol(l as usize),
            DotBracket::Unpaired => brackets::UNPAIRED,
            DotBracket::Break => brackets::BREAKS[0],
        }
    }
}

/// A tokenized dot-bracket string, including strand breaks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DotBracketVec(pub Vec<DotBracket>);

impl DotBracketVec {
    /// Number of nucleotide positions (strand breaks excluded).
    pub fn num_positions(&self) -> usize {
        self.0.iter().filter(|&&db| db != DotBracket::Break).count()
    }

    /// Strand breaks as the (1-based) nucleotide after which they occur.
    pub fn breaks(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut pos = 0;
        for db in &self.0 {
            match db {
                DotBracket::Break => out.push(pos),
                _ => pos += 1,
            }
        }
        out
    }

    /// Encode a pair table and re-insert strand breaks behind the given
    /// nucleotides.
    pub fn with_breaks(pt: &PairTable, breaks: &[usize]) -> Self {
        let plain = DotBracketVec::from(pt);
        let mut result = Vec::with_capacity(plain.len() + breaks.len());
        for (i, &db) in plain.iter().enumerate() {
            result.push(db);
            if breaks.contains(&(i + 1)) && i + 1 < plain.len() {
                result.push(DotBracket::Break);
            }
        }
        DotBracketVec(result)
    }
}

impl Deref for DotBracketVec {
    type Target = [DotBracket];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DotBracketVec {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl TryFrom<&str> for DotBracketVec {
    type Error = StructureError;

    /// Tokenize a notation string. Error positions are 1-based columns.
    /// A strand break must separate two non-empty strands, a single
    /// trailing break is tolerated and dropped.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut vec = Vec::with_capacity(s.len());
        let chars: Vec<char> = s.chars().collect();
        for (i, &c) in chars.iter().enumerate() {
            let db = DotBracket::try_from(c)
                .map_err(|_| StructureError::InvalidSymbol(c, i + 1))?;
            if db == DotBracket::Break {
                if matches!(vec.last(), None | Some(DotBracket::Break)) {
                    return Err(StructureError::InvalidSymbol(c, i + 1));
                }
                if i + 1 == chars.len() {
                    continue;
                }
            }
            vec.push(db);
        }
        Ok(DotBracketVec(vec))
    }
}

impl From<&PairTable> for DotBracketVec {
    /// Writes every pair with the lowest bracket level in which it does not
    /// cross a pair that is already assigned. Nested tables therefore come
    /// out with round brackets only.
    fn from(pt: &PairTable) -> Self {
        let n = pt.length();
        let mut result = Vec::with_capacity(n);
        // Per level: closing positions of the currently open pairs.
        let mut open: Vec<Vec<usize>> = vec![Vec::new(); brackets::num_levels()];
        let mut level_of = vec![None; n + 1];

        for i in 1..=n {
            let j = pt[i];
            if j == 0 {
                result.push(DotBracket::Unpaired);
            } else if j > i {
                let level = open.iter()
                    .position(|stack| stack.last().is_none_or(|&l| l > j));
                match level {
                    Some(l) => {
                        open[l].push(j);
                        level_of[i] = Some(l);
                        level_of[j] = Some(l);
                        result.push(DotBracket::Open(l as u8));
                    }
                    None => {
                        warn!("Out of bracket levels, writing pair ({}, {}) as unpaired.", i, j);
                        result.push(DotBracket::Unpaired);
                    }
                }
            } else {
                match level_of[i] {
                    Some(l) => {
                        debug_assert_eq!(open[l].last(), Some(&i));
                        open[l].pop();
                        result.push(DotBracket::Close(l as u8));
                    }
                    None => result.push(DotBracket::Unpaired),
                }
            }
        }
        DotBracketVec(result)
    }
}

impl fmt::Display for DotBracketVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for db in &self.0 {
            write!(f, "{}", char::from(*db))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_bracket_from_char() {
        assert_eq!(DotBracket::try_from('.').unwrap(), DotBracket::Unpaired);
        assert_eq!(DotBracket::try_from('(').unwrap(), DotBracket::Open(0));
        assert_eq!(DotBracket::try_from(')').unwrap(), DotBracket::Close(0));
        assert_eq!(DotBracket::try_from('[').unwrap(), DotBracket::Open(1));
        assert_eq!(DotBracket::try_from('b').unwrap(), DotBracket::Close(5));
        assert_eq!(DotBracket::try_from('&').unwrap(), DotBracket::Break);
        assert_eq!(DotBracket::try_from('+').unwrap(), DotBracket::Break);
    }

    #[test]
    fn test_char_from_dot_bracket() {
        assert_eq!(char::from(DotBracket::Unpaired), '.');
        assert_eq!(char::from(DotBracket::Open(0)), '(');
        assert_eq!(char::from(DotBracket::Close(2)), '}');
        assert_eq!(char::from(DotBracket::Break), '&');
    }

    #[test]
    fn test_dot_bracket_vec_invalid_symbol() {
        let res = DotBracketVec::try_from("((?))");
        assert_eq!(res, Err(StructureError::InvalidSymbol('?', 3)));
    }

    #[test]
    fn test_dot_bracket_vec_from_str() {
        let dbv = DotBracketVec::try_from("(.)[.]").unwrap();
        assert_eq!(format!("{}", dbv), "(.)[.]");
        assert_eq!(dbv.len(), 6);
        assert_eq!(dbv[0], DotBracket::Open(0));
        assert_eq!(dbv[1], DotBracket::Unpaired);
        assert_eq!(dbv[5], DotBracket::Close(1));
    }

    #[test]
    fn test_breaks() {
        let dbv = DotBracketVec::try_from("((..&..))+..").unwrap();
        assert_eq!(dbv.num_positions(), 10);
        assert_eq!(dbv.breaks(), vec![4, 8]);
        assert_eq!(format!("{}", dbv), "((..&..))&..");
    }

    #[test]
    fn test_trailing_break_is_dropped() {
        let dbv = DotBracketVec::try_from("((..))+").unwrap();
        assert!(dbv.breaks().is_empty());
        assert_eq!(format!("{}", dbv), "((..))");
    }

    #[test]
    fn test_empty_strands_are_rejected() {
        assert_eq!(DotBracketVec::try_from("&.."), Err(StructureError::InvalidSymbol('&', 1)));
        assert_eq!(DotBracketVec::try_from("..&&.."), Err(StructureError::InvalidSymbol('&', 4)));
    }

    #[test]
    fn test_dot_bracket_vec_from_pair_table() {
        let pt = PairTable::try_from("((..))").unwrap();
        let dbv = DotBracketVec::from(&pt);
        assert_eq!(format!("{}", dbv), "((..))");
    }

    #[test]
    fn test_encode_assigns_levels_greedily() {
        // Square brackets are rewritten, but stay on the second level.
        let pt = PairTable::try_from("((..<<..))..>>").unwrap();
        assert_eq!(DotBracketVec::from(&pt).to_string(), "((..[[..))..]]");

        // Three mutually crossing pairs need three levels.
        let pt = PairTable::try_from("(.[.{.).].}").unwrap();
        assert_eq!(DotBracketVec::from(&pt).to_string(), "(.[.{.).].}");

        // Nested pairs always end up as round brackets.
        let pt = PairTable::try_from("[[..{..}..]]").unwrap();
        assert_eq!(DotBracketVec::from(&pt).to_string(), "((..(..)..))");
    }

    #[test]
    fn test_with_breaks() {
        let dbv = DotBracketVec::try_from("((..&..))").unwrap();
        let pt = PairTable::try_from(&dbv).unwrap();
        let out = DotBracketVec::with_breaks(&pt, &dbv.breaks());
        assert_eq!(out.to_string(), "((..&..))");
    }
}
