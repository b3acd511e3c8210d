use std::ops::{Deref, DerefMut};
use std::convert::TryFrom;

use crate::brackets::NUM_LEVELS;
use crate::StructureError;
use crate::{DotBracket, DotBracketVec};

/// The canonical pair table: `pt[0]` holds the sequence length n,
/// `pt[i]` (1-based) the partner of nucleotide i or 0 if i is unpaired.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairTable(pub Vec<usize>);

impl PairTable {
    /// An open chain of length `n`.
    pub fn unpaired(n: usize) -> Self {
        let mut table = vec![0; n + 1];
        table[0] = n;
        PairTable(table)
    }

    /// Build a table from a list of pairs. Every position may be used once.
    pub fn from_pairs(n: usize, pairs: &[(usize, usize)]) -> Result<Self, StructureError> {
        let mut pt = PairTable::unpaired(n);
        for &(i, j) in pairs {
            if i == 0 || j == 0 || i > n || j > n || i == j {
                return Err(StructureError::InvalidRange { from: i, to: j, len: n });
            }
            if pt[i] != 0 {
                return Err(StructureError::InconsistentPair(i));
            }
            if pt[j] != 0 {
                return Err(StructureError::InconsistentPair(j));
            }
            pt[i] = j;
            pt[j] = i;
        }
        Ok(pt)
    }

    /// Sequence length.
    pub fn length(&self) -> usize {
        self.0[0]
    }

    pub fn partner(&self, i: usize) -> Option<usize> {
        match self.0[i] {
            0 => None,
            j => Some(j),
        }
    }

    /// All pairs (i, j) with i < j, ordered by i.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (1..=self.length())
            .filter(move |&i| self.0[i] > i)
            .map(move |i| (i, self.0[i]))
    }

    pub fn num_pairs(&self) -> usize {
        self.pairs().count()
    }

    /// Verify the mutual-partner invariant.
    pub fn check(&self) -> Result<(), StructureError> {
        let n = self.length();
        if self.0.len() != n + 1 {
            return Err(StructureError::InconsistentPair(0));
        }
        for i in 1..=n {
            let j = self.0[i];
            if j != 0 && (j == i || j > n || self.0[j] != i) {
                return Err(StructureError::InconsistentPair(i));
            }
        }
        Ok(())
    }

    /// True if no two pairs cross.
    pub fn is_nested(&self) -> bool {
        let mut stack = Vec::new();
        for i in 1..=self.length() {
            let j = self.0[i];
            if j > i {
                stack.push(j);
            } else if j != 0 && stack.pop() != Some(i) {
                return false;
            }
        }
        stack.is_empty()
    }

    /// Check if the substructure on the closed interval `[i, j]` is
    /// well-formed, i.e. no pair points outside.
    pub fn is_well_formed(&self, i: usize, j: usize) -> bool {
        assert!(j <= self.length(), "Invalid interval: j must be <= length");
        (i.max(1)..=j).all(|k| {
            let l = self.0[k];
            l == 0 || (i..=j).contains(&l)
        })
    }

    /// The canonical notation: round brackets for nested pairs, further
    /// bracket levels only where pairs cross.
    pub fn to_dot_bracket(&self) -> String {
        DotBracketVec::from(self).to_string()
    }
}

impl Deref for PairTable {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PairTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl TryFrom<&str> for PairTable {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let db = DotBracketVec::try_from(s)?;
        PairTable::try_from(&db)
    }
}

impl TryFrom<&DotBracketVec> for PairTable {
    type Error = StructureError;

    /// Decode with one stack per bracket level. Strand breaks take no
    /// position, error positions refer to the resulting 1-based indices.
    fn try_from(db: &DotBracketVec) -> Result<Self, Self::Error> {
        let mut stacks: Vec<Vec<usize>> = vec![Vec::new(); NUM_LEVELS];
        let mut pt = PairTable::unpaired(db.num_positions());

        let mut i = 0;
        for dot in db.iter() {
            match *dot {
                DotBracket::Break => continue,
                DotBracket::Unpaired => i += 1,
                DotBracket::Open(l) => {
                    i += 1;
                    stacks[l as usize].push(i);
                }
                DotBracket::Close(l) => {
                    i += 1;
                    let j = stacks[l as usize].pop()
                        .ok_or(StructureError::UnmatchedClose(char::from(*dot), i))?;
                    pt[i] = j;
                    pt[j] = i;
                }
            }
        }

        let leftover = stacks.iter().enumerate()
            .filter_map(|(l, stack)| stack.first().map(|&i| (i, l)))
            .min();
        if let Some((i, l)) = leftover {
            return Err(StructureError::UnmatchedOpen(char::from(DotBracket::Open(l as u8)), i));
        }
        debug_assert!(pt.check().is_ok());
        Ok(pt)
    }
}
