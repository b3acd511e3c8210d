//! Decomposition of a nested pair table into structural elements.
//!
//! Every position of the structure ends up in exactly one element: paired
//! positions in stems, unpaired positions in the loop (or dangling end)
//! that contains them. Loops refer to their child stems by the outer pair
//! of the stem, stems to their child loop by the innermost pair.

use std::fmt;
use colored::*;
use serde::{Serialize, Deserialize};

use crate::PairTable;
use crate::StructureError;
use crate::find_unmatched;
use crate::split_at_breaks;

type Range = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Stem,
    Hairpin,
    Interior,
    Multiloop,
    /// A loop that contains a strand break.
    Junction,
    FivePrime,
    ThreePrime,
    Exterior,
}

impl ElementKind {
    /// One letter code, as used in element annotations.
    pub fn code(&self) -> char {
        match self {
            ElementKind::Stem => 's',
            ElementKind::Hairpin => 'h',
            ElementKind::Interior => 'i',
            ElementKind::Multiloop => 'm',
            ElementKind::Junction => 'x',
            ElementKind::FivePrime => 'f',
            ElementKind::ThreePrime => 't',
            ElementKind::Exterior => 'e',
        }
    }
}

/// A structural element. `level` is the number of base pairs enclosing
/// the element (for a stem: enclosing its outermost pair).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    Stem {
        level: usize,
        five: Range,
        three: Range,
    },
    Hairpin {
        level: usize,
        closing: Range,
        unpaired: Vec<Range>,
    },
    Interior {
        level: usize,
        closing: Range,
        inner: Range,
        unpaired: Vec<Range>,
    },
    Multiloop {
        level: usize,
        closing: Range,
        //NOTE: branches are always in 5'->3' order.
        branches: Vec<Range>,
        unpaired: Vec<Range>,
    },
    Junction {
        level: usize,
        closing: Range,
        branches: Vec<Range>,
        unpaired: Vec<Range>,
    },
    FivePrime {
        range: Range,
    },
    ThreePrime {
        range: Range,
    },
    Exterior {
        branches: Vec<Range>,
        unpaired: Vec<Range>,
    },
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Stem { .. } => ElementKind::Stem,
            Element::Hairpin { .. } => ElementKind::Hairpin,
            Element::Interior { .. } => ElementKind::Interior,
            Element::Multiloop { .. } => ElementKind::Multiloop,
            Element::Junction { .. } => ElementKind::Junction,
            Element::FivePrime { .. } => ElementKind::FivePrime,
            Element::ThreePrime { .. } => ElementKind::ThreePrime,
            Element::Exterior { .. } => ElementKind::Exterior,
        }
    }

    pub fn level(&self) -> usize {
        match self {
            Element::Stem { level, .. }
            | Element::Hairpin { level, .. }
            | Element::Interior { level, .. }
            | Element::Multiloop { level, .. }
            | Element::Junction { level, .. } => *level,
            Element::FivePrime { .. }
            | Element::ThreePrime { .. }
            | Element::Exterior { .. } => 0,
        }
    }

    /// The nucleotide ranges owned by this element. A stem has two
    /// parallel ranges, loops their unpaired stretches.
    pub fn ranges(&self) -> Vec<Range> {
        match self {
            Element::Stem { five, three, .. } => vec![*five, *three],
            Element::Hairpin { unpaired, .. }
            | Element::Interior { unpaired, .. }
            | Element::Multiloop { unpaired, .. }
            | Element::Junction { unpaired, .. }
            | Element::Exterior { unpaired, .. } => unpaired.clone(),
            Element::FivePrime { range } | Element::ThreePrime { range } => vec![*range],
        }
    }

    /// All positions owned by this element, in 5'->3' order.
    pub fn positions(&self) -> Vec<usize> {
        self.ranges().into_iter().flat_map(|(s, e)| s..=e).collect()
    }

    /// The pair closing a loop.
    pub fn closing(&self) -> Option<Range> {
        match self {
            Element::Hairpin { closing, .. }
            | Element::Interior { closing, .. }
            | Element::Multiloop { closing, .. }
            | Element::Junction { closing, .. } => Some(*closing),
            _ => None,
        }
    }

    /// Outer pairs of the stems that branch off this loop.
    pub fn branches(&self) -> &[Range] {
        match self {
            Element::Interior { inner, .. } => std::slice::from_ref(inner),
            Element::Multiloop { branches, .. }
            | Element::Junction { branches, .. }
            | Element::Exterior { branches, .. } => branches,
            _ => &[],
        }
    }

    /// For stems: the outermost and innermost pair.
    pub fn stem_pairs(&self) -> Option<(Range, Range)> {
        match self {
            Element::Stem { five, three, .. } => Some(((five.0, three.1), (five.1, three.0))),
            _ => None,
        }
    }
}

fn fmt_ranges(ranges: &[Range]) -> String {
    ranges.iter()
        .map(|(i, j)| format!("[{:>3}, {:>3}]", i, j))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Stem { level, five, three } => {
                write!(f, "{:<10} {:>3} {}", "Stem".green(), level, fmt_ranges(&[*five, *three]))
            }
            Element::Exterior { unpaired, .. } => {
                write!(f, "{:<10} {:>3} {}", "Exterior".cyan().bold(), 0, fmt_ranges(unpaired))
            }
            Element::FivePrime { range } => {
                write!(f, "{:<10} {:>3} {}", "5'-end".yellow(), 0, fmt_ranges(&[*range]))
            }
            Element::ThreePrime { range } => {
                write!(f, "{:<10} {:>3} {}", "3'-end".yellow(), 0, fmt_ranges(&[*range]))
            }
            _ => {
                let name = match self.kind() {
                    ElementKind::Hairpin => "Hairpin",
                    ElementKind::Interior => "Interior",
                    ElementKind::Multiloop => "Multibr.",
                    _ => "Junction",
                };
                let (i, j) = self.closing().unwrap_or_default();
                write!(f, "{:<10} {:>3} ({:>3}, {:>3}) {}",
                    name.cyan(), self.level(), i, j, fmt_ranges(&self.ranges()))
            }
        }
    }
}

/// Returns the first pair that closes out of order, if any.
fn first_crossing(pt: &PairTable) -> Option<Range> {
    let mut stack = Vec::new();
    for k in 1..=pt.length() {
        let l = pt[k];
        if l > k {
            stack.push(k);
        } else if l != 0 && stack.pop() != Some(l) {
            return Some((l, k));
        }
    }
    None
}

struct Classifier<'a> {
    pt: &'a PairTable,
    breaks: &'a [usize],
}

impl Classifier<'_> {
    fn has_break(&self, after: usize) -> bool {
        self.breaks.contains(&after)
    }

    /// Outer pairs of the helices that start in `[i, j]`, 5'->3'.
    fn branches(&self, i: usize, j: usize) -> Vec<Range> {
        let pt = self.pt;
        let mut branches = Vec::new();
        let mut p = i;
        while p <= j {
            let q = pt[p];
            if q == 0 {
                p += 1;
            } else {
                debug_assert!(q > p && q <= j, "branch ({}, {}) leaves [{}, {}]", p, q, i, j);
                branches.push((p, q));
                p = q + 1;
            }
        }
        branches
    }

    /// The innermost pair around a well-formed range that starts at `i`.
    fn enclosing(&self, i: usize) -> Option<Range> {
        let pt = self.pt;
        let mut a = i - 1;
        while a > 0 {
            let b = pt[a];
            if b > a {
                return Some((a, b));
            }
            a = if b == 0 { a - 1 } else { b - 1 };
        }
        None
    }

    /// The loop (or exterior) element for the stretch `[i, j]` of the loop
    /// closed by `closing`, and the branches inside that stretch.
    fn loop_elements(&self, level: usize, closing: Option<Range>, i: usize, j: usize,
    ) -> Result<(Vec<Element>, Vec<Range>), StructureError> {
        let pt = self.pt;
        let branches = self.branches(i, j);

        let mut gaps = Vec::new();
        let mut s = i;
        for &(p, q) in &branches {
            gaps.extend(find_unmatched(pt, s, p - 1)?);
            s = q + 1;
        }
        gaps.extend(find_unmatched(pt, s, j)?);
        let mut unpaired = split_at_breaks(&gaps, self.breaks);

        let mut elements = Vec::new();
        match closing {
            None => {
                let mut ends = Vec::new();
                if let (Some(&first), Some(&(p, _))) = (unpaired.first(), branches.first()) {
                    if first.0 == 1 && first.1 + 1 == p && !self.has_break(first.1) {
                        ends.push(Element::FivePrime { range: first });
                        unpaired.remove(0);
                    }
                }
                if let (Some(&last), Some(&(_, q))) = (unpaired.last(), branches.last()) {
                    if last.1 == pt.length() && last.0 == q + 1 && !self.has_break(q) {
                        ends.push(Element::ThreePrime { range: last });
                        unpaired.pop();
                    }
                }
                elements.push(Element::Exterior { branches: branches.clone(), unpaired });
                elements.extend(ends);
            }
            Some((a, b)) => {
                // The loop type is a property of the whole loop.
                let all = if (a + 1, b - 1) == (i, j) {
                    branches.clone()
                } else {
                    self.branches(a + 1, b - 1)
                };
                let nicked = self.breaks.iter().any(|&k| {
                    a <= k && k < b && !all.iter().any(|&(p, q)| p <= k && k < q)
                });
                elements.push(if nicked {
                    Element::Junction { level, closing: (a, b), branches: branches.clone(), unpaired }
                } else {
                    match all.len() {
                        0 => Element::Hairpin { level, closing: (a, b), unpaired },
                        1 => Element::Interior { level, closing: (a, b), inner: all[0], unpaired },
                        _ => Element::Multiloop { level, closing: (a, b), branches: branches.clone(), unpaired },
                    }
                });
            }
        }
        Ok((elements, branches))
    }

    /// The helix starting with pair `(p, q)`, and its innermost pair. The
    /// ladder ends at the first missing stacked pair or strand break.
    fn stem(&self, level: usize, (p, q): Range) -> (Element, Range) {
        let pt = self.pt;
        let mut len = 1;
        while p + len < q - len
            && pt[p + len] == q - len
            && !self.has_break(p + len - 1)
            && !self.has_break(q - len)
        {
            len += 1;
        }
        let stem = Element::Stem {
            level,
            five: (p, p + len - 1),
            three: (q + 1 - len, q),
        };
        (stem, (p + len - 1, q + 1 - len))
    }

    /// Append the elements below `branches` in depth first order: each stem
    /// is followed by its loop and everything inside that loop.
    fn descend(&self, mut elements: Vec<Element>, level: usize, branches: Vec<Range>,
    ) -> Result<Vec<Element>, StructureError> {
        let mut stack: Vec<(usize, Range)> = branches.into_iter().rev().map(|b| (level, b)).collect();
        while let Some((level, (p, q))) = stack.pop() {
            let (stem, (a, b)) = self.stem(level, (p, q));
            let inner = level + a + 1 - p;
            elements.push(stem);
            let (loop_elements, sub) = self.loop_elements(inner, Some((a, b)), a + 1, b - 1)?;
            elements.extend(loop_elements);
            stack.extend(sub.into_iter().rev().map(|s| (inner, s)));
        }
        Ok(elements)
    }
}

/// Decompose the closed range `[i, j]` of a nested pair table into
/// structural elements, starting at nesting `level`.
///
/// If `(i, j)` is itself a pair, the result starts with the stem it opens.
/// Otherwise `[i, j]` is treated as (part of) the loop closed by the
/// innermost pair around it, or of the exterior loop if there is none.
/// Strand `breaks` are given as the nucleotides after which a break occurs.
pub fn pt_to_elements(pt: &PairTable, level: usize, i: usize, j: usize, breaks: &[usize],
) -> Result<Vec<Element>, StructureError> {
    if i > j {
        return Ok(Vec::new());
    }
    let n = pt.length();
    if i == 0 || j > n || !pt.is_well_formed(i, j) {
        return Err(StructureError::InvalidRange { from: i, to: j, len: n });
    }
    if let Some((k, l)) = first_crossing(pt) {
        return Err(StructureError::InvalidRange { from: k, to: l, len: n });
    }

    let classifier = Classifier { pt, breaks };
    if pt[i] == j {
        classifier.descend(Vec::new(), level, vec![(i, j)])
    } else {
        let closing = classifier.enclosing(i);
        let (elements, branches) = classifier.loop_elements(level, closing, i, j)?;
        classifier.descend(elements, level, branches)
    }
}

/// All elements of a structure, rooted at the exterior loop (index 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTree {
    length: usize,
    elements: Vec<Element>,
}

impl ElementTree {
    pub fn from_pair_table(pt: &PairTable, breaks: &[usize]) -> Result<Self, StructureError> {
        pt.check()?;
        let n = pt.length();
        let elements = if n == 0 {
            vec![Element::Exterior { branches: vec![], unpaired: vec![] }]
        } else {
            pt_to_elements(pt, 0, 1, n, breaks)?
        };
        // A structure that is one big helix still gets its exterior loop.
        let elements = if matches!(elements.first(), Some(Element::Exterior { .. })) {
            elements
        } else {
            let mut all = vec![Element::Exterior { branches: vec![(1, n)], unpaired: vec![] }];
            all.extend(elements);
            all
        };
        Ok(ElementTree { length: n, elements })
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Element index for every position (index 0 is unused).
    pub fn membership(&self) -> Vec<Option<usize>> {
        let mut member = vec![None; self.length + 1];
        for (e, element) in self.elements.iter().enumerate() {
            for k in element.positions() {
                debug_assert!(member[k].is_none(), "position {} is in two elements", k);
                member[k] = Some(e);
            }
        }
        member
    }

    /// The stem whose outermost pair is `pair`.
    pub fn stem_at(&self, pair: Range) -> Option<usize> {
        self.elements.iter().position(|e| matches!(e.stem_pairs(), Some((outer, _)) if outer == pair))
    }

    /// The loop closed by `pair`.
    pub fn loop_closed_by(&self, pair: Range) -> Option<usize> {
        self.elements.iter().position(|e| e.closing() == Some(pair))
    }

    pub fn children(&self, idx: usize) -> Vec<usize> {
        match &self.elements[idx] {
            Element::Stem { .. } => {
                let (_, inner) = self.elements[idx].stem_pairs().unwrap_or_default();
                self.loop_closed_by(inner).into_iter().collect()
            }
            Element::Exterior { branches, .. } => {
                let ends = self.elements.iter().enumerate()
                    .filter(|(_, e)| matches!(e, Element::FivePrime { .. } | Element::ThreePrime { .. }))
                    .map(|(k, _)| k);
                ends.chain(branches.iter().filter_map(|&b| self.stem_at(b))).collect()
            }
            e => e.branches().iter().filter_map(|&b| self.stem_at(b)).collect(),
        }
    }

    pub fn parent(&self, idx: usize) -> Option<usize> {
        match &self.elements[idx] {
            Element::Exterior { .. } => None,
            Element::FivePrime { .. } | Element::ThreePrime { .. } => Some(0),
            Element::Stem { .. } => {
                let (outer, _) = self.elements[idx].stem_pairs()?;
                self.elements.iter().position(|e| e.branches().contains(&outer))
            }
            e => {
                let closing = e.closing()?;
                self.elements.iter()
                    .position(|s| matches!(s.stem_pairs(), Some((_, inner)) if inner == closing))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remove_pseudoknots;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    fn kinds(tree: &ElementTree) -> Vec<ElementKind> {
        tree.iter().map(|e| e.kind()).collect()
    }

    fn assert_partition(tree: &ElementTree, n: usize) {
        let mut count = vec![0; n + 1];
        for e in tree.iter() {
            for k in e.positions() {
                count[k] += 1;
            }
        }
        assert!(count[1..].iter().all(|&c| c == 1), "{:?}", tree);
    }

    #[test]
    fn test_hairpin() {
        let pt = PairTable::try_from("(((...)))").unwrap();
        let tree = ElementTree::from_pair_table(&pt, &[]).unwrap();
        assert_eq!(tree.elements(), &[
            Element::Exterior { branches: vec![(1, 9)], unpaired: vec![] },
            Element::Stem { level: 0, five: (1, 3), three: (7, 9) },
            Element::Hairpin { level: 3, closing: (3, 7), unpaired: vec![(4, 6)] },
        ]);
        assert_partition(&tree, 9);
        assert_eq!(tree.children(0), vec![1]);
        assert_eq!(tree.children(1), vec![2]);
        assert_eq!(tree.parent(2), Some(1));
        assert_eq!(tree.parent(1), Some(0));
        assert_eq!(tree.parent(0), None);
    }

    #[test]
    fn test_open_chain() {
        let pt = PairTable::try_from("....").unwrap();
        let tree = ElementTree::from_pair_table(&pt, &[]).unwrap();
        assert_eq!(tree.elements(), &[
            Element::Exterior { branches: vec![], unpaired: vec![(1, 4)] },
        ]);
        assert_eq!(tree.membership(), vec![None, Some(0), Some(0), Some(0), Some(0)]);
    }

    #[test]
    fn test_empty_structure() {
        let pt = PairTable::try_from("").unwrap();
        let tree = ElementTree::from_pair_table(&pt, &[]).unwrap();
        assert_eq!(kinds(&tree), vec![ElementKind::Exterior]);
    }

    #[test]
    fn test_interior_loop() {
        let pt = PairTable::try_from("((..((...))..))").unwrap();
        let tree = ElementTree::from_pair_table(&pt, &[]).unwrap();
        assert_eq!(tree.elements()[2], Element::Interior {
            level: 2,
            closing: (2, 14),
            inner: (5, 11),
            unpaired: vec![(3, 4), (12, 13)],
        });
        assert_eq!(kinds(&tree), vec![
            ElementKind::Exterior, ElementKind::Stem, ElementKind::Interior,
            ElementKind::Stem, ElementKind::Hairpin,
        ]);
        assert_eq!(tree.children(2), vec![3]);
        assert_partition(&tree, 15);
    }

    #[test]
    fn test_bulge_is_interior() {
        let pt = PairTable::try_from("((.((...))))").unwrap();
        let tree = ElementTree::from_pair_table(&pt, &[]).unwrap();
        assert_eq!(tree.elements()[2], Element::Interior {
            level: 2,
            closing: (2, 11),
            inner: (4, 10),
            unpaired: vec![(3, 3)],
        });
    }

    #[test]
    fn test_multiloop_with_dangles() {
        let pt = PairTable::try_from("..((.((...)).((...)).))..").unwrap();
        let tree = ElementTree::from_pair_table(&pt, &[]).unwrap();
        assert_eq!(tree.elements(), &[
            Element::Exterior { branches: vec![(3, 23)], unpaired: vec![] },
            Element::FivePrime { range: (1, 2) },
            Element::ThreePrime { range: (24, 25) },
            Element::Stem { level: 0, five: (3, 4), three: (22, 23) },
            Element::Multiloop {
                level: 2,
                closing: (4, 22),
                branches: vec![(6, 12), (14, 20)],
                unpaired: vec![(5, 5), (13, 13), (21, 21)],
            },
            Element::Stem { level: 2, five: (6, 7), three: (11, 12) },
            Element::Hairpin { level: 4, closing: (7, 11), unpaired: vec![(8, 10)] },
            Element::Stem { level: 2, five: (14, 15), three: (19, 20) },
            Element::Hairpin { level: 4, closing: (15, 19), unpaired: vec![(16, 18)] },
        ]);
        assert_eq!(tree.children(0), vec![1, 2, 3]);
        assert_eq!(tree.children(4), vec![5, 7]);
        assert_eq!(tree.parent(7), Some(4));
        assert_eq!(tree.parent(1), Some(0));
        assert_partition(&tree, 25);
    }

    #[test]
    fn test_exterior_between_branches() {
        let pt = PairTable::try_from("(..)..(..)").unwrap();
        let tree = ElementTree::from_pair_table(&pt, &[]).unwrap();
        assert_eq!(tree.elements()[0], Element::Exterior {
            branches: vec![(1, 4), (7, 10)],
            unpaired: vec![(5, 6)],
        });
        assert_eq!(tree.stem_at((7, 10)), Some(3));
    }

    #[test]
    fn test_zero_length_hairpin() {
        let pt = PairTable::try_from("(())").unwrap();
        let tree = ElementTree::from_pair_table(&pt, &[]).unwrap();
        assert_eq!(tree.elements()[2], Element::Hairpin { level: 2, closing: (2, 3), unpaired: vec![] });
    }

    #[test]
    fn test_nicked_hairpin_is_junction() {
        let pt = PairTable::try_from("((..&..))").unwrap();
        let tree = ElementTree::from_pair_table(&pt, &[4]).unwrap();
        assert_eq!(tree.elements()[2], Element::Junction {
            level: 2,
            closing: (2, 7),
            branches: vec![],
            unpaired: vec![(3, 4), (5, 6)],
        });
        assert_partition(&tree, 8);
    }

    #[test]
    fn test_stem_stops_at_break() {
        let pt = PairTable::try_from("(&(..))").unwrap();
        let tree = ElementTree::from_pair_table(&pt, &[1]).unwrap();
        assert_eq!(tree.elements(), &[
            Element::Exterior { branches: vec![(1, 6)], unpaired: vec![] },
            Element::Stem { level: 0, five: (1, 1), three: (6, 6) },
            Element::Junction { level: 1, closing: (1, 6), branches: vec![(2, 5)], unpaired: vec![] },
            Element::Stem { level: 1, five: (2, 2), three: (5, 5) },
            Element::Hairpin { level: 2, closing: (2, 5), unpaired: vec![(3, 4)] },
        ]);
    }

    #[test]
    fn test_no_dangle_across_break() {
        let pt = PairTable::try_from("((..))&..").unwrap();
        let tree = ElementTree::from_pair_table(&pt, &[6]).unwrap();
        assert_eq!(tree.elements()[0], Element::Exterior {
            branches: vec![(1, 6)],
            unpaired: vec![(7, 8)],
        });
        assert!(!kinds(&tree).contains(&ElementKind::ThreePrime));
    }

    #[test]
    fn test_exterior_split_at_break() {
        let pt = PairTable::try_from("..&..").unwrap();
        let tree = ElementTree::from_pair_table(&pt, &[2]).unwrap();
        assert_eq!(tree.elements(), &[
            Element::Exterior { branches: vec![], unpaired: vec![(1, 2), (3, 4)] },
        ]);
    }

    #[test]
    fn test_sub_ranges() {
        let pt = PairTable::try_from("..((.((...)).((...)).))..").unwrap();
        // A helix.
        let els = pt_to_elements(&pt, 2, 6, 12, &[]).unwrap();
        assert_eq!(els.len(), 2);
        assert_eq!(els[0], Element::Stem { level: 2, five: (6, 7), three: (11, 12) });
        // The inside of the multiloop.
        let els = pt_to_elements(&pt, 2, 5, 21, &[]).unwrap();
        assert_eq!(els[0].kind(), ElementKind::Multiloop);
        assert_eq!(els.len(), 5);
        // Empty.
        assert!(pt_to_elements(&pt, 0, 9, 8, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_sub_range_keeps_enclosing_loop() {
        let pt = PairTable::try_from("..((.((...)).((...)).))..").unwrap();
        let els = pt_to_elements(&pt, 2, 6, 20, &[]).unwrap();
        assert_eq!(els.iter().map(|e| e.kind()).collect::<Vec<_>>(), vec![
            ElementKind::Multiloop, ElementKind::Stem, ElementKind::Hairpin,
            ElementKind::Stem, ElementKind::Hairpin,
        ]);
        assert_eq!(els[0], Element::Multiloop {
            level: 2,
            closing: (4, 22),
            branches: vec![(6, 12), (14, 20)],
            unpaired: vec![(13, 13)],
        });

        // Part of a hairpin is still the hairpin.
        let pt = PairTable::try_from("((.....))").unwrap();
        assert_eq!(pt_to_elements(&pt, 2, 4, 6, &[]).unwrap(), vec![
            Element::Hairpin { level: 2, closing: (2, 8), unpaired: vec![(4, 6)] },
        ]);

        // Outside of all pairs it is the exterior loop, whatever the level.
        let pt = PairTable::try_from("(..)...(..)").unwrap();
        let els = pt_to_elements(&pt, 3, 5, 6, &[]).unwrap();
        assert_eq!(els, vec![Element::Exterior { branches: vec![], unpaired: vec![(5, 6)] }]);
    }

    #[test]
    fn test_deep_bulge_ladder() {
        let d = 10_000;
        let s = format!("{}...{}", "(.".repeat(d), ")".repeat(d));
        let pt = PairTable::try_from(s.as_str()).unwrap();
        let n = pt.length();
        assert_eq!(n, 3 * d + 3);

        let tree = ElementTree::from_pair_table(&pt, &[]).unwrap();
        // Exterior, then a stem and a loop per pair.
        assert_eq!(tree.len(), 2 * d + 1);
        assert_eq!(tree.elements()[2], Element::Interior {
            level: 1,
            closing: (1, n),
            inner: (3, n - 1),
            unpaired: vec![(2, 2)],
        });
        assert_eq!(tree.elements()[2 * d], Element::Hairpin {
            level: d,
            closing: (2 * d - 1, 2 * d + 4),
            unpaired: vec![(2 * d, 2 * d + 3)],
        });
        assert!(tree.membership()[1..].iter().all(|m| m.is_some()));
    }

    #[test]
    fn test_invalid_ranges() {
        let pt = PairTable::try_from("(())").unwrap();
        assert_eq!(pt_to_elements(&pt, 0, 0, 3, &[]),
            Err(StructureError::InvalidRange { from: 0, to: 3, len: 4 }));
        assert!(pt_to_elements(&pt, 0, 2, 5, &[]).is_err());
        assert!(pt_to_elements(&pt, 0, 2, 4, &[]).is_err());
    }

    #[test]
    fn test_crossing_table_is_rejected() {
        let pt = PairTable::try_from("((..[[..))..]]").unwrap();
        let err = ElementTree::from_pair_table(&pt, &[]).unwrap_err();
        assert_eq!(err, StructureError::InvalidRange { from: 2, to: 9, len: 14 });
    }

    #[test]
    fn test_partition_law() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..300 {
            let n = rng.random_range(1..=40);
            let mut positions: Vec<usize> = (1..=n).collect();
            positions.shuffle(&mut rng);
            let pairs: Vec<(usize, usize)> = positions.chunks_exact(2)
                .take(rng.random_range(0..=n / 2))
                .map(|c| (c[0].min(c[1]), c[0].max(c[1])))
                .collect();
            let mut pt = PairTable::from_pairs(n, &pairs).unwrap();
            remove_pseudoknots(&mut pt);

            let breaks: Vec<usize> = (1..n).filter(|_| rng.random_bool(0.1)).collect();
            let tree = ElementTree::from_pair_table(&pt, &breaks).unwrap();
            assert_partition(&tree, n);
            assert_eq!(tree.elements()[0].kind(), ElementKind::Exterior);

            // No range crosses a break.
            for e in tree.iter() {
                for (s, t) in e.ranges() {
                    assert!(breaks.iter().all(|&b| b < s || b >= t));
                }
            }
            // Every element but the root has a parent.
            for k in 1..tree.len() {
                assert!(tree.parent(k).is_some(), "{} {:?}", pt.to_dot_bracket(), tree.elements()[k]);
            }
        }
    }
}
