//! From a notation string to nodes and links.

use log::debug;
use rand::Rng;
use serde::{Serialize, Deserialize};

use fo_structure::brackets;
use fo_structure::DotBracketVec;
use fo_structure::Element;
use fo_structure::ElementTree;
use fo_structure::PairTable;
use fo_structure::StructureError;
use fo_structure::split_pseudoknots;

use crate::Graph;
use crate::GraphError;
use crate::LinkKind;
use crate::Node;
use crate::NodeIdx;
use crate::NodeKind;

/// A random 128 bit identifier.
pub fn new_uid() -> String {
    format!("{:032x}", rand::rng().random::<u128>())
}

/// The result of the parsing pipeline for one notation string. Only lives
/// until the graph is built.
#[derive(Debug, Clone)]
pub struct ParsedStructure {
    /// The nested part of the structure.
    pub pairs: PairTable,
    /// Pairs removed to make `pairs` nested.
    pub pseudoknots: Vec<(usize, usize)>,
    /// Strand breaks, as the nucleotide after which they occur.
    pub breaks: Vec<usize>,
    pub elements: ElementTree,
}

impl ParsedStructure {
    pub fn parse(structure: &str) -> Result<Self, StructureError> {
        let dbv = DotBracketVec::try_from(structure)?;
        let full = PairTable::try_from(&dbv)?;
        full.check()?;
        let breaks = dbv.breaks();
        let (pairs, pseudoknots) = split_pseudoknots(&full);
        let elements = ElementTree::from_pair_table(&pairs, &breaks)?;
        Ok(ParsedStructure { pairs, pseudoknots, breaks, elements })
    }

    pub fn length(&self) -> usize {
        self.pairs.length()
    }

    /// All pairs, pseudoknots included.
    pub fn full_table(&self) -> PairTable {
        let mut pt = self.pairs.clone();
        for &(i, j) in &self.pseudoknots {
            pt[i] = j;
            pt[j] = i;
        }
        pt
    }

    /// The canonical notation, strand breaks included.
    pub fn dot_bracket(&self) -> String {
        DotBracketVec::with_breaks(&self.full_table(), &self.breaks).to_string()
    }

    /// 0-based strand index of every position (index 0 is unused).
    fn strands(&self) -> Vec<usize> {
        let mut strand = vec![0; self.length() + 1];
        let mut s = 0;
        for (k, item) in strand.iter_mut().enumerate().skip(1) {
            *item = s;
            if self.breaks.contains(&k) {
                s += 1;
            }
        }
        strand
    }
}

/// Strip strand break symbols off a sequence, and check its length.
pub fn clean_sequence(sequence: Option<&str>, length: usize) -> Result<Vec<char>, StructureError> {
    match sequence {
        None => Ok(vec!['N'; length]),
        Some(s) => {
            let seq: Vec<char> = s.chars().filter(|&c| !brackets::is_break(c)).collect();
            if seq.len() != length {
                return Err(StructureError::LengthMismatch { sequence: seq.len(), structure: length });
            }
            Ok(seq)
        }
    }
}

/// Everything needed to (re-)build the nodes of one RNA molecule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    pub uid: String,
    pub name: String,
    pub sequence: String,
    /// Canonical notation including pseudoknots and strand breaks.
    pub structure: String,
    /// One uid per nucleotide.
    pub node_uids: Vec<String>,
    pub label_interval: usize,
    pub reinforce_loops: bool,
    /// External links within this molecule (1-based positions).
    pub extra_links: Vec<(usize, usize)>,
}

/// A protein chain: one node per residue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Protein {
    pub uid: String,
    pub name: String,
    pub sequence: String,
    pub node_uids: Vec<String>,
}

pub struct GraphBuilder {
    pub nucleotide_radius: f64,
}

impl GraphBuilder {
    /// Append nodes and links of one molecule to `graph`. Returns the node
    /// index of every nucleotide (index 0 unused).
    pub fn add_molecule(&self, graph: &mut Graph, mol: &Molecule, parsed: &ParsedStructure,
    ) -> Result<Vec<NodeIdx>, GraphError> {
        let n = parsed.length();
        if mol.node_uids.len() != n {
            return Err(GraphError::UidCount { found: mol.node_uids.len(), expected: n });
        }
        let sequence = clean_sequence(Some(&mol.sequence), n)?;
        if let Some(&k) = mol.extra_links.iter()
            .flat_map(|(i, j)| [i, j])
            .find(|&&k| k == 0 || k > n)
        {
            return Err(GraphError::UnknownNucleotide(k));
        }
        let member = parsed.elements.membership();
        let strands = parsed.strands();
        let base = graph.nodes.len();
        let idx = |k: usize| base + k - 1;

        let mut index = vec![0; n + 1];
        for k in 1..=n {
            let element = member[k].unwrap_or_else(|| unreachable!("position {} has no element", k));
            let prev = (k > 1 && strands[k - 1] == strands[k]).then(|| idx(k - 1));
            let next = (k < n && strands[k + 1] == strands[k]).then(|| idx(k + 1));
            index[k] = graph.add_node(Node {
                uid: mol.node_uids[k - 1].clone(),
                molecule: mol.uid.clone(),
                num: k,
                radius: self.nucleotide_radius,
                x: None,
                y: None,
                kind: NodeKind::Nucleotide {
                    name: sequence[k - 1],
                    elem_type: parsed.elements.elements()[element].kind(),
                    element,
                    prev,
                    next,
                },
            });
        }

        for k in 1..n {
            let kind = if strands[k] == strands[k + 1] {
                LinkKind::Backbone
            } else {
                LinkKind::ChainChain
            };
            graph.add_link(index[k], index[k + 1], kind);
        }

        for (i, j) in parsed.pairs.pairs() {
            let kind = if strands[i] == strands[j] {
                LinkKind::Basepair
            } else {
                LinkKind::Intermolecule
            };
            graph.add_link(index[i], index[j], kind);
        }
        for &(i, j) in &parsed.pseudoknots {
            graph.add_link(index[i], index[j], LinkKind::Pseudoknot);
        }

        let mut extra: Vec<(usize, usize)> = mol.extra_links.iter()
            .map(|&(i, j)| (i.min(j), i.max(j)))
            .collect();
        extra.sort_unstable();
        extra.dedup();
        for (i, j) in extra {
            graph.add_link(index[i], index[j], LinkKind::External);
        }

        if mol.label_interval > 0 {
            for k in (mol.label_interval..=n).step_by(mol.label_interval) {
                let label = graph.add_node(Node {
                    uid: format!("{}-label", mol.node_uids[k - 1]),
                    molecule: mol.uid.clone(),
                    num: k,
                    radius: self.nucleotide_radius,
                    x: None,
                    y: None,
                    kind: NodeKind::Label { label: k.to_string(), target: index[k] },
                });
                graph.add_link(index[k], label, LinkKind::LabelLink);
            }
        }

        if mol.reinforce_loops {
            self.reinforce_loops(graph, mol, parsed, &index);
        }

        debug!("Molecule {} ({}): {} nucleotides, {} pairs, {} pseudoknotted.",
            mol.name, mol.uid, n, parsed.pairs.num_pairs(), parsed.pseudoknots.len());
        Ok(index)
    }

    /// One middle node per loop, tied to every nucleotide of the loop
    /// (closing and branch pairs included).
    fn reinforce_loops(&self, graph: &mut Graph, mol: &Molecule, parsed: &ParsedStructure, index: &[NodeIdx]) {
        for (e, element) in parsed.elements.iter().enumerate() {
            let Some((a, b)) = element.closing() else {
                continue;
            };
            if matches!(element, Element::Junction { .. }) {
                continue;
            }
            let mut members: Vec<usize> = element.positions();
            members.extend([a, b]);
            members.extend(element.branches().iter().flat_map(|&(p, q)| [p, q]));
            members.sort_unstable();

            let middle = graph.add_node(Node {
                uid: format!("{}-middle-{}-{}", mol.uid, a, b),
                molecule: mol.uid.clone(),
                num: 0,
                radius: 0.0,
                x: None,
                y: None,
                kind: NodeKind::Middle { elem_type: element.kind(), element: e },
            });
            for k in members {
                graph.add_link(middle, index[k], LinkKind::Fake);
            }
        }
    }

    /// Append a protein chain to `graph`.
    pub fn add_protein(&self, graph: &mut Graph, protein: &Protein) {
        let mut last: Option<NodeIdx> = None;
        for (k, (name, uid)) in protein.sequence.chars().zip(&protein.node_uids).enumerate() {
            let node = graph.add_node(Node {
                uid: uid.clone(),
                molecule: protein.uid.clone(),
                num: k + 1,
                radius: self.nucleotide_radius,
                x: None,
                y: None,
                kind: NodeKind::Protein { name },
            });
            if let Some(prev) = last {
                graph.add_link(prev, node, LinkKind::ProteinChain);
            }
            last = Some(node);
        }
    }
}
