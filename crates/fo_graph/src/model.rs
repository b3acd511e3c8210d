//! The node and link model handed to the layout/render collaborator.
//!
//! Nodes are owned by `Graph::nodes`. Everything else (links, backbone
//! neighbors, label targets) refers to nodes by their index in that table.

use ahash::AHashSet;
use serde::{Serialize, Deserialize};
use fo_structure::ElementKind;

use crate::GraphError;

/// Index into `Graph::nodes`.
pub type NodeIdx = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_type", rename_all = "snake_case")]
pub enum NodeKind {
    Nucleotide {
        /// The sequence letter.
        name: char,
        elem_type: ElementKind,
        /// Index of the element in the molecule's element tree.
        element: usize,
        prev: Option<NodeIdx>,
        next: Option<NodeIdx>,
    },
    Label {
        label: String,
        target: NodeIdx,
    },
    /// The center of a loop.
    Middle {
        elem_type: ElementKind,
        element: usize,
    },
    Protein {
        name: char,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub uid: String,
    /// Uid of the molecule this node belongs to.
    pub molecule: String,
    /// 1-based position within the molecule.
    pub num: usize,
    /// Rendering hint.
    pub radius: f64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub kind: NodeKind,
}

impl Node {
    pub fn is_nucleotide(&self) -> bool {
        matches!(self.kind, NodeKind::Nucleotide { .. })
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        self.x.zip(self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Backbone,
    Basepair,
    Pseudoknot,
    LabelLink,
    Intermolecule,
    External,
    ProteinChain,
    ChainChain,
    /// Reinforces a loop by tying its nucleotides to a middle node.
    Fake,
}

impl LinkKind {
    /// The serialized name, also used in link uids.
    pub fn name(&self) -> &'static str {
        match self {
            LinkKind::Backbone => "backbone",
            LinkKind::Basepair => "basepair",
            LinkKind::Pseudoknot => "pseudoknot",
            LinkKind::LabelLink => "label_link",
            LinkKind::Intermolecule => "intermolecule",
            LinkKind::External => "external",
            LinkKind::ProteinChain => "protein_chain",
            LinkKind::ChainChain => "chain_chain",
            LinkKind::Fake => "fake",
        }
    }

    /// The default weight for the layout engine.
    pub fn default_value(&self) -> f64 {
        match self {
            LinkKind::Backbone
            | LinkKind::Basepair
            | LinkKind::Intermolecule
            | LinkKind::LabelLink
            | LinkKind::ProteinChain => 1.0,
            LinkKind::Pseudoknot
            | LinkKind::External => 0.5,
            LinkKind::ChainChain
            | LinkKind::Fake => 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub uid: String,
    pub source: NodeIdx,
    pub target: NodeIdx,
    pub value: f64,
    pub kind: LinkKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, node: Node) -> NodeIdx {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Link two nodes, the link uid is derived from the node uids and the
    /// link kind. Callers must not add the same link twice.
    pub fn add_link(&mut self, source: NodeIdx, target: NodeIdx, kind: LinkKind) {
        let uid = format!("{}-{}-{}", self.nodes[source].uid, self.nodes[target].uid, kind.name());
        self.links.push(Link { uid, source, target, value: kind.default_value(), kind });
    }

    pub fn nucleotides(&self) -> impl Iterator<Item = (NodeIdx, &Node)> {
        self.nodes.iter().enumerate().filter(|(_, n)| n.is_nucleotide())
    }

    pub fn links_of(&self, kind: LinkKind) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.kind == kind)
    }

    pub fn count_links(&self, kind: LinkKind) -> usize {
        self.links_of(kind).count()
    }

    pub fn find(&self, uid: &str) -> Option<NodeIdx> {
        self.nodes.iter().position(|n| n.uid == uid)
    }

    /// Check the contract with the layout engine: uids are unique, all link
    /// endpoints exist and the prev/next references of nucleotides match
    /// the backbone.
    pub fn validate(&self) -> Result<(), GraphError> {
        let n = self.nodes.len();
        let mut seen = AHashSet::with_capacity(n + self.links.len());
        if let Some(node) = self.nodes.iter().find(|node| !seen.insert(node.uid.as_str())) {
            return Err(GraphError::DuplicateUid(node.uid.clone()));
        }
        seen.clear();
        if let Some(link) = self.links.iter().find(|link| !seen.insert(link.uid.as_str())) {
            return Err(GraphError::InvalidDocument(format!("duplicate link {}", link.uid)));
        }
        for link in &self.links {
            if link.source >= n || link.target >= n {
                return Err(GraphError::InvalidDocument(
                    format!("link {} points outside the node table", link.uid)));
            }
        }

        let mut expected: Vec<(NodeIdx, NodeIdx)> = self.links_of(LinkKind::Backbone)
            .map(|l| (l.source, l.target))
            .collect();
        let mut found = Vec::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            match &node.kind {
                NodeKind::Nucleotide { prev, next, .. } => {
                    if let Some(p) = *prev {
                        match self.nodes.get(p).map(|m| &m.kind) {
                            Some(NodeKind::Nucleotide { next: Some(q), .. }) if *q == idx => (),
                            _ => return Err(GraphError::InvalidDocument(
                                format!("node {} has an inconsistent backbone", node.uid))),
                        }
                    }
                    if let Some(q) = *next {
                        found.push((idx, q));
                    }
                }
                NodeKind::Label { target, .. } if *target >= n => {
                    return Err(GraphError::InvalidDocument(
                        format!("label {} points outside the node table", node.uid)));
                }
                _ => (),
            }
        }
        expected.sort_unstable();
        found.sort_unstable();
        if expected != found {
            return Err(GraphError::InvalidDocument(
                "backbone links and prev/next references differ".to_string()));
        }
        Ok(())
    }
}
