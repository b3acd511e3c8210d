use ahash::{AHashMap, AHashSet};
use log::{debug, info, warn};
use serde::{Serialize, Deserialize};

use fo_structure::brackets;

use crate::Graph;
use crate::GraphError;
use crate::LinkKind;
use crate::NodeIdx;
use crate::builder::*;

/// Container wide defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerOptions {
    /// Put a label on every n-th nucleotide (0 disables labels).
    pub label_interval: usize,
    pub nucleotide_radius: f64,
    /// Add middle nodes and fake links to loops.
    pub reinforce_loops: bool,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        ContainerOptions {
            label_interval: 10,
            nucleotide_radius: 5.0,
            reinforce_loops: false,
        }
    }
}

/// Per molecule options of `RnaContainer::add_rna`. Unset values fall back
/// to the container options.
#[derive(Debug, Clone, Default)]
pub struct AddRnaOptions {
    pub sequence: Option<String>,
    pub name: Option<String>,
    pub label_interval: Option<usize>,
    /// Node uids to reuse, one per nucleotide.
    pub uids: Option<Vec<String>>,
    /// Initial positions, one per nucleotide.
    pub positions: Option<Vec<(f64, f64)>>,
    /// External links between nucleotides of this molecule (1-based).
    pub extra_links: Vec<(usize, usize)>,
    pub reinforce_loops: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entity {
    Rna(Molecule),
    Protein(Protein),
}

#[derive(Serialize, Deserialize)]
struct ContainerDocument {
    options: ContainerOptions,
    entities: Vec<Entity>,
    extra_links: Vec<(String, String)>,
    graph: Graph,
}

/// Holds the molecules and the graph that is shown to the layout engine.
///
/// Every mutating call builds the new graph on the side and only installs
/// it once it is complete. If anything fails, the container is unchanged.
#[derive(Debug, Clone, Default)]
pub struct RnaContainer {
    options: ContainerOptions,
    entities: Vec<Entity>,
    /// External links between any two nodes, by uid.
    extra_links: Vec<(String, String)>,
    graph: Graph,
}

impl RnaContainer {
    pub fn new(options: ContainerOptions) -> Self {
        RnaContainer { options, ..Default::default() }
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable access for the layout engine (positions).
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn molecules(&self) -> impl Iterator<Item = &Molecule> {
        self.entities.iter().filter_map(|e| match e {
            Entity::Rna(m) => Some(m),
            Entity::Protein(_) => None,
        })
    }

    fn builder(&self) -> GraphBuilder {
        GraphBuilder { nucleotide_radius: self.options.nucleotide_radius }
    }

    /// Parse `structure` and add it as a new molecule. Returns the
    /// molecule uid.
    pub fn add_rna(&mut self, structure: &str, opts: AddRnaOptions) -> Result<String, GraphError> {
        let parsed = ParsedStructure::parse(structure)?;
        let n = parsed.length();
        let sequence: String = clean_sequence(opts.sequence.as_deref(), n)?.into_iter().collect();

        let node_uids = match opts.uids {
            Some(uids) if uids.len() != n => {
                return Err(GraphError::UidCount { found: uids.len(), expected: n });
            }
            Some(uids) => uids,
            None => (0..n).map(|_| new_uid()).collect(),
        };
        let mut seen: AHashSet<&str> = self.graph.nodes.iter().map(|n| n.uid.as_str()).collect();
        if let Some(dup) = node_uids.iter().find(|u| !seen.insert(u.as_str())) {
            return Err(GraphError::DuplicateUid(dup.clone()));
        }

        let mol = Molecule {
            uid: new_uid(),
            name: opts.name.unwrap_or_else(|| format!("rna{}", self.molecules().count() + 1)),
            sequence,
            structure: parsed.dot_bracket(),
            node_uids,
            label_interval: opts.label_interval.unwrap_or(self.options.label_interval),
            reinforce_loops: opts.reinforce_loops.unwrap_or(self.options.reinforce_loops),
            extra_links: opts.extra_links,
        };

        let mut graph = self.graph.clone();
        let index = self.builder().add_molecule(&mut graph, &mol, &parsed)?;
        match opts.positions {
            Some(pos) if pos.len() == n => {
                for (k, (x, y)) in pos.into_iter().enumerate() {
                    graph.nodes[index[k + 1]].x = Some(x);
                    graph.nodes[index[k + 1]].y = Some(y);
                }
            }
            Some(pos) => warn!("Ignoring {} positions for {} nucleotides.", pos.len(), n),
            None => (),
        }

        info!("Added molecule '{}' with {} nucleotides.", mol.name, n);
        let uid = mol.uid.clone();
        self.entities.push(Entity::Rna(mol));
        self.graph = graph;
        Ok(uid)
    }

    /// Add a protein chain with one node per residue. Returns its uid.
    pub fn add_protein(&mut self, name: &str, sequence: &str) -> String {
        let protein = Protein {
            uid: new_uid(),
            name: name.to_string(),
            sequence: sequence.to_string(),
            node_uids: sequence.chars().map(|_| new_uid()).collect(),
        };
        self.builder().add_protein(&mut self.graph, &protein);
        let uid = protein.uid.clone();
        self.entities.push(Entity::Protein(protein));
        uid
    }

    /// Add external links between nucleotides, numbered consecutively
    /// (from 1) over all molecules in the container.
    pub fn add_extra_links(&mut self, links: &[(usize, usize)]) -> Result<(), GraphError> {
        let uids: Vec<&String> = self.molecules().flat_map(|m| &m.node_uids).collect();
        let by_number = |k: usize| -> Result<String, GraphError> {
            k.checked_sub(1)
                .and_then(|k| uids.get(k))
                .map(|u| u.to_string())
                .ok_or(GraphError::UnknownNucleotide(k))
        };
        let mut new_links = Vec::with_capacity(links.len());
        for &(a, b) in links {
            new_links.push((by_number(a)?, by_number(b)?));
        }

        let mut graph = self.graph.clone();
        let added = link_by_uid(&mut graph, &new_links)?;
        self.extra_links.extend(added);
        self.graph = graph;
        Ok(())
    }

    /// Replace the structure of the most recently added molecule. Node uids
    /// and positions are kept, so the layout can animate the change.
    pub fn transition_rna(&mut self, structure: &str) -> Result<(), GraphError> {
        let pos = self.entities.iter()
            .rposition(|e| matches!(e, Entity::Rna(_)))
            .ok_or(GraphError::NoMolecule)?;
        let Entity::Rna(old) = &self.entities[pos] else {
            unreachable!("entity {} is not an RNA", pos);
        };

        let parsed = ParsedStructure::parse(structure)?;
        clean_sequence(Some(&old.sequence), parsed.length())?;
        let mol = Molecule {
            structure: parsed.dot_bracket(),
            ..old.clone()
        };
        debug!("Transition of '{}': {} -> {}", mol.name, old.structure, mol.structure);

        let mut entities = self.entities.clone();
        entities[pos] = Entity::Rna(mol);
        let graph = self.rebuild(&entities, &self.extra_links)?;

        info!("Transitioned molecule '{}'.", old.name);
        self.entities = entities;
        self.graph = graph;
        Ok(())
    }

    /// Remove everything.
    pub fn clear_nodes(&mut self) {
        self.entities.clear();
        self.extra_links.clear();
        self.graph = Graph::new();
    }

    /// Build a fresh graph, keeping the positions of nodes that survive.
    fn rebuild(&self, entities: &[Entity], extra_links: &[(String, String)]) -> Result<Graph, GraphError> {
        let builder = self.builder();
        let mut graph = Graph::new();
        for entity in entities {
            match entity {
                Entity::Rna(mol) => {
                    let parsed = ParsedStructure::parse(&mol.structure)?;
                    builder.add_molecule(&mut graph, mol, &parsed)?;
                }
                Entity::Protein(protein) => builder.add_protein(&mut graph, protein),
            }
        }
        link_by_uid(&mut graph, extra_links)?;

        let positions: AHashMap<&str, (Option<f64>, Option<f64>)> = self.graph.nodes.iter()
            .map(|n| (n.uid.as_str(), (n.x, n.y)))
            .collect();
        for node in graph.nodes.iter_mut() {
            if let Some(&(x, y)) = positions.get(node.uid.as_str()) {
                node.x = x;
                node.y = y;
            }
        }
        Ok(graph)
    }

    /// The structures and sequences of all molecules, joined by strand
    /// breaks.
    pub fn structures_dot_bracket(&self) -> (String, String) {
        let mut structures = Vec::new();
        let mut sequences = Vec::new();
        for mol in self.molecules() {
            let mut residues = mol.sequence.chars();
            let sequence: String = mol.structure.chars()
                .map(|c| if brackets::is_break(c) {
                    c
                } else {
                    residues.next().unwrap_or('N')
                })
                .collect();
            structures.push(mol.structure.clone());
            sequences.push(sequence);
        }
        let sep = brackets::BREAKS[0].to_string();
        (structures.join(&sep), sequences.join(&sep))
    }

    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string(&self.document())?)
    }

    pub fn to_json_pretty(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(&self.document())?)
    }

    fn document(&self) -> ContainerDocument {
        ContainerDocument {
            options: self.options.clone(),
            entities: self.entities.clone(),
            extra_links: self.extra_links.clone(),
            graph: self.graph.clone(),
        }
    }

    /// Replace the container contents with a document written by `to_json`.
    pub fn from_json(&mut self, json: &str) -> Result<(), GraphError> {
        let doc: ContainerDocument = serde_json::from_str(json)?;
        doc.graph.validate()?;
        for entity in &doc.entities {
            let (uid, node_uids) = match entity {
                Entity::Rna(mol) => {
                    ParsedStructure::parse(&mol.structure)?;
                    (&mol.uid, &mol.node_uids)
                }
                Entity::Protein(p) => (&p.uid, &p.node_uids),
            };
            if let Some(missing) = node_uids.iter().find(|u| doc.graph.find(u).is_none()) {
                return Err(GraphError::InvalidDocument(
                    format!("node {} of molecule {} is not in the graph", missing, uid)));
            }
        }
        info!("Loaded {} entities, {} nodes.", doc.entities.len(), doc.graph.nodes.len());
        self.options = doc.options;
        self.entities = doc.entities;
        self.extra_links = doc.extra_links;
        self.graph = doc.graph;
        Ok(())
    }
}

/// Add external links between nodes given by uid. Node pairs that are
/// already linked externally are skipped. Returns the links that were added.
fn link_by_uid(graph: &mut Graph, links: &[(String, String)]) -> Result<Vec<(String, String)>, GraphError> {
    let lookup: AHashMap<&str, NodeIdx> = graph.nodes.iter().enumerate()
        .map(|(i, n)| (n.uid.as_str(), i))
        .collect();
    let mut linked: AHashSet<(NodeIdx, NodeIdx)> = graph.links_of(LinkKind::External)
        .map(|l| (l.source.min(l.target), l.source.max(l.target)))
        .collect();
    let mut added = Vec::with_capacity(links.len());
    let mut resolved = Vec::with_capacity(links.len());
    for (a, b) in links {
        match (lookup.get(a.as_str()), lookup.get(b.as_str())) {
            (Some(&s), Some(&t)) => {
                if linked.insert((s.min(t), s.max(t))) {
                    resolved.push((s, t));
                    added.push((a.clone(), b.clone()));
                } else {
                    debug!("Skipping duplicate extra link {}-{}.", a, b);
                }
            }
            _ => return Err(GraphError::InvalidDocument(
                format!("extra link {}-{} refers to an unknown node", a, b))),
        }
    }
    for (s, t) in resolved {
        graph.add_link(s, t, LinkKind::External);
    }
    Ok(added)
}
