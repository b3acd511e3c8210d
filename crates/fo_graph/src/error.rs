use std::fmt;
use std::error::Error;
use fo_structure::StructureError;

#[derive(Debug)]
pub enum GraphError {
    Structure(StructureError),
    Json(serde_json::Error),
    UnknownNucleotide(usize),
    UidCount { found: usize, expected: usize },
    DuplicateUid(String),
    NoMolecule,
    InvalidDocument(String),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structure(e) => write!(f, "Structure error: {}", e),
            Self::Json(e) => write!(f, "JSON parse error: {}", e),
            Self::UnknownNucleotide(k) =>
                write!(f, "There is no nucleotide with number {k}"),
            Self::UidCount { found, expected } =>
                write!(f, "Got {found} uids for {expected} nucleotides"),
            Self::DuplicateUid(uid) =>
                write!(f, "Node uid {uid} is already in use"),
            Self::NoMolecule =>
                write!(f, "No RNA molecule in the container"),
            Self::InvalidDocument(msg) =>
                write!(f, "Invalid document: {msg}"),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Structure(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StructureError> for GraphError {
    fn from(e: StructureError) -> Self { Self::Structure(e) }
}

impl From<serde_json::Error> for GraphError {
    fn from(e: serde_json::Error) -> Self { Self::Json(e) }
}
