use std::fs::File;
use std::io::{stdin, BufRead, BufReader, Cursor};
use std::path::Path;

use anyhow::{anyhow, Result};
use paste::paste;
use fo_structure::brackets;
use fo_structure::DotBracketVec;

// ============================================================
//  Generic FASTA-like parser supporting lenient/strict modes
// ============================================================

#[derive(Clone, Copy)]
enum FastaMode {
    Lenient,
    Strict,
}

/// Header, sequence (strand breaks included) and structure of one record.
pub type Record = (Option<String>, String, DotBracketVec);

/// Core parsing logic shared by all adapters.
fn parse_fasta_like<R: BufRead>(reader: R, mode: FastaMode) -> Result<Record> {
    let mut header: Option<String> = None;
    let mut sequence: Option<String> = None;
    let mut structure: Option<DotBracketVec> = None;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            if sequence.is_some() && structure.is_some() {
                break;
            } else {
                continue;
            }
        }

        let token = line.split_whitespace().next().unwrap_or(line);
        if line.starts_with('>') {
            header = Some(line.to_string());
        } else if sequence.is_none() {
            sequence = Some(token.to_uppercase());
        } else if structure.is_none() {
            structure = Some(DotBracketVec::try_from(token)?);
            break;
        }
    }

    let sequence = sequence.ok_or_else(|| anyhow!("Missing sequence line"))?;

    let structure = match (structure, mode) {
        (Some(s), _) => s,
        (None, FastaMode::Lenient) => {
            // Open chain, with the strand breaks of the sequence.
            let open: String = sequence.chars()
                .map(|c| if brackets::is_break(c) { c } else { brackets::UNPAIRED })
                .collect();
            DotBracketVec::try_from(open.as_str())?
        }
        (None, FastaMode::Strict) => return Err(anyhow!("Missing structure line")),
    };

    let length = sequence.chars().filter(|&c| !brackets::is_break(c)).count();
    if length != structure.num_positions() {
        return Err(anyhow!(
            "Sequence length ({}) and structure length ({}) do not match",
            length,
            structure.num_positions()
        ));
    }

    Ok((header, sequence, structure))
}

// ============================================================
//  Base parser functions (lenient and strict variants)
// ============================================================

/// The structure line is optional, a missing one means open chain.
pub fn read_fasta_like<R: BufRead>(reader: R) -> Result<Record> {
    parse_fasta_like(reader, FastaMode::Lenient)
}

pub fn read_structure<R: BufRead>(reader: R) -> Result<Record> {
    parse_fasta_like(reader, FastaMode::Strict)
}

// ============================================================
//  Macro generating file/string/stdin/input helpers
// ============================================================

/// Generate input adapters for a base parser function `fn base<R: BufRead>(R) -> Result<T>`.
///
/// This expands into:
/// - `base_string(&str)`
/// - `base_file<P: AsRef<Path>>(P)`
/// - `base_stdin()`
/// - `base_input(&str)`  (dispatches "-" → stdin, otherwise → file)
///
/// Example:
/// ```ignore
/// define_input_variants!(read_fasta_like, Result<Record>);
/// ```
macro_rules! define_input_variants {
    ($base:ident, $ret:ty) => {
        paste! {
            /// Read from a string buffer.
            pub fn [<$base _string>](s: &str) -> $ret {
                $base(Cursor::new(s))
            }

            /// Read from a file path.
            pub fn [<$base _file>]<P: AsRef<Path>>(path: P) -> $ret {
                let reader = BufReader::new(File::open(path)?);
                $base(reader)
            }

            /// Read from stdin.
            pub fn [<$base _stdin>]() -> $ret {
                let reader = BufReader::new(stdin());
                $base(reader)
            }

            /// Read either from stdin ("-") or a file path.
            pub fn [<$base _input>](s: &str) -> $ret {
                if s == "-" {
                    [<$base _stdin>]()
                } else {
                    [<$base _file>](s)
                }
            }
        }
    };
}

type RecordResult = Result<Record>;

define_input_variants!(read_fasta_like, RecordResult);
define_input_variants!(read_structure, RecordResult);

/// A position ruler for a structure of length `len`.
pub fn ruler(len: usize) -> String {
    let mut s = String::new();
    let mut c = 0;
    for i in 0..=len {
        if i % 10 == 0 {
            let t = format!("{}", i / 10);
            c = t.len() - 1;
            s.push_str(&t);
            continue;
        } else if c > 0 {
            c -= 1;
            continue;
        }
        if i % 10 == 5 {
            s.push(',');
        } else {
            s.push('.');
        }
    }
    s
}
