use std::io::Write;
use log::info;
use colored::*;
use env_logger::Builder;
use clap::Parser;
use clap::ArgAction;
use anyhow::Result;

use fo_structure::PairTable;
use fo_structure::ElementTree;
use fo_structure::split_pseudoknots;

use forna::input_parsers::ruler;
use forna::input_parsers::read_fasta_like_input;

/// Decompose a secondary structure into its structural elements.
#[derive(Debug, Parser)]
#[command(name = "fo-elements")]
#[command(author, version, about)]
pub struct Cli {
    /// Input file (FASTA-like), or "-" for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    pub input: String,

    /// Verbosity (-v = info, -vv = debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            // no prefix, just the message
            writeln!(buf, "{}", record.args())
        })
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (header, sequence, structure) = read_fasta_like_input(&cli.input)?;
    if let Some(h) = header {
        println!("{}", h.yellow())
    }

    let full = PairTable::try_from(&structure)?;
    let breaks = structure.breaks();
    let (nested, removed) = split_pseudoknots(&full);
    let elements = ElementTree::from_pair_table(&nested, &breaks)?;

    info!("{}", ruler(structure.len().saturating_sub(1)).magenta());
    println!("{}\n{}", sequence, structure);
    info!("{}", ruler(structure.len().saturating_sub(1)).magenta());

    if !removed.is_empty() {
        let pairs: Vec<String> = removed.iter().map(|(i, j)| format!("({i}, {j})")).collect();
        println!("{} {}", "Pseudoknots:".red(), pairs.join(" "));
        println!("{}", nested.to_dot_bracket());
    }

    for element in elements.iter() {
        println!("{}", element);
    }
    info!("{} elements, {} pairs, {} removed.", elements.len(), nested.num_pairs(), removed.len());

    Ok(())
}
