use std::io::Write;
use log::info;
use env_logger::Builder;
use clap::Args;
use clap::Parser;
use clap::ArgAction;
use anyhow::Result;

use fo_graph::RnaContainer;
use fo_graph::AddRnaOptions;

use forna::input_parsers::read_fasta_like_input;
use forna::graph_parsers::GraphArguments;

#[derive(Debug, Args)]
pub struct GraphInput {
    /// Input file (FASTA-like), or "-" for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    pub input: String,

    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Verbosity (-v = info, -vv = debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Print the node/link graph of a secondary structure as JSON.
#[derive(Debug, Parser)]
#[command(name = "fo-graph")]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub io: GraphInput,

    #[command(flatten, next_help_heading = "Graph parameters")]
    pub graph: GraphArguments,
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
    init_logging(cli.io.verbose);

    let (header, sequence, structure) = read_fasta_like_input(&cli.io.input)?;
    let name = header.map(|h| h.trim_start_matches('>').trim().to_string());

    let mut container = RnaContainer::new(cli.graph.build_options());
    container.add_rna(&structure.to_string(), AddRnaOptions {
        sequence: Some(sequence),
        name,
        ..Default::default()
    })?;

    let graph = container.graph();
    info!("{} nodes, {} links.", graph.nodes.len(), graph.links.len());

    let json = if cli.io.pretty {
        container.to_json_pretty()?
    } else {
        container.to_json()?
    };
    println!("{}", json);
    Ok(())
}
