use clap::Args;
use log::debug;
use fo_graph::ContainerOptions;

/// Graph construction parameters.
#[derive(Debug, Args)]
pub struct GraphArguments {
    /// Label every n-th nucleotide (0 disables labels)
    #[arg(short, long, default_value = "10")]
    pub label_interval: usize,

    /// Radius of nucleotide nodes
    #[arg(long, default_value = "5.0")]
    pub radius: f64,

    /// Add a middle node to every loop, tied to its nucleotides
    #[arg(short, long)]
    pub reinforce_loops: bool,
}

impl GraphArguments {
    pub fn build_options(&self) -> ContainerOptions {
        debug!("Label interval: {}", self.label_interval);
        debug!("Nucleotide radius: {}", self.radius);
        ContainerOptions {
            label_interval: self.label_interval,
            nucleotide_radius: self.radius,
            reinforce_loops: self.reinforce_loops,
        }
    }
}
