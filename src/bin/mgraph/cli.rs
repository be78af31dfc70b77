use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "mgraph",
    about = "Molecular graph dataset preparation",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Prepare the Lipophilicity dataset
    #[command(visible_alias = "lipo")]
    Lipophilicity(PrepareArgs),

    /// Prepare the SIDER side-effect dataset (requires --label or --columns)
    Sider(PrepareArgs),

    /// Prepare any dataset from the built-in or a custom catalog
    #[command(visible_alias = "p")]
    Prepare {
        /// Dataset name as listed in the catalog
        #[arg(value_name = "DATASET")]
        dataset: String,

        #[command(flatten)]
        args: PrepareArgs,
    },

    /// List the target labels and variants of a dataset
    #[command(visible_alias = "l")]
    Labels {
        /// Dataset name as listed in the catalog
        #[arg(value_name = "DATASET")]
        dataset: String,

        /// Custom dataset catalog (TOML)
        #[arg(long, value_name = "FILE")]
        definitions: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct PrepareArgs {
    /// Dataset root; raw files go to ROOT/raw, the cache to ROOT/processed
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Raw data variant (e.g. rdkit3d, precise3d)
    #[arg(long, value_name = "NAME")]
    pub variant: Option<String>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,

    /// Number of samples to list after preparation
    #[arg(long, value_name = "N", default_value = "0")]
    pub show: usize,

    #[command(flatten)]
    pub targets: TargetOptions,

    #[command(flatten)]
    pub processing: ProcessingOptions,
}

/// Target selection options.
#[derive(Args)]
#[command(next_help_heading = "Target Selection")]
pub struct TargetOptions {
    /// Named target label (see `mgraph labels <DATASET>`)
    #[arg(long, value_name = "NAME", conflicts_with = "columns")]
    pub label: Option<String>,

    /// Target column indices, comma separated
    #[arg(long, value_name = "COLS", value_delimiter = ',')]
    pub columns: Option<Vec<usize>>,
}

/// Processing and caching options.
#[derive(Args)]
#[command(next_help_heading = "Processing")]
pub struct ProcessingOptions {
    /// Rebuild the cache even if a valid one exists
    #[arg(long)]
    pub force_reload: bool,

    /// Load the pre-encoded sample list instead of encoding SDF/CSV
    #[arg(long)]
    pub prebuilt: bool,

    /// Never download; fail if raw files are missing
    #[arg(long)]
    pub offline: bool,

    /// Custom dataset catalog (TOML)
    #[arg(long, value_name = "FILE")]
    pub definitions: Option<PathBuf>,

    /// Hybridization perception for SDF atoms
    #[arg(long, value_name = "MODE", default_value = "topological")]
    pub perception: PerceptionMode,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum PerceptionMode {
    /// Aromatic flags only; hybridization left unspecified
    Minimal,
    /// Aromatic flags and hybridization from bond orders and degree
    #[default]
    Topological,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn columns_are_comma_separated() {
        let cli = Cli::try_parse_from(["mgraph", "sider", "--columns", "3,7"]).unwrap();
        let Command::Sider(args) = cli.command else {
            panic!("expected sider command");
        };
        assert_eq!(args.targets.columns, Some(vec![3, 7]));
        assert!(args.targets.label.is_none());
    }

    #[test]
    fn label_conflicts_with_columns() {
        let result = Cli::try_parse_from([
            "mgraph",
            "sider",
            "--label",
            "Eye disorders",
            "--columns",
            "1",
        ]);
        assert!(result.is_err());
    }
}
