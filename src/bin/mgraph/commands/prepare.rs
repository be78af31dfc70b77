use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use molgraph::chem::Perception;
use molgraph::{DatasetConfig, MoleculeDataset, ProcessingStrategy, TargetChoice};

use crate::cli::{PerceptionMode, PrepareArgs, TargetOptions};
use crate::display::{Context as DisplayContext, Progress, print_samples, print_summary};

pub fn run_prepare(name: &str, args: PrepareArgs, ctx: DisplayContext) -> Result<()> {
    let config = build_config(name, &args)?;
    let root = config.root.clone();

    let mut progress = Progress::new(ctx.interactive);
    let dataset = MoleculeDataset::open_observed(name, config, &mut progress)
        .with_context(|| format!("Failed to prepare dataset '{}' in {}", name, root.display()))?;
    progress.finish(dataset.report().is_none());

    print_summary(&dataset, ctx.interactive);
    print_samples(&dataset, args.show);

    Ok(())
}

fn build_config(name: &str, args: &PrepareArgs) -> Result<DatasetConfig> {
    let processing = &args.processing;

    Ok(DatasetConfig {
        root: args
            .root
            .clone()
            .unwrap_or_else(|| default_root(name)),
        variant: args.variant.clone(),
        strategy: if processing.prebuilt {
            ProcessingStrategy::Prebuilt
        } else {
            ProcessingStrategy::Encode
        },
        force_reload: processing.force_reload,
        download: !processing.offline,
        perception: match processing.perception {
            PerceptionMode::Minimal => Perception::Minimal,
            PerceptionMode::Topological => Perception::Topological,
        },
        targets: target_choice(&args.targets),
        definitions: read_definitions(processing.definitions.as_deref())?,
        ..Default::default()
    })
}

fn default_root(name: &str) -> PathBuf {
    Path::new("data").join(name.to_lowercase())
}

fn target_choice(opts: &TargetOptions) -> TargetChoice {
    match (&opts.label, &opts.columns) {
        (Some(label), _) => TargetChoice::Label(label.clone()),
        (None, Some(cols)) => TargetChoice::Columns(cols.clone()),
        (None, None) => TargetChoice::Default,
    }
}

pub(super) fn read_definitions(path: Option<&Path>) -> Result<Option<String>> {
    path.map(|p| {
        fs::read_to_string(p)
            .with_context(|| format!("Failed to read dataset definitions {}", p.display()))
    })
    .transpose()
}
