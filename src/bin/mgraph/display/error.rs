use std::io::{self, Write};

use anyhow::Error;
use molgraph::DatasetError;
use molgraph::featurize::Error as FeaturizeError;
use molgraph::io::{Error as IoError, Format};

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 59) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    if let Some(hints) = HintCollector::collect(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn new() -> Self {
        Self {
            hints: Vec::new(),
            has_typed_hints: false,
        }
    }

    fn collect(err: &Error) -> Option<Vec<String>> {
        let mut collector = Self::new();

        collector.collect_dataset_hints(err);
        if !collector.has_typed_hints {
            if let Some(io_err) = err.downcast_ref::<IoError>() {
                collector.mark_typed();
                collector.collect_io_hints(io_err);
            }
        }

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }

        if collector.hints.is_empty() {
            None
        } else {
            Some(collector.hints)
        }
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn mark_typed(&mut self) {
        self.has_typed_hints = true;
    }

    fn collect_dataset_hints(&mut self, err: &Error) {
        let Some(dataset_err) = err.downcast_ref::<DatasetError>() else {
            return;
        };

        self.mark_typed();

        match dataset_err {
            DatasetError::Io(io_err) => self.collect_io_hints(io_err),

            DatasetError::Featurize {
                index,
                source: FeaturizeError::BondOutOfRange { .. },
            } => {
                self.add(format!("Molecule {} has a bond to a missing atom", index));
                self.add("Check the counts line and bond block of that SDF record");
            }

            DatasetError::Featurize { index, .. } => {
                self.add(format!(
                    "Molecule {} uses an atom or bond type missing from the vocabulary",
                    index
                ));
                self.add("Extend atom_types/bond_types in a custom catalog and pass it via --definitions");
            }

            DatasetError::SpecParse(_) => {
                self.add("The dataset catalog is not valid");
                self.add("Check TOML syntax, element symbols and bond type names");
                self.add("Every default_variant must be listed under [<dataset>.variants]");
            }

            DatasetError::UnknownDataset { .. } => {
                self.add("Built-in datasets: lipophilicity, sider");
                self.add("Use --definitions to load a catalog with other datasets");
            }

            DatasetError::UnknownVariant { choices, .. } => {
                self.add(format!("Pass one of the listed variants with --variant ({})", choices.len()));
            }

            DatasetError::MissingLabel { dataset, .. } => {
                self.add(format!("Run `mgraph labels {}` to list the labels", dataset));
                self.add("Select one with --label \"<NAME>\" or use --columns");
            }

            DatasetError::UnknownLabel { .. } => {
                self.add("Label names are matched exactly, then ignoring case");
                self.add("Quote names that contain spaces or commas");
            }

            DatasetError::MissingRawFile(path) => {
                self.add(format!(
                    "Expected {} in the raw directory",
                    path.file_name().unwrap_or_default().to_string_lossy()
                ));
                self.add("Drop --offline to download the archive");
                self.add("Or copy the raw files into ROOT/raw by hand");
            }

            DatasetError::TargetMismatch { .. } => {
                self.add("The SDF and CSV raw files do not belong together");
                self.add("Re-download the raw archive with --force-reload after clearing ROOT/raw");
            }

            DatasetError::ColumnOutOfRange { width, .. } => {
                self.add(format!("Valid target columns are 0..{}", width));
            }

            DatasetError::IndexOutOfRange { .. } => {
                self.add("Sample indices start at 0");
            }
        }
    }

    fn collect_io_hints(&mut self, io_err: &IoError) {
        match io_err {
            IoError::Io { source } => self.collect_std_io_hints(source),

            IoError::Parse { format, line, .. } => {
                self.add(format!(
                    "Parser encountered an issue near line {} in {} data",
                    line, format
                ));
                self.add("Inspect the file around that line for malformed entries");
                self.add_format_specific_parse_hints(*format);
            }

            IoError::Csv(_) => {
                self.add("The target CSV could not be read");
                self.add("Check for unbalanced quotes or rows with missing fields");
            }

            IoError::Download(_) => {
                self.add("The raw archive could not be downloaded");
                self.add("Check network access, or place the raw files in ROOT/raw and use --offline");
            }

            IoError::Archive(_) => {
                self.add("The downloaded archive could not be extracted");
                self.add("The download may be an HTML error page instead of the archive");
            }

            IoError::Cache(_) | IoError::StaleCache { .. } => {
                self.add("The processed cache is unusable");
                self.add("Rebuild it with --force-reload");
            }
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("A dataset file or directory does not exist");
                self.add("Raw files are read from ROOT/raw; pass --root to change ROOT");
            }

            ErrorKind::PermissionDenied => {
                self.add("The dataset root is not accessible");
                self.add("ROOT/raw must be readable and ROOT/processed writable");
            }

            ErrorKind::InvalidData | ErrorKind::UnexpectedEof => {
                self.add("A raw file ended early or holds unreadable bytes");
                self.add("Delete it from ROOT/raw to download a fresh copy");
            }

            ErrorKind::WriteZero | ErrorKind::StorageFull => {
                self.add("The processed cache could not be written");
                self.add("Free some disk space under ROOT/processed");
            }

            _ => {
                self.add("Reading or writing dataset files failed");
                self.add("Check the --root directory and its free space");
            }
        }
    }

    fn add_format_specific_parse_hints(&mut self, format: Format) {
        match format {
            Format::Sdf => {
                self.add("SDF: Only V2000 records are supported");
                self.add("SDF: Check atom block and bond block column alignment");
            }

            Format::Csv => {
                self.add("CSV: Target columns must hold numbers (integers for SIDER)");
            }

            Format::Cache => {
                self.add("Cache: Rebuild it with --force-reload");
            }
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("dataset definitions") {
            self.add("Check the path given to --definitions");
            return;
        }

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check the --root and --definitions paths");
        } else if msg.contains("permission denied") {
            self.add("Check access rights of the dataset root");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    let mut text = String::new();

    text.push_str(&err.to_string());

    let mut source = err.source();
    while let Some(cause) = source {
        text.push('\n');
        text.push_str(&cause.to_string());
        source = cause.source();
    }

    text.to_lowercase()
}
