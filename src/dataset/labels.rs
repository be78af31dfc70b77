//! Target selection.
//!
//! Selection is expressed in source column indices and resolved through each
//! sample's `y_columns`, so narrowing an already narrowed sample to the same
//! columns is a no-op.

use super::definition::DatasetDefinition;
use super::error::Error;
use crate::model::graph::GraphSample;

/// What the caller asked for when opening a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TargetChoice {
    /// The dataset's default columns.
    #[default]
    Default,
    /// A named label from the dataset definition.
    Label(String),
    /// Explicit target column indices.
    Columns(Vec<usize>),
}

/// The resolved per-access narrowing of `y`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TargetSelector {
    #[default]
    All,
    Columns(Vec<usize>),
}

impl TargetSelector {
    pub fn columns(&self) -> Option<&[usize]> {
        match self {
            TargetSelector::All => None,
            TargetSelector::Columns(cols) => Some(cols),
        }
    }

    /// Checks every selected column against the number of target columns.
    pub fn validate(&self, width: usize) -> Result<(), Error> {
        match self.columns().and_then(|cols| cols.iter().find(|&&c| c >= width)) {
            Some(&column) => Err(Error::ColumnOutOfRange { column, width }),
            None => Ok(()),
        }
    }

    pub fn apply(&self, mut sample: GraphSample) -> Result<GraphSample, Error> {
        let Some(cols) = self.columns() else {
            return Ok(sample);
        };

        let mut y = Vec::with_capacity(cols.len());
        for &column in cols {
            let pos = sample
                .y_columns
                .iter()
                .position(|&c| c == column)
                .ok_or(Error::ColumnOutOfRange {
                    column,
                    width: sample.y_columns.len(),
                })?;
            y.push(sample.y[pos]);
        }
        sample.y = y;
        sample.y_columns = cols.to_vec();
        Ok(sample)
    }
}

pub fn resolve(definition: &DatasetDefinition, choice: &TargetChoice) -> Result<TargetSelector, Error> {
    match choice {
        TargetChoice::Columns(cols) => Ok(TargetSelector::Columns(cols.clone())),
        TargetChoice::Label(label) => definition
            .label_index(label)
            .map(|i| TargetSelector::Columns(vec![i]))
            .ok_or_else(|| Error::UnknownLabel {
                label: label.clone(),
                choices: definition.labels.clone(),
            }),
        TargetChoice::Default if definition.label_required => Err(Error::MissingLabel {
            dataset: definition.name.clone(),
            choices: definition.labels.clone(),
        }),
        TargetChoice::Default if definition.default_columns.is_empty() => Ok(TargetSelector::All),
        TargetChoice::Default => Ok(TargetSelector::Columns(definition.default_columns.clone())),
    }
}
