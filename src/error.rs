//! Dashboard-level errors and non-fatal pipeline warnings.

use crate::charts::RenderError;
use crate::data::{DataQualityWarning, EmptyResultWarning, LoaderError, SchemaError};
use polars::prelude::PolarsError;
use thiserror::Error;

/// Fatal conditions. Any of these stops the render pass.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Not signed in")]
    Unauthenticated,
    #[error(transparent)]
    Source(#[from] LoaderError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Export failed: {0}")]
    Export(#[from] PolarsError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl DashboardError {
    /// What the user can do about it.
    pub fn hint(&self) -> &'static str {
        match self {
            DashboardError::Unauthenticated => "Sign in to load the dashboard.",
            DashboardError::Source(LoaderError::SourceUnavailable { .. }) => {
                "Check the source directory and sheet names in the configuration."
            }
            DashboardError::Source(_) => "Check that both sheets are valid CSV exports.",
            DashboardError::Schema(_) => "Check the column names in the sheets and the [columns] configuration.",
            DashboardError::Export(_) | DashboardError::Io(_) => "Check the destination path and try again.",
            DashboardError::Render(RenderError::NoData(_)) => {
                "Widen the filters so there is something to draw."
            }
            DashboardError::Render(_) => "Check the destination folder and try again.",
        }
    }
}

/// Conditions that degrade one view without stopping the render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineWarning {
    /// A row has no usable coordinates and is left out of map views.
    DataQuality(DataQualityWarning),
    /// The current selection matches no rows.
    EmptyResult(EmptyResultWarning),
}

impl From<DataQualityWarning> for PipelineWarning {
    fn from(warning: DataQualityWarning) -> Self {
        PipelineWarning::DataQuality(warning)
    }
}

impl From<EmptyResultWarning> for PipelineWarning {
    fn from(warning: EmptyResultWarning) -> Self {
        PipelineWarning::EmptyResult(warning)
    }
}
