use thiserror::Error;

use graft_core::StoreError;

use crate::report::LoadReport;

/// Fatal load failures; per-record problems land in the [`LoadReport`] instead
#[derive(Error, Debug)]
pub enum LoadError {
    /// The store became unreachable mid-load. `report` holds what committed.
    #[error("Lost connection to the graph store: {source}")]
    Connection {
        #[source]
        source: StoreError,
        report: Box<LoadReport>,
    },
}

impl LoadError {
    /// Partial report of the interrupted run
    pub fn report(&self) -> &LoadReport {
        match self {
            Self::Connection { report, .. } => report,
        }
    }
}
