//! Storage abstractions for reaction output.
//!
//! The combined output is a single JSON array of records:
//!
//! ```text
//! [
//!   {
//!     "solvent": "dichloromethane",
//!     "reactant_smiles": ["CCO"],
//!     "solvent_smiles": ["ClCCl"],
//!     "product_smiles": ["CC=O"]
//!   }
//! ]
//! ```

pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ReactionRecord;

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// Where the records were written
    pub path: PathBuf,
    /// Number of records written
    pub count: usize,
}

/// Trait for record storage backends.
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Replace the stored output with `records`.
    async fn write_records(&self, records: &[ReactionRecord]) -> Result<WriteSummary>;
}
