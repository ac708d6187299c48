//! Persistence: save and reload a trained engine.
//!
//! The blob is a JSON document of the grid, the ansatz identifier and the
//! parameter tensor, stamped with an explicit schema version.  Loading
//! rebuilds the engine exactly as at construction (re-deriving the
//! parameter count from grid and ansatz) and then overwrites its
//! parameters, so a round trip reproduces identical states and energies
//! under the deterministic simulator.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use spinphase_circuit::Ansatz;
use spinphase_ham::HamiltonianGrid;

use crate::engine::Vqe;
use crate::error::{VqeError, VqeResult};

/// Version stamped into every blob this build writes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Blob {
    schema_version: u32,
    grid: HamiltonianGrid,
    ansatz: Ansatz,
    params: Array2<f64>,
}

/// Serialize an engine's grid, ansatz and parameters to a file.
pub fn save(vqe: &Vqe, path: impl AsRef<Path>) -> VqeResult<()> {
    let blob = Blob {
        schema_version: SCHEMA_VERSION,
        grid: vqe.grid().clone(),
        ansatz: vqe.ansatz(),
        params: vqe.params().clone(),
    };
    let json = serde_json::to_string(&blob)?;
    fs::write(path.as_ref(), json)?;
    info!(path = %path.as_ref().display(), "saved VQE blob");
    Ok(())
}

/// Reconstruct an engine from a file written by [`save`].
///
/// A malformed document or a schema-version mismatch is a hard load
/// failure; there is no partial recovery.
pub fn load(path: impl AsRef<Path>) -> VqeResult<Vqe> {
    let json = fs::read_to_string(path.as_ref())?;
    let blob: Blob = serde_json::from_str(&json)?;

    if blob.schema_version != SCHEMA_VERSION {
        return Err(VqeError::SchemaVersion {
            found: blob.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    let mut vqe = Vqe::new(blob.grid, blob.ansatz)?;
    vqe.set_params(blob.params)?;
    info!(path = %path.as_ref().display(), "loaded VQE blob");
    Ok(vqe)
}
