//! Restart / snapshot serialization.
//!
//! Bincode, mirroring the teacher's `Snapshot`/`bincode` pattern in
//! `src/simulation/mod.rs`. Carries exactly the fields spec.md §6 names
//! under "Restart", plus the microphysics/surface prognostics and the
//! timestep counter.

use crate::errors::*;
use crate::field::{Boundary, Diagnostics, State};
use crate::grid::GridDescriptor;
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Serialize, Deserialize)]
pub struct Snapshot {
    pub grid: GridDescriptor,
    pub timestep: usize,
    pub state: State,
    pub diagnostics: Diagnostics,
    pub boundary: Boundary,
}

impl Snapshot {
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let f = File::create(path)?;
        let w = BufWriter::new(f);
        bincode::serialize_into(w, self).map_err(Error::from)
    }

    /// Load a snapshot and validate its grid descriptor against the
    /// running configuration; a resolution mismatch is a fatal error per
    /// spec.md §6.
    pub fn read<P: AsRef<Path>>(path: P, expected: &GridDescriptor) -> Result<Snapshot> {
        let f = File::open(path)?;
        let r = BufReader::new(f);
        let snapshot: Snapshot = bincode::deserialize_from(r)?;
        if snapshot.grid.nx != expected.nx || snapshot.grid.ny != expected.ny || snapshot.grid.nz != expected.nz {
            bail!(ErrorKind::RestartMismatch(format!(
                "restart grid ({}, {}, {}) does not match configured grid ({}, {}, {})",
                snapshot.grid.nx, snapshot.grid.ny, snapshot.grid.nz, expected.nx, expected.ny, expected.nz
            )));
        }
        Ok(snapshot)
    }
}
