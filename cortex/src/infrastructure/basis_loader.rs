// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Reads and writes basis files.
//!
//! `.bin` files are bincode-encoded [`BasisFile`]s; anything else is JSON.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::{Basis, BasisError, BasisFile};

#[derive(Debug, Error)]
pub enum BasisLoadError {
    #[error("Failed to access basis {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Basis {path:?} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Basis {path:?} is not valid bincode: {source}")]
    Bincode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("Basis {path:?} is invalid: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: BasisError,
    },
}

fn is_bincode(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("bin")
}

pub fn load_basis(path: impl AsRef<Path>) -> Result<Basis, BasisLoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| BasisLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let file: BasisFile = if is_bincode(path) {
        bincode::deserialize(&bytes).map_err(|source| BasisLoadError::Bincode {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_json::from_slice(&bytes).map_err(|source| BasisLoadError::Json {
            path: path.to_path_buf(),
            source,
        })?
    };

    Basis::from_file(file).map_err(|source| BasisLoadError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_basis(basis: &Basis, path: impl AsRef<Path>) -> Result<(), BasisLoadError> {
    let path = path.as_ref();
    let file = basis.to_file();

    let bytes = if is_bincode(path) {
        bincode::serialize(&file).map_err(|source| BasisLoadError::Bincode {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_json::to_vec(&file).map_err(|source| BasisLoadError::Json {
            path: path.to_path_buf(),
            source,
        })?
    };

    std::fs::write(path, bytes).map_err(|source| BasisLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
