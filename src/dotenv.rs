//! `.env` file support
//!
//! Reads a dotenv file into an [`EnvSource`] without touching the process
//! environment, so the file and the real environment can be layered.

use crate::config::EnvSource;
use crate::error::{Error, Result};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Variables parsed from a `.env` file
#[derive(Debug, Clone)]
pub struct DotenvSource {
    path: PathBuf,
    vars: HashMap<String, String>,
}

impl DotenvSource {
    /// Parse the file at `path`
    ///
    /// # Errors
    ///
    /// * `Error::FileRead` - the file does not exist or cannot be read
    /// * `Error::Parse` - a line is not valid dotenv syntax
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|e| map_dotenv_error(path, e))?;

        let mut vars = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| map_dotenv_error(path, e))?;
            vars.insert(key, value);
        }

        debug!("Loaded {} variables from {}", vars.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            vars,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvSource for DotenvSource {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

fn map_dotenv_error(path: &Path, err: dotenvy::Error) -> Error {
    match err {
        dotenvy::Error::Io(source) => Error::FileRead {
            path: path.to_path_buf(),
            source,
        },
        other => Error::Parse {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}
