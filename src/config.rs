//! Index configuration
//!
//! # Priority (highest to lowest)
//!
//! 1. Environment variables (`ALICE_AFM_WINDOW`, `ALICE_AFM_MODULUS`,
//!    `ALICE_AFM_SAMPLE_STEP`)
//! 2. Configuration file (`alice-afm.toml`)
//! 3. Default values
//!
//! The window and modulus must match the ones the dictionary and parse were
//! produced with.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pfp::Params;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "alice-afm.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Window length `w`
    pub window: usize,
    /// Trigger modulus `p`
    pub modulus: u64,
    /// Suffix-array sampling rate of every FM-index
    pub sample_step: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            window: 10,
            modulus: 100,
            sample_step: 16,
        }
    }
}

impl IndexConfig {
    /// Loads configuration from `alice-afm.toml` and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Loads configuration from a specific file path. A missing file leaves
    /// the defaults in place.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("ALICE_AFM_"));

        figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.params()
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;
        if self.sample_step == 0 {
            return Err(Error::Config("sample_step must be at least 1".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn params(&self) -> Params {
        Params {
            w: self.window,
            p: self.modulus,
        }
    }
}
