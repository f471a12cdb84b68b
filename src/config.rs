use std::path::Path;

use anyhow::{ensure, Context};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{dataset::DatasetKind, types::SupportCount, Result};

const ENV_PREFIX: &str = "APRIORI_";

/// Parameters of one mining run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Absolute support count an itemset needs to be frequent.
    pub min_support: SupportCount,
    pub min_confidence: f64,
    /// Clamped to the number of transactions when larger.
    pub num_workers: usize,
    /// Largest itemset size to mine; unbounded when absent.
    pub max_len: Option<usize>,
    pub dataset: DatasetKind,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            min_support: 2,
            min_confidence: 0.7,
            num_workers: 1,
            max_len: None,
            dataset: DatasetKind::Dummy,
        }
    }
}

impl MiningConfig {
    /// Defaults, then `APRIORI_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_with_custom_config(None)
    }

    /// Defaults, then the TOML file at `custom_config` if given, then
    /// `APRIORI_*` environment variables. The result is validated.
    pub fn load_with_custom_config(custom_config: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(MiningConfig::default()));

        if let Some(path) = custom_config {
            figment = figment.merge(Toml::file(path));
        }

        let config: MiningConfig = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .context("invalid mining configuration")?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.min_support >= 1,
            "min_support must be at least 1, got {}",
            self.min_support
        );
        ensure!(
            (0.0..=1.0).contains(&self.min_confidence),
            "min_confidence must be in range [0,1], got {}",
            self.min_confidence
        );
        ensure!(
            self.num_workers >= 1,
            "num_workers must be at least 1, got {}",
            self.num_workers
        );
        ensure!(self.max_len != Some(0), "max_len must be at least 1");
        Ok(())
    }
}
