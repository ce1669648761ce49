//! Asset universe parsing.
//!
//! The universe is a fixed, ordered list of asset identifiers for the whole
//! run; configuration supplies it as a comma-separated list.

use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct Universe {
    pub assets: Vec<String>,
}

impl Universe {
    pub fn count(&self) -> usize {
        self.assets.len()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in asset list")]
    EmptyToken,

    #[error("duplicate asset: {0}")]
    DuplicateAsset(String),
}

pub fn parse_assets(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut assets = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let asset = trimmed.to_uppercase();
        if seen.contains(&asset) {
            return Err(UniverseError::DuplicateAsset(asset));
        }
        seen.insert(asset.clone());
        assets.push(asset);
    }

    Ok(assets)
}
