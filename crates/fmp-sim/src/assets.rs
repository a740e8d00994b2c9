//! Loading the game data files from an asset directory.

use anyhow::{Context, Result};
use fmp_core::Catalog;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MAP_FILE: &str = "board.json";
pub const UNITS_FILE: &str = "unit.json";
pub const TIDES_FILE: &str = "tide cards.json";
pub const TURNS_FILE: &str = "turns.json";

/// The four data files of a game, as raw JSON text.
#[derive(Debug, Clone)]
pub struct AssetSet {
    pub root: PathBuf,
    pub map: String,
    pub units: String,
    pub tides: String,
    pub turns: String,
}

impl AssetSet {
    /// Read every data file under `root`
    pub fn read(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        Ok(Self {
            map: read_file(&root, MAP_FILE)?,
            units: read_file(&root, UNITS_FILE)?,
            tides: read_file(&root, TIDES_FILE)?,
            turns: read_file(&root, TURNS_FILE)?,
            root,
        })
    }

    /// Parse and validate the files into a catalog
    pub fn into_catalog(self) -> Result<Catalog> {
        let catalog = Catalog::from_json(&self.map, &self.units, &self.tides, &self.turns)
            .with_context(|| format!("invalid game data in {}", self.root.display()))?;
        info!(
            "Catalog ready: {} hexes, {} unit types, {} tide cards, {} turns",
            catalog.board.len(),
            catalog.unit_types.len(),
            catalog.tide_cards.len(),
            catalog.turns.len()
        );
        Ok(catalog)
    }
}

fn read_file(root: &Path, name: &str) -> Result<String> {
    let path = root.join(name);
    fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
}
