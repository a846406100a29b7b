use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Display sentinel for a folder with no matching party code. An unknown
/// party is a normal case for listing, not an error.
pub const UNKNOWN_CODE: &str = "?";

/// Immutable snapshot of the party-name -> code table, loaded from a
/// two-column `Party Name, Code` CSV. Reload replaces the whole snapshot.
#[derive(Debug, Clone, Default)]
pub struct PartyTable {
    map: HashMap<String, String>,
}

impl PartyTable {
    /// Load the table from a CSV file. The first row is treated as a header
    /// and skipped; rows with a blank name or code are ignored. Names are
    /// trimmed but matched case-sensitively.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read party table: {}", path.display()))?;

        let mut map = HashMap::new();
        for line in content.lines().skip(1) {
            // The code column is short and never contains a comma, so split
            // from the right to tolerate commas inside party names.
            let Some((name, code)) = line.rsplit_once(',') else {
                continue;
            };
            let name = name.trim();
            let code = code.trim();
            if !name.is_empty() && !code.is_empty() {
                map.insert(name.to_string(), code.to_string());
            }
        }

        Ok(Self { map })
    }

    /// Write a starter table so a fresh install has something to edit.
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let rows = "Party Name,Code\n\
                    Creative,2\n\
                    Pranam Maheta,7\n\
                    XYZ Designs,5\n\
                    Sunrise,3\n\
                    Vikas,9\n";
        fs::write(path, rows)
            .with_context(|| format!("Failed to write party table: {}", path.display()))
    }

    /// Look up the code for a party name. Missing keys are expected.
    pub fn code(&self, party: &str) -> Option<&str> {
        self.map.get(party).map(String::as_str)
    }

    /// The code for display purposes, substituting the unknown sentinel.
    pub fn code_or_unknown(&self, party: &str) -> &str {
        self.code(party).unwrap_or(UNKNOWN_CODE)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
