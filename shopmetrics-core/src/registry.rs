//! Shop registry reader.
//!
//! Format: one `shop_id,base_revenue` pair per line. Blank lines are skipped,
//! whitespace around each field is trimmed, order is preserved and duplicate
//! identifiers are passed through untouched.

use crate::domain::ShopEntry;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("line {line}: {reason} in {content:?} (expected 'shop,base_revenue')")]
    Format {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("no shops found in {source_name}")]
    EmptySource { source_name: String },

    #[error("failed to read registry {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Read a registry file from disk.
pub fn read_registry_file(path: &Path) -> Result<Vec<ShopEntry>, RegistryError> {
    let file = std::fs::File::open(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_registry(std::io::BufReader::new(file), &path.display().to_string())
}

/// Read a registry from any buffered source. `source_name` only labels errors.
pub fn read_registry<R: BufRead>(
    reader: R,
    source_name: &str,
) -> Result<Vec<ShopEntry>, RegistryError> {
    let mut shops = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| RegistryError::Io {
            path: PathBuf::from(source_name),
            source,
        })?;
        if let Some(entry) = parse_line(&line, idx + 1)? {
            shops.push(entry);
        }
    }

    if shops.is_empty() {
        return Err(RegistryError::EmptySource {
            source_name: source_name.to_string(),
        });
    }
    Ok(shops)
}

/// Parse one registry line. Blank lines yield `None`.
fn parse_line(raw: &str, line: usize) -> Result<Option<ShopEntry>, RegistryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let format_err = |reason: String| RegistryError::Format {
        line,
        content: trimmed.to_string(),
        reason,
    };

    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        return Err(format_err(format!("expected 2 fields, found {}", parts.len())));
    }

    let shop_id = parts[0];
    if shop_id.is_empty() {
        return Err(format_err("shop id is empty".to_string()));
    }
    if let Some(c) = shop_id.chars().find(|c| !is_shop_id_char(*c)) {
        return Err(format_err(format!(
            "shop id {shop_id:?} contains {c:?}; only [A-Za-z0-9._-] are allowed"
        )));
    }

    let base_revenue: f64 = parts[1]
        .parse()
        .map_err(|e| format_err(format!("base revenue {:?} is not a number ({e})", parts[1])))?;
    if !base_revenue.is_finite() {
        return Err(format_err(format!("base revenue {:?} is not finite", parts[1])));
    }

    Ok(Some(ShopEntry::new(shop_id, base_revenue)))
}

/// Shop IDs end up verbatim in partition directories and object keys.
fn is_shop_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}
