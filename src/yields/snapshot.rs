//! Per-chain snapshot files
//!
//! Each chain lives in `<dir>/<chain>.json` as
//! `{timestamp, chain, protocols, count}`. Files are overwritten in place.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{ser::PrettyFormatter, Serializer, Value};

use super::YieldError;

/// Contents of one chain file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub chain: String,
    /// Raw upstream records; not guaranteed to be an array on disk
    #[serde(default = "empty_protocols")]
    pub protocols: Value,
    #[serde(default)]
    pub count: usize,
}

fn empty_protocols() -> Value {
    Value::Array(Vec::new())
}

/// A chain name usable as a file stem inside the data directory
fn is_safe_chain_name(chain: &str) -> bool {
    !chain.is_empty()
        && chain != "."
        && chain != ".."
        && !chain.contains(['/', '\\', '\0'])
}

/// Group records by lowercased `chain`; records without a string chain, or
/// whose chain cannot be a file name, are skipped
pub fn group_by_chain(pools: Vec<Value>) -> BTreeMap<String, Vec<Value>> {
    let mut groups: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    let mut skipped = 0usize;

    for pool in pools {
        match pool
            .get("chain")
            .and_then(Value::as_str)
            .map(str::to_lowercase)
            .filter(|chain| is_safe_chain_name(chain))
        {
            Some(chain) => groups.entry(chain).or_default().push(pool),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Skipped pool records without a usable chain");
    }
    groups
}

fn snapshot_path(dir: &Path, chain: &str) -> Result<PathBuf, YieldError> {
    let chain = chain.to_lowercase();
    if !is_safe_chain_name(&chain) {
        return Err(YieldError::InvalidData(format!(
            "chain name {chain:?} is not a valid file name"
        )));
    }
    Ok(dir.join(format!("{chain}.json")))
}

/// Write one file per chain, returning the paths written
pub fn write_snapshots(
    dir: &Path,
    groups: &BTreeMap<String, Vec<Value>>,
) -> Result<Vec<PathBuf>, YieldError> {
    fs::create_dir_all(dir).map_err(|e| YieldError::io(dir, e))?;

    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    let mut written = Vec::with_capacity(groups.len());

    for (chain, protocols) in groups {
        let snapshot = ChainSnapshot {
            timestamp: Some(timestamp.clone()),
            chain: chain.clone(),
            protocols: Value::Array(protocols.clone()),
            count: protocols.len(),
        };

        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        snapshot.serialize(&mut ser)?;

        let path = snapshot_path(dir, chain)?;
        fs::write(&path, &buf).map_err(|e| YieldError::io(&path, e))?;
        tracing::info!(chain = %chain, path = %path.display(), count = protocols.len(), "Chain data saved");
        written.push(path);
    }

    Ok(written)
}

/// Loads `<chain>.json`, matching the file stem case-insensitively when the
/// lowercase file is absent
pub fn load_chain_data(dir: &Path, chain: &str) -> Result<ChainSnapshot, YieldError> {
    let mut path = snapshot_path(dir, chain)?;
    if !path.is_file() {
        path = find_by_stem(dir, &chain.to_lowercase())?
            .ok_or_else(|| YieldError::NoData(chain.to_string()))?;
    }

    let raw = fs::read_to_string(&path).map_err(|e| YieldError::io(&path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

fn find_by_stem(dir: &Path, chain: &str) -> Result<Option<PathBuf>, YieldError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(YieldError::io(dir, e)),
    };

    for entry in entries {
        let path = entry.map_err(|e| YieldError::io(dir, e))?.path();
        let matches = path.extension().and_then(|e| e.to_str()) == Some("json")
            && path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| stem.to_lowercase() == chain);
        if matches && path.is_file() {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Lowercased chain names with a snapshot file in `dir`, sorted and
/// deduplicated; a missing directory has none
pub fn available_chains(dir: &Path) -> Result<Vec<String>, YieldError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(YieldError::io(dir, e)),
    };

    let mut chains = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| YieldError::io(dir, e))?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            chains.push(stem.to_lowercase());
        }
    }
    chains.sort();
    chains.dedup();
    Ok(chains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_group_by_chain_lowercases_and_skips() {
        let groups = group_by_chain(vec![
            json!({"chain": "Ethereum", "project": "aave"}),
            json!({"chain": "ethereum", "project": "lido"}),
            json!({"chain": "Solana", "project": "marinade"}),
            json!({"project": "orphan"}),
            json!({"chain": 7, "project": "numeric"}),
        ]);

        assert_eq!(groups.keys().collect::<Vec<_>>(), ["ethereum", "solana"]);
        assert_eq!(groups["ethereum"].len(), 2);
        // raw records keep their original casing
        assert_eq!(groups["ethereum"][0]["chain"], "Ethereum");
    }

    #[test]
    fn test_write_then_load_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let groups = group_by_chain(vec![
            json!({"chain": "Solana", "apyBase": 4.2}),
            json!({"chain": "Solana", "apyBase": 7.0}),
        ]);

        let written = write_snapshots(dir.path(), &groups).unwrap();
        assert_eq!(written, vec![dir.path().join("solana.json")]);

        let raw = fs::read_to_string(&written[0]).unwrap();
        assert!(raw.contains("\n    \"timestamp\""));

        let snapshot = load_chain_data(dir.path(), "SOLANA").unwrap();
        assert_eq!(snapshot.chain, "solana");
        assert_eq!(snapshot.count, 2);
        let stamp = snapshot.timestamp.unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn test_write_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let first = group_by_chain(vec![json!({"chain": "base"}), json!({"chain": "base"})]);
        write_snapshots(dir.path(), &first).unwrap();

        let second = group_by_chain(vec![json!({"chain": "base"})]);
        write_snapshots(dir.path(), &second).unwrap();

        assert_eq!(load_chain_data(dir.path(), "base").unwrap().count, 1);
    }

    #[test]
    fn test_missing_chain_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_chain_data(dir.path(), "arbitrum").unwrap_err();
        assert!(matches!(err, YieldError::NoData(ref c) if c == "arbitrum"));
        assert_eq!(err.to_string(), "No data found for chain: arbitrum");
    }

    #[test]
    fn test_unsafe_chain_names_never_reach_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let groups = group_by_chain(vec![
            json!({"chain": "../escape"}),
            json!({"chain": "a/b"}),
            json!({"chain": ".."}),
            json!({"chain": ""}),
            json!({"chain": "Base"}),
        ]);
        assert_eq!(groups.keys().collect::<Vec<_>>(), ["base"]);

        write_snapshots(dir.path(), &groups).unwrap();
        assert!(!dir.path().parent().unwrap().join("escape.json").exists());

        let err = load_chain_data(dir.path(), "../base").unwrap_err();
        assert!(matches!(err, YieldError::InvalidData(_)));
    }

    #[test]
    fn test_uppercase_file_stem_is_listed_and_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let groups = group_by_chain(vec![json!({"chain": "solana"})]);
        write_snapshots(dir.path(), &groups).unwrap();
        fs::rename(dir.path().join("solana.json"), dir.path().join("Solana.json")).unwrap();

        assert_eq!(available_chains(dir.path()).unwrap(), ["solana"]);
        let snapshot = load_chain_data(dir.path(), "solana").unwrap();
        assert_eq!(snapshot.count, 1);
    }

    #[test]
    fn test_available_chains() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("solana.json"), "{}").unwrap();
        fs::write(dir.path().join("ethereum.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        assert_eq!(available_chains(dir.path()).unwrap(), ["ethereum", "solana"]);
        assert!(available_chains(&dir.path().join("missing"))
            .unwrap()
            .is_empty());
    }
}
