//! Local-order tables: (k, p) → c_p.
//!
//! A table for one k lives in `<dir>/k{K}.json`:
//!
//! ```json
//! { "k": 2, "cp": { "3": 13, "7": 48 } }
//! ```
//!
//! Keys are primes as decimal strings; values are positive integers, either
//! as JSON numbers or as decimal strings when they do not fit in 64 bits.
//! A missing document is an empty table.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use serde_json::{Map, Value};

use crate::error::{Result, SplitLiftError};
use crate::report::{big_json, bigint_json};

/// Read-only source of local order constants for a fixed k.
pub trait LocalOrders {
    /// c_p for prime `p`, if the table has one.
    fn local_order(&self, p: &BigUint) -> Option<&BigUint>;
}

/// In-memory table for one k, ordered by prime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpMap {
    entries: BTreeMap<BigUint, BigUint>,
}

impl CpMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, p: BigUint, c_p: BigUint) -> Option<BigUint> {
        self.entries.insert(p, c_p)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending prime order.
    pub fn iter(&self) -> impl Iterator<Item = (&BigUint, &BigUint)> {
        self.entries.iter()
    }

    /// JSON document for this table.
    pub fn to_document(&self, k: &BigInt) -> Value {
        let cp: Map<String, Value> = self
            .entries
            .iter()
            .map(|(p, c)| (p.to_string(), big_json(c)))
            .collect();
        let mut doc = Map::new();
        doc.insert("k".to_string(), bigint_json(k));
        doc.insert("cp".to_string(), Value::Object(cp));
        Value::Object(doc)
    }
}

impl LocalOrders for CpMap {
    fn local_order(&self, p: &BigUint) -> Option<&BigUint> {
        self.entries.get(p)
    }
}

impl FromIterator<(BigUint, BigUint)> for CpMap {
    fn from_iter<I: IntoIterator<Item = (BigUint, BigUint)>>(iter: I) -> Self {
        CpMap {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Location of the table document for `k` under `dir`.
pub fn table_path(dir: &Path, k: &BigInt) -> PathBuf {
    dir.join(format!("k{}.json", k))
}

/// Load the table for `k` from `dir`. Absent file ⇒ empty table.
pub fn load_cp_map(dir: &Path, k: &BigInt) -> Result<CpMap> {
    let path = table_path(dir, k);
    if !path.exists() {
        log::debug!("No order table at {}, using empty table", path.display());
        return Ok(CpMap::new());
    }
    let text = fs::read_to_string(&path)?;
    let map = parse_cp_map(&text, &path)?;
    log::debug!("Loaded {} local orders from {}", map.len(), path.display());
    Ok(map)
}

/// Parse a table document. A document without a `cp` object is empty.
pub fn parse_cp_map(text: &str, path: &Path) -> Result<CpMap> {
    let data: Value = serde_json::from_str(text).map_err(|source| SplitLiftError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let Some(cp) = data.get("cp").and_then(Value::as_object) else {
        return Ok(CpMap::new());
    };

    let mut map = CpMap::new();
    for (key, value) in cp {
        let invalid = || SplitLiftError::InvalidEntry {
            path: path.to_path_buf(),
            key: key.clone(),
            value: value.to_string(),
        };
        let p: BigUint = key.trim().parse().map_err(|_| invalid())?;
        let c_p = parse_positive(value).ok_or_else(invalid)?;
        map.insert(p, c_p);
    }
    Ok(map)
}

fn parse_positive(value: &Value) -> Option<BigUint> {
    let n = match value {
        Value::Number(n) => BigUint::from(n.as_u64()?),
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    if n.is_zero() {
        None
    } else {
        Some(n)
    }
}

/// Write the table for `k` into `dir`, replacing any previous document.
pub fn save_cp_map(dir: &Path, k: &BigInt, map: &CpMap) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = table_path(dir, k);
    let json = serde_json::to_string_pretty(&map.to_document(k))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.persist(&path).map_err(|e| e.error)?;

    log::info!("Wrote {} local orders to {}", map.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_parse_numbers_and_strings() {
        let text = r#"{"k": 2, "cp": {"7": 48, "3": "13", "100000000000000000039": "123456789012345678901234"}}"#;
        let map = parse_cp_map(text, Path::new("k2.json")).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.local_order(&big(7)), Some(&big(48)));
        assert_eq!(map.local_order(&big(3)), Some(&big(13)));
        let huge: BigUint = "100000000000000000039".parse().unwrap();
        let c: BigUint = "123456789012345678901234".parse().unwrap();
        assert_eq!(map.local_order(&huge), Some(&c));
        assert_eq!(map.local_order(&big(5)), None);
    }

    #[test]
    fn test_parse_missing_cp_is_empty() {
        let map = parse_cp_map(r#"{"k": 3}"#, Path::new("k3.json")).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_entries() {
        for text in [
            r#"{"cp": {"7": 0}}"#,
            r#"{"cp": {"7": -4}}"#,
            r#"{"cp": {"seven": 4}}"#,
            r#"{"cp": {"7": [1]}}"#,
        ] {
            let err = parse_cp_map(text, Path::new("k.json")).unwrap_err();
            assert!(
                matches!(err, SplitLiftError::InvalidEntry { .. }),
                "expected InvalidEntry for {}, got {:?}",
                text,
                err
            );
        }
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = parse_cp_map("{not json", Path::new("k.json")).unwrap_err();
        assert!(matches!(err, SplitLiftError::Json { .. }));
    }

    #[test]
    fn test_absent_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let map = load_cp_map(dir.path(), &BigInt::from(5)).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let k = BigInt::from(2);
        let map: CpMap = [(big(11), big(133)), (big(3), big(13)), (big(7), big(48))]
            .into_iter()
            .collect();
        let path = save_cp_map(dir.path(), &k, &map).unwrap();
        assert_eq!(path, dir.path().join("k2.json"));

        let text = fs::read_to_string(&path).unwrap();
        // ascending numeric order of primes in the written document
        let i3 = text.find("\"3\"").unwrap();
        let i7 = text.find("\"7\"").unwrap();
        let i11 = text.find("\"11\"").unwrap();
        assert!(i3 < i7 && i7 < i11, "unexpected key order:\n{}", text);

        assert_eq!(load_cp_map(dir.path(), &k).unwrap(), map);
    }
}
