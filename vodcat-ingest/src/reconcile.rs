//! Variation list reconciliation
//!
//! A record's `Variations` list holds one URL per stem, ordered by stem.
//! Re-delivering the same URL leaves the list as it was; a new URL for an
//! existing stem replaces the old one in place.

use std::fmt;

use vodcat_common::CatalogRecord;

use crate::stem::extract_stem;
use crate::Result;

/// Effect of a reconciliation on the variation list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// New stem appended
    Added,
    /// Existing stem now points at the new URL
    Replaced,
    /// List emptied by a reset
    Cleared,
    /// List identical to what was stored; no write needed
    Unchanged,
}

impl Change {
    /// True if the record must be written back
    pub fn needs_write(self) -> bool {
        !matches!(self, Change::Unchanged)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Change::Added => "added",
            Change::Replaced => "replaced",
            Change::Cleared => "cleared",
            Change::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge `new_url` into the record's variations
///
/// Later entries sharing the new URL's stem are dropped. Fails if the new
/// URL or any stored variation has no usable stem; the record is left
/// untouched in that case.
pub fn reconcile(record: &mut CatalogRecord, new_url: &str) -> Result<Change> {
    let new_stub = extract_stem(new_url)?;

    let mut entries = record
        .variations
        .iter()
        .map(|url| -> Result<(String, String)> { Ok((extract_stem(url)?, url.clone())) })
        .collect::<Result<Vec<_>>>()?;

    let existing = entries.iter().position(|(stub, _)| *stub == new_stub);
    match existing {
        Some(i) => {
            entries[i].1 = new_url.to_string();
            let mut index = 0;
            entries.retain(|(stub, _)| {
                let keep = index <= i || *stub != new_stub;
                index += 1;
                keep
            });
        }
        None => entries.push((new_stub, new_url.to_string())),
    }

    // Stable sort: equal stubs cannot occur after the merge above
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    let merged: Vec<String> = entries.into_iter().map(|(_, url)| url).collect();

    if merged == record.variations {
        return Ok(Change::Unchanged);
    }
    record.variations = merged;
    Ok(if existing.is_some() {
        Change::Replaced
    } else {
        Change::Added
    })
}

/// Clear every variation of the record
pub fn reset(record: &mut CatalogRecord) -> Change {
    if record.variations.is_empty() {
        return Change::Unchanged;
    }
    record.variations.clear();
    Change::Cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::{json, Map, Value};

    const BASE: &str = "https://d1.cloudfront.net/vod";

    fn url(stub: &str) -> String {
        format!("{}/{}/hls/{}.m3u8", BASE, stub, stub)
    }

    fn record(variations: &[String]) -> CatalogRecord {
        let attributes: Map<String, Value> = json!({"Number": "3"}).as_object().cloned().unwrap();
        let mut record = CatalogRecord::new("r1", attributes);
        record.variations = variations.to_vec();
        record
    }

    #[test]
    fn test_add_to_empty_list() {
        let mut r = record(&[]);
        assert_eq!(reconcile(&mut r, &url("dn3")).unwrap(), Change::Added);
        assert_eq!(r.variations, vec![url("dn3")]);
    }

    #[test]
    fn test_add_keeps_stub_order() {
        let mut r = record(&[url("dn3"), url("dn3c")]);
        assert_eq!(reconcile(&mut r, &url("dn3b")).unwrap(), Change::Added);
        assert_eq!(r.variations, vec![url("dn3"), url("dn3b"), url("dn3c")]);
    }

    #[test]
    fn test_replace_by_stub() {
        let old = "https://old.example/x/dn3b.mp4".to_string();
        let mut r = record(&[url("dn3"), old]);
        let new = "https://new.example/y/dn3b.m3u8";

        assert_eq!(reconcile(&mut r, new).unwrap(), Change::Replaced);
        assert_eq!(r.variations, vec![url("dn3"), new.to_string()]);
    }

    #[test]
    fn test_same_url_twice_is_unchanged() {
        let mut r = record(&[]);
        reconcile(&mut r, &url("dn3")).unwrap();
        let once = r.clone();

        assert_eq!(reconcile(&mut r, &url("dn3")).unwrap(), Change::Unchanged);
        assert_eq!(r, once);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let starts = [
            vec![],
            vec![url("dn3c"), url("dn3a")],
            vec![url("dn3b"), url("dn3")],
        ];
        for start in starts {
            for new in [url("dn3"), url("dn3b"), url("dn3d")] {
                let mut once = record(&start);
                reconcile(&mut once, &new).unwrap();
                let mut twice = once.clone();
                reconcile(&mut twice, &new).unwrap();
                assert_eq!(twice.variations, once.variations);
            }
        }
    }

    #[test]
    fn test_output_sorted_regardless_of_input_order() {
        let stubs = ["dn3d", "dn3", "dn3b", "dn3a"];
        let orders: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]];
        for order in orders {
            let start: Vec<String> = order.iter().map(|&i| url(stubs[i])).collect();
            let mut r = record(&start);
            reconcile(&mut r, &url("dn3c")).unwrap();

            let got: Vec<String> = r
                .variations
                .iter()
                .map(|u| extract_stem(u).unwrap())
                .collect();
            assert_eq!(got, vec!["dn3", "dn3a", "dn3b", "dn3c", "dn3d"]);
        }
    }

    #[test]
    fn test_resorting_stored_list_counts_as_change() {
        let mut r = record(&[url("dn3b"), url("dn3")]);
        assert_eq!(reconcile(&mut r, &url("dn3")).unwrap(), Change::Replaced);
        assert_eq!(r.variations, vec![url("dn3"), url("dn3b")]);
    }

    #[test]
    fn test_duplicate_stubs_collapse() {
        let mut r = record(&[
            "https://a.example/dn3.mp4".to_string(),
            "https://b.example/dn3.mp4".to_string(),
        ]);
        assert_eq!(reconcile(&mut r, &url("dn3")).unwrap(), Change::Replaced);
        assert_eq!(r.variations, vec![url("dn3")]);
    }

    #[test]
    fn test_malformed_urls_leave_record_untouched() {
        let mut r = record(&[url("dn3")]);
        assert!(matches!(reconcile(&mut r, "https://host/"), Err(Error::MalformedUrl(_))));
        assert_eq!(r.variations, vec![url("dn3")]);

        let mut r = record(&["not a url".to_string()]);
        assert!(matches!(reconcile(&mut r, &url("dn3")), Err(Error::MalformedUrl(_))));
        assert_eq!(r.variations, vec!["not a url".to_string()]);
    }

    #[test]
    fn test_reset() {
        let mut r = record(&[url("dn3"), url("dn3b")]);
        assert_eq!(reset(&mut r), Change::Cleared);
        assert!(r.variations.is_empty());

        assert_eq!(reset(&mut r), Change::Unchanged);
        assert!(!Change::Unchanged.needs_write());
        assert!(Change::Cleared.needs_write());
    }
}
