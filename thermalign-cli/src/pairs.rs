//! Discovery of thermal/RGB file pairs by naming convention.
//!
//! A thermal capture `<base>_T.JPG` pairs with the RGB capture
//! `<base>_Z.JPG` from the same shutter press. Suffix matching is
//! case-insensitive; the shared prefix must match exactly.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const THERMAL_SUFFIX: &str = "_T.JPG";
const RGB_SUFFIX: &str = "_Z.JPG";

/// A matched thermal/RGB file pair sharing a common prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    pub thermal: PathBuf,
    pub rgb: PathBuf,
    /// Shared filename prefix, used to name the output files.
    pub base: String,
}

/// Scans a directory for pairs, warning about unpaired thermal files.
pub fn find_pairs(dir: &Path) -> io::Result<Vec<ImagePair>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();

    let (pairs, unpaired) = pair_names(&names);
    for name in unpaired {
        tracing::warn!(file = %name, "no matching RGB image found, skipping");
    }
    Ok(pairs
        .into_iter()
        .map(|(thermal, rgb, base)| ImagePair {
            thermal: dir.join(thermal),
            rgb: dir.join(rgb),
            base,
        })
        .collect())
}

/// Pairs thermal names with their RGB counterparts from a name list.
///
/// Returns `(thermal, rgb, base)` triples plus the thermal names that had
/// no counterpart.
fn pair_names(names: &[String]) -> (Vec<(String, String, String)>, Vec<String>) {
    let mut pairs = Vec::new();
    let mut unpaired = Vec::new();
    for name in names {
        if !has_suffix(name, THERMAL_SUFFIX) {
            continue;
        }
        let base = &name[..name.len() - THERMAL_SUFFIX.len()];
        let counterpart = names.iter().find(|candidate| {
            candidate.len() == base.len() + RGB_SUFFIX.len()
                && candidate.starts_with(base)
                && has_suffix(candidate, RGB_SUFFIX)
        });
        match counterpart {
            Some(rgb) => pairs.push((name.clone(), rgb.clone(), base.to_string())),
            None => unpaired.push(name.clone()),
        }
    }
    (pairs, unpaired)
}

/// ASCII case-insensitive suffix test, safe for non-ASCII prefixes.
fn has_suffix(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.is_char_boundary(name.len() - suffix.len())
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn matching_suffixes_are_paired() {
        let (pairs, unpaired) = pair_names(&names(&[
            "DJI_0001_T.JPG",
            "DJI_0001_Z.JPG",
            "DJI_0002_T.JPG",
            "DJI_0002_Z.JPG",
        ]));
        assert_eq!(unpaired.len(), 0);
        assert_eq!(pairs.len(), 2);
        assert_eq!(
            pairs[0],
            (
                "DJI_0001_T.JPG".to_string(),
                "DJI_0001_Z.JPG".to_string(),
                "DJI_0001".to_string()
            )
        );
    }

    #[test]
    fn suffix_matching_is_case_insensitive() {
        let (pairs, unpaired) = pair_names(&names(&["scan_t.jpg", "scan_Z.JPG"]));
        assert_eq!(unpaired.len(), 0);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].2, "scan");
    }

    #[test]
    fn thermal_without_counterpart_is_reported() {
        let (pairs, unpaired) = pair_names(&names(&["a_T.JPG", "b_T.JPG", "b_Z.JPG"]));
        assert_eq!(pairs.len(), 1);
        assert_eq!(unpaired, vec!["a_T.JPG".to_string()]);
    }

    #[test]
    fn prefix_must_match_exactly() {
        let (pairs, unpaired) = pair_names(&names(&["ab_T.JPG", "ax_Z.JPG"]));
        assert!(pairs.is_empty());
        assert_eq!(unpaired.len(), 1);
    }

    #[test]
    fn unrelated_files_are_ignored() {
        let (pairs, unpaired) = pair_names(&names(&["readme.txt", "photo.JPG"]));
        assert!(pairs.is_empty());
        assert!(unpaired.is_empty());
    }
}
