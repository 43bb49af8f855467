/// Index for the next version named after `base`
///
/// Every name starting with `base` counts; its numeric suffix is the index,
/// and a missing or non-numeric suffix counts as 0. Returns the highest index
/// plus one, or 0 when no name matches.
#[must_use]
pub fn latest_version_index<'a>(base: &str, names: impl IntoIterator<Item = &'a str>) -> u32 {
    names
        .into_iter()
        .filter_map(|name| name.strip_prefix(base))
        .map(|suffix| suffix.trim().parse::<u32>().unwrap_or(0))
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

/// Display name for a version index; index 0 is the bare base name
#[must_use]
pub fn version_name(base: &str, index: u32) -> String {
    if index == 0 {
        base.to_string()
    } else {
        format!("{base} {index}")
    }
}

#[must_use]
pub fn next_version_name<'a>(base: &str, names: impl IntoIterator<Item = &'a str>) -> String {
    version_name(base, latest_version_index(base, names))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matching_name_yields_bare_base() {
        assert_eq!(latest_version_index("Edited", ["Current", "Build Routes Snapshot"]), 0);
        assert_eq!(next_version_name("Edited", []), "Edited");
    }

    #[test]
    fn test_next_after_highest_suffix() {
        let names = ["Edited", "Edited 1", "Edited 3"];
        assert_eq!(latest_version_index("Edited", names), 4);
        assert_eq!(next_version_name("Edited", names), "Edited 4");
    }

    #[test]
    fn test_bare_base_counts_as_zero() {
        assert_eq!(next_version_name("Edited", ["Edited"]), "Edited 1");
        assert_eq!(next_version_name("Edited", ["Edited copy"]), "Edited 1");
    }

    #[test]
    fn test_version_name() {
        assert_eq!(version_name("Edited", 0), "Edited");
        assert_eq!(version_name("Edited", 2), "Edited 2");
    }
}
