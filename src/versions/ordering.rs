use std::cmp::Ordering;

use crate::models::{Schedule, ScheduleType};

const fn display_rank(kind: ScheduleType) -> u8 {
    match kind {
        ScheduleType::Edited => 0,
        ScheduleType::Current => 1,
        ScheduleType::BuildRoutesSnapshot => 2,
    }
}

/// Display order of schedule versions
///
/// Edited versions come first, then Current, then the build snapshot.
/// Within a type newer versions come first; equal creation times are equal.
#[must_use]
pub fn compare_versions(a: &Schedule, b: &Schedule) -> Ordering {
    display_rank(a.kind)
        .cmp(&display_rank(b.kind))
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Sort versions into display order
pub fn sort_versions(versions: &mut [&Schedule]) {
    versions.sort_by(|a, b| compare_versions(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{created, day};

    fn version(name: &str, kind: ScheduleType, minutes: i64) -> Schedule {
        Schedule::new(name, day(), kind, created(minutes))
    }

    #[test]
    fn test_display_order() {
        let snapshot = version("Build Routes Snapshot", ScheduleType::BuildRoutesSnapshot, 50);
        let current = version("Current", ScheduleType::Current, 40);
        let old = version("Edited", ScheduleType::Edited, 10);
        let new = version("Edited 1", ScheduleType::Edited, 30);
        let middle = version("Edited 2", ScheduleType::Edited, 20);

        let mut versions = vec![&snapshot, &old, &current, &new, &middle];
        sort_versions(&mut versions);
        let names: Vec<&str> = versions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Edited 1", "Edited 2", "Edited", "Current", "Build Routes Snapshot"]);
    }

    #[test]
    fn test_ties_compare_equal() {
        let a = version("Edited", ScheduleType::Edited, 5);
        let b = version("Edited 1", ScheduleType::Edited, 5);
        assert_eq!(compare_versions(&a, &b), Ordering::Equal);
        let current = version("Current", ScheduleType::Current, 5);
        assert_eq!(compare_versions(&current, &a), Ordering::Greater);
    }
}
