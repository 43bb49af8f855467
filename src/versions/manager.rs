use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;

use super::{next_version_name, sort_versions};
use crate::error::VersionError;
use crate::models::{
    OrderId, Project, Route, Schedule, ScheduleId, ScheduleType, UnassignedOrders, UserSettings,
};
use crate::storage::ProjectStore;

/// Creates, commits, renames and deletes schedule versions
///
/// Every operation works on a copy of the project and replaces the caller's
/// project only once the store accepted the copy. A failed save therefore
/// leaves the project, and its one-Current-per-day rule, as it was.
#[derive(Debug, Clone)]
pub struct VersionManager {
    edited_base: String,
    current_name: String,
    snapshot_name: String,
}

impl VersionManager {
    #[must_use]
    pub fn new(settings: &UserSettings) -> Self {
        Self {
            edited_base: settings.edited_version_base_name.clone(),
            current_name: settings.current_version_name.clone(),
            snapshot_name: settings.snapshot_version_name.clone(),
        }
    }

    /// Versions of `date` in display order
    #[must_use]
    pub fn versions_on<'a>(&self, project: &'a Project, date: NaiveDate) -> Vec<&'a Schedule> {
        let mut versions: Vec<&Schedule> = project.schedules_on(date).collect();
        sort_versions(&mut versions);
        versions
    }

    /// Clone `source` as a new Edited version
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown source and `SaveFailure` if the store refuses the result
    pub fn create_version<S: ProjectStore + ?Sized>(
        &self,
        project: &mut Project,
        store: &mut S,
        source: ScheduleId,
        now: DateTime<Utc>,
    ) -> Result<ScheduleId, VersionError> {
        let original = project.schedule(source).ok_or(VersionError::NotFound(source))?;
        let name = next_version_name(
            &self.edited_base,
            project.schedules_on(original.planned_date).map(|s| s.name.as_str()),
        );
        let copy = original.clone_as(name, ScheduleType::Edited, now);

        let mut staged = project.clone();
        let id = staged.add_schedule(copy);
        persist(project, store, staged)?;
        log::info!("Created schedule version {id}");
        Ok(id)
    }

    /// Make a copy of `source` the only Current schedule of its day
    ///
    /// Committing a schedule that already is Current changes nothing.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown source and `SaveFailure` if the store refuses the result
    pub fn commit_to_current<S: ProjectStore + ?Sized>(
        &self,
        project: &mut Project,
        store: &mut S,
        source: ScheduleId,
        now: DateTime<Utc>,
    ) -> Result<ScheduleId, VersionError> {
        let original = project.schedule(source).ok_or(VersionError::NotFound(source))?;
        if original.kind == ScheduleType::Current {
            return Ok(source);
        }
        let copy = original.clone_as(self.current_name.clone(), ScheduleType::Current, now);

        let mut staged = project.clone();
        let id = self.install_current(&mut staged, copy);
        persist(project, store, staged)?;
        log::info!("Committed schedule {source} as current schedule {id}");
        Ok(id)
    }

    /// Delete an Edited version; returns the day's Current schedule to select next
    ///
    /// Callers must stop presenting the schedule before deleting it.
    ///
    /// # Errors
    /// Returns `NotFound`, `Immutable` for non-Edited versions, or `SaveFailure`
    pub fn delete_version<S: ProjectStore + ?Sized>(
        &self,
        project: &mut Project,
        store: &mut S,
        id: ScheduleId,
    ) -> Result<Option<ScheduleId>, VersionError> {
        let schedule = project.schedule(id).ok_or(VersionError::NotFound(id))?;
        check_editable(schedule)?;
        let date = schedule.planned_date;

        let mut staged = project.clone();
        staged.dispose_unassigned(id);
        staged.remove_schedule(id);
        let current = staged.current_schedule(date).map(|s| s.id);
        persist(project, store, staged)?;
        log::info!("Deleted schedule version {id}");
        Ok(current)
    }

    /// # Errors
    /// Returns `NotFound`, `Immutable` for non-Edited versions, `InvalidName`
    /// for a blank name, or `SaveFailure`
    pub fn rename_version<S: ProjectStore + ?Sized>(
        &self,
        project: &mut Project,
        store: &mut S,
        id: ScheduleId,
        name: &str,
    ) -> Result<(), VersionError> {
        let schedule = project.schedule(id).ok_or(VersionError::NotFound(id))?;
        check_editable(schedule)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(VersionError::InvalidName(name.to_string()));
        }

        let mut staged = project.clone();
        staged.rename_schedule(id, name);
        persist(project, store, staged)
    }

    /// The Current schedule of `date`, created empty if the day has none
    ///
    /// # Errors
    /// Returns `SaveFailure` if a new schedule could not be saved
    pub fn ensure_current<S: ProjectStore + ?Sized>(
        &self,
        project: &mut Project,
        store: &mut S,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<ScheduleId, VersionError> {
        if let Some(current) = project.current_schedule(date) {
            return Ok(current.id);
        }

        let mut schedule = Schedule::new(self.current_name.clone(), date, ScheduleType::Current, now);
        schedule.unassigned = Some(UnassignedOrders::new(project.orders_on(date).map(|o| o.id)));

        let mut staged = project.clone();
        let id = staged.add_schedule(schedule);
        persist(project, store, staged)?;
        log::info!("Created current schedule {id} for {date}");
        Ok(id)
    }

    /// Store a solver result as the day's build snapshot and commit it as Current
    ///
    /// A previous snapshot of the day is replaced. Returns the new Current schedule.
    ///
    /// # Errors
    /// Returns `SaveFailure` if the store refuses the result
    pub fn record_build_snapshot<S: ProjectStore + ?Sized>(
        &self,
        project: &mut Project,
        store: &mut S,
        date: NaiveDate,
        routes: Vec<Route>,
        now: DateTime<Utc>,
    ) -> Result<ScheduleId, VersionError> {
        let routed: HashSet<OrderId> = routes
            .iter()
            .flat_map(|route| route.stops.iter())
            .filter_map(|stop| stop.object.order())
            .collect();
        let mut snapshot = Schedule::new(
            self.snapshot_name.clone(),
            date,
            ScheduleType::BuildRoutesSnapshot,
            now,
        );
        snapshot.routes = routes;
        snapshot.unassigned = Some(UnassignedOrders::new(
            project
                .orders_on(date)
                .map(|o| o.id)
                .filter(|id| !routed.contains(id)),
        ));
        let current = snapshot.clone_as(self.current_name.clone(), ScheduleType::Current, now);

        let mut staged = project.clone();
        remove_all(&mut staged, date, ScheduleType::BuildRoutesSnapshot);
        staged.add_schedule(snapshot);
        let id = self.install_current(&mut staged, current);
        persist(project, store, staged)?;
        log::info!("Recorded build snapshot for {date}, current schedule is {id}");
        Ok(id)
    }

    /// Replace every Current schedule of the copy's day with `copy`
    fn install_current(&self, staged: &mut Project, copy: Schedule) -> ScheduleId {
        debug_assert_eq!(copy.kind, ScheduleType::Current);
        debug_assert_eq!(copy.name, self.current_name);
        remove_all(staged, copy.planned_date, ScheduleType::Current);
        staged.add_schedule(copy)
    }
}

fn check_editable(schedule: &Schedule) -> Result<(), VersionError> {
    if schedule.kind.is_user_editable() {
        Ok(())
    } else {
        Err(VersionError::Immutable {
            name: schedule.name.clone(),
            kind: schedule.kind,
        })
    }
}

fn remove_all(project: &mut Project, date: NaiveDate, kind: ScheduleType) {
    let doomed: Vec<ScheduleId> = project
        .schedules_on(date)
        .filter(|s| s.kind == kind)
        .map(|s| s.id)
        .collect();
    for id in doomed {
        project.dispose_unassigned(id);
        project.remove_schedule(id);
    }
}

/// Save the staged project and adopt it
fn persist<S: ProjectStore + ?Sized>(
    project: &mut Project,
    store: &mut S,
    staged: Project,
) -> Result<(), VersionError> {
    if let Err(err) = store.save(&staged) {
        log::error!("Failed to save schedule change: {err}");
        return Err(err.into());
    }
    *project = staged;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{created, scenario, Scenario};
    use crate::models::Stop;
    use crate::storage::MemoryStore;
    use chrono::Duration;

    fn manager() -> VersionManager {
        VersionManager::new(&UserSettings::default())
    }

    fn count(s: &Scenario, kind: ScheduleType) -> usize {
        s.project.schedules_on(s.day).filter(|sc| sc.kind == kind).count()
    }

    #[test]
    fn test_create_version_clones_with_next_name() {
        let mut s = scenario();
        let mut store = MemoryStore::new();
        let vm = manager();

        let first = vm
            .create_version(&mut s.project, &mut store, s.schedule, created(10))
            .expect("version created");
        let second = vm
            .create_version(&mut s.project, &mut store, first, created(11))
            .expect("version created");

        let first = s.project.schedule(first).expect("stored");
        let second = s.project.schedule(second).expect("stored");
        assert_eq!(first.name, "Edited");
        assert_eq!(second.name, "Edited 1");
        assert_eq!(first.kind, ScheduleType::Edited);
        assert_eq!(first.routes.len(), 2);
        assert!(first.route(s.r1).is_none());
        assert_eq!(first.unassigned_orders().count(), 3);
        assert_eq!(store.save_count(), 2);
    }

    #[test]
    fn test_repeated_commits_keep_one_current() {
        let mut s = scenario();
        let mut store = MemoryStore::new();
        let vm = manager();
        let edited = vm
            .create_version(&mut s.project, &mut store, s.schedule, created(10))
            .expect("version created");

        let mut current = s.schedule;
        for minute in 20..24 {
            current = vm
                .commit_to_current(&mut s.project, &mut store, edited, created(minute))
                .expect("commit succeeds");
            assert_eq!(count(&s, ScheduleType::Current), 1);
        }
        let stored = s.project.current_schedule(s.day).expect("current exists");
        assert_eq!(stored.id, current);
        assert_eq!(stored.name, "Current");
        assert!(s.project.schedule(edited).is_some());
    }

    #[test]
    fn test_commit_of_current_is_noop() {
        let mut s = scenario();
        let mut store = MemoryStore::new();
        let id = manager()
            .commit_to_current(&mut s.project, &mut store, s.schedule, created(5))
            .expect("commit succeeds");
        assert_eq!(id, s.schedule);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_failed_commit_leaves_project_untouched() {
        let mut s = scenario();
        let mut store = MemoryStore::new();
        let vm = manager();
        let edited = vm
            .create_version(&mut s.project, &mut store, s.schedule, created(10))
            .expect("version created");
        s.project.drain_events();

        store.fail_next_saves(1);
        let result = vm.commit_to_current(&mut s.project, &mut store, edited, created(20));
        assert!(matches!(result, Err(VersionError::SaveFailure(_))));
        assert_eq!(s.project.current_schedule(s.day).map(|c| c.id), Some(s.schedule));
        assert_eq!(count(&s, ScheduleType::Current), 1);
        assert!(!s.project.has_pending_events());
    }

    #[test]
    fn test_delete_only_edited() {
        let mut s = scenario();
        let mut store = MemoryStore::new();
        let vm = manager();
        let edited = vm
            .create_version(&mut s.project, &mut store, s.schedule, created(10))
            .expect("version created");

        assert!(matches!(
            vm.delete_version(&mut s.project, &mut store, s.schedule),
            Err(VersionError::Immutable { kind: ScheduleType::Current, .. })
        ));
        let next = vm
            .delete_version(&mut s.project, &mut store, edited)
            .expect("edited versions can be deleted");
        assert_eq!(next, Some(s.schedule));
        assert!(s.project.schedule(edited).is_none());
        assert!(matches!(
            vm.delete_version(&mut s.project, &mut store, edited),
            Err(VersionError::NotFound(_))
        ));
    }

    #[test]
    fn test_rename_rules() {
        let mut s = scenario();
        let mut store = MemoryStore::new();
        let vm = manager();
        let edited = vm
            .create_version(&mut s.project, &mut store, s.schedule, created(10))
            .expect("version created");

        vm.rename_version(&mut s.project, &mut store, edited, "  Evening plan ")
            .expect("rename allowed");
        assert_eq!(s.project.schedule(edited).map(|sc| sc.name.as_str()), Some("Evening plan"));
        assert!(matches!(
            vm.rename_version(&mut s.project, &mut store, edited, "   "),
            Err(VersionError::InvalidName(_))
        ));
        assert!(matches!(
            vm.rename_version(&mut s.project, &mut store, s.schedule, "Other"),
            Err(VersionError::Immutable { .. })
        ));
    }

    #[test]
    fn test_ensure_current_creates_missing_day() {
        let mut s = scenario();
        let mut store = MemoryStore::new();
        let vm = manager();
        assert_eq!(
            vm.ensure_current(&mut s.project, &mut store, s.day, created(1)).expect("exists"),
            s.schedule
        );

        let tomorrow = s.day.succ_opt().expect("valid date");
        let order = s.project.add_order(crate::models::Order::new("Tomorrow", Some(tomorrow)));
        let id = vm
            .ensure_current(&mut s.project, &mut store, tomorrow, created(2))
            .expect("created");
        let schedule = s.project.schedule(id).expect("stored");
        assert_eq!(schedule.kind, ScheduleType::Current);
        assert!(schedule.is_unassigned(order));
    }

    #[test]
    fn test_record_build_snapshot_replaces_previous() {
        let mut s = scenario();
        let mut store = MemoryStore::new();
        let vm = manager();

        let mut route = Route::new("Solved", "#911EB4", created(30));
        route.stops.push(Stop::for_order(s.unassigned[0], Duration::minutes(10)));
        vm.record_build_snapshot(&mut s.project, &mut store, s.day, vec![route.clone()], created(30))
            .expect("recorded");
        let current = vm
            .record_build_snapshot(&mut s.project, &mut store, s.day, vec![route], created(40))
            .expect("recorded");

        assert_eq!(count(&s, ScheduleType::BuildRoutesSnapshot), 1);
        assert_eq!(count(&s, ScheduleType::Current), 1);
        let current = s.project.schedule(current).expect("stored");
        assert_eq!(current.routes.len(), 1);
        assert!(!current.is_unassigned(s.unassigned[0]));
        assert!(current.is_unassigned(s.unassigned[1]));

        let versions = vm.versions_on(&s.project, s.day);
        assert_eq!(versions.last().map(|v| v.kind), Some(ScheduleType::BuildRoutesSnapshot));
    }
}
