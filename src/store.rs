//! Per-date plan cache and its synchronization with the plan service.
//!
//! Every operation comes in two halves. `begin_*` validates and records the
//! request; the caller sends it to the backend (inline, or on the worker
//! thread) and hands the answer to the matching `finish_*`, which commits it
//! to the cache. The plain `load_day`/`create`/`update`/`remove` methods run
//! both halves inline against a backend.
//!
//! Cache contract:
//! - only the selected date is cached; selecting another date drops the rest
//!   and marks the new date for refetch
//! - a failed load keeps whatever was cached for that date
//! - a failed mutation leaves the cache untouched, nothing is inserted
//!   optimistically
//! - a load answer for a date or generation that is no longer current is
//!   discarded
//! - every acknowledged mutation is followed by a full reload of its date

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::io::{PlanBackend, TransportError};
use crate::model::{Category, PlanDraft, PlanId, PlanItem, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("no plan with id {0} on this day")]
    UnknownPlan(PlanId),
    #[error("plan has not been saved yet")]
    NotSaved,
    #[error("another change is still being saved")]
    Busy,
    #[error("plan is for {draft}, but {viewing} is being viewed")]
    OtherDay { draft: NaiveDate, viewing: NaiveDate },
}

/// Identifies one load request so late answers can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub date: NaiveDate,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The answer replaced the cache; carries the number of plans.
    Applied(usize),
    /// The answer belonged to a superseded request and was dropped.
    Stale,
}

/// A mutation waiting for the backend's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingChange {
    Create(PlanItem),
    Update(PlanItem),
    Remove { date: NaiveDate, id: PlanId },
}

impl PendingChange {
    pub fn date(&self) -> NaiveDate {
        match self {
            PendingChange::Create(item) | PendingChange::Update(item) => item.date,
            PendingChange::Remove { date, .. } => *date,
        }
    }
}

#[derive(Debug)]
pub struct PlanStore {
    selected: NaiveDate,
    cache: HashMap<NaiveDate, Vec<PlanItem>>,
    generation: u64,
    loading: Option<LoadTicket>,
    needs_refresh: bool,
    pending: Option<PendingChange>,
    last_error: Option<TransportError>,
}

impl PlanStore {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            selected: date,
            cache: HashMap::new(),
            generation: 0,
            loading: None,
            needs_refresh: true,
            pending: None,
            last_error: None,
        }
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected
    }

    /// Plans cached for the selected date, in backend order.
    pub fn items(&self) -> &[PlanItem] {
        self.cache.get(&self.selected).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, id: &PlanId) -> Option<&PlanItem> {
        self.items().iter().find(|p| &p.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    /// True while a mutation is outstanding; the view disables saving.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    pub fn last_error(&self) -> Option<&TransportError> {
        self.last_error.as_ref()
    }

    /// Plan counts per category for the selected date, in legend order,
    /// leaving out categories with no plans.
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .iter()
            .map(|&c| (c, self.items().iter().filter(|p| p.category == c).count()))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    /// Switch the selected date. Cached plans of other dates are dropped and
    /// any in-flight load becomes stale.
    pub fn select(&mut self, date: NaiveDate) {
        if date == self.selected {
            return;
        }
        tracing::debug!(%date, "select day");
        self.selected = date;
        self.cache.retain(|d, _| *d == date);
        self.generation += 1;
        self.loading = None;
        self.needs_refresh = true;
    }

    // ── Load ────────────────────────────────────────────────────────────

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        let ticket = LoadTicket {
            date: self.selected,
            generation: self.generation,
        };
        self.loading = Some(ticket);
        self.needs_refresh = false;
        ticket
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<PlanItem>, TransportError>,
    ) -> Result<LoadOutcome, PlanError> {
        if ticket.date != self.selected || ticket.generation != self.generation {
            tracing::debug!(date = %ticket.date, "dropping stale load answer");
            return Ok(LoadOutcome::Stale);
        }
        self.loading = None;
        match result {
            Ok(mut items) => {
                // Guard against a backend that ignores the date filter.
                items.retain(|p| p.date == ticket.date);
                let count = items.len();
                self.cache.insert(ticket.date, items);
                self.last_error = None;
                tracing::debug!(date = %ticket.date, count, "day loaded");
                Ok(LoadOutcome::Applied(count))
            }
            Err(e) => {
                tracing::warn!(date = %ticket.date, error = %e, "loading day failed, keeping cached plans");
                self.last_error = Some(e.clone());
                Err(e.into())
            }
        }
    }

    /// Fetch `date` from the backend, selecting it first if needed.
    pub fn load_day(&mut self, backend: &dyn PlanBackend, date: NaiveDate) -> Result<&[PlanItem], PlanError> {
        self.select(date);
        let ticket = self.begin_load();
        let result = backend.fetch_day(date);
        self.finish_load(ticket, result)?;
        Ok(self.items())
    }

    // ── Create ──────────────────────────────────────────────────────────

    /// Validate a new plan and assign its id. Returns the record to send.
    pub fn begin_create(&mut self, draft: &PlanDraft) -> Result<PlanItem, PlanError> {
        self.ensure_idle()?;
        let validated = draft.validate()?;
        if validated.item.date != self.selected {
            return Err(PlanError::OtherDay {
                draft: validated.item.date,
                viewing: self.selected,
            });
        }
        let id = validated.id.clone().unwrap_or_else(PlanId::generate);
        let item = validated.into_item(id);
        self.pending = Some(PendingChange::Create(item.clone()));
        Ok(item)
    }

    pub fn finish_create(&mut self, result: Result<PlanItem, TransportError>) -> Result<PlanItem, PlanError> {
        self.pending = None;
        let created = result.map_err(|e| {
            tracing::warn!(error = %e, "creating plan failed");
            e
        })?;
        if let Some(items) = self.cache.get_mut(&created.date) {
            items.push(created.clone());
        } else if created.date == self.selected {
            self.cache.insert(created.date, vec![created.clone()]);
        }
        self.mark_refresh(created.date);
        tracing::info!(id = %created.id, date = %created.date, "plan created");
        Ok(created)
    }

    pub fn create(&mut self, backend: &dyn PlanBackend, draft: &PlanDraft) -> Result<PlanItem, PlanError> {
        let item = self.begin_create(draft)?;
        let result = backend.create(&item);
        let created = self.finish_create(result)?;
        self.refresh(backend);
        Ok(created)
    }

    // ── Update ──────────────────────────────────────────────────────────

    /// Validate an edit of a cached plan. Returns the replacement to send.
    pub fn begin_update(&mut self, draft: &PlanDraft) -> Result<PlanItem, PlanError> {
        self.ensure_idle()?;
        let validated = draft.validate()?;
        let id = validated.id.clone().ok_or(PlanError::NotSaved)?;
        let existing = self.get(&id).ok_or_else(|| PlanError::UnknownPlan(id.clone()))?;
        if existing.date != validated.item.date {
            return Err(ValidationError::DateChanged.into());
        }
        let item = validated.into_item(id);
        self.pending = Some(PendingChange::Update(item.clone()));
        Ok(item)
    }

    pub fn finish_update(&mut self, result: Result<PlanItem, TransportError>) -> Result<PlanItem, PlanError> {
        self.pending = None;
        let updated = result.map_err(|e| {
            tracing::warn!(error = %e, "updating plan failed, cache unchanged");
            e
        })?;
        if let Some(slot) = self
            .cache
            .get_mut(&updated.date)
            .and_then(|items| items.iter_mut().find(|p| p.id == updated.id))
        {
            *slot = updated.clone();
        }
        self.mark_refresh(updated.date);
        tracing::info!(id = %updated.id, "plan updated");
        Ok(updated)
    }

    pub fn update(&mut self, backend: &dyn PlanBackend, draft: &PlanDraft) -> Result<PlanItem, PlanError> {
        let item = self.begin_update(draft)?;
        let result = backend.update(&item);
        let updated = self.finish_update(result)?;
        self.refresh(backend);
        Ok(updated)
    }

    // ── Remove ──────────────────────────────────────────────────────────

    pub fn begin_remove(&mut self, id: &PlanId) -> Result<PendingChange, PlanError> {
        self.ensure_idle()?;
        let existing = self.get(id).ok_or_else(|| PlanError::UnknownPlan(id.clone()))?;
        let change = PendingChange::Remove {
            date: existing.date,
            id: id.clone(),
        };
        self.pending = Some(change.clone());
        Ok(change)
    }

    pub fn finish_remove(
        &mut self,
        date: NaiveDate,
        id: &PlanId,
        result: Result<(), TransportError>,
    ) -> Result<(), PlanError> {
        self.pending = None;
        result.map_err(|e| {
            tracing::warn!(%id, error = %e, "deleting plan failed, cache unchanged");
            e
        })?;
        if let Some(items) = self.cache.get_mut(&date) {
            items.retain(|p| &p.id != id);
        }
        self.mark_refresh(date);
        tracing::info!(%id, "plan deleted");
        Ok(())
    }

    pub fn remove(&mut self, backend: &dyn PlanBackend, id: &PlanId) -> Result<(), PlanError> {
        let change = self.begin_remove(id)?;
        let result = backend.delete(id);
        self.finish_remove(change.date(), id, result)?;
        self.refresh(backend);
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn ensure_idle(&self) -> Result<(), PlanError> {
        if self.pending.is_some() {
            Err(PlanError::Busy)
        } else {
            Ok(())
        }
    }

    fn mark_refresh(&mut self, date: NaiveDate) {
        if date == self.selected {
            self.needs_refresh = true;
        }
    }

    /// Reload the selected date after a mutation. A failure here does not
    /// undo the mutation; it is logged and kept in `last_error`.
    fn refresh(&mut self, backend: &dyn PlanBackend) {
        if !self.needs_refresh {
            return;
        }
        let ticket = self.begin_load();
        let result = backend.fetch_day(ticket.date);
        if let Err(e) = self.finish_load(ticket, result) {
            tracing::warn!(error = %e, "refresh after change failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryBackend;
    use crate::model::TimeOfDay;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn draft(date: NaiveDate, title: &str, start: &str, end: &str) -> PlanDraft {
        let mut d = PlanDraft::new(date, t(start), t(end));
        d.title = title.into();
        d
    }

    fn seeded() -> (MemoryBackend, PlanStore, PlanItem) {
        let backend = MemoryBackend::new();
        let mut store = PlanStore::new(day(1));
        store.load_day(&backend, day(1)).unwrap();
        let item = store.create(&backend, &draft(day(1), "Review", "09:00", "10:00")).unwrap();
        (backend, store, item)
    }

    #[test]
    fn create_assigns_id_and_refreshes() {
        let (backend, store, item) = seeded();
        assert!(!item.id.as_str().is_empty());
        assert_eq!(store.items(), &[item.clone()]);
        assert_eq!(backend.stored(day(1)), vec![item]);
        // load, create, refresh
        assert_eq!(backend.calls(), 3);
        assert!(!store.needs_refresh());
        assert!(!store.is_busy());
    }

    #[test]
    fn create_keeps_caller_supplied_id() {
        let backend = MemoryBackend::new();
        let mut store = PlanStore::new(day(1));
        let mut d = draft(day(1), "Gym", "18:00", "19:00");
        d.id = Some(PlanId::from("fixed"));
        let item = store.create(&backend, &d).unwrap();
        assert_eq!(item.id, PlanId::from("fixed"));
    }

    #[test]
    fn empty_title_never_reaches_the_backend() {
        let backend = MemoryBackend::new();
        let mut store = PlanStore::new(day(1));
        let result = store.create(&backend, &draft(day(1), "", "09:00", "10:00"));
        assert_eq!(result, Err(PlanError::Validation(ValidationError::MissingTitle)));
        assert_eq!(backend.calls(), 0);
        assert!(!store.is_busy());
    }

    #[test]
    fn inverted_range_is_rejected_on_create_and_update() {
        let (backend, mut store, item) = seeded();
        let calls = backend.calls();

        let bad = draft(day(1), "Late", "10:00", "10:00");
        assert!(matches!(
            store.create(&backend, &bad),
            Err(PlanError::Validation(ValidationError::EmptyRange { .. }))
        ));

        let mut edit = PlanDraft::from(&item);
        edit.end_time = Some(t("08:00"));
        assert!(matches!(
            store.update(&backend, &edit),
            Err(PlanError::Validation(ValidationError::EmptyRange { .. }))
        ));
        assert_eq!(backend.calls(), calls);
    }

    #[test]
    fn draft_from_a_day_no_longer_viewed_is_refused() {
        let backend = MemoryBackend::new();
        let mut store = PlanStore::new(day(1));
        let mut stale = crate::controller::TimelineController::new().on_canvas_click(day(1), 540.0);
        stale.title = "Standup".into();

        store.load_day(&backend, day(2)).unwrap();
        let calls = backend.calls();
        assert_eq!(
            store.create(&backend, &stale),
            Err(PlanError::OtherDay {
                draft: day(1),
                viewing: day(2),
            })
        );
        assert_eq!(backend.calls(), calls);
        assert!(backend.stored(day(1)).is_empty());
        assert!(!store.is_busy());
    }

    #[test]
    fn failed_create_inserts_nothing() {
        let backend = MemoryBackend::new();
        let mut store = PlanStore::new(day(1));
        store.load_day(&backend, day(1)).unwrap();
        backend.fail_next(TransportError::Network("offline".into()));
        let result = store.create(&backend, &draft(day(1), "Gym", "18:00", "19:00"));
        assert!(matches!(result, Err(PlanError::Transport(TransportError::Network(_)))));
        assert!(store.items().is_empty());
        assert!(!store.is_busy());
    }

    #[test]
    fn failed_update_leaves_cached_item_unchanged() {
        let (backend, mut store, item) = seeded();
        let mut edit = PlanDraft::from(&item);
        edit.title = "Renamed".into();
        backend.fail_next(TransportError::Status {
            code: 500,
            body: "boom".into(),
        });
        let result = store.update(&backend, &edit);
        assert!(matches!(
            result,
            Err(PlanError::Transport(TransportError::Status { code: 500, .. }))
        ));
        assert_eq!(store.get(&item.id), Some(&item));
        assert!(!store.is_busy());
    }

    #[test]
    fn update_replaces_cached_item() {
        let (backend, mut store, item) = seeded();
        let mut edit = PlanDraft::from(&item);
        edit.title = "Renamed".into();
        edit.category = Some(Category::Learning);
        let updated = store.update(&backend, &edit).unwrap();
        assert_eq!(updated.id, item.id);
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.get(&item.id).unwrap().title, "Renamed");
        assert_eq!(backend.stored(day(1))[0].category, Category::Learning);
    }

    #[test]
    fn update_requires_a_cached_id() {
        let (backend, mut store, _) = seeded();
        let mut edit = draft(day(1), "Ghost", "09:00", "10:00");
        edit.id = Some(PlanId::from("missing"));
        assert_eq!(
            store.update(&backend, &edit),
            Err(PlanError::UnknownPlan(PlanId::from("missing")))
        );
        let no_id = draft(day(1), "Ghost", "09:00", "10:00");
        assert_eq!(store.update(&backend, &no_id), Err(PlanError::NotSaved));
    }

    #[test]
    fn update_cannot_move_a_plan_to_another_day() {
        let (backend, mut store, item) = seeded();
        let mut edit = PlanDraft::from(&item);
        edit.date = day(2);
        assert_eq!(
            store.update(&backend, &edit),
            Err(PlanError::Validation(ValidationError::DateChanged))
        );
    }

    #[test]
    fn remove_drops_from_cache_and_failure_keeps_it() {
        let (backend, mut store, item) = seeded();
        backend.fail_next(TransportError::Network("offline".into()));
        assert!(store.remove(&backend, &item.id).is_err());
        assert_eq!(store.items().len(), 1);

        store.remove(&backend, &item.id).unwrap();
        assert!(store.items().is_empty());
        assert!(backend.stored(day(1)).is_empty());
    }

    #[test]
    fn failed_load_keeps_previous_cache() {
        let (backend, mut store, item) = seeded();
        backend.fail_next(TransportError::Network("offline".into()));
        assert!(store.load_day(&backend, day(1)).is_err());
        assert_eq!(store.items(), &[item]);
        assert!(matches!(store.last_error(), Some(TransportError::Network(_))));
        assert!(!store.is_loading());
    }

    #[test]
    fn stale_load_does_not_overwrite_newer_day() {
        let backend = MemoryBackend::with_plans([
            draft(day(1), "First", "09:00", "10:00").validate().unwrap().into_item(PlanId::from("a")),
            draft(day(2), "Second", "11:00", "12:00").validate().unwrap().into_item(PlanId::from("b")),
        ]);
        let mut store = PlanStore::new(day(1));

        let old_ticket = store.begin_load();
        let old_answer = backend.fetch_day(old_ticket.date);

        store.select(day(2));
        let new_ticket = store.begin_load();
        let new_answer = backend.fetch_day(new_ticket.date);
        assert_eq!(store.finish_load(new_ticket, new_answer), Ok(LoadOutcome::Applied(1)));

        assert_eq!(store.finish_load(old_ticket, old_answer), Ok(LoadOutcome::Stale));
        assert_eq!(store.selected_date(), day(2));
        assert_eq!(store.items()[0].title, "Second");
    }

    #[test]
    fn superseded_load_of_same_day_is_stale() {
        let backend = MemoryBackend::new();
        let mut store = PlanStore::new(day(1));
        let first = store.begin_load();
        let second = store.begin_load();
        assert_eq!(store.finish_load(first, backend.fetch_day(day(1))), Ok(LoadOutcome::Stale));
        assert_eq!(store.finish_load(second, backend.fetch_day(day(1))), Ok(LoadOutcome::Applied(0)));
    }

    #[test]
    fn switching_days_evicts_other_dates() {
        let (backend, mut store, _) = seeded();
        store.select(day(2));
        assert!(store.items().is_empty());
        assert!(store.needs_refresh());
        store.select(day(1));
        assert!(store.items().is_empty(), "day 1 must be refetched, not served from cache");
        store.load_day(&backend, day(1)).unwrap();
        assert_eq!(store.items().len(), 1);
    }

    #[test]
    fn second_change_while_pending_is_busy() {
        let (_, mut store, item) = seeded();
        let sent = store.begin_create(&draft(day(1), "A", "12:00", "13:00")).unwrap();
        assert!(store.is_busy());
        assert_eq!(store.begin_create(&draft(day(1), "B", "13:00", "14:00")), Err(PlanError::Busy));
        assert_eq!(store.begin_remove(&item.id), Err(PlanError::Busy));
        store.finish_create(Ok(sent)).unwrap();
        assert!(!store.is_busy());
        assert!(store.needs_refresh());
    }

    #[test]
    fn category_counts_follow_legend_order() {
        let backend = MemoryBackend::new();
        let mut store = PlanStore::new(day(1));
        let mut gym = draft(day(1), "Gym", "06:00", "07:00");
        gym.category = Some(Category::Exercise);
        store.create(&backend, &gym).unwrap();
        store.create(&backend, &draft(day(1), "Open", "09:30", "10:00")).unwrap();
        store.create(&backend, &draft(day(1), "Close", "15:30", "16:00")).unwrap();
        assert_eq!(
            store.category_counts(),
            vec![(Category::Trading, 2), (Category::Exercise, 1)]
        );
    }
}
