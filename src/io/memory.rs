use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{PlanBackend, TransportError};
use crate::model::{PlanId, PlanItem};

#[derive(Debug, Default)]
struct MemoryState {
    plans: BTreeMap<NaiveDate, Vec<PlanItem>>,
    fail_next: Option<TransportError>,
    calls: usize,
}

/// In-process plan service used in offline mode.
///
/// Clones share the same storage, so a test can keep a handle while the
/// store or worker owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(plans: impl IntoIterator<Item = PlanItem>) -> Self {
        let backend = Self::new();
        {
            let mut state = backend.lock();
            for plan in plans {
                state.plans.entry(plan.date).or_default().push(plan);
            }
        }
        backend
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: TransportError) {
        self.lock().fail_next = Some(error);
    }

    /// Number of calls received, failed ones included.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    pub fn stored(&self, date: NaiveDate) -> Vec<PlanItem> {
        self.lock().plans.get(&date).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock leaves plain data behind; keep using it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin_call(&self) -> Result<MutexGuard<'_, MemoryState>, TransportError> {
        let mut state = self.lock();
        state.calls += 1;
        match state.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

impl PlanBackend for MemoryBackend {
    fn fetch_day(&self, date: NaiveDate) -> Result<Vec<PlanItem>, TransportError> {
        let state = self.begin_call()?;
        Ok(state.plans.get(&date).cloned().unwrap_or_default())
    }

    fn create(&self, item: &PlanItem) -> Result<PlanItem, TransportError> {
        let mut state = self.begin_call()?;
        let exists = state.plans.values().flatten().any(|p| p.id == item.id);
        if exists {
            return Err(TransportError::Status {
                code: 409,
                body: format!("plan {} already exists", item.id),
            });
        }
        state.plans.entry(item.date).or_default().push(item.clone());
        Ok(item.clone())
    }

    fn update(&self, item: &PlanItem) -> Result<PlanItem, TransportError> {
        let mut state = self.begin_call()?;
        let slot = state
            .plans
            .values_mut()
            .flatten()
            .find(|p| p.id == item.id)
            .ok_or_else(|| TransportError::Status {
                code: 404,
                body: format!("plan {} not found", item.id),
            })?;
        *slot = item.clone();
        Ok(item.clone())
    }

    fn delete(&self, id: &PlanId) -> Result<(), TransportError> {
        let mut state = self.begin_call()?;
        let mut found = false;
        for plans in state.plans.values_mut() {
            let before = plans.len();
            plans.retain(|p| &p.id != id);
            found |= plans.len() != before;
        }
        if found {
            Ok(())
        } else {
            Err(TransportError::Status {
                code: 404,
                body: format!("plan {} not found", id),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, TimeOfDay};

    fn plan(id: &str, date: NaiveDate) -> PlanItem {
        PlanItem {
            id: PlanId::from(id),
            date,
            title: format!("plan {id}"),
            category: Category::Other,
            start_time: TimeOfDay::from_hm(8, 0).unwrap(),
            end_time: TimeOfDay::from_hm(9, 0).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn partitions_by_date() {
        let a = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let backend = MemoryBackend::with_plans([plan("1", a), plan("2", b), plan("3", a)]);
        assert_eq!(backend.fetch_day(a).unwrap().len(), 2);
        assert_eq!(backend.fetch_day(b).unwrap().len(), 1);
    }

    #[test]
    fn injected_failure_hits_only_the_next_call() {
        let a = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let backend = MemoryBackend::new();
        backend.fail_next(TransportError::Network("down".into()));
        assert!(backend.create(&plan("1", a)).is_err());
        assert!(backend.stored(a).is_empty());
        assert!(backend.create(&plan("1", a)).is_ok());
        assert_eq!(backend.calls(), 2);
    }

    #[test]
    fn update_and_delete_unknown_ids_are_404() {
        let a = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.update(&plan("x", a)),
            Err(TransportError::Status { code: 404, .. })
        ));
        assert!(matches!(
            backend.delete(&PlanId::from("x")),
            Err(TransportError::Status { code: 404, .. })
        ));
    }
}
