pub mod api;
pub mod config;
pub mod csv_export;
pub mod memory;

use chrono::NaiveDate;

use crate::model::{PlanId, PlanItem};

pub use api::HttpBackend;
pub use config::{AppConfig, ConfigOrigin};
pub use memory::MemoryBackend;

/// Failure talking to the persistence service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server answered {code}: {body}")]
    Status { code: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// The persistence service that owns plans across sessions.
///
/// Implementations are called from the background worker, hence `Send`.
pub trait PlanBackend: Send {
    /// All plans stored under `date`.
    fn fetch_day(&self, date: NaiveDate) -> Result<Vec<PlanItem>, TransportError>;

    /// Store a new plan and return the record as the backend saved it.
    fn create(&self, item: &PlanItem) -> Result<PlanItem, TransportError>;

    /// Replace an existing plan wholesale.
    fn update(&self, item: &PlanItem) -> Result<PlanItem, TransportError>;

    fn delete(&self, id: &PlanId) -> Result<(), TransportError>;
}

impl<T: PlanBackend + ?Sized> PlanBackend for Box<T> {
    fn fetch_day(&self, date: NaiveDate) -> Result<Vec<PlanItem>, TransportError> {
        (**self).fetch_day(date)
    }

    fn create(&self, item: &PlanItem) -> Result<PlanItem, TransportError> {
        (**self).create(item)
    }

    fn update(&self, item: &PlanItem) -> Result<PlanItem, TransportError> {
        (**self).update(item)
    }

    fn delete(&self, id: &PlanId) -> Result<(), TransportError> {
        (**self).delete(id)
    }
}
