use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::time_grid::TimeOfDay;

/// Opaque plan identifier. Client-assigned ids are UUID v4 strings, but any
/// string the backend hands back is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(String);

impl PlanId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlanId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of activity a plan is. Only affects its color and legend entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Trading,
    Learning,
    Exercise,
    Personal,
    Other,
}

impl Category {
    /// Legend order.
    pub const ALL: [Category; 5] = [
        Category::Trading,
        Category::Learning,
        Category::Exercise,
        Category::Personal,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Trading => "Trading",
            Category::Learning => "Learning",
            Category::Exercise => "Exercise",
            Category::Personal => "Personal",
            Category::Other => "Other",
        }
    }
}

/// A titled, time-ranged activity on one calendar day.
///
/// Field names on the wire follow the backend: `type`, `startTime`, `endTime`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    pub id: PlanId,
    pub date: NaiveDate,
    pub title: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a title is required")]
    MissingTitle,
    #[error("a type is required")]
    MissingCategory,
    #[error("a start time is required")]
    MissingStart,
    #[error("an end time is required")]
    MissingEnd,
    #[error("end time {end} must be after start time {start}")]
    EmptyRange { start: TimeOfDay, end: TimeOfDay },
    #[error("a plan cannot move to another day; delete it and create a new one")]
    DateChanged,
}

/// The editable form of a plan. Fields may be missing until validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDraft {
    pub id: Option<PlanId>,
    pub date: NaiveDate,
    pub title: String,
    pub category: Option<Category>,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub notes: String,
}

impl PlanDraft {
    /// Empty draft for `date` with the default category and the given range.
    pub fn new(date: NaiveDate, start: TimeOfDay, end: TimeOfDay) -> Self {
        Self {
            id: None,
            date,
            title: String::new(),
            category: Some(Category::default()),
            start_time: Some(start),
            end_time: Some(end),
            notes: String::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Check required fields and the time range, producing a plan. A missing
    /// id stays missing here; the store assigns one on create.
    pub fn validate(&self) -> Result<ValidatedDraft, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        let category = self.category.ok_or(ValidationError::MissingCategory)?;
        let start = self.start_time.ok_or(ValidationError::MissingStart)?;
        let end = self.end_time.ok_or(ValidationError::MissingEnd)?;
        if start >= end {
            return Err(ValidationError::EmptyRange { start, end });
        }
        let notes = if self.notes.trim().is_empty() {
            None
        } else {
            Some(self.notes.clone())
        };
        Ok(ValidatedDraft {
            id: self.id.clone(),
            item: PlanFields {
                date: self.date,
                title: title.to_string(),
                category,
                start_time: start,
                end_time: end,
                notes,
            },
        })
    }
}

impl From<&PlanItem> for PlanDraft {
    fn from(item: &PlanItem) -> Self {
        Self {
            id: Some(item.id.clone()),
            date: item.date,
            title: item.title.clone(),
            category: Some(item.category),
            start_time: Some(item.start_time),
            end_time: Some(item.end_time),
            notes: item.notes.clone().unwrap_or_default(),
        }
    }
}

/// Everything of a plan except its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanFields {
    pub date: NaiveDate,
    pub title: String,
    pub category: Category,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub notes: Option<String>,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    pub id: Option<PlanId>,
    pub item: PlanFields,
}

impl ValidatedDraft {
    pub fn into_item(self, id: PlanId) -> PlanItem {
        let PlanFields {
            date,
            title,
            category,
            start_time,
            end_time,
            notes,
        } = self.item;
        PlanItem {
            id,
            date,
            title,
            category,
            start_time,
            end_time,
            notes,
        }
    }
}
