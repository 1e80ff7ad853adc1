use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::types::Gender;

/// A child record nested in a journal summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Child {
    pub id: u64,
    pub url: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub gender: Gender,
}

impl Child {
    /// Display name, first and last joined
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A family's journal at the remote service
///
/// Immutable once parsed; refetched whole rather than cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalSummary {
    /// Remote numeric id, used in entry queries and mirror paths
    pub id: u64,

    pub title: String,

    /// Journal creation time, converted from epoch milliseconds
    pub created: DateTime<Utc>,

    /// Home URL of the journal on the service
    pub url: String,

    pub children: Vec<Child>,
}
