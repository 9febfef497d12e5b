//! local taxpayer records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// a giro comercial - one of the commercial activities a company is
/// registered for with the tax authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommercialActivity {
    /// unique identifier (uuid string).
    pub id: String,
    /// activity code, e.g. "523930".
    pub code: String,
    /// human-readable description.
    pub description: String,
}

impl CommercialActivity {
    /// create a new activity with a fresh id.
    pub fn new(code: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code,
            description,
        }
    }
}

/// a local taxpayer that issues documents through the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// unique identifier (uuid string).
    pub id: String,

    /// taxpayer code (RUT), unique across companies, e.g. "76212889-6".
    pub code: String,

    /// legal name.
    pub name: String,

    /// postal address.
    pub address: String,

    /// registered commercial activities.
    #[serde(default)]
    pub commercial_activities: Vec<CommercialActivity>,

    /// when the record was created.
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// create a new company with a fresh id and no activities.
    pub fn new(code: String, name: String, address: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code,
            name,
            address,
            commercial_activities: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
