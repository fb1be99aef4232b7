use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub country: String,
    pub county: String,
    pub town: String,
    pub building: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAddress {
    pub country: String,
    pub county: String,
    pub town: String,
    pub building: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressPatch {
    pub country: Option<String>,
    pub county: Option<String>,
    pub town: Option<String>,
    pub building: Option<String>,
}

impl AddressPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply(self, address: &mut Address) {
        if let Some(country) = self.country {
            address.country = country;
        }
        if let Some(county) = self.county {
            address.county = county;
        }
        if let Some(town) = self.town {
            address.town = town;
        }
        if let Some(building) = self.building {
            address.building = building;
        }
    }
}
