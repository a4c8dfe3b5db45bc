//! Operation catalogue: one type per query, mutation and subscription
//!
//! Mutations list the queries they make stale in `INVALIDATES`; the client
//! evicts those after the mutation succeeds.

mod achievements;
mod algorithm;
mod calendar;
mod chat;
mod meetings;
mod organizations;
mod pairings;
mod ratings;
mod reports;
mod statistics;
mod users;

use serde::Serialize;
use uuid::Uuid;

pub use achievements::*;
pub use algorithm::*;
pub use calendar::*;
pub use chat::*;
pub use meetings::*;
pub use organizations::*;
pub use pairings::*;
pub use ratings::*;
pub use reports::*;
pub use statistics::*;
pub use users::*;

#[derive(Debug, Clone, Serialize)]
pub struct IdVariables {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationIdVariables {
    pub organization_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingIdVariables {
    pub pairing_id: Uuid,
}
