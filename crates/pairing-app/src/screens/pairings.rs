//! Pairings list with active and past tabs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pairing_client::operations::{MyPairings, OrganizationIdVariables, OrganizationPairings};
use pairing_client::{ClientError, ClientResult, GraphqlClient, NoVariables};
use pairing_core::{Pairing, PairingStatus};
use uuid::Uuid;

use crate::routes::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingsTab {
    #[default]
    Active,
    Past,
}

/// One row of the list, as seen by the signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingRow {
    pub pairing_id: Uuid,
    pub partner_name: String,
    pub partner_initials: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub status: PairingStatus,
    pub chat: Route,
}

pub struct PairingsScreen {
    client: Arc<GraphqlClient>,
    me: Uuid,
    pairings: Vec<Pairing>,
}

impl PairingsScreen {
    pub fn new(client: Arc<GraphqlClient>) -> ClientResult<Self> {
        let me = client.session().user_id().ok_or(ClientError::NotSignedIn)?;
        Ok(Self {
            client,
            me,
            pairings: Vec::new(),
        })
    }

    pub async fn load(&mut self) -> ClientResult<usize> {
        self.pairings = self
            .client
            .query::<MyPairings>(&NoVariables {})
            .await?
            .my_pairings;
        Ok(self.pairings.len())
    }

    /// Every pairing of an organization (admins)
    pub async fn load_organization(&self, organization_id: Uuid) -> ClientResult<Vec<Pairing>> {
        let variables = OrganizationIdVariables { organization_id };
        Ok(self
            .client
            .query::<OrganizationPairings>(&variables)
            .await?
            .organization_pairings)
    }

    pub fn tab(&self, tab: PairingsTab, now: DateTime<Utc>) -> Vec<PairingRow> {
        rows(&self.pairings, self.me, tab, now)
    }

    pub fn current(&self, now: DateTime<Utc>) -> Option<&Pairing> {
        self.pairings.iter().find(|p| p.is_current(now))
    }
}

/// Active tab: current pairings, newest period first. Past tab: everything
/// else, most recently ended first.
pub fn rows(pairings: &[Pairing], me: Uuid, tab: PairingsTab, now: DateTime<Utc>) -> Vec<PairingRow> {
    let mut selected: Vec<&Pairing> = pairings
        .iter()
        .filter(|p| (tab == PairingsTab::Active) == p.is_current(now))
        .collect();
    match tab {
        PairingsTab::Active => selected.sort_by(|a, b| b.period_start.cmp(&a.period_start)),
        PairingsTab::Past => selected.sort_by(|a, b| b.period_end.cmp(&a.period_end)),
    }

    selected
        .into_iter()
        .filter_map(|pairing| {
            let partner = pairing.partner_of(me)?;
            Some(PairingRow {
                pairing_id: pairing.id,
                partner_name: partner.display_name(),
                partner_initials: partner.initials(),
                period_start: pairing.period_start,
                period_end: pairing.period_end,
                status: pairing.status,
                chat: Route::Chat(pairing.id),
            })
        })
        .collect()
}
