//! Pairing algorithm settings and manual runs (admins)

use std::sync::Arc;

use pairing_client::forms::PairingSettingsForm;
use pairing_client::operations::{
    self, ExecutePairingAlgorithm, OrganizationIdVariables, UpdatePairingAlgorithmSettings,
};
use pairing_client::{check, ClientResult, GraphqlClient};
use pairing_core::{AlgorithmRunResult, PairingAlgorithmSettings};
use tracing::info;
use uuid::Uuid;

use crate::notice::Notice;

pub struct AlgorithmScreen {
    client: Arc<GraphqlClient>,
    organization_id: Uuid,
    form: PairingSettingsForm,
    settings: Option<PairingAlgorithmSettings>,
    last_run: Option<AlgorithmRunResult>,
}

impl AlgorithmScreen {
    pub fn new(client: Arc<GraphqlClient>, organization_id: Uuid) -> Self {
        Self {
            client,
            organization_id,
            form: PairingSettingsForm::default(),
            settings: None,
            last_run: None,
        }
    }

    /// Load the stored settings into the form
    pub async fn load(&mut self) -> ClientResult<&PairingAlgorithmSettings> {
        let variables = OrganizationIdVariables {
            organization_id: self.organization_id,
        };
        let settings = self
            .client
            .query::<operations::PairingAlgorithmSettings>(&variables)
            .await?
            .pairing_algorithm_settings;
        self.form = PairingSettingsForm::from_settings(&settings);
        Ok(self.settings.insert(settings))
    }

    pub fn form(&self) -> &PairingSettingsForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PairingSettingsForm {
        &mut self.form
    }

    pub fn settings(&self) -> Option<&PairingAlgorithmSettings> {
        self.settings.as_ref()
    }

    pub async fn save(&mut self) -> Notice {
        if let Err(fields) = check(&self.form) {
            return Notice::invalid(fields);
        }
        let variables = self.form.to_variables(self.organization_id);
        match self
            .client
            .mutate::<UpdatePairingAlgorithmSettings>(&variables)
            .await
        {
            Ok(data) => {
                let settings = data.update_pairing_algorithm_settings;
                self.form = PairingSettingsForm::from_settings(&settings);
                self.settings = Some(settings);
                Notice::success("Settings saved")
            }
            Err(err) => Notice::from_error(&err),
        }
    }

    /// Run the algorithm now; the server's counts and warnings are shown as is
    pub async fn execute(&mut self) -> Notice {
        let variables = OrganizationIdVariables {
            organization_id: self.organization_id,
        };
        match self.client.mutate::<ExecutePairingAlgorithm>(&variables).await {
            Ok(data) => {
                let result = data.execute_pairing_algorithm;
                info!(
                    organization_id = %self.organization_id,
                    pairs = result.pairs_created,
                    unpaired = result.users_unpaired,
                    "Pairing algorithm executed"
                );
                let notice = if result.warnings.is_empty() {
                    Notice::success(result.summary())
                } else {
                    Notice::info(result.summary())
                };
                self.last_run = Some(result);
                notice
            }
            Err(err) => Notice::from_error(&err),
        }
    }

    pub fn last_run(&self) -> Option<&AlgorithmRunResult> {
        self.last_run.as_ref()
    }
}
