//! Organizations: all of them for super admins, the own one for org admins

use std::sync::Arc;

use pairing_client::forms::OrganizationForm;
use pairing_client::operations::{
    CreateOrganization, CreateOrganizationVariables, GetOrganization, IdVariables,
    ListOrganizations, OrganizationIdVariables, RegenerateInviteCode, UpdateOrganization,
    UpdateOrganizationVariables,
};
use pairing_client::{check, ClientError, ClientResult, GraphqlClient, NoVariables};
use pairing_core::{AppRole, Organization};
use tracing::info;
use uuid::Uuid;

use crate::notice::Notice;

pub struct OrganizationsScreen {
    client: Arc<GraphqlClient>,
    organizations: Vec<Organization>,
}

impl OrganizationsScreen {
    pub fn new(client: Arc<GraphqlClient>) -> Self {
        Self {
            client,
            organizations: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> ClientResult<&[Organization]> {
        let session = self.client.session();
        self.organizations = match session.role() {
            Some(AppRole::SuperAdmin) => {
                self.client
                    .query::<ListOrganizations>(&NoVariables {})
                    .await?
                    .organizations
            }
            _ => {
                let id = session.organization_id().ok_or(ClientError::NotSignedIn)?;
                self.client
                    .query::<GetOrganization>(&IdVariables { id })
                    .await?
                    .organization
                    .into_iter()
                    .collect()
            }
        };
        Ok(&self.organizations)
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    pub async fn create(&mut self, form: &OrganizationForm) -> Notice {
        if let Err(fields) = check(form) {
            return Notice::invalid(fields);
        }
        let variables = CreateOrganizationVariables {
            input: form.to_input(),
        };
        match self.client.mutate::<CreateOrganization>(&variables).await {
            Ok(data) => {
                let org = data.create_organization;
                info!(organization_id = %org.id, "Organization created");
                let message = format!("Created {}", org.name);
                self.organizations.push(org);
                Notice::success(message)
            }
            Err(err) => Notice::from_error(&err),
        }
    }

    pub async fn update(&mut self, id: Uuid, form: &OrganizationForm) -> Notice {
        if let Err(fields) = check(form) {
            return Notice::invalid(fields);
        }
        let variables = UpdateOrganizationVariables {
            id,
            input: form.to_input(),
        };
        match self.client.mutate::<UpdateOrganization>(&variables).await {
            Ok(data) => {
                self.replace(data.update_organization);
                Notice::success("Organization updated")
            }
            Err(err) => Notice::from_error(&err),
        }
    }

    /// New invite code; the old one stops working
    pub async fn regenerate_code(&mut self, organization_id: Uuid) -> Notice {
        let variables = OrganizationIdVariables { organization_id };
        match self.client.mutate::<RegenerateInviteCode>(&variables).await {
            Ok(data) => {
                let org = data.regenerate_invite_code;
                let message = match &org.invite_code {
                    Some(code) => format!("New invite code: {code}"),
                    None => "Invite code removed".to_string(),
                };
                self.replace(org);
                Notice::success(message)
            }
            Err(err) => Notice::from_error(&err),
        }
    }

    fn replace(&mut self, org: Organization) {
        match self.organizations.iter_mut().find(|o| o.id == org.id) {
            Some(slot) => *slot = org,
            None => self.organizations.push(org),
        }
    }
}
