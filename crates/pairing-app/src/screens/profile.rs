//! Profile screen

use std::sync::Arc;

use pairing_client::operations::{CurrentUser, UpdateProfile, UpdateProfileVariables};
use pairing_client::{check, ClientResult, GraphqlClient, NoVariables};
use pairing_client::forms::ProfileForm;
use pairing_core::User;
use tracing::info;

use crate::notice::Notice;

pub struct ProfileScreen {
    client: Arc<GraphqlClient>,
    user: Option<User>,
    form: ProfileForm,
}

impl ProfileScreen {
    pub fn new(client: Arc<GraphqlClient>) -> Self {
        Self {
            client,
            user: None,
            form: ProfileForm::default(),
        }
    }

    /// Load the profile and reset the form to it
    pub async fn load(&mut self) -> ClientResult<&User> {
        let user = self.client.query::<CurrentUser>(&NoVariables {}).await?.me;
        self.form = ProfileForm::from_user(&user);
        Ok(self.user.insert(user))
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ProfileForm {
        &mut self.form
    }

    pub async fn save(&mut self) -> Notice {
        if let Err(fields) = check(&self.form) {
            return Notice::invalid(fields);
        }

        let variables = UpdateProfileVariables {
            input: self.form.to_input(),
        };
        match self.client.mutate::<UpdateProfile>(&variables).await {
            Ok(data) => {
                let user = data.update_profile;
                // Header and routing read the profile from the session
                self.client.session().set_profile(user.clone());
                self.form = ProfileForm::from_user(&user);
                info!(user_id = %user.id, "Profile updated");
                self.user = Some(user);
                Notice::success("Profile updated")
            }
            Err(err) => Notice::from_error(&err),
        }
    }
}
