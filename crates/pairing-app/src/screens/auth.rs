//! Sign-in, registration and password screens

use std::sync::Arc;
use std::time::Duration;

use pairing_client::forms::{LoginForm, RegisterForm, ResetPasswordForm, UpdatePasswordForm};
use pairing_client::identity::SignUpOutcome;
use pairing_client::operations::{ValidateInviteCode, ValidateInviteCodeVariables};
use pairing_client::{
    check, ClientError, ClientResult, Debouncer, FieldErrors, FormLayout, GraphqlClient,
};
use pairing_common::IdentityConfig;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::notice::Notice;

/// Invite code feedback next to the registration field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InviteCodeStatus {
    #[default]
    Idle,
    Checking,
    Valid { organization_name: Option<String> },
    Invalid,
}

pub struct AuthScreen {
    client: Arc<GraphqlClient>,
    identity: IdentityConfig,
    invite: watch::Sender<InviteCodeStatus>,
    invite_check: Debouncer,
}

impl AuthScreen {
    pub fn new(client: Arc<GraphqlClient>, identity: IdentityConfig, invite_delay: Duration) -> Self {
        Self {
            client,
            identity,
            invite: watch::channel(InviteCodeStatus::Idle).0,
            invite_check: Debouncer::new(invite_delay),
        }
    }

    pub fn layout_for_login() -> FormLayout {
        FormLayout::login()
    }

    pub fn layout_for_register() -> FormLayout {
        FormLayout::register()
    }

    pub async fn sign_in(&self, form: &LoginForm) -> Result<(), Notice> {
        self.authenticate(form).await.map_err(|err| sign_in_notice(&err))
    }

    /// Validate the form and open a session
    pub async fn authenticate(&self, form: &LoginForm) -> ClientResult<()> {
        check(form)?;
        self.client
            .session()
            .sign_in(form.email.trim(), &form.password)
            .await
            .map(|_| ())
    }

    /// Re-check the invite code once typing pauses
    pub fn check_invite_code(&self, raw: &str) {
        let code = raw.trim().to_ascii_uppercase();
        if code.is_empty() {
            self.invite_check.cancel();
            self.invite.send_replace(InviteCodeStatus::Idle);
            return;
        }

        self.invite.send_replace(InviteCodeStatus::Checking);
        let client = self.client.clone();
        let status = self.invite.clone();
        self.invite_check.call(async move {
            let variables = ValidateInviteCodeVariables { code };
            let next = match client.query::<ValidateInviteCode>(&variables).await {
                Ok(data) if data.validate_invite_code.valid => InviteCodeStatus::Valid {
                    organization_name: data.validate_invite_code.organization_name,
                },
                Ok(_) => InviteCodeStatus::Invalid,
                Err(err) => {
                    warn!(error = %err, "Invite code check failed");
                    InviteCodeStatus::Invalid
                }
            };
            status.send_replace(next);
        });
    }

    pub fn invite_status(&self) -> watch::Receiver<InviteCodeStatus> {
        self.invite.subscribe()
    }

    /// Create the account. With email confirmation on, no session is
    /// established and the user is told to check their inbox.
    pub async fn register(&self, form: &RegisterForm) -> Notice {
        let mut fields = check(form).err().unwrap_or_default();
        if form.normalized_invite_code().is_some()
            && *self.invite.borrow() == InviteCodeStatus::Invalid
        {
            fields.add("invite_code", "Invite code is not valid");
        }
        if !fields.is_empty() {
            return Notice::invalid(fields);
        }

        let redirect = match self.identity.redirect_to("/auth/callback") {
            Ok(url) => url,
            Err(err) => return Notice::error(err.to_string()),
        };
        match self.client.session().sign_up(&form.to_sign_up(redirect)).await {
            Ok(SignUpOutcome::SignedIn(session)) => {
                info!(user_id = %session.user_id(), "Registered");
                Notice::success("Welcome aboard!")
            }
            Ok(SignUpOutcome::ConfirmationSent { .. }) => {
                Notice::info("Check your email to confirm your account.")
            }
            Err(err) => Notice::from_error(&err),
        }
    }

    /// Always reports success so the form does not reveal which emails exist
    pub async fn request_reset(&self, form: &ResetPasswordForm) -> Notice {
        if let Err(fields) = check(form) {
            return Notice::invalid(fields);
        }
        let redirect = match self.identity.redirect_to("/update-password") {
            Ok(url) => url,
            Err(err) => return Notice::error(err.to_string()),
        };
        if let Err(err) = self
            .client
            .session()
            .request_password_reset(form.email.trim(), &redirect)
            .await
        {
            warn!(error = %err, "Password reset request failed");
        }
        Notice::info("If an account exists for that email, a reset link is on its way.")
    }

    pub async fn update_password(&self, form: &UpdatePasswordForm) -> Notice {
        if let Err(fields) = check(form) {
            return Notice::invalid(fields);
        }
        match self.client.session().update_password(&form.password).await {
            Ok(()) => Notice::success("Password updated"),
            Err(ClientError::NotSignedIn) => {
                let mut fields = FieldErrors::new();
                fields.add(
                    pairing_client::forms::FORM_LEVEL,
                    "The reset link has expired. Request a new one.",
                );
                Notice::invalid(fields)
            }
            Err(err) => Notice::from_error(&err),
        }
    }
}

/// Wrong credentials stay next to the form; other failures are toasts
pub(crate) fn sign_in_notice(err: &ClientError) -> Notice {
    let notice = Notice::from_error(err);
    if matches!(err, ClientError::InvalidCredentials) {
        notice.inline()
    } else {
        notice
    }
}
