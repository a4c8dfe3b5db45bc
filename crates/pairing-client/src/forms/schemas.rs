//! Form schemas
//!
//! Each form mirrors a server input type field for field and is validated
//! before submission. Conversions produce the operation variables.

use chrono::{DateTime, Utc};
use pairing_core::{ChatMessage, PairingAlgorithmSettings, Rating};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::identity::SignUpRequest;
use crate::operations::{
    CalendarEventInput, OrganizationInput, ProfileInput, ProposeMeetingTimeVariables, RatingInput,
    ReportInput, UpdatePairingAlgorithmSettingsVariables,
};

// ============================================================================
// Auth forms
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,

    #[validate(custom(function = "validate_invite_code"))]
    pub invite_code: Option<String>,
}

impl RegisterForm {
    /// Sign-up request; the verification email links back to `redirect_to`
    pub fn to_sign_up(&self, redirect_to: Url) -> SignUpRequest {
        SignUpRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            invite_code: self.normalized_invite_code(),
            redirect_to,
        }
    }

    /// Upper-cased invite code, `None` when blank
    pub fn normalized_invite_code(&self) -> Option<String> {
        self.invite_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_ascii_uppercase)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ResetPasswordForm {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordForm {
    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

// ============================================================================
// Profile and organization forms
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: String,

    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,

    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: Option<String>,
}

impl ProfileForm {
    pub fn from_user(user: &pairing_core::User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            bio: user.bio.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }

    pub fn to_input(&self) -> ProfileInput {
        ProfileInput {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            bio: blank_to_none(self.bio.as_deref()),
            avatar_url: blank_to_none(self.avatar_url.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OrganizationForm {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

impl OrganizationForm {
    pub fn to_input(&self) -> OrganizationInput {
        OrganizationInput {
            name: self.name.trim().to_string(),
            description: blank_to_none(self.description.as_deref()),
        }
    }
}

// ============================================================================
// Pairing algorithm settings
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PairingSettingsForm {
    #[validate(range(min = 1, max = 365, message = "Period must be between 1 and 365 days"))]
    pub period_length_days: i32,

    #[validate(range(min = 0, message = "Seed must be zero or positive"))]
    pub random_seed: i64,
}

impl Default for PairingSettingsForm {
    fn default() -> Self {
        Self {
            period_length_days: 14,
            random_seed: 0,
        }
    }
}

impl PairingSettingsForm {
    pub fn from_settings(settings: &PairingAlgorithmSettings) -> Self {
        Self {
            period_length_days: settings.period_length_days,
            random_seed: settings.random_seed,
        }
    }

    pub fn to_variables(&self, organization_id: Uuid) -> UpdatePairingAlgorithmSettingsVariables {
        UpdatePairingAlgorithmSettingsVariables {
            organization_id,
            period_length_days: self.period_length_days,
            random_seed: self.random_seed,
        }
    }
}

// ============================================================================
// Reports and ratings
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportForm {
    pub reported_user_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Reason must be 1-100 characters"))]
    pub reason: String,

    #[validate(length(max = 2000, message = "Details must be at most 2000 characters"))]
    pub details: Option<String>,
}

impl ReportForm {
    pub fn to_input(&self) -> ReportInput {
        ReportInput {
            reported_user_id: self.reported_user_id,
            reason: self.reason.trim().to_string(),
            details: blank_to_none(self.details.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RatingForm {
    pub meeting_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "Score must be between 1 and 5"))]
    pub score: u8,

    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub comment: Option<String>,
}

impl RatingForm {
    pub fn to_input(&self) -> pairing_core::DomainResult<RatingInput> {
        Ok(RatingInput {
            meeting_id: self.meeting_id,
            score: Rating::check_score(self.score)?,
            comment: blank_to_none(self.comment.as_deref()),
        })
    }
}

// ============================================================================
// Meetings and calendar
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_meeting_window"))]
pub struct MeetingProposalForm {
    pub pairing_id: Uuid,
    pub meeting_id: Option<Uuid>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MeetingProposalForm {
    pub fn to_variables(&self) -> ProposeMeetingTimeVariables {
        ProposeMeetingTimeVariables {
            pairing_id: self.pairing_id,
            meeting_id: self.meeting_id,
            start: self.start,
            end: self.end,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_event_window"))]
pub struct CalendarEventForm {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,

    #[validate(custom(function = "validate_recurrence_rule"))]
    pub recurrence_rule: Option<String>,
}

impl CalendarEventForm {
    pub fn to_input(&self) -> CalendarEventInput {
        CalendarEventInput {
            title: self.title.trim().to_string(),
            description: blank_to_none(self.description.as_deref()),
            start: self.start,
            end: self.end,
            recurrence_rule: blank_to_none(self.recurrence_rule.as_deref()),
        }
    }
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MessageForm {
    #[validate(custom(function = "validate_message_content"))]
    pub content: String,
}

// ============================================================================
// Custom validators
// ============================================================================

fn validate_invite_code(code: &str) -> Result<(), ValidationError> {
    let code = code.trim();
    if code.is_empty() {
        return Ok(());
    }
    if (6..=12).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("invite_code")
            .with_message("Invite code must be 6-12 letters or digits".into()))
    }
}

fn validate_recurrence_rule(rule: &str) -> Result<(), ValidationError> {
    let rule = rule.trim();
    if rule.is_empty() || rule.to_ascii_uppercase().starts_with("FREQ=") {
        Ok(())
    } else {
        Err(ValidationError::new("recurrence_rule")
            .with_message("Recurrence must be an RRULE starting with FREQ=".into()))
    }
}

fn validate_message_content(content: &str) -> Result<(), ValidationError> {
    ChatMessage::prepare_content(content)
        .map(|_| ())
        .map_err(|e| ValidationError::new("content").with_message(e.to_string().into()))
}

fn validate_meeting_window(form: &MeetingProposalForm) -> Result<(), ValidationError> {
    check_window(form.start, form.end)?;
    if form.start <= Utc::now() {
        return Err(ValidationError::new("start_in_past")
            .with_message("Meeting must start in the future".into()));
    }
    Ok(())
}

fn validate_event_window(form: &CalendarEventForm) -> Result<(), ValidationError> {
    check_window(form.start, form.end)
}

fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ValidationError> {
    if start < end {
        Ok(())
    } else {
        Err(ValidationError::new("time_range")
            .with_message("End time must be after start time".into()))
    }
}

fn blank_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
