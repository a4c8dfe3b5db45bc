//! Field layouts for the authentication screens

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind }
    }

    pub fn is_required(&self) -> bool {
        self.kind != FieldKind::Optional
    }
}

/// Title, ordered fields and submit label of a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormLayout {
    pub title: &'static str,
    pub fields: Vec<FieldSpec>,
    pub submit_label: &'static str,
}

impl FormLayout {
    pub fn login() -> Self {
        Self {
            title: "Sign in",
            fields: vec![
                FieldSpec::new("email", "Email", FieldKind::Email),
                FieldSpec::new("password", "Password", FieldKind::Password),
            ],
            submit_label: "Sign in",
        }
    }

    pub fn register() -> Self {
        Self {
            title: "Create an account",
            fields: vec![
                FieldSpec::new("first_name", "First name", FieldKind::Text),
                FieldSpec::new("last_name", "Last name", FieldKind::Text),
                FieldSpec::new("email", "Email", FieldKind::Email),
                FieldSpec::new("password", "Password", FieldKind::Password),
                FieldSpec::new("confirm_password", "Confirm password", FieldKind::Password),
                FieldSpec::new("invite_code", "Invite code", FieldKind::Optional),
            ],
            submit_label: "Create account",
        }
    }

    pub fn reset_password() -> Self {
        Self {
            title: "Reset your password",
            fields: vec![FieldSpec::new("email", "Email", FieldKind::Email)],
            submit_label: "Send reset link",
        }
    }

    pub fn update_password() -> Self {
        Self {
            title: "Choose a new password",
            fields: vec![
                FieldSpec::new("password", "New password", FieldKind::Password),
                FieldSpec::new("confirm_password", "Confirm password", FieldKind::Password),
            ],
            submit_label: "Update password",
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_layout_matches_form_fields() {
        let layout = FormLayout::register();
        let names: Vec<_> = layout.fields.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            ["first_name", "last_name", "email", "password", "confirm_password", "invite_code"]
        );
        assert!(!layout.field("invite_code").unwrap().is_required());
        assert!(layout.field("email").unwrap().is_required());
    }

    #[test]
    fn test_password_fields_are_masked() {
        for layout in [FormLayout::login(), FormLayout::update_password()] {
            assert_eq!(layout.field("password").unwrap().kind, FieldKind::Password);
        }
    }
}
