//! Registration submission as received from the client.

use serde::Deserialize;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Every field is optional on the wire; presence is checked by the service
/// so that a missing field yields "Missing required fields" rather than a
/// deserialization error. Empty strings count as missing.
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub parent_phone_number: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub confirm_password: Option<String>,
    #[serde(default, alias = "recaptchaToken")]
    pub challenge_token: Option<String>,
}

impl RegistrationRequest {
    pub fn full_name(&self) -> Option<&str> {
        present(&self.full_name)
    }

    pub fn phone_number(&self) -> Option<&str> {
        present(&self.phone_number)
    }

    pub fn parent_phone_number(&self) -> Option<&str> {
        present(&self.parent_phone_number)
    }

    pub fn password(&self) -> Option<&str> {
        present(&self.password)
    }

    pub fn confirm_password(&self) -> Option<&str> {
        present(&self.confirm_password)
    }

    pub fn challenge_token(&self) -> Option<&str> {
        present(&self.challenge_token)
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("full_name", &self.full_name)
            .field("phone_number", &self.phone_number)
            .field("parent_phone_number", &self.parent_phone_number)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "confirm_password",
                &self.confirm_password.as_ref().map(|_| "<redacted>"),
            )
            .field("challenge_token", &self.challenge_token.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_and_legacy_token_name() {
        let req: RegistrationRequest = serde_json::from_str(
            r#"{"fullName":"X","phoneNumber":"100","parentPhoneNumber":"200",
                "password":"p","confirmPassword":"p","recaptchaToken":"ok"}"#,
        )
        .unwrap();
        assert_eq!(req.full_name(), Some("X"));
        assert_eq!(req.challenge_token(), Some("ok"));
    }

    #[test]
    fn empty_strings_are_missing() {
        let req: RegistrationRequest =
            serde_json::from_str(r#"{"fullName":"","phoneNumber":"100"}"#).unwrap();
        assert_eq!(req.full_name(), None);
        assert_eq!(req.phone_number(), Some("100"));
        assert_eq!(req.password(), None);
    }

    #[test]
    fn debug_redacts_secrets() {
        let req = RegistrationRequest {
            full_name: Some("X".into()),
            phone_number: None,
            parent_phone_number: None,
            password: Some("hunter2".into()),
            confirm_password: Some("hunter2".into()),
            challenge_token: Some("tok-123".into()),
        };
        let printed = format!("{req:?}");
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("tok-123"));
    }
}
