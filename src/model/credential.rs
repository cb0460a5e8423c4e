//! Credential records.
//!
//! `password` and `enable_secret` are deliberately excluded from `Debug`,
//! `Display`, and `Serialize` — the only thing ever allowed to cross the
//! artifact/log boundary is [`CredentialUsed`], which retains username,
//! auth type, and port only (spec §3, §6, property 8).

use serde::Serialize;

#[derive(Clone, PartialEq, Eq)]
pub enum AuthType {
    Password,
    Key,
    Token,
}

impl std::fmt::Debug for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuthType::Password => "password",
            AuthType::Key => "key",
            AuthType::Token => "token",
        };
        f.write_str(s)
    }
}

#[derive(Clone)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub enable_secret: Option<String>,
    pub auth_type: AuthType,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("enable_secret", &self.enable_secret.as_ref().map(|_| "<redacted>"))
            .field("auth_type", &self.auth_type)
            .finish()
    }
}

/// What persists about a credential once a device has been discovered —
/// never the password or enable secret (spec §3, §6).
#[derive(Debug, Clone, Serialize)]
pub struct CredentialUsed {
    pub username: String,
    pub auth_type: CredentialUsedAuthType,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialUsedAuthType {
    Password,
    Key,
    Token,
}

impl From<&AuthType> for CredentialUsedAuthType {
    fn from(a: &AuthType) -> Self {
        match a {
            AuthType::Password => CredentialUsedAuthType::Password,
            AuthType::Key => CredentialUsedAuthType::Key,
            AuthType::Token => CredentialUsedAuthType::Token,
        }
    }
}

impl Credential {
    pub fn redact(&self, port: u16) -> CredentialUsed {
        CredentialUsed {
            username: self.username.clone(),
            auth_type: (&self.auth_type).into(),
            port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_contains_secret() {
        let cred = Credential {
            username: "admin".into(),
            password: "hunter2".into(),
            enable_secret: Some("topsecret".into()),
            auth_type: AuthType::Password,
        };
        let rendered = format!("{cred:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("topsecret"));
        assert!(rendered.contains("admin"));
    }

    #[test]
    fn redact_drops_password() {
        let cred = Credential {
            username: "bob".into(),
            password: "secret".into(),
            enable_secret: None,
            auth_type: AuthType::Key,
        };
        let used = cred.redact(22);
        let json = serde_json::to_string(&used).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("bob"));
    }
}
