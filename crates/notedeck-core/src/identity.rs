//! Authenticated identity and bearer credential
//!
//! A [`Session`] pairs the identity returned by login/signup with the opaque
//! bearer token used on every authenticated call. The token is never decoded
//! or verified client-side.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a user inside their tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Member,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("ADMIN"),
            Role::Member => f.write_str("MEMBER"),
        }
    }
}

/// Subscription plan of a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Free => f.write_str("FREE"),
            Plan::Pro => f.write_str("PRO"),
        }
    }
}

/// Identity record persisted next to the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub email: String,
    pub role: Role,
    pub tenant_slug: String,
    /// Only known after an upgrade or when the server volunteers it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
}

impl Identity {
    /// Plan used for entitlement decisions; an unrecorded plan counts as FREE.
    pub fn effective_plan(&self) -> Plan {
        self.plan.unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Opaque bearer token.
///
/// `Debug` never prints the value so credentials can't leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<{} bytes>)", self.0.len())
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The active authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub token: Credential,
}

impl Session {
    pub fn new(identity: Identity, token: Credential) -> Self {
        Self { identity, token }
    }
}

/// Body of a successful `/login` or `/signup` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
    pub role: Role,
    pub tenant_slug: String,
    #[serde(default)]
    pub plan: Option<Plan>,
}

impl From<AuthResponse> for Session {
    fn from(resp: AuthResponse) -> Self {
        Session {
            identity: Identity {
                email: resp.email,
                role: resp.role,
                tenant_slug: resp.tenant_slug,
                plan: resp.plan,
            },
            token: Credential::new(resp.token),
        }
    }
}

/// `/login` request body
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `/signup` request body
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub tenant_name: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("tenant_name", &self.tenant_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_into_session() {
        let resp: AuthResponse = serde_json::from_value(serde_json::json!({
            "token": "t1",
            "email": "admin@acme.test",
            "role": "ADMIN",
            "tenantSlug": "acme"
        }))
        .unwrap();

        let session = Session::from(resp);
        assert_eq!(session.token.expose(), "t1");
        assert_eq!(session.identity.email, "admin@acme.test");
        assert_eq!(session.identity.role, Role::Admin);
        assert_eq!(session.identity.tenant_slug, "acme");
        assert_eq!(session.identity.plan, None);
        assert_eq!(session.identity.effective_plan(), Plan::Free);
    }

    #[test]
    fn test_identity_serializes_camel_case_without_plan() {
        let identity = Identity {
            email: "user@acme.test".to_string(),
            role: Role::Member,
            tenant_slug: "acme".to_string(),
            plan: None,
        };

        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "email": "user@acme.test",
                "role": "MEMBER",
                "tenantSlug": "acme"
            })
        );
    }

    #[test]
    fn test_identity_with_plan() {
        let identity: Identity = serde_json::from_str(
            r#"{"email":"admin@globex.test","role":"ADMIN","tenantSlug":"globex","plan":"PRO"}"#,
        )
        .unwrap();
        assert_eq!(identity.effective_plan(), Plan::Pro);
        assert!(identity.is_admin());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result: std::result::Result<Identity, _> = serde_json::from_str(
            r#"{"email":"x@acme.test","role":"OWNER","tenantSlug":"acme"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let token = Credential::new("secret-token");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("secret-token"));
        assert_eq!(token.bearer(), "Bearer secret-token");

        let creds = Credentials::new("a@b.test", "hunter2");
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }

    #[test]
    fn test_signup_request_body() {
        let req = SignupRequest {
            email: "new@initech.test".to_string(),
            password: "pw".to_string(),
            tenant_name: "Initech".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["tenantName"], "Initech");
        assert_eq!(json["email"], "new@initech.test");
    }
}
