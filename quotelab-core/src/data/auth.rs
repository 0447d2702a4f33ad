//! J-Quants credential exchange.
//!
//! Two steps: email + password → refresh token (`/token/auth_user`), then
//! refresh token → ID token (`/token/auth_refresh`). The ID token is the
//! bearer credential for data requests. Nothing is cached; every call
//! performs a fresh exchange, and a failed exchange is returned immediately.

use super::error::{body_message, AuthError};
use crate::config::{mask_secret, ENV_JQUANTS_EMAIL, ENV_JQUANTS_PASSWORD};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::fmt;

/// Email + password for the J-Quants user-auth endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct JQuantsCredentials {
    pub email: String,
    pub password: String,
}

impl JQuantsCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for JQuantsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JQuantsCredentials")
            .field("email", &mask_secret(&self.email))
            .field("password", &"<redacted>")
            .finish()
    }
}

macro_rules! opaque_token {
    ($name:ident) => {
        /// Opaque token string. Formatting shows only a masked prefix.
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            pub fn new(token: impl Into<String>) -> Self {
                Self(token.into())
            }

            /// The full token, for request headers and parameters only.
            pub fn secret(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), mask_secret(&self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&mask_secret(&self.0))
            }
        }
    };
}

opaque_token!(RefreshToken);
opaque_token!(IdToken);

#[derive(Debug, Deserialize)]
struct RefreshTokenResponse {
    #[serde(rename = "refreshToken")]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdTokenResponse {
    #[serde(rename = "idToken")]
    id_token: Option<String>,
}

pub struct JQuantsAuth {
    client: Client,
    base_url: String,
    credentials: JQuantsCredentials,
}

impl JQuantsAuth {
    pub fn new(client: Client, base_url: impl Into<String>, credentials: JQuantsCredentials) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Exchange email + password for a refresh token.
    pub fn refresh_token(&self) -> Result<RefreshToken, AuthError> {
        if self.credentials.email.trim().is_empty() {
            return Err(AuthError::MissingCredentials(ENV_JQUANTS_EMAIL));
        }
        if self.credentials.password.is_empty() {
            return Err(AuthError::MissingCredentials(ENV_JQUANTS_PASSWORD));
        }

        let url = format!("{}/token/auth_user", self.base_url);
        tracing::debug!(
            url = %url,
            email = %mask_secret(&self.credentials.email),
            "requesting refresh token"
        );

        let body = serde_json::json!({
            "mailaddress": self.credentials.email,
            "password": self.credentials.password,
        });
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let text = read_success_body(resp)?;

        let parsed: RefreshTokenResponse =
            serde_json::from_str(&text).map_err(|e| AuthError::Decode(e.to_string()))?;
        let token = parsed
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken {
                field: "refreshToken",
            })?;

        let token = RefreshToken::new(token);
        tracing::debug!(token = %token, "refresh token issued");
        Ok(token)
    }

    /// Exchange a refresh token for an ID token (the session credential).
    pub fn id_token(&self, refresh_token: &RefreshToken) -> Result<IdToken, AuthError> {
        let url = format!("{}/token/auth_refresh", self.base_url);
        tracing::debug!(url = %url, refresh_token = %refresh_token, "requesting id token");

        let resp = self
            .client
            .post(&url)
            .query(&[("refreshtoken", refresh_token.secret())])
            .send()
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let text = read_success_body(resp)?;

        let parsed: IdTokenResponse =
            serde_json::from_str(&text).map_err(|e| AuthError::Decode(e.to_string()))?;
        let token = parsed
            .id_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken { field: "idToken" })?;

        let token = IdToken::new(token);
        tracing::debug!(token = %token, "id token issued");
        Ok(token)
    }

    /// Run both exchanges and return a fresh session credential.
    pub fn session(&self) -> Result<IdToken, AuthError> {
        let refresh = self.refresh_token()?;
        self.id_token(&refresh)
    }
}

fn read_success_body(resp: reqwest::blocking::Response) -> Result<String, AuthError> {
    let status = resp.status();
    let text = resp.text().map_err(|e| AuthError::Network(e.to_string()))?;
    if !status.is_success() {
        return Err(AuthError::Status {
            status: status.as_u16(),
            message: body_message(&text),
        });
    }
    Ok(text)
}
