//! OAuth client-credentials token exchange.

use serde::Deserialize;

use vigil_core::errors::StorageError;

/// Credentials for the `client_credentials` grant.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl ClientCredentials {
    /// Form fields of the token request.
    pub fn form(&self) -> [(&'static str, &str); 3] {
        [
            ("grant_type", "client_credentials"),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in_secs: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Parse a token endpoint response body.
pub fn parse_token_response(body: &str) -> Result<AccessToken, StorageError> {
    let parsed: TokenResponse =
        serde_json::from_str(body).map_err(|e| StorageError::TokenExchange {
            reason: format!("failed to parse token response: {e}"),
        })?;

    if let Some(error) = parsed.error {
        let description = parsed
            .error_description
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(StorageError::TokenExchange {
            reason: format!("token endpoint error: {error}: {description}"),
        });
    }

    let access_token = parsed
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| StorageError::TokenExchange {
            reason: "no access_token in token response".to_string(),
        })?;

    Ok(AccessToken {
        access_token,
        expires_in_secs: parsed.expires_in.unwrap_or(3600),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success() {
        let token =
            parse_token_response(r#"{"access_token":"abc","token_type":"Bearer","expires_in":300}"#)
                .unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in_secs, 300);
    }

    #[test]
    fn test_parse_default_expiry() {
        let token = parse_token_response(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(token.expires_in_secs, 3600);
    }

    #[test]
    fn test_parse_error_response() {
        let err = parse_token_response(
            r#"{"error":"invalid_client","error_description":"bad secret"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid_client: bad secret"));
    }

    #[test]
    fn test_parse_missing_token() {
        assert!(parse_token_response(r#"{"token_type":"Bearer"}"#).is_err());
        assert!(parse_token_response("<html>").is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = ClientCredentials {
            token_url: "https://sso.example.com/token".to_string(),
            client_id: "vigil".to_string(),
            client_secret: "hunter2".to_string(),
        };
        assert!(!format!("{credentials:?}").contains("hunter2"));
    }
}
