use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Header carrying the project's anon (publishable) key on every request.
const API_KEY_HEADER: HeaderName = HeaderName::from_static("apikey");

/// Header identifying this client to the backend's request logs.
const APP_NAME_HEADER: HeaderName = HeaderName::from_static("x-application-name");

/// Key material for talking to a Supabase project.
///
/// The anon key is always sent as `apikey`. The bearer token is the
/// signed-in user's access token when one is available; without it the
/// anon key doubles as the bearer and row-level security sees an
/// anonymous caller.
#[derive(Debug, Clone)]
pub struct ApiKeys {
    pub anon_key: SecretString,
    pub access_token: Option<SecretString>,
}

impl ApiKeys {
    pub fn anonymous(anon_key: SecretString) -> Self {
        Self {
            anon_key,
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: SecretString) -> Self {
        self.access_token = Some(token);
        self
    }

    /// Whether requests will run as a signed-in user.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Build the default header set injected into every request.
    pub(crate) fn to_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();

        let mut key = sensitive_value(self.anon_key.expose_secret(), "anon key")?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let bearer = self
            .access_token
            .as_ref()
            .unwrap_or(&self.anon_key)
            .expose_secret();
        let auth = sensitive_value(&format!("Bearer {bearer}"), "access token")?;
        headers.insert(AUTHORIZATION, auth);

        headers.insert(APP_NAME_HEADER, HeaderValue::from_static("transferdesk"));
        Ok(headers)
    }
}

fn sensitive_value(raw: &str, what: &str) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(raw).map_err(|e| Error::Authentication {
        message: format!("invalid {what} header value: {e}"),
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn anon_key_doubles_as_bearer_without_session() {
        let keys = ApiKeys::anonymous(SecretString::from("anon-123".to_string()));
        let headers = keys.to_headers().unwrap();
        assert_eq!(headers.get("apikey").unwrap(), "anon-123");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer anon-123");
        assert!(!keys.is_authenticated());
    }

    #[test]
    fn access_token_takes_over_bearer() {
        let keys = ApiKeys::anonymous(SecretString::from("anon-123".to_string()))
            .with_access_token(SecretString::from("jwt-abc".to_string()));
        let headers = keys.to_headers().unwrap();
        assert_eq!(headers.get("apikey").unwrap(), "anon-123");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer jwt-abc");
        assert_eq!(headers.get("x-application-name").unwrap(), "transferdesk");
    }

    #[test]
    fn rejects_keys_with_control_characters() {
        let keys = ApiKeys::anonymous(SecretString::from("bad\nkey".to_string()));
        assert!(matches!(
            keys.to_headers(),
            Err(Error::Authentication { .. })
        ));
    }
}
