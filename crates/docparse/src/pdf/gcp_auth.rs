//! GCP service account authentication
//!
//! Signs a JWT with the service account key and exchanges it for an OAuth2
//! access token. A fresh token is requested for every load; nothing is
//! cached between calls.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::error::{Error, Result};

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Service account credentials loaded from a JSON key file
#[derive(Debug, Clone)]
pub struct GcpAuth {
    key_path: PathBuf,
}

#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GcpAuth {
    /// Create from service account JSON key file
    pub fn from_service_account(key_path: impl AsRef<Path>) -> Result<Self> {
        let key_path = key_path.as_ref();
        if !key_path.exists() {
            return Err(Error::config(format!(
                "Service account key not found: {}",
                key_path.display()
            )));
        }

        Ok(Self {
            key_path: key_path.to_path_buf(),
        })
    }

    /// Fetch an access token for the cloud-platform scope
    pub fn access_token(&self, client: &reqwest::blocking::Client) -> Result<String> {
        let key_content = std::fs::read_to_string(&self.key_path)?;
        let key: ServiceAccountKey = serde_json::from_str(&key_content)?;

        let jwt = sign_jwt(&key)?;

        let response = client
            .post(&key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", jwt.as_str()),
            ])
            .send()?
            .error_for_status()?;

        let token: TokenResponse = response.json()?;
        Ok(token.access_token)
    }
}

fn sign_jwt(key: &ServiceAccountKey) -> Result<String> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(Error::backend)?
        .as_secs();

    let claims = serde_json::json!({
        "iss": key.client_email,
        "scope": CLOUD_PLATFORM_SCOPE,
        "aud": key.token_uri,
        "iat": now,
        "exp": now + 3600,
    });

    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#.as_bytes());
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    let signing_input = format!("{}.{}", header, payload);

    let private_key = key.private_key.replace("\\n", "\n");
    let pem = pem::parse(&private_key)
        .map_err(|e| Error::config(format!("Failed to parse private key PEM: {}", e)))?;
    let key_pair = ring::signature::RsaKeyPair::from_pkcs8(pem.contents())
        .map_err(|e| Error::config(format!("Failed to parse private key: {}", e)))?;

    let mut signature = vec![0u8; key_pair.public().modulus_len()];
    key_pair
        .sign(
            &ring::signature::RSA_PKCS1_SHA256,
            &ring::rand::SystemRandom::new(),
            signing_input.as_bytes(),
            &mut signature,
        )
        .map_err(|e| Error::config(format!("Failed to sign JWT: {}", e)))?;

    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(&signature)))
}
