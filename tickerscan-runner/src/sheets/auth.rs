//! Service-account OAuth: sign a JWT assertion and trade it for an access token.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::SheetsError;
use crate::credentials::ServiceAccountKey;

/// Spreadsheet read/write plus Drive access for search, create and share.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

/// Assertion lifetime accepted by Google's token endpoint (max one hour).
const ASSERTION_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(key: &ServiceAccountKey, scopes: &[&str], issued_at: i64) -> Self {
        Self {
            iss: key.client_email.clone(),
            scope: scopes.join(" "),
            aud: key.token_uri.clone(),
            iat: issued_at,
            exp: issued_at + ASSERTION_TTL_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// RS256-signed assertion for the token endpoint.
pub fn sign_assertion(key: &ServiceAccountKey, claims: &JwtClaims) -> Result<String, SheetsError> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| SheetsError::Auth(format!("invalid private key: {e}")))?;
    encode(&Header::new(Algorithm::RS256), claims, &encoding_key)
        .map_err(|e| SheetsError::Auth(format!("sign assertion: {e}")))
}

/// Exchange a signed assertion for a bearer token.
pub fn fetch_access_token(
    http: &reqwest::blocking::Client,
    key: &ServiceAccountKey,
    scopes: &[&str],
) -> Result<String, SheetsError> {
    let claims = JwtClaims::new(key, scopes, Utc::now().timestamp());
    let assertion = sign_assertion(key, &claims)?;

    let resp = http
        .post(&key.token_uri)
        .form(&[
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ])
        .send()
        .map_err(|e| SheetsError::Auth(format!("token request: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(SheetsError::Auth(format!("token endpoint returned {status}: {body}")));
    }

    resp.json::<TokenResponse>()
        .map(|t| t.access_token)
        .map_err(|e| SheetsError::Auth(format!("token response: {e}")))
}
