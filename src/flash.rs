//! One-shot status messages carried between requests in a signed cookie.
//!
//! The cookie value is `<payload>.<signature>`, both URL-safe base64. The
//! payload is the JSON list of pending messages and the signature is
//! HMAC-SHA256 over the encoded payload, keyed by the configured secret.

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::model::error::{ErrorKind, StorageError};

pub const COOKIE_NAME: &str = "objectdesk_flash";

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
            kind: None,
        }
    }

    pub fn error(err: &StorageError) -> Self {
        Self {
            level: Level::Error,
            message: format!("Error: {}", err),
            kind: Some(err.kind),
        }
    }
}

#[derive(Clone)]
pub struct FlashSigner {
    mac: HmacSha256,
}

impl FlashSigner {
    pub fn new(secret: &[u8]) -> Result<Self, hmac::digest::InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(secret)?,
        })
    }

    /// Pending messages from the request's flash cookie. A missing,
    /// malformed or forged cookie yields no messages.
    pub fn read(&self, headers: &HeaderMap) -> Vec<Flash> {
        cookie_value(headers, COOKIE_NAME)
            .and_then(|value| self.decode(value))
            .unwrap_or_default()
    }

    /// `Set-Cookie` value holding `flashes`.
    pub fn store(&self, flashes: &[Flash]) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            COOKIE_NAME,
            self.encode(flashes)
        )
    }

    /// `Set-Cookie` value that drops the flash cookie.
    pub fn clear(&self) -> String {
        format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", COOKIE_NAME)
    }

    fn encode(&self, flashes: &[Flash]) -> String {
        // Serializing plain structs of strings and unit enums cannot fail.
        let json = serde_json::to_vec(flashes).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes()));
        format!("{}.{}", payload, signature)
    }

    fn decode(&self, value: &str) -> Option<Vec<Flash>> {
        let (payload, signature) = value.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
