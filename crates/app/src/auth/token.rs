//! Bearer token wire format.
//!
//! Tokens look like `em_v1_<token uuid, simple>.<64 hex chars of secret>`. Only an
//! HMAC verifier of the secret is stored; the raw token is shown once at issuance.

use std::{fmt, str::FromStr};

use rand::{RngCore, rngs::OsRng};
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::domain::users::models::UserUuid;

/// Leading segment of every token.
pub const API_TOKEN_PREFIX: &str = "em";

pub const API_TOKEN_SECRET_BYTES: usize = 32;

const SECRET_HEX_LEN: usize = API_TOKEN_SECRET_BYTES * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiTokenVersion {
    V1,
}

impl ApiTokenVersion {
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::V1 => 1,
        }
    }

    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::V1 => "v1",
        }
    }
}

impl TryFrom<i16> for ApiTokenVersion {
    type Error = ApiTokenError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            _ => Err(ApiTokenError::UnsupportedVersion),
        }
    }
}

impl FromStr for ApiTokenVersion {
    type Err = ApiTokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "v1" => Ok(Self::V1),
            _ => Err(ApiTokenError::UnsupportedVersion),
        }
    }
}

/// Secret half of a token. Wiped on drop and never printed.
#[derive(Clone)]
pub struct ApiTokenSecret([u8; API_TOKEN_SECRET_BYTES]);

impl ApiTokenSecret {
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; API_TOKEN_SECRET_BYTES];

        OsRng.fill_bytes(&mut bytes);

        Self(bytes)
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; API_TOKEN_SECRET_BYTES]) -> Self {
        Self(bytes)
    }

    fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{byte:02x}")).collect()
    }

    fn from_hex(encoded: &str) -> Option<Self> {
        let digits = encoded.as_bytes();

        if digits.len() != SECRET_HEX_LEN {
            return None;
        }

        let mut bytes = [0_u8; API_TOKEN_SECRET_BYTES];

        for (byte, pair) in bytes.iter_mut().zip(digits.chunks_exact(2)) {
            let [hi, lo] = pair else {
                return None;
            };

            *byte = (nibble(*hi)? << 4) | nibble(*lo)?;
        }

        Some(Self(bytes))
    }
}

impl PartialEq for ApiTokenSecret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl fmt::Debug for ApiTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiTokenSecret(**redacted**)")
    }
}

impl Drop for ApiTokenSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

fn nibble(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// A bearer token split into its parts.
#[derive(Debug, Clone)]
pub struct ParsedApiToken {
    pub token_uuid: Uuid,
    pub version: ApiTokenVersion,
    pub secret: ApiTokenSecret,
}

#[derive(Debug, Error)]
pub enum ApiTokenError {
    #[error("api token format is invalid")]
    InvalidFormat,

    #[error("api token uses an unsupported version")]
    UnsupportedVersion,

    #[error("api token secret encoding is invalid")]
    InvalidSecretEncoding,
}

impl ParsedApiToken {
    /// Render the raw bearer token.
    #[must_use]
    pub fn format(&self) -> String {
        format!(
            "{API_TOKEN_PREFIX}_{}_{}.{}",
            self.version.segment(),
            self.token_uuid.simple(),
            self.secret.to_hex()
        )
    }

    /// Bytes the verifier HMAC is computed over, binding the secret to its
    /// token id, version and owning user.
    #[must_use]
    pub fn verifier_input(&self, user: UserUuid) -> Vec<u8> {
        format!(
            "{}:{}:{}:{}",
            self.token_uuid.simple(),
            self.version.as_i16(),
            user.into_uuid().simple(),
            self.secret.to_hex(),
        )
        .into_bytes()
    }
}

impl FromStr for ParsedApiToken {
    type Err = ApiTokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (head, secret) = token.split_once('.').ok_or(ApiTokenError::InvalidFormat)?;

        let mut segments = head.splitn(3, '_');

        let (Some(prefix), Some(version), Some(token_uuid)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(ApiTokenError::InvalidFormat);
        };

        if prefix != API_TOKEN_PREFIX {
            return Err(ApiTokenError::InvalidFormat);
        }

        Ok(Self {
            version: version.parse()?,
            token_uuid: Uuid::try_parse(token_uuid).map_err(|_| ApiTokenError::InvalidFormat)?,
            secret: ApiTokenSecret::from_hex(secret)
                .ok_or(ApiTokenError::InvalidSecretEncoding)?,
        })
    }
}
