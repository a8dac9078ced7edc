//! HS256 access tokens.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use roster_auth::{CredentialError, JwtClaims, TokenIssuer};

/// Signs [`JwtClaims`] with a shared secret.
#[derive(Clone)]
pub struct Hs256TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl core::fmt::Debug for Hs256TokenIssuer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Hs256TokenIssuer(***)")
    }
}

impl TokenIssuer for Hs256TokenIssuer {
    fn issue(&self, claims: &JwtClaims) -> Result<String, CredentialError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| CredentialError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<JwtClaims, CredentialError> {
        decode::<JwtClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| CredentialError::InvalidToken(e.to_string()))
    }
}
