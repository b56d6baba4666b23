//! DPoP proof handling (RFC 9449).
//!
//! The token endpoint only needs the thumbprint of the public key embedded in
//! the proof header: it lands in the access token's `cnf.jkt` claim so that
//! resource servers can demand proof-of-possession. Full proof validation
//! (htm/htu/iat, signature) is the JOSE layer's job and happens elsewhere.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::AuthError;
use crate::AuthResult;

/// Extracts the RFC 7638 JWK thumbprint from a DPoP proof header value.
///
/// Decodes the JWS header without verifying the signature, reads the embedded
/// `jwk`, and computes `BASE64URL(SHA256(canonical-json(required members)))`.
///
/// # Errors
///
/// Returns `AuthError::InvalidDpopProof` when the proof is not a compact JWS,
/// the header is not valid JSON, the `jwk` member is missing, or the key type
/// is unsupported. All failures share the one machine code.
pub fn extract_dpop_jkt(proof: &str) -> AuthResult<String> {
    let header_b64 = proof
        .split('.')
        .next()
        .filter(|part| !part.is_empty())
        .ok_or_else(|| AuthError::invalid_dpop_proof("Proof is not a compact JWS"))?;

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|_| AuthError::invalid_dpop_proof("Proof header is not valid base64url"))?;

    let header: Value = serde_json::from_slice(&header_bytes)
        .map_err(|_| AuthError::invalid_dpop_proof("Proof header is not valid JSON"))?;

    let jwk = header
        .get("jwk")
        .and_then(Value::as_object)
        .ok_or_else(|| AuthError::invalid_dpop_proof("Proof header carries no jwk"))?;

    let kty = jwk
        .get("kty")
        .and_then(Value::as_str)
        .ok_or_else(|| AuthError::invalid_dpop_proof("jwk has no kty"))?;

    // RFC 7638 §3.2: required members per key type, lexicographic order.
    let members: &[&str] = match kty {
        "EC" => &["crv", "kty", "x", "y"],
        "RSA" => &["e", "kty", "n"],
        "OKP" => &["crv", "kty", "x"],
        "oct" => &["k", "kty"],
        other => {
            return Err(AuthError::invalid_dpop_proof(format!(
                "Unsupported jwk key type: {other}"
            )));
        }
    };

    let mut canonical = String::from("{");
    for (i, member) in members.iter().enumerate() {
        let value = jwk.get(*member).and_then(Value::as_str).ok_or_else(|| {
            AuthError::invalid_dpop_proof(format!("jwk is missing required member '{member}'"))
        })?;
        if i > 0 {
            canonical.push(',');
        }
        // Thumbprint members are base64url/text; serde_json handles escaping.
        canonical.push_str(&format!(
            "{}:{}",
            Value::String((*member).to_string()),
            Value::String(value.to_string())
        ));
    }
    canonical.push('}');

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proof_with_header(header: &Value) -> String {
        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header).unwrap());
        format!("{header_b64}.e30.c2ln")
    }

    #[test]
    fn test_rfc7638_rsa_test_vector() {
        // Key and thumbprint from RFC 7638 §3.1
        let header = json!({
            "typ": "dpop+jwt",
            "alg": "RS256",
            "jwk": {
                "kty": "RSA",
                "n": "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw",
                "e": "AQAB",
                "alg": "RS256",
                "kid": "2011-04-29"
            }
        });

        let jkt = extract_dpop_jkt(&proof_with_header(&header)).unwrap();
        assert_eq!(jkt, "NzbLsXh8uDCcd-6MNwXF4W_7noWXFZAfHkxZsRGC9Xs");
    }

    #[test]
    fn test_ec_key_thumbprint() {
        let header = json!({
            "typ": "dpop+jwt",
            "alg": "ES256",
            "jwk": {
                "kty": "EC",
                "crv": "P-256",
                "x": "l8tFrhx-34tV3hRICRDY9zCkDlpBhF42UQUfWVAWBFs",
                "y": "9VE4jf_Ok_o64zbTTlcuNJajHmt6v9TDVrU0CdvGRDA"
            }
        });

        let jkt = extract_dpop_jkt(&proof_with_header(&header)).unwrap();
        // Thumbprint is deterministic for the same key
        assert_eq!(jkt, extract_dpop_jkt(&proof_with_header(&header)).unwrap());
        assert_eq!(jkt.len(), 43);
    }

    #[test]
    fn test_not_a_jws() {
        let err = extract_dpop_jkt("").unwrap_err();
        assert!(matches!(err, AuthError::InvalidDpopProof { .. }));

        let err = extract_dpop_jkt("!!not-base64url!!.payload.sig").unwrap_err();
        assert!(matches!(err, AuthError::InvalidDpopProof { .. }));
    }

    #[test]
    fn test_header_not_json() {
        let header_b64 = URL_SAFE_NO_PAD.encode(b"not json at all");
        let err = extract_dpop_jkt(&format!("{header_b64}.e30.c2ln")).unwrap_err();
        assert!(matches!(err, AuthError::InvalidDpopProof { .. }));
    }

    #[test]
    fn test_missing_jwk() {
        let header = json!({"typ": "dpop+jwt", "alg": "ES256"});
        let err = extract_dpop_jkt(&proof_with_header(&header)).unwrap_err();
        assert!(matches!(err, AuthError::InvalidDpopProof { .. }));
    }

    #[test]
    fn test_unsupported_key_type() {
        let header = json!({
            "typ": "dpop+jwt",
            "alg": "ES256",
            "jwk": {"kty": "WEIRD", "x": "abc"}
        });
        let err = extract_dpop_jkt(&proof_with_header(&header)).unwrap_err();
        assert_eq!(err.oauth_error_code(), "invalid_dpop_proof");
    }

    #[test]
    fn test_missing_required_member() {
        let header = json!({
            "typ": "dpop+jwt",
            "alg": "ES256",
            "jwk": {"kty": "EC", "crv": "P-256", "x": "only-x"}
        });
        let err = extract_dpop_jkt(&proof_with_header(&header)).unwrap_err();
        assert!(matches!(err, AuthError::InvalidDpopProof { .. }));
    }
}
