//! Payment callback signatures.
//!
//! The provider signs `order_id + "|" + payment_id` with HMAC-SHA256 under
//! the shared secret; verification recomputes the hex digest and compares
//! for exact equality. This only ever runs server-side.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::payment::types::PaymentError;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of an arbitrary payload.
pub fn hmac_hex(secret: &str, payload: &str) -> Result<String, PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Provider(e.to_string()))?;
    mac.update(payload.as_bytes());
    let digest = mac.finalize().into_bytes();

    let mut out = String::with_capacity(digest.len() * 2);
    append_hex_lower(&digest, &mut out);
    Ok(out)
}

/// Signature over a provider order/payment id pair.
pub fn signature_hex(secret: &str, order_id: &str, payment_id: &str) -> Result<String, PaymentError> {
    hmac_hex(secret, &format!("{order_id}|{payment_id}"))
}

/// Check a supplied signature against the recomputed one.
pub fn verify_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    supplied: &str,
) -> Result<bool, PaymentError> {
    let expected = signature_hex(secret, order_id, payment_id)?;
    Ok(expected == supplied)
}

fn append_hex_lower(bytes: &[u8], out: &mut String) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
}
