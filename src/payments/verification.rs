use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::{LedgerError, Result};

type HmacSha256 = Hmac<Sha256>;

/// length of a hex encoded SHA-256 digest
const SIGNATURE_HEX_LEN: usize = 64;

fn keyed_mac(order_id: &str, payment_id: &str, secret: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Some(mac)
}

/// lowercase hex HMAC-SHA256 of `order_id|payment_id` under the gateway's
/// key secret, as the gateway sends it
pub fn sign(order_id: &str, payment_id: &str, secret: &str) -> Result<String> {
    keyed_mac(order_id, payment_id, secret)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .ok_or_else(|| LedgerError::InvalidConfiguration {
            message: "gateway key secret rejected by hmac".to_string(),
        })
}

/// true only when `provided_signature` is exactly the lowercase hex HMAC of
/// `order_id|payment_id` under `secret`. never panics, never errors.
///
/// shape checks (length, lowercase hex) only look at public input; the digest
/// itself is compared in constant time by `verify_slice`.
pub fn verify(order_id: &str, payment_id: &str, provided_signature: &str, secret: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    if provided_signature.len() != SIGNATURE_HEX_LEN
        || !provided_signature
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return false;
    }
    let Ok(provided) = hex::decode(provided_signature) else {
        return false;
    };
    match keyed_mac(order_id, payment_id, secret) {
        Some(mac) => mac.verify_slice(&provided).is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret";
    const ORDER: &str = "order_DBJOWzybf0sJbb";
    const PAYMENT: &str = "pay_DGDMgoq2DjJ9tR";
    const KNOWN: &str = "d26f02adad54a4756fd67df1e46bbd1d4686b0a9786a45186466f7cd838cab68";

    #[test]
    fn test_known_vector() {
        assert_eq!(sign(ORDER, PAYMENT, SECRET).unwrap(), KNOWN);
        assert!(verify(ORDER, PAYMENT, KNOWN, SECRET));
    }

    #[test]
    fn test_forged_signature_rejected() {
        let forged = "0123456789abcdef".repeat(4);
        assert!(!verify(ORDER, PAYMENT, &forged, SECRET));
        assert!(!verify(ORDER, PAYMENT, "", SECRET));
        assert!(!verify(ORDER, PAYMENT, "not-hex", SECRET));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        assert!(!verify(ORDER, PAYMENT, KNOWN, "other_secret"));
        assert!(!verify(ORDER, PAYMENT, KNOWN, ""));
    }

    #[test]
    fn test_uppercase_hex_rejected() {
        assert!(!verify(ORDER, PAYMENT, &KNOWN.to_uppercase(), SECRET));
    }

    #[test]
    fn test_single_character_mutations_flip_result() {
        // signature
        for i in 0..KNOWN.len() {
            let mut bytes = KNOWN.as_bytes().to_vec();
            bytes[i] = if bytes[i] == b'0' { b'1' } else { b'0' };
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(!verify(ORDER, PAYMENT, &mutated, SECRET), "signature index {}", i);
        }

        // order id
        for i in 0..ORDER.len() {
            let mut bytes = ORDER.as_bytes().to_vec();
            bytes[i] = if bytes[i] == b'x' { b'y' } else { b'x' };
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(!verify(&mutated, PAYMENT, KNOWN, SECRET), "order index {}", i);
        }

        // payment id
        for i in 0..PAYMENT.len() {
            let mut bytes = PAYMENT.as_bytes().to_vec();
            bytes[i] = if bytes[i] == b'x' { b'y' } else { b'x' };
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(!verify(ORDER, &mutated, KNOWN, SECRET), "payment index {}", i);
        }
    }

    #[test]
    fn test_signed_message_is_plain_concatenation() {
        // the gateway signs the joined string, so the split point is not covered
        let sig = sign("a|b", "c", SECRET).unwrap();
        assert_eq!(sig, sign("a", "b|c", SECRET).unwrap());
        assert_ne!(sig, sign("a", "bc", SECRET).unwrap());
    }
}
