use digest::Digest;
use num_bigint::BigUint;
use sha2::Sha256;

/// Hash a sequence of integers to a scalar mod `modulus` (Fiat-Shamir challenge)
///
/// Each integer is written as lowercase hex, left-padded with `0` to at least two digits, and
/// the renderings are concatenated with no separator. The SHA-256 digest of that text, read as a
/// big-endian integer, is reduced mod `modulus`. Proofs are only portable between
/// implementations that reproduce this encoding exactly.
pub fn hash_to_scalar(modulus: &BigUint, elements: &[&BigUint]) -> BigUint {
    let mut hasher = Sha256::new();
    for element in elements {
        hasher.update(encode_element(element).as_bytes());
    }
    let digest = hasher.finalize();

    BigUint::from_bytes_be(&digest) % modulus
}

fn encode_element(element: &BigUint) -> String {
    let hex = element.to_str_radix(16);
    if hex.len() < 2 {
        format!("0{}", hex)
    } else {
        hex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_encoding() {
        assert_eq!(encode_element(&BigUint::from(0u32)), "00");
        assert_eq!(encode_element(&BigUint::from(10u32)), "0a");
        assert_eq!(encode_element(&BigUint::from(255u32)), "ff");
        assert_eq!(encode_element(&BigUint::from(256u32)), "100");
    }

    #[test]
    fn hash_matches_concatenated_hex() {
        let modulus = BigUint::from(1u32) << 300;
        let (a, b) = (BigUint::from(1u32), BigUint::from(0xabcu32));

        // "01" ++ "abc"
        let expected = BigUint::from_bytes_be(&Sha256::digest(b"01abc"));
        assert_eq!(hash_to_scalar(&modulus, &[&a, &b]), expected);

        // Ordering matters
        assert_ne!(
            hash_to_scalar(&modulus, &[&a, &b]),
            hash_to_scalar(&modulus, &[&b, &a])
        );
    }

    #[test]
    fn hash_is_reduced() {
        let modulus = BigUint::from(1_000_003u32);
        for i in 0..20u32 {
            let x = BigUint::from(i);
            assert!(hash_to_scalar(&modulus, &[&x]) < modulus);
        }
    }
}
