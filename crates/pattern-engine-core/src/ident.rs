//! Record identifier minting.
//!
//! Identifiers are a short type prefix followed by 16 lowercase hex
//! characters drawn from a cryptographically strong source (`OsRng`).
//! Tests that need reproducible identifiers can mint from any seeded
//! [`RngCore`] via [`mint_with`].

use rand::rngs::OsRng;
use rand::RngCore;

/// Identifier prefix, one per persisted record type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdPrefix {
    /// Temporal pattern analysis: `pat_`
    Pattern,
    /// Anomaly report: `anom_`
    Anomaly,
    /// Correlation analysis: `corr_`
    Correlation,
}

impl IdPrefix {
    /// The literal prefix string including the trailing underscore.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pattern => "pat_",
            Self::Anomaly => "anom_",
            Self::Correlation => "corr_",
        }
    }
}

/// Mint a fresh identifier from the operating system RNG.
pub fn mint(prefix: IdPrefix) -> String {
    mint_with(prefix, &mut OsRng)
}

/// Mint an identifier from the supplied RNG.
pub fn mint_with(prefix: IdPrefix, rng: &mut impl RngCore) -> String {
    let mut bytes = [0u8; 8];
    rng.fill_bytes(&mut bytes);

    let mut id = String::with_capacity(prefix.as_str().len() + 16);
    id.push_str(prefix.as_str());
    for byte in bytes {
        // two lowercase hex chars per byte
        id.push_str(&format!("{byte:02x}"));
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_prefix_and_length() {
        let id = mint(IdPrefix::Pattern);
        assert!(id.starts_with("pat_"));
        assert_eq!(id.len(), 4 + 16);

        let id = mint(IdPrefix::Anomaly);
        assert!(id.starts_with("anom_"));
        assert_eq!(id.len(), 5 + 16);

        let id = mint(IdPrefix::Correlation);
        assert!(id.starts_with("corr_"));
        assert_eq!(id.len(), 5 + 16);
    }

    #[test]
    fn test_hex_suffix_is_lowercase() {
        let id = mint(IdPrefix::Pattern);
        let suffix = &id[4..];
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_seeded_mint_is_reproducible() {
        let a = mint_with(IdPrefix::Correlation, &mut ChaCha8Rng::seed_from_u64(7));
        let b = mint_with(IdPrefix::Correlation, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_fresh_ids_differ() {
        assert_ne!(mint(IdPrefix::Pattern), mint(IdPrefix::Pattern));
    }
}
