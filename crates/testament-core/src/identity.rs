//! # Identity Newtypes
//!
//! Identifiers for drafts and their owners, plus the two Indian government
//! identifiers collected by the wizard.
//!
//! ## Validation
//!
//! UUID-based identifiers ([`OwnerId`], [`WillId`]) are always valid by
//! construction. String-based identifiers ([`Pan`], [`Aadhaar`]) validate
//! format at construction and at deserialization; there is no silent
//! normalization, so `"abcde1234f"` is rejected rather than uppercased.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Routes deserialization through the validating constructor so that
/// invalid values are rejected at the boundary.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $ty:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $ty(Uuid);

        impl $ty {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// The user who owns one or more will drafts.
    OwnerId
);

uuid_id!(
    /// One will-in-progress. Drafts are addressed by `(OwnerId, WillId)`.
    WillId
);

/// Permanent Account Number issued by the Indian Income Tax Department.
///
/// # Validation
///
/// - Exactly 10 ASCII characters
/// - Five uppercase letters, four digits, one uppercase letter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pan(String);

impl_validating_deserialize!(Pan);

impl Pan {
    /// Create a PAN, validating the `^[A-Z]{5}[0-9]{4}[A-Z]$` format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPan`] if the format does not match.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !Self::is_valid(&s) {
            return Err(ValidationError::InvalidPan(s));
        }
        Ok(Self(s))
    }

    /// Check the PAN format without constructing.
    pub fn is_valid(s: &str) -> bool {
        let bytes = s.as_bytes();
        bytes.len() == 10
            && bytes[..5].iter().all(u8::is_ascii_uppercase)
            && bytes[5..9].iter().all(u8::is_ascii_digit)
            && bytes[9].is_ascii_uppercase()
    }

    /// Access the PAN string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Pan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Aadhaar number issued by UIDAI.
///
/// # Validation
///
/// - Exactly 12 ASCII digits, no separators
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Aadhaar(String);

impl_validating_deserialize!(Aadhaar);

impl Aadhaar {
    /// Create an Aadhaar number, validating the 12-digit format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAadhaar`] if the value is not
    /// exactly 12 digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !Self::is_valid(&s) {
            return Err(ValidationError::InvalidAadhaar(s));
        }
        Ok(Self(s))
    }

    /// Check the Aadhaar format without constructing.
    pub fn is_valid(s: &str) -> bool {
        s.len() == 12 && s.bytes().all(|b| b.is_ascii_digit())
    }

    /// Access the Aadhaar string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render with only the last four digits visible, as printed on
    /// generated documents.
    pub fn masked(&self) -> String {
        format!("XXXX XXXX {}", &self.0[8..])
    }
}

impl std::fmt::Display for Aadhaar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_ids_are_unique() {
        assert_ne!(OwnerId::new(), OwnerId::new());
    }

    #[test]
    fn will_id_parses_from_string() {
        let id = WillId::new();
        let parsed: WillId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn will_id_serializes_as_bare_uuid() {
        let id = WillId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }

    #[test]
    fn pan_accepts_canonical_format() {
        assert!(Pan::new("ABCDE1234F").is_ok());
    }

    #[test]
    fn pan_rejects_lowercase() {
        assert_eq!(
            Pan::new("abcde1234f"),
            Err(ValidationError::InvalidPan("abcde1234f".to_string()))
        );
    }

    #[test]
    fn pan_rejects_wrong_shape() {
        for bad in ["ABCD1234F", "ABCDE12345", "ABCDE1234FG", "1BCDE1234F", "ABCDE123AF", ""] {
            assert!(Pan::new(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn pan_rejects_non_ascii_without_panicking() {
        assert!(!Pan::is_valid("ÀBCDE1234F"));
    }

    #[test]
    fn aadhaar_accepts_twelve_digits() {
        assert!(Aadhaar::new("123456789012").is_ok());
    }

    #[test]
    fn aadhaar_rejects_eleven_digits() {
        assert!(Aadhaar::new("12345678901").is_err());
    }

    #[test]
    fn aadhaar_rejects_separators_and_letters() {
        assert!(Aadhaar::new("1234 5678 9012").is_err());
        assert!(Aadhaar::new("12345678901A").is_err());
    }

    #[test]
    fn aadhaar_masks_all_but_last_four() {
        let a = Aadhaar::new("123456789012").unwrap();
        assert_eq!(a.masked(), "XXXX XXXX 9012");
        assert_eq!(a.to_string(), "XXXX XXXX 9012");
    }

    #[test]
    fn pan_deserialization_validates() {
        let ok: Result<Pan, _> = serde_json::from_str("\"ABCDE1234F\"");
        assert!(ok.is_ok());
        let bad: Result<Pan, _> = serde_json::from_str("\"abcde1234f\"");
        assert!(bad.is_err());
    }
}
