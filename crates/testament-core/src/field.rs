//! # Field Paths and Field Errors
//!
//! A [`FieldPath`] addresses a value inside one step payload using
//! dot-delimited segments, where numeric segments index list entries:
//! `beneficiaries.2.sharePercentage`. The empty path addresses the payload
//! itself and is used for step-level errors.
//!
//! [`FieldError`] is the unit of validation output. Validation never raises;
//! it returns zero or more of these.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::step::StepKey;

/// One segment of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Object member name.
    Key(String),
    /// List entry index.
    Index(usize),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Dot-delimited location inside a step payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The empty path, addressing the whole step payload.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path. The empty string parses to [`FieldPath::root`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidFieldPath`] if any segment is empty
    /// (`"a..b"`, `".a"`, `"a."`).
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for part in s.split('.') {
            if part.is_empty() {
                return Err(ValidationError::InvalidFieldPath(s.to_string()));
            }
            segments.push(match part.parse::<usize>() {
                Ok(i) if part.bytes().all(|b| b.is_ascii_digit()) => PathSegment::Index(i),
                _ => PathSegment::Key(part.to_string()),
            });
        }
        Ok(Self(segments))
    }

    /// Build a path of object keys.
    pub fn keys<'a>(parts: impl IntoIterator<Item = &'a str>) -> Self {
        Self(parts.into_iter().map(|p| PathSegment::Key(p.to_string())).collect())
    }

    /// Append an object key.
    pub fn child(&self, key: &str) -> Self {
        let mut next = self.0.clone();
        next.push(PathSegment::Key(key.to_string()));
        Self(next)
    }

    /// Append a list index.
    pub fn index(&self, i: usize) -> Self {
        let mut next = self.0.clone();
        next.push(PathSegment::Index(i));
        Self(next)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` equals `prefix` or lies underneath it.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// The final segment, if any.
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for FieldPath {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Machine-readable category of a [`FieldError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldErrorKind {
    /// A field the current answers make mandatory is empty.
    Required,
    /// PAN, Aadhaar, PIN code, phone, or email did not match its format.
    InvalidFormat,
    /// Not a calendar date, or a date of birth in the future.
    InvalidDate,
    /// Below a minimum age.
    Underage,
    /// Beneficiary shares do not total exactly 100.
    AllocationTotal,
    /// A number is outside its allowed range.
    OutOfRange,
    /// Two list entries identify the same person.
    Duplicate,
    /// A declaration the testator must affirm is not affirmed.
    NotAffirmed,
    /// The payload does not have the expected shape.
    Malformed,
}

impl FieldErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::InvalidFormat => "invalidFormat",
            Self::InvalidDate => "invalidDate",
            Self::Underage => "underage",
            Self::AllocationTotal => "allocationTotal",
            Self::OutOfRange => "outOfRange",
            Self::Duplicate => "duplicate",
            Self::NotAffirmed => "notAffirmed",
            Self::Malformed => "malformed",
        }
    }
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Step whose payload contains the field.
    pub step: StepKey,
    /// Location inside the step payload; empty for step-level errors.
    pub path: FieldPath,
    pub kind: FieldErrorKind,
    /// Human-readable explanation.
    pub message: String,
}

impl FieldError {
    pub fn new(
        step: StepKey,
        path: FieldPath,
        kind: FieldErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            step,
            path,
            kind,
            message: message.into(),
        }
    }

    /// A `Required` error with the conventional "<label> is required" message.
    pub fn required(step: StepKey, path: FieldPath, label: &str) -> Self {
        Self::new(step, path, FieldErrorKind::Required, format!("{label} is required"))
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_root() {
            write!(f, "{}: {}", self.step, self.message)
        } else {
            write!(f, "{}.{}: {}", self.step, self.path, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mixes_keys_and_indices() {
        let p = FieldPath::parse("beneficiaries.2.sharePercentage").unwrap();
        assert_eq!(
            p.segments(),
            &[
                PathSegment::Key("beneficiaries".into()),
                PathSegment::Index(2),
                PathSegment::Key("sharePercentage".into()),
            ]
        );
        assert_eq!(p.to_string(), "beneficiaries.2.sharePercentage");
    }

    #[test]
    fn empty_string_is_root() {
        assert!(FieldPath::parse("").unwrap().is_root());
    }

    #[test]
    fn empty_segments_rejected() {
        for bad in ["a..b", ".a", "a."] {
            assert!(FieldPath::parse(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn signed_numbers_stay_keys() {
        let p = FieldPath::parse("a.+1").unwrap();
        assert_eq!(p.last(), Some(&PathSegment::Key("+1".into())));
    }

    #[test]
    fn child_and_index_build_paths() {
        let p = FieldPath::keys(["children"]).index(0).child("name");
        assert_eq!(p.to_string(), "children.0.name");
        assert!(p.starts_with(&FieldPath::keys(["children"])));
        assert!(!p.starts_with(&FieldPath::keys(["siblings"])));
    }

    #[test]
    fn field_error_serializes_path_as_string() {
        let err = FieldError::required(
            StepKey::Beneficiaries,
            FieldPath::parse("beneficiaries.0.guardianName").unwrap(),
            "Guardian name",
        );
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["step"], "beneficiaries");
        assert_eq!(json["path"], "beneficiaries.0.guardianName");
        assert_eq!(json["kind"], "required");
        assert_eq!(json["message"], "Guardian name is required");
    }

    #[test]
    fn step_level_error_display_omits_path() {
        let err = FieldError::new(
            StepKey::Assets,
            FieldPath::root(),
            FieldErrorKind::Malformed,
            "payload is not an object",
        );
        assert_eq!(err.to_string(), "assets: payload is not an object");
    }
}
