//! # Step Payloads
//!
//! Typed views over the JSON payload stored for each step. Drafts keep
//! payloads as raw [`serde_json::Value`] so that partially-filled forms
//! survive round trips untouched; these types are decoded on demand when
//! rules and validation need to reason about the answers.
//!
//! Every field defaults when absent or `null`, so an unanswered question is a
//! missing value, never a shape error. Text fields also accept numbers and
//! booleans (YAML draft files write `pinCode: 560001`). Numeric fields accept
//! JSON numbers or numeric strings and keep unparseable input as
//! [`Numeric::Unparsed`] so it can be reported against the field.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use testament_core::{sha256_hex, FieldError, FieldErrorKind, FieldPath, StepKey};

// ─── Lenient field decoders ─────────────────────────────────────────

fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected text, found {}",
            json_kind(&other)
        ))),
    }
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn numeric<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Numeric>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(Numeric::parse(&n.to_string()))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(Numeric::parse(&s))),
        Some(other) => Err(D::Error::custom(format!(
            "expected a number, found {}",
            json_kind(&other)
        ))),
    }
}

pub(crate) fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Trimmed, non-empty text.
pub fn filled(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// A numeric answer as entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Numeric {
    /// Parsed exactly.
    Value(Decimal),
    /// Could not be read as a number; kept verbatim for the error message.
    Unparsed(String),
}

impl Numeric {
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map(Self::Value)
            .unwrap_or_else(|_| Self::Unparsed(raw.to_string()))
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            Self::Value(d) => Some(*d),
            Self::Unparsed(_) => None,
        }
    }
}

/// Decode a step payload into its typed view.
///
/// `null` decodes as an empty object. Anything else that is not an object,
/// or an object whose members have the wrong JSON types, yields one
/// step-level [`FieldErrorKind::Malformed`] error.
pub fn decode<T: DeserializeOwned + Default>(step: StepKey, payload: &Value) -> Result<T, FieldError> {
    match payload {
        Value::Null => Ok(T::default()),
        Value::Object(_) => T::deserialize(payload).map_err(|e| {
            FieldError::new(
                step,
                FieldPath::root(),
                FieldErrorKind::Malformed,
                format!("{} answers could not be read: {e}", step.title()),
            )
        }),
        other => Err(FieldError::new(
            step,
            FieldPath::root(),
            FieldErrorKind::Malformed,
            format!("{} answers must be an object, found {}", step.title(), json_kind(other)),
        )),
    }
}

// ─── Choice lists ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    pub const CHOICES: [&'static str; 4] = ["Single", "Married", "Divorced", "Widowed"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Single" => Some(Self::Single),
            "Married" => Some(Self::Married),
            "Divorced" => Some(Self::Divorced),
            "Widowed" => Some(Self::Widowed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipType {
    Sole,
    Joint,
    CoOwner,
    Inherited,
}

impl OwnershipType {
    pub const CHOICES: [&'static str; 4] = ["Sole", "Joint", "Co-owner", "Inherited"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Sole" => Some(Self::Sole),
            "Joint" => Some(Self::Joint),
            "Co-owner" => Some(Self::CoOwner),
            "Inherited" => Some(Self::Inherited),
            _ => None,
        }
    }

    /// Whether the property is shared with named co-owners.
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Joint | Self::CoOwner)
    }
}

/// How the residuary estate is split among beneficiaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionType {
    Equal,
    Percentage,
    SpecificAsset,
}

impl DistributionType {
    pub const CHOICES: [&'static str; 3] = [
        "Equal distribution",
        "Percentage-based",
        "Specific asset allocation",
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Equal distribution" => Some(Self::Equal),
            "Percentage-based" => Some(Self::Percentage),
            "Specific asset allocation" => Some(Self::SpecificAsset),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "Equal distribution",
            Self::Percentage => "Percentage-based",
            Self::SpecificAsset => "Specific asset allocation",
        }
    }

    /// Whether shares must total exactly 100.
    pub fn uses_shares(&self) -> bool {
        !matches!(self, Self::SpecificAsset)
    }
}

// ─── testator ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestatorDetails {
    #[serde(deserialize_with = "text")]
    pub full_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub date_of_birth: Option<String>,
    #[serde(deserialize_with = "text")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "text")]
    pub nationality: Option<String>,
    #[serde(deserialize_with = "text")]
    pub religion: Option<String>,
    #[serde(deserialize_with = "text")]
    pub occupation: Option<String>,
    #[serde(deserialize_with = "text")]
    pub address: Option<String>,
    #[serde(deserialize_with = "text")]
    pub city: Option<String>,
    #[serde(deserialize_with = "text")]
    pub state: Option<String>,
    #[serde(deserialize_with = "text")]
    pub pin_code: Option<String>,
    #[serde(deserialize_with = "text")]
    pub pan: Option<String>,
    #[serde(deserialize_with = "text")]
    pub aadhaar: Option<String>,
    #[serde(deserialize_with = "text")]
    pub email: Option<String>,
    #[serde(deserialize_with = "text")]
    pub phone: Option<String>,
}

// ─── family ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpouseDetails {
    #[serde(deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub date_of_birth: Option<String>,
    #[serde(deserialize_with = "text")]
    pub pan: Option<String>,
    #[serde(deserialize_with = "text")]
    pub aadhaar: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChildDetails {
    #[serde(deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub date_of_birth: Option<String>,
    #[serde(deserialize_with = "text")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "text")]
    pub relationship: Option<String>,
    /// User-asserted; not derived from the date of birth.
    pub is_minor: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiblingDetails {
    #[serde(deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub date_of_birth: Option<String>,
    #[serde(deserialize_with = "text")]
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FamilyDetails {
    #[serde(deserialize_with = "text")]
    pub marital_status: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub spouse: SpouseDetails,
    pub has_children: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub children: Vec<ChildDetails>,
    #[serde(deserialize_with = "null_as_default")]
    pub siblings: Vec<SiblingDetails>,
}

impl FamilyDetails {
    pub fn marital_status(&self) -> Option<MaritalStatus> {
        filled(&self.marital_status).and_then(MaritalStatus::parse)
    }

    pub fn has_minor_child(&self) -> bool {
        self.children.iter().any(|c| c.is_minor == Some(true))
    }
}

// ─── guardianship ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuardianDetails {
    #[serde(deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub relation: Option<String>,
    #[serde(deserialize_with = "text")]
    pub address: Option<String>,
    #[serde(deserialize_with = "text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "text")]
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuardianshipDetails {
    pub has_minor_children: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub primary_guardian: GuardianDetails,
    pub has_backup_guardian: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub backup_guardian: GuardianDetails,
}

// ─── assets ─────────────────────────────────────────────────────────

/// The assets step keeps entries raw so that each one can be decoded and
/// reported on individually.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetsDetails {
    #[serde(deserialize_with = "null_as_default")]
    pub assets: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoanDetails {
    #[serde(deserialize_with = "text")]
    pub lender_name: Option<String>,
    #[serde(deserialize_with = "numeric")]
    pub outstanding_amount: Option<Numeric>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImmovableProperty {
    #[serde(deserialize_with = "text")]
    pub property_type: Option<String>,
    #[serde(deserialize_with = "text")]
    pub address: Option<String>,
    #[serde(deserialize_with = "text")]
    pub area: Option<String>,
    #[serde(deserialize_with = "text")]
    pub ownership_type: Option<String>,
    #[serde(deserialize_with = "text")]
    pub co_owner_names: Option<String>,
    #[serde(deserialize_with = "numeric")]
    pub ownership_share: Option<Numeric>,
    pub has_loan: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub loan: LoanDetails,
}

impl ImmovableProperty {
    pub fn ownership_type(&self) -> Option<OwnershipType> {
        filled(&self.ownership_type).and_then(OwnershipType::parse)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BankAccount {
    #[serde(deserialize_with = "text")]
    pub bank_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub account_type: Option<String>,
    #[serde(deserialize_with = "text")]
    pub account_number: Option<String>,
    #[serde(deserialize_with = "text")]
    pub branch: Option<String>,
    #[serde(deserialize_with = "text")]
    pub nominee: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Investment {
    #[serde(deserialize_with = "text")]
    pub investment_type: Option<String>,
    #[serde(deserialize_with = "text")]
    pub institution: Option<String>,
    #[serde(deserialize_with = "text")]
    pub folio_number: Option<String>,
    #[serde(deserialize_with = "text")]
    pub nominee: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(deserialize_with = "text")]
    pub vehicle_type: Option<String>,
    #[serde(deserialize_with = "text")]
    pub make_model: Option<String>,
    #[serde(deserialize_with = "text")]
    pub registration_number: Option<String>,
    pub has_loan: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub loan: LoanDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JewelryValuables {
    #[serde(deserialize_with = "text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "numeric")]
    pub estimated_value: Option<Numeric>,
    #[serde(deserialize_with = "text")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BusinessInterest {
    #[serde(deserialize_with = "text")]
    pub business_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub business_type: Option<String>,
    #[serde(deserialize_with = "numeric")]
    pub ownership_percentage: Option<Numeric>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Debt {
    #[serde(deserialize_with = "text")]
    pub creditor_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub debt_type: Option<String>,
    #[serde(deserialize_with = "numeric")]
    pub outstanding_amount: Option<Numeric>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DigitalAssets {
    #[serde(deserialize_with = "text")]
    pub platform: Option<String>,
    #[serde(deserialize_with = "text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "text")]
    pub access_instructions: Option<String>,
}

/// One asset, tagged by `assetType`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "assetType", rename_all = "camelCase")]
pub enum AssetRecord {
    ImmovableProperty(ImmovableProperty),
    BankAccount(BankAccount),
    Investment(Investment),
    Vehicle(Vehicle),
    JewelryValuables(JewelryValuables),
    BusinessInterest(BusinessInterest),
    Debt(Debt),
    DigitalAssets(DigitalAssets),
}

impl AssetRecord {
    pub const TYPES: [&'static str; 8] = [
        "immovableProperty",
        "bankAccount",
        "investment",
        "vehicle",
        "jewelryValuables",
        "businessInterest",
        "debt",
        "digitalAssets",
    ];

    /// Human-readable one-line description used in outlines.
    pub fn summary(&self) -> String {
        let or_blank = |v: &Option<String>| filled(v).unwrap_or("").to_string();
        match self {
            Self::ImmovableProperty(p) => format!(
                "{} at {}",
                or_blank(&p.property_type),
                or_blank(&p.address)
            ),
            Self::BankAccount(b) => format!(
                "{} account with {}",
                or_blank(&b.account_type),
                or_blank(&b.bank_name)
            ),
            Self::Investment(i) => format!(
                "{} held with {}",
                or_blank(&i.investment_type),
                or_blank(&i.institution)
            ),
            Self::Vehicle(v) => format!(
                "{} {} ({})",
                or_blank(&v.vehicle_type),
                or_blank(&v.make_model),
                or_blank(&v.registration_number)
            ),
            Self::JewelryValuables(j) => or_blank(&j.description),
            Self::BusinessInterest(b) => format!(
                "Interest in {} ({})",
                or_blank(&b.business_name),
                or_blank(&b.business_type)
            ),
            Self::Debt(d) => format!("{} owed to {}", or_blank(&d.debt_type), or_blank(&d.creditor_name)),
            Self::DigitalAssets(d) => format!("{} on {}", or_blank(&d.description), or_blank(&d.platform)),
        }
    }
}

/// Outcome of decoding one raw asset entry.
#[derive(Debug, Clone)]
pub enum AssetEntry {
    Record(AssetRecord),
    /// `assetType` absent or blank.
    Untyped,
    /// `assetType` present but not a known variant.
    UnknownType(String),
    /// Known type whose fields had the wrong JSON types.
    Malformed(String),
}

impl AssetEntry {
    pub fn decode(raw: &Value) -> Self {
        let Value::Object(map) = raw else {
            return Self::Malformed(format!("expected an object, found {}", json_kind(raw)));
        };
        let tag = match map.get("assetType") {
            None | Some(Value::Null) => return Self::Untyped,
            Some(Value::String(s)) if s.trim().is_empty() => return Self::Untyped,
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Self::Malformed(format!("assetType must be text, found {}", json_kind(other)))
            }
        };
        if !AssetRecord::TYPES.contains(&tag.as_str()) {
            return Self::UnknownType(tag);
        }
        match AssetRecord::deserialize(raw) {
            Ok(record) => Self::Record(record),
            Err(e) => Self::Malformed(e.to_string()),
        }
    }

    pub fn record(&self) -> Option<&AssetRecord> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }
}

// ─── beneficiaries ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BeneficiaryEntry {
    #[serde(deserialize_with = "text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub relation: Option<String>,
    #[serde(deserialize_with = "text")]
    pub date_of_birth: Option<String>,
    #[serde(deserialize_with = "text")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "text")]
    pub pan: Option<String>,
    #[serde(deserialize_with = "text")]
    pub aadhaar: Option<String>,
    #[serde(deserialize_with = "numeric")]
    pub share_percentage: Option<Numeric>,
    #[serde(deserialize_with = "text")]
    pub guardian_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub guardian_relation: Option<String>,
}

impl BeneficiaryEntry {
    /// Identity of the beneficiary across edits: the explicit `id` when
    /// present, else the SHA-256 hex of the normalized
    /// `name|relation|dateOfBirth` triple.
    pub fn stable_key(&self) -> String {
        if let Some(id) = filled(&self.id) {
            return id.to_string();
        }
        let norm = |v: &Option<String>| {
            filled(v)
                .unwrap_or("")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase()
        };
        let triple = format!(
            "{}|{}|{}",
            norm(&self.name),
            norm(&self.relation),
            norm(&self.date_of_birth)
        );
        sha256_hex(triple.as_bytes())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BeneficiariesDetails {
    #[serde(deserialize_with = "text")]
    pub distribution_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub beneficiaries: Vec<BeneficiaryEntry>,
}

impl BeneficiariesDetails {
    pub fn distribution_type(&self) -> Option<DistributionType> {
        filled(&self.distribution_type).and_then(DistributionType::parse)
    }
}

// ─── charities ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharityDetails {
    #[serde(deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub registration_number: Option<String>,
    #[serde(deserialize_with = "text")]
    pub pan: Option<String>,
    #[serde(deserialize_with = "text")]
    pub address: Option<String>,
    #[serde(deserialize_with = "text")]
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharitiesDetails {
    pub has_charities: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub charities: Vec<CharityDetails>,
}

// ─── executors ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecutorDetails {
    #[serde(deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub relation: Option<String>,
    #[serde(deserialize_with = "text")]
    pub address: Option<String>,
    #[serde(deserialize_with = "text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "text")]
    pub date_of_birth: Option<String>,
    #[serde(deserialize_with = "text")]
    pub pan: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecutorsDetails {
    pub use_professional_executor: Option<bool>,
    #[serde(deserialize_with = "text")]
    pub fallback_executor: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub primary_executor: ExecutorDetails,
    pub has_backup_executor: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub backup_executor: ExecutorDetails,
}

// ─── disputeResolution ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverDetails {
    #[serde(deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub relation: Option<String>,
    #[serde(deserialize_with = "text")]
    pub address: Option<String>,
    #[serde(deserialize_with = "text")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisputeResolutionDetails {
    pub has_dispute_resolver: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub resolver: ResolverDetails,
}

// ─── witnesses ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WitnessDetails {
    #[serde(deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub address: Option<String>,
    #[serde(deserialize_with = "text")]
    pub date_of_birth: Option<String>,
    #[serde(deserialize_with = "text")]
    pub occupation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WitnessesDetails {
    #[serde(deserialize_with = "null_as_default")]
    pub witnesses: Vec<WitnessDetails>,
}

// ─── review ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewDetails {
    pub sound_mind: Option<bool>,
    pub free_will: Option<bool>,
    #[serde(deserialize_with = "text")]
    pub place_of_signing: Option<String>,
    #[serde(deserialize_with = "text")]
    pub date_of_signing: Option<String>,
}

// ─── Default payloads ───────────────────────────────────────────────

/// The payload a fresh draft holds for `step`: empty strings, `false`
/// flags, empty lists, and nested records with empty members.
pub fn default_payload(step: StepKey) -> Value {
    use serde_json::json;

    let person = |keys: &[&str]| {
        Value::Object(keys.iter().map(|k| ((*k).to_string(), json!(""))).collect())
    };

    match step {
        StepKey::Testator => person(&[
            "fullName",
            "dateOfBirth",
            "gender",
            "nationality",
            "religion",
            "occupation",
            "address",
            "city",
            "state",
            "pinCode",
            "pan",
            "aadhaar",
            "email",
            "phone",
        ]),
        StepKey::Family => json!({
            "maritalStatus": "",
            "spouse": person(&["name", "dateOfBirth", "pan", "aadhaar"]),
            "hasChildren": null,
            "children": [],
            "siblings": [],
        }),
        StepKey::Guardianship => json!({
            "hasMinorChildren": null,
            "primaryGuardian": person(&["name", "relation", "address", "phone", "dateOfBirth"]),
            "hasBackupGuardian": null,
            "backupGuardian": person(&["name", "relation", "address", "phone", "dateOfBirth"]),
        }),
        StepKey::Assets => json!({ "assets": [] }),
        StepKey::Beneficiaries => json!({ "distributionType": "", "beneficiaries": [] }),
        StepKey::Charities => json!({ "hasCharities": null, "charities": [] }),
        StepKey::Executors => json!({
            "useProfessionalExecutor": null,
            "fallbackExecutor": "",
            "primaryExecutor": person(&["name", "relation", "address", "phone", "dateOfBirth", "pan"]),
            "hasBackupExecutor": null,
            "backupExecutor": person(&["name", "relation", "address", "phone", "dateOfBirth", "pan"]),
        }),
        StepKey::DisputeResolution => json!({
            "hasDisputeResolver": null,
            "resolver": person(&["name", "relation", "address", "phone"]),
        }),
        StepKey::Witnesses => json!({ "witnesses": [] }),
        StepKey::Review => json!({
            "soundMind": false,
            "freeWill": false,
            "placeOfSigning": "",
            "dateOfSigning": "",
        }),
    }
}
