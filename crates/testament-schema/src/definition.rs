//! # Step Definitions
//!
//! Static description of each wizard step: its key, title, and the declared
//! order of its fields. The declared order is what "first invalid field"
//! means; the order in which validation happens to emit errors is not
//! significant.
//!
//! Field patterns are dot-delimited. A `*` segment matches any list index.

use serde::Serialize;
use testament_core::{FieldError, FieldPath, PathSegment, StepKey, WillType};

/// Static metadata for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    pub key: StepKey,
    pub title: &'static str,
    /// Declared field patterns, in on-screen order.
    pub fields: &'static [&'static str],
}

const TESTATOR_FIELDS: &[&str] = &[
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
];

const FAMILY_FIELDS: &[&str] = &[
    "maritalStatus",
    "spouse.name",
    "spouse.dateOfBirth",
    "spouse.pan",
    "spouse.aadhaar",
    "hasChildren",
    "children",
    "children.*.name",
    "children.*.dateOfBirth",
    "children.*.gender",
    "children.*.relationship",
    "children.*.isMinor",
    "siblings",
    "siblings.*.name",
    "siblings.*.dateOfBirth",
    "siblings.*.relationship",
];

const GUARDIANSHIP_FIELDS: &[&str] = &[
    "hasMinorChildren",
    "primaryGuardian.name",
    "primaryGuardian.relation",
    "primaryGuardian.address",
    "primaryGuardian.phone",
    "primaryGuardian.dateOfBirth",
    "hasBackupGuardian",
    "backupGuardian.name",
    "backupGuardian.relation",
    "backupGuardian.address",
    "backupGuardian.phone",
    "backupGuardian.dateOfBirth",
];

const ASSETS_FIELDS: &[&str] = &[
    "assets",
    "assets.*.assetType",
    // immovableProperty
    "assets.*.propertyType",
    "assets.*.address",
    "assets.*.area",
    "assets.*.ownershipType",
    "assets.*.coOwnerNames",
    "assets.*.ownershipShare",
    // bankAccount
    "assets.*.bankName",
    "assets.*.accountType",
    "assets.*.accountNumber",
    "assets.*.branch",
    // investment
    "assets.*.investmentType",
    "assets.*.institution",
    "assets.*.folioNumber",
    // vehicle
    "assets.*.vehicleType",
    "assets.*.makeModel",
    "assets.*.registrationNumber",
    // jewelryValuables
    "assets.*.description",
    "assets.*.estimatedValue",
    "assets.*.location",
    // businessInterest
    "assets.*.businessName",
    "assets.*.businessType",
    "assets.*.ownershipPercentage",
    // debt
    "assets.*.creditorName",
    "assets.*.debtType",
    // digitalAssets
    "assets.*.platform",
    "assets.*.accessInstructions",
    // shared tail
    "assets.*.nominee",
    "assets.*.hasLoan",
    "assets.*.loan.lenderName",
    "assets.*.loan.outstandingAmount",
    "assets.*.outstandingAmount",
];

const BENEFICIARIES_FIELDS: &[&str] = &[
    "distributionType",
    "beneficiaries",
    "beneficiaries.*.name",
    "beneficiaries.*.relation",
    "beneficiaries.*.dateOfBirth",
    "beneficiaries.*.gender",
    "beneficiaries.*.pan",
    "beneficiaries.*.aadhaar",
    "beneficiaries.*.sharePercentage",
    "beneficiaries.*.guardianName",
    "beneficiaries.*.guardianRelation",
];

const CHARITIES_FIELDS: &[&str] = &[
    "hasCharities",
    "charities",
    "charities.*.name",
    "charities.*.registrationNumber",
    "charities.*.pan",
    "charities.*.address",
    "charities.*.purpose",
];

const EXECUTORS_FIELDS: &[&str] = &[
    "useProfessionalExecutor",
    "fallbackExecutor",
    "primaryExecutor.name",
    "primaryExecutor.relation",
    "primaryExecutor.address",
    "primaryExecutor.phone",
    "primaryExecutor.dateOfBirth",
    "primaryExecutor.pan",
    "hasBackupExecutor",
    "backupExecutor.name",
    "backupExecutor.relation",
    "backupExecutor.address",
    "backupExecutor.phone",
    "backupExecutor.dateOfBirth",
    "backupExecutor.pan",
];

const DISPUTE_RESOLUTION_FIELDS: &[&str] = &[
    "hasDisputeResolver",
    "resolver.name",
    "resolver.relation",
    "resolver.address",
    "resolver.phone",
];

const WITNESSES_FIELDS: &[&str] = &[
    "witnesses",
    "witnesses.*.name",
    "witnesses.*.address",
    "witnesses.*.dateOfBirth",
    "witnesses.*.occupation",
];

const REVIEW_FIELDS: &[&str] = &["soundMind", "freeWill", "placeOfSigning", "dateOfSigning"];

impl StepDefinition {
    /// Definition for a step key.
    pub fn of(key: StepKey) -> Self {
        let fields = match key {
            StepKey::Testator => TESTATOR_FIELDS,
            StepKey::Family => FAMILY_FIELDS,
            StepKey::Guardianship => GUARDIANSHIP_FIELDS,
            StepKey::Assets => ASSETS_FIELDS,
            StepKey::Beneficiaries => BENEFICIARIES_FIELDS,
            StepKey::Charities => CHARITIES_FIELDS,
            StepKey::Executors => EXECUTORS_FIELDS,
            StepKey::DisputeResolution => DISPUTE_RESOLUTION_FIELDS,
            StepKey::Witnesses => WITNESSES_FIELDS,
            StepKey::Review => REVIEW_FIELDS,
        };
        Self {
            key,
            title: key.title(),
            fields,
        }
    }

    /// Sort key of `path` under this step's declared order.
    ///
    /// Each key segment contributes the rank of the first declared pattern
    /// whose prefix matches the path so far; each index segment contributes
    /// the index itself. Comparing the resulting vectors lexicographically
    /// orders entries numerically and puts list-level paths before the
    /// entries beneath them. Undeclared segments sort last.
    pub fn order_key(&self, path: &FieldPath) -> Vec<u32> {
        let segments = path.segments();
        let mut key = Vec::with_capacity(segments.len());
        for (depth, seg) in segments.iter().enumerate() {
            match seg {
                PathSegment::Index(i) => key.push(u32::try_from(*i).unwrap_or(u32::MAX)),
                PathSegment::Key(_) => {
                    let prefix = &segments[..=depth];
                    let rank = self
                        .fields
                        .iter()
                        .position(|pattern| pattern_prefix_matches(pattern, prefix))
                        .map(|r| r as u32)
                        .unwrap_or(u32::MAX);
                    key.push(rank);
                }
            }
        }
        key
    }

    /// The error for the earliest field, by declared order, among `errors`
    /// belonging to this step. Step-level errors come first.
    pub fn first_invalid<'a>(&self, errors: &'a [FieldError]) -> Option<&'a FieldError> {
        errors
            .iter()
            .filter(|e| e.step == self.key)
            .min_by_key(|e| self.order_key(&e.path))
    }
}

fn pattern_prefix_matches(pattern: &str, prefix: &[PathSegment]) -> bool {
    let parts: Vec<&str> = pattern.split('.').collect();
    if parts.len() < prefix.len() {
        return false;
    }
    parts.iter().zip(prefix).all(|(part, seg)| match seg {
        PathSegment::Index(_) => *part == "*",
        PathSegment::Key(k) => part == k,
    })
}

/// Ordered definitions for every step of a will type.
pub fn step_plan(will_type: WillType) -> Vec<StepDefinition> {
    will_type.steps().iter().map(|k| StepDefinition::of(*k)).collect()
}

/// The error to focus across a whole draft: earliest step in the plan,
/// then earliest field by that step's declared order.
pub fn first_invalid_in_plan(will_type: WillType, errors: &[FieldError]) -> Option<&FieldError> {
    errors.iter().min_by_key(|e| {
        (
            will_type.position_of(e.step).unwrap_or(usize::MAX),
            StepDefinition::of(e.step).order_key(&e.path),
        )
    })
}
