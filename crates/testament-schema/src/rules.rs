//! # Conditional Rule Resolver
//!
//! Pure functions that decide, from the current answers, which fields are
//! required, which are inactive (and must be cleared), and which values are
//! derived from other steps and therefore locked.
//!
//! Nothing here is cached: every call evaluates the rules fresh against the
//! payload it is given. The resolver never fails; a payload that cannot be
//! decoded resolves to no requirements and the validator reports the shape
//! error instead.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use testament_core::{calculate_age, parse_date, FieldPath, StepKey, MAJORITY_AGE};

use crate::draft::WillDraft;
use crate::payload::{
    self, filled, AssetEntry, AssetRecord, AssetsDetails, BeneficiariesDetails, CharitiesDetails,
    DisputeResolutionDetails, DistributionType, ExecutorsDetails, FamilyDetails,
    GuardianshipDetails, MaritalStatus, WitnessesDetails,
};

/// Designation written into `executors.fallbackExecutor` when the testator
/// opts for a professional executor.
pub const PROFESSIONAL_EXECUTOR: &str = "Professional executor appointed by the will service";

/// Minimum number of attesting witnesses.
pub const MINIMUM_WITNESSES: usize = 2;

/// What "filled in" means for a required field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// A non-blank scalar or a non-empty record.
    Value,
    /// A list with at least this many entries.
    Items(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredField {
    pub path: FieldPath,
    pub label: String,
    pub requirement: Requirement,
}

/// Outcome of evaluating one step's rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepResolution {
    /// Fields that must be filled, in generation order.
    pub required: Vec<RequiredField>,
    /// Subtrees that no longer apply and are cleared by the controller.
    /// Only an explicit answer deactivates; an unanswered question leaves
    /// its dependent fields alone.
    pub inactive: Vec<FieldPath>,
}

impl StepResolution {
    fn require(&mut self, path: FieldPath, label: impl Into<String>) {
        self.required.push(RequiredField {
            path,
            label: label.into(),
            requirement: Requirement::Value,
        });
    }

    fn require_items(&mut self, path: FieldPath, label: impl Into<String>, min: usize) {
        self.required.push(RequiredField {
            path,
            label: label.into(),
            requirement: Requirement::Items(min),
        });
    }

    fn deactivate(&mut self, path: FieldPath) {
        self.inactive.push(path);
    }

    pub fn is_required(&self, path: &FieldPath) -> bool {
        self.required.iter().any(|r| &r.path == path)
    }

    /// Whether `path` lies in an inactive subtree.
    pub fn is_inactive(&self, path: &FieldPath) -> bool {
        self.inactive.iter().any(|p| path.starts_with(p))
    }
}

fn key(name: &str) -> FieldPath {
    FieldPath::keys([name])
}

fn is_yes(flag: Option<bool>) -> bool {
    flag == Some(true)
}

/// An explicit "no". An unanswered question deactivates nothing.
fn is_no(flag: Option<bool>) -> bool {
    flag == Some(false)
}

/// Evaluate the requiredness and inactivity rules of one step.
pub fn resolve_step(step: StepKey, payload: &Value, today: NaiveDate) -> StepResolution {
    let mut res = StepResolution::default();
    match step {
        StepKey::Testator => resolve_testator(&mut res),
        StepKey::Family => {
            if let Ok(p) = payload::decode::<FamilyDetails>(step, payload) {
                resolve_family(&p, &mut res);
            }
        }
        StepKey::Guardianship => {
            if let Ok(p) = payload::decode::<GuardianshipDetails>(step, payload) {
                resolve_guardianship(&p, &mut res);
            }
        }
        StepKey::Assets => {
            if let Ok(p) = payload::decode::<AssetsDetails>(step, payload) {
                resolve_assets(&p, &mut res);
            }
        }
        StepKey::Beneficiaries => {
            if let Ok(p) = payload::decode::<BeneficiariesDetails>(step, payload) {
                resolve_beneficiaries(&p, today, &mut res);
            }
        }
        StepKey::Charities => {
            if let Ok(p) = payload::decode::<CharitiesDetails>(step, payload) {
                resolve_charities(&p, &mut res);
            }
        }
        StepKey::Executors => {
            if let Ok(p) = payload::decode::<ExecutorsDetails>(step, payload) {
                resolve_executors(&p, &mut res);
            }
        }
        StepKey::DisputeResolution => {
            if let Ok(p) = payload::decode::<DisputeResolutionDetails>(step, payload) {
                resolve_dispute_resolution(&p, &mut res);
            }
        }
        StepKey::Witnesses => {
            if let Ok(p) = payload::decode::<WitnessesDetails>(step, payload) {
                resolve_witnesses(&p, &mut res);
            }
        }
        StepKey::Review => {
            res.require(key("placeOfSigning"), "Place of signing");
            res.require(key("dateOfSigning"), "Date of signing");
        }
    }
    res
}

fn resolve_testator(res: &mut StepResolution) {
    for (field, label) in [
        ("fullName", "Full name"),
        ("dateOfBirth", "Date of birth"),
        ("gender", "Gender"),
        ("nationality", "Nationality"),
        ("address", "Address"),
        ("city", "City"),
        ("state", "State"),
        ("pinCode", "PIN code"),
    ] {
        res.require(key(field), label);
    }
}

fn resolve_family(p: &FamilyDetails, res: &mut StepResolution) {
    res.require(key("maritalStatus"), "Marital status");

    match p.marital_status() {
        Some(MaritalStatus::Married) => {
            let spouse = key("spouse");
            res.require(spouse.child("name"), "Spouse name");
            res.require(spouse.child("dateOfBirth"), "Spouse date of birth");
        }
        Some(_) => res.deactivate(key("spouse")),
        None => {}
    }

    let children = key("children");
    if is_yes(p.has_children) {
        res.require_items(children.clone(), "At least one child", 1);
        for i in 0..p.children.len() {
            let entry = children.index(i);
            let n = i + 1;
            res.require(entry.child("name"), format!("Child {n} name"));
            res.require(entry.child("dateOfBirth"), format!("Child {n} date of birth"));
            res.require(entry.child("gender"), format!("Child {n} gender"));
            res.require(entry.child("relationship"), format!("Child {n} relationship"));
        }
    } else if is_no(p.has_children) {
        res.deactivate(children);
    }

    let siblings = key("siblings");
    for i in 0..p.siblings.len() {
        let entry = siblings.index(i);
        let n = i + 1;
        res.require(entry.child("name"), format!("Sibling {n} name"));
        res.require(entry.child("relationship"), format!("Sibling {n} relationship"));
    }
}

fn resolve_guardianship(p: &GuardianshipDetails, res: &mut StepResolution) {
    let primary = key("primaryGuardian");
    let backup = key("backupGuardian");
    if !is_yes(p.has_minor_children) {
        if is_no(p.has_minor_children) {
            res.deactivate(primary);
            res.deactivate(backup);
        }
        return;
    }
    for (field, label) in [
        ("name", "Guardian name"),
        ("relation", "Guardian relation"),
        ("address", "Guardian address"),
        ("phone", "Guardian phone"),
        ("dateOfBirth", "Guardian date of birth"),
    ] {
        res.require(primary.child(field), label);
    }
    if is_yes(p.has_backup_guardian) {
        res.require(backup.child("name"), "Backup guardian name");
        res.require(backup.child("relation"), "Backup guardian relation");
    } else if is_no(p.has_backup_guardian) {
        res.deactivate(backup);
    }
}

fn resolve_loan(entry: &FieldPath, has_loan: Option<bool>, n: usize, res: &mut StepResolution) {
    let loan = entry.child("loan");
    if is_yes(has_loan) {
        res.require(loan.child("lenderName"), format!("Asset {n} lender name"));
        res.require(loan.child("outstandingAmount"), format!("Asset {n} outstanding loan amount"));
    } else if is_no(has_loan) {
        res.deactivate(loan);
    }
}

fn resolve_assets(p: &AssetsDetails, res: &mut StepResolution) {
    let assets = key("assets");
    res.require_items(assets.clone(), "At least one asset", 1);
    for (i, raw) in p.assets.iter().enumerate() {
        let entry = assets.index(i);
        let n = i + 1;
        let members: &[(&str, &str)] = match AssetEntry::decode(raw) {
            AssetEntry::Record(AssetRecord::ImmovableProperty(prop)) => {
                match prop.ownership_type() {
                    Some(t) if t.is_shared() => {
                        res.require(entry.child("coOwnerNames"), format!("Asset {n} co-owner names"));
                        res.require(entry.child("ownershipShare"), format!("Asset {n} ownership share"));
                    }
                    Some(_) => {
                        res.deactivate(entry.child("coOwnerNames"));
                        res.deactivate(entry.child("ownershipShare"));
                    }
                    None => {}
                }
                resolve_loan(&entry, prop.has_loan, n, res);
                &[
                    ("propertyType", "property type"),
                    ("address", "address"),
                    ("area", "area"),
                    ("ownershipType", "ownership type"),
                ]
            }
            AssetEntry::Record(AssetRecord::BankAccount(_)) => &[
                ("bankName", "bank name"),
                ("accountType", "account type"),
                ("accountNumber", "account number"),
            ],
            AssetEntry::Record(AssetRecord::Investment(_)) => &[
                ("investmentType", "investment type"),
                ("institution", "institution"),
            ],
            AssetEntry::Record(AssetRecord::Vehicle(v)) => {
                resolve_loan(&entry, v.has_loan, n, res);
                &[
                    ("vehicleType", "vehicle type"),
                    ("makeModel", "make and model"),
                    ("registrationNumber", "registration number"),
                ]
            }
            AssetEntry::Record(AssetRecord::JewelryValuables(_)) => &[("description", "description")],
            AssetEntry::Record(AssetRecord::BusinessInterest(_)) => &[
                ("businessName", "business name"),
                ("businessType", "business type"),
                ("ownershipPercentage", "ownership percentage"),
            ],
            AssetEntry::Record(AssetRecord::Debt(_)) => &[
                ("creditorName", "creditor name"),
                ("debtType", "debt type"),
                ("outstandingAmount", "outstanding amount"),
            ],
            AssetEntry::Record(AssetRecord::DigitalAssets(_)) => &[
                ("platform", "platform"),
                ("description", "description"),
            ],
            AssetEntry::Untyped | AssetEntry::UnknownType(_) | AssetEntry::Malformed(_) => &[],
        };
        res.require(entry.child("assetType"), format!("Asset {n} type"));
        for (field, label) in members {
            res.require(entry.child(field), format!("Asset {n} {label}"));
        }
    }
}

/// Whole-year age from an optional date string; `None` when absent or
/// unparseable.
pub fn age_of(dob: &Option<String>, today: NaiveDate) -> Option<u32> {
    filled(dob)
        .and_then(|s| parse_date(s).ok())
        .map(|d| calculate_age(d, today))
}

fn resolve_beneficiaries(p: &BeneficiariesDetails, today: NaiveDate, res: &mut StepResolution) {
    res.require(key("distributionType"), "Distribution type");
    let list = key("beneficiaries");
    res.require_items(list.clone(), "At least one beneficiary", 1);

    let mode = p.distribution_type();
    for (i, b) in p.beneficiaries.iter().enumerate() {
        let entry = list.index(i);
        let n = i + 1;
        res.require(entry.child("name"), format!("Beneficiary {n} name"));
        res.require(entry.child("relation"), format!("Beneficiary {n} relation"));

        match mode {
            Some(DistributionType::SpecificAsset) => res.deactivate(entry.child("sharePercentage")),
            Some(_) => res.require(entry.child("sharePercentage"), format!("Beneficiary {n} share")),
            None => {}
        }

        match age_of(&b.date_of_birth, today) {
            Some(age) if age < MAJORITY_AGE => {
                res.require(entry.child("guardianName"), format!("Beneficiary {n} guardian name"));
                res.require(
                    entry.child("guardianRelation"),
                    format!("Beneficiary {n} guardian relation"),
                );
            }
            Some(_) => {
                res.deactivate(entry.child("guardianName"));
                res.deactivate(entry.child("guardianRelation"));
            }
            None => {}
        }
    }
}

fn resolve_charities(p: &CharitiesDetails, res: &mut StepResolution) {
    let list = key("charities");
    if !is_yes(p.has_charities) {
        if is_no(p.has_charities) {
            res.deactivate(list);
        }
        return;
    }
    res.require_items(list.clone(), "At least one charity", 1);
    for i in 0..p.charities.len() {
        let entry = list.index(i);
        let n = i + 1;
        res.require(entry.child("name"), format!("Charity {n} name"));
        res.require(entry.child("address"), format!("Charity {n} address"));
    }
}

fn resolve_executors(p: &ExecutorsDetails, res: &mut StepResolution) {
    let primary = key("primaryExecutor");
    let backup = key("backupExecutor");
    if is_yes(p.use_professional_executor) {
        res.deactivate(primary);
        res.deactivate(backup);
        return;
    }
    res.deactivate(key("fallbackExecutor"));
    res.require(primary.child("name"), "Executor name");
    res.require(primary.child("relation"), "Executor relation");
    res.require(primary.child("address"), "Executor address");
    if is_yes(p.has_backup_executor) {
        res.require(backup.child("name"), "Backup executor name");
        res.require(backup.child("relation"), "Backup executor relation");
    } else if is_no(p.has_backup_executor) {
        res.deactivate(backup);
    }
}

fn resolve_dispute_resolution(p: &DisputeResolutionDetails, res: &mut StepResolution) {
    let resolver = key("resolver");
    if is_yes(p.has_dispute_resolver) {
        res.require(resolver.child("name"), "Resolver name");
        res.require(resolver.child("relation"), "Resolver relation");
    } else if is_no(p.has_dispute_resolver) {
        res.deactivate(resolver);
    }
}

fn resolve_witnesses(p: &WitnessesDetails, res: &mut StepResolution) {
    let list = key("witnesses");
    res.require_items(list.clone(), "At least two witnesses", MINIMUM_WITNESSES);
    for i in 0..p.witnesses.len() {
        let entry = list.index(i);
        let n = i + 1;
        res.require(entry.child("name"), format!("Witness {n} name"));
        res.require(entry.child("address"), format!("Witness {n} address"));
        res.require(entry.child("dateOfBirth"), format!("Witness {n} date of birth"));
    }
}

// ─── Cross-step derivation ──────────────────────────────────────────

/// A value forced by answers elsewhere in the draft.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedValue {
    pub step: StepKey,
    pub path: FieldPath,
    pub value: Value,
}

/// Derived values and the fields they lock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedState {
    pub values: Vec<DerivedValue>,
    pub locked: Vec<(StepKey, FieldPath)>,
}

impl DerivedState {
    fn force(&mut self, step: StepKey, path: FieldPath, value: Value) {
        self.locked.push((step, path.clone()));
        self.values.push(DerivedValue { step, path, value });
    }

    /// Whether `path` is, or lies beneath, a locked field.
    pub fn is_locked(&self, step: StepKey, path: &FieldPath) -> bool {
        self.locked
            .iter()
            .any(|(s, p)| *s == step && path.starts_with(p))
    }
}

/// Evaluate rules that span steps.
pub fn resolve_derived(draft: &WillDraft) -> DerivedState {
    let mut state = DerivedState::default();

    if let Ok(family) = payload::decode::<FamilyDetails>(StepKey::Family, draft.section(StepKey::Family)) {
        if family.has_minor_child() {
            state.force(StepKey::Guardianship, key("hasMinorChildren"), Value::Bool(true));
        }
    }

    if let Ok(exec) =
        payload::decode::<ExecutorsDetails>(StepKey::Executors, draft.section(StepKey::Executors))
    {
        if is_yes(exec.use_professional_executor) {
            state.force(
                StepKey::Executors,
                key("fallbackExecutor"),
                Value::String(PROFESSIONAL_EXECUTOR.to_string()),
            );
        }
    }

    if let Ok(ben) = payload::decode::<BeneficiariesDetails>(
        StepKey::Beneficiaries,
        draft.section(StepKey::Beneficiaries),
    ) {
        if ben.distribution_type() == Some(DistributionType::Equal) {
            let list = key("beneficiaries");
            for (i, share) in equal_shares(ben.beneficiaries.len()).into_iter().enumerate() {
                state.force(
                    StepKey::Beneficiaries,
                    list.index(i).child("sharePercentage"),
                    Value::String(share.to_string()),
                );
            }
        }
    }

    state
}

/// Split 100 into `n` shares of two decimal places that total exactly 100.
/// The rounding remainder goes one hundredth at a time to the first entries.
pub fn equal_shares(n: usize) -> Vec<Decimal> {
    if n == 0 {
        return Vec::new();
    }
    let total_cents: i64 = 10_000;
    let n_i = i64::try_from(n).unwrap_or(i64::MAX);
    let base = total_cents / n_i;
    let remainder = total_cents % n_i;
    (0..n_i)
        .map(|i| Decimal::new(base + i64::from(i < remainder), 2))
        .collect()
}

/// Apply derived values and clear inactive subtrees across the whole draft.
/// Returns whether the draft changed.
pub fn normalize(draft: &mut WillDraft, today: NaiveDate) -> bool {
    let mut changed = clear_inactive(draft, today);

    for derived in resolve_derived(draft).values {
        if draft.get_field(derived.step, &derived.path) == Some(&derived.value) {
            continue;
        }
        match draft.set_field_at(derived.step, &derived.path, derived.value) {
            Ok(()) => changed = true,
            Err(e) => tracing::warn!(step = %derived.step, path = %derived.path, error = %e, "derived value not applied"),
        }
    }

    changed |= clear_inactive(draft, today);
    changed
}

fn clear_inactive(draft: &mut WillDraft, today: NaiveDate) -> bool {
    let mut changed = false;
    for step in StepKey::ALL {
        let resolution = resolve_step(step, draft.section(step), today);
        for path in &resolution.inactive {
            changed |= draft.clear_field_at(step, path);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use testament_core::{OwnerId, WillType};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn paths(res: &StepResolution) -> Vec<String> {
        res.required.iter().map(|r| r.path.to_string()).collect()
    }

    #[test]
    fn spouse_required_only_when_married() {
        let married = resolve_step(
            StepKey::Family,
            &json!({"maritalStatus": "Married"}),
            today(),
        );
        assert!(paths(&married).contains(&"spouse.name".to_string()));
        assert!(!married.is_inactive(&FieldPath::parse("spouse.name").unwrap()));

        let single = resolve_step(StepKey::Family, &json!({"maritalStatus": "Single"}), today());
        assert!(!paths(&single).contains(&"spouse.name".to_string()));
        assert!(single.is_inactive(&FieldPath::parse("spouse.name").unwrap()));
    }

    #[test]
    fn children_required_per_entry_when_has_children() {
        let res = resolve_step(
            StepKey::Family,
            &json!({"maritalStatus": "Single", "hasChildren": true, "children": [{}, {}]}),
            today(),
        );
        let p = paths(&res);
        assert!(p.contains(&"children".to_string()));
        assert!(p.contains(&"children.1.relationship".to_string()));
        assert_eq!(
            res.required.iter().find(|r| r.path.to_string() == "children").unwrap().requirement,
            Requirement::Items(1)
        );
    }

    #[test]
    fn children_inactive_without_children() {
        let res = resolve_step(StepKey::Family, &json!({"hasChildren": false}), today());
        assert!(res.is_inactive(&FieldPath::parse("children.0.name").unwrap()));
    }

    #[test]
    fn minor_beneficiary_requires_guardian() {
        let res = resolve_step(
            StepKey::Beneficiaries,
            &json!({
                "distributionType": "Percentage-based",
                "beneficiaries": [{"name": "Kavya", "relation": "Daughter", "dateOfBirth": "2015-06-01"}],
            }),
            today(),
        );
        assert!(res.is_required(&FieldPath::parse("beneficiaries.0.guardianName").unwrap()));
        assert!(res.is_required(&FieldPath::parse("beneficiaries.0.guardianRelation").unwrap()));
    }

    #[test]
    fn adult_beneficiary_guardian_fields_inactive() {
        let res = resolve_step(
            StepKey::Beneficiaries,
            &json!({
                "distributionType": "Percentage-based",
                "beneficiaries": [{"name": "Kavya", "relation": "Daughter", "dateOfBirth": "2008-10-19"}],
            }),
            today(),
        );
        let guardian = FieldPath::parse("beneficiaries.0.guardianName").unwrap();
        assert!(!res.is_required(&guardian));
        assert!(res.is_inactive(&guardian));
    }

    #[test]
    fn unknown_age_neither_requires_nor_clears_guardian() {
        let res = resolve_step(
            StepKey::Beneficiaries,
            &json!({"beneficiaries": [{"name": "Kavya", "guardianName": "Asha"}]}),
            today(),
        );
        let guardian = FieldPath::parse("beneficiaries.0.guardianName").unwrap();
        assert!(!res.is_required(&guardian));
        assert!(!res.is_inactive(&guardian));
    }

    #[test]
    fn unanswered_questions_deactivate_nothing() {
        let family = resolve_step(StepKey::Family, &json!({"spouse": {"name": "Priya"}}), today());
        assert!(family.inactive.is_empty());
        assert!(!family.is_required(&FieldPath::parse("spouse.name").unwrap()));

        let guardianship = resolve_step(
            StepKey::Guardianship,
            &json!({"primaryGuardian": {"name": "Asha"}}),
            today(),
        );
        assert_eq!(guardianship, StepResolution::default());

        let assets = resolve_step(
            StepKey::Assets,
            &json!({"assets": [{"assetType": "vehicle", "loan": {"lenderName": "SBI"}}]}),
            today(),
        );
        assert!(assets.inactive.is_empty());
    }

    #[test]
    fn normalize_keeps_answers_given_before_their_question() {
        let mut draft = WillDraft::new(OwnerId::new(), WillType::Comprehensive);
        draft.set_field(StepKey::Family, "spouse.name", json!("Priya")).unwrap();
        draft.set_field(StepKey::Charities, "charities.0.name", json!("CRY")).unwrap();
        normalize(&mut draft, today());
        assert_eq!(draft.section(StepKey::Family)["spouse"]["name"], json!("Priya"));
        assert_eq!(draft.section(StepKey::Charities)["charities"][0]["name"], json!("CRY"));

        draft.set_field(StepKey::Charities, "hasCharities", json!(false)).unwrap();
        normalize(&mut draft, today());
        assert_eq!(draft.section(StepKey::Charities)["charities"], json!([]));
    }

    #[test]
    fn minor_children_require_the_whole_primary_guardian() {
        let res = resolve_step(StepKey::Guardianship, &json!({"hasMinorChildren": true}), today());
        assert_eq!(
            paths(&res),
            vec![
                "primaryGuardian.name",
                "primaryGuardian.relation",
                "primaryGuardian.address",
                "primaryGuardian.phone",
                "primaryGuardian.dateOfBirth",
            ]
        );
    }

    #[test]
    fn immovable_property_requires_area() {
        let res = resolve_step(
            StepKey::Assets,
            &json!({"assets": [{"assetType": "immovableProperty"}]}),
            today(),
        );
        assert!(res.is_required(&FieldPath::parse("assets.0.area").unwrap()));
    }

    #[test]
    fn specific_asset_mode_suspends_shares() {
        let res = resolve_step(
            StepKey::Beneficiaries,
            &json!({
                "distributionType": "Specific asset allocation",
                "beneficiaries": [{"name": "A", "relation": "Son"}],
            }),
            today(),
        );
        let share = FieldPath::parse("beneficiaries.0.sharePercentage").unwrap();
        assert!(!res.is_required(&share));
        assert!(res.is_inactive(&share));
    }

    #[test]
    fn professional_executor_deactivates_personal_executors() {
        let res = resolve_step(
            StepKey::Executors,
            &json!({"useProfessionalExecutor": true}),
            today(),
        );
        assert!(res.required.is_empty());
        assert!(res.is_inactive(&FieldPath::parse("primaryExecutor.name").unwrap()));
        assert!(!res.is_inactive(&FieldPath::parse("fallbackExecutor").unwrap()));
    }

    #[test]
    fn joint_property_requires_co_owners() {
        let res = resolve_step(
            StepKey::Assets,
            &json!({"assets": [{"assetType": "immovableProperty", "ownershipType": "Joint", "hasLoan": true}]}),
            today(),
        );
        let p = paths(&res);
        assert!(p.contains(&"assets.0.coOwnerNames".to_string()));
        assert!(p.contains(&"assets.0.ownershipShare".to_string()));
        assert!(p.contains(&"assets.0.loan.lenderName".to_string()));
    }

    #[test]
    fn sole_property_deactivates_co_owners_and_loan() {
        let res = resolve_step(
            StepKey::Assets,
            &json!({"assets": [{"assetType": "immovableProperty", "ownershipType": "Sole", "hasLoan": false}]}),
            today(),
        );
        assert!(res.is_inactive(&FieldPath::parse("assets.0.coOwnerNames").unwrap()));
        assert!(res.is_inactive(&FieldPath::parse("assets.0.loan.lenderName").unwrap()));
    }

    #[test]
    fn undecodable_payload_resolves_to_nothing() {
        let res = resolve_step(StepKey::Family, &json!("nonsense"), today());
        assert_eq!(res, StepResolution::default());
    }

    #[test]
    fn minor_child_forces_and_locks_guardianship() {
        let mut draft = WillDraft::new(OwnerId::new(), WillType::Simple);
        draft
            .set_field(StepKey::Family, "children.0", json!({"name": "Ira", "isMinor": true}))
            .unwrap();
        let derived = resolve_derived(&draft);
        let path = FieldPath::parse("hasMinorChildren").unwrap();
        assert!(derived.is_locked(StepKey::Guardianship, &path));
        assert_eq!(derived.values[0].value, json!(true));
    }

    #[test]
    fn professional_executor_derives_fallback() {
        let mut draft = WillDraft::new(OwnerId::new(), WillType::Simple);
        draft
            .set_field(StepKey::Executors, "useProfessionalExecutor", json!(true))
            .unwrap();
        normalize(&mut draft, today());
        assert_eq!(
            draft.section(StepKey::Executors)["fallbackExecutor"],
            json!(PROFESSIONAL_EXECUTOR)
        );
        assert_eq!(draft.section(StepKey::Executors)["primaryExecutor"], Value::Null);
    }

    #[test]
    fn turning_off_professional_executor_clears_fallback() {
        let mut draft = WillDraft::new(OwnerId::new(), WillType::Simple);
        draft
            .set_field(StepKey::Executors, "useProfessionalExecutor", json!(true))
            .unwrap();
        normalize(&mut draft, today());
        draft
            .set_field(StepKey::Executors, "useProfessionalExecutor", json!(false))
            .unwrap();
        normalize(&mut draft, today());
        assert_eq!(draft.section(StepKey::Executors)["fallbackExecutor"], Value::Null);
    }

    #[test]
    fn equal_shares_total_exactly_one_hundred() {
        for n in 1..=12 {
            let shares = equal_shares(n);
            assert_eq!(shares.len(), n);
            assert_eq!(shares.iter().copied().sum::<Decimal>(), Decimal::new(100, 0));
        }
        assert_eq!(
            equal_shares(3),
            vec![Decimal::new(3334, 2), Decimal::new(3333, 2), Decimal::new(3333, 2)]
        );
        assert!(equal_shares(0).is_empty());
    }

    #[test]
    fn equal_distribution_writes_shares() {
        let mut draft = WillDraft::new(OwnerId::new(), WillType::Simple);
        draft
            .set_section(
                StepKey::Beneficiaries,
                json!({
                    "distributionType": "Equal distribution",
                    "beneficiaries": [{"name": "A"}, {"name": "B"}, {"name": "C"}],
                }),
            );
        assert!(normalize(&mut draft, today()));
        let list = &draft.section(StepKey::Beneficiaries)["beneficiaries"];
        assert_eq!(list[0]["sharePercentage"], json!("33.34"));
        assert_eq!(list[2]["sharePercentage"], json!("33.33"));
        assert!(!normalize(&mut draft, today()));
    }

    #[test]
    fn normalize_clears_stale_spouse() {
        let mut draft = WillDraft::new(OwnerId::new(), WillType::Simple);
        draft.set_field(StepKey::Family, "maritalStatus", json!("Married")).unwrap();
        draft.set_field(StepKey::Family, "spouse.name", json!("Priya")).unwrap();
        normalize(&mut draft, today());
        assert_eq!(draft.section(StepKey::Family)["spouse"]["name"], json!("Priya"));

        draft.set_field(StepKey::Family, "maritalStatus", json!("Divorced")).unwrap();
        normalize(&mut draft, today());
        assert_eq!(draft.section(StepKey::Family)["spouse"], Value::Null);
    }
}
