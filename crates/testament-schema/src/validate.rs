//! # Field Schema Validation
//!
//! [`validate_step`] checks one step payload and returns every offending
//! field; [`validate_draft`] applies the derived values, checks every step
//! of the draft's will type, and on success returns a [`ValidatedDraft`], the
//! only input the document assembler accepts.
//!
//! Validation never panics and never fails as a function: problems are
//! returned as [`FieldError`] values. A payload that does not decode is
//! reported as one step-level `Malformed` error.
//!
//! ## Rule order
//!
//! 1. Shape: the payload decodes into the step's typed view.
//! 2. Presence: every field the resolver marks required is filled.
//! 3. Format and cross-field rules on filled values only, so an empty field
//!    produces exactly one `Required` error.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use testament_core::{
    calculate_age, parse_date, Aadhaar, FieldError, FieldErrorKind, FieldPath, Pan, StepKey,
    MAJORITY_AGE,
};

use crate::draft::{lookup, WillDraft};
use crate::payload::{
    self, filled, AssetEntry, AssetRecord, AssetsDetails, BeneficiariesDetails, CharitiesDetails,
    DisputeResolutionDetails, DistributionType, ExecutorDetails, ExecutorsDetails, FamilyDetails,
    GuardianDetails, GuardianshipDetails, LoanDetails, MaritalStatus, Numeric, OwnershipType,
    ReviewDetails, TestatorDetails, WitnessesDetails,
};
use crate::rules::{self, Requirement};

/// Inputs validation depends on besides the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    /// Reference date for ages and future-date checks.
    pub today: NaiveDate,
}

impl ValidationContext {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Context anchored at the current UTC date.
    pub fn current() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

/// A draft that passed [`validate_draft`]. Cannot be constructed any other
/// way.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    draft: WillDraft,
    validated_on: NaiveDate,
}

impl ValidatedDraft {
    pub fn draft(&self) -> &WillDraft {
        &self.draft
    }

    pub fn validated_on(&self) -> NaiveDate {
        self.validated_on
    }

    pub fn into_draft(self) -> WillDraft {
        self.draft
    }
}

// ─── Entry points ───────────────────────────────────────────────────

/// Validate one step payload.
pub fn validate_step(step: StepKey, payload: &Value, ctx: &ValidationContext) -> Vec<FieldError> {
    match step {
        StepKey::Testator => run::<TestatorDetails>(step, payload, ctx, check_testator),
        StepKey::Family => run::<FamilyDetails>(step, payload, ctx, check_family),
        StepKey::Guardianship => run::<GuardianshipDetails>(step, payload, ctx, check_guardianship),
        StepKey::Assets => run::<AssetsDetails>(step, payload, ctx, check_assets),
        StepKey::Beneficiaries => {
            run::<BeneficiariesDetails>(step, payload, ctx, check_beneficiaries)
        }
        StepKey::Charities => run::<CharitiesDetails>(step, payload, ctx, check_charities),
        StepKey::Executors => run::<ExecutorsDetails>(step, payload, ctx, check_executors),
        StepKey::DisputeResolution => {
            run::<DisputeResolutionDetails>(step, payload, ctx, check_dispute_resolution)
        }
        StepKey::Witnesses => run::<WitnessesDetails>(step, payload, ctx, check_witnesses),
        StepKey::Review => run::<ReviewDetails>(step, payload, ctx, check_review),
    }
}

/// Validate every step of the draft's will type.
///
/// Derived values are applied and inactive answers cleared on a copy before
/// checking; the returned [`ValidatedDraft`] holds that normalized copy.
pub fn validate_draft(
    draft: &WillDraft,
    ctx: &ValidationContext,
) -> Result<ValidatedDraft, Vec<FieldError>> {
    let mut normalized = draft.clone();
    rules::normalize(&mut normalized, ctx.today);

    let errors: Vec<FieldError> = normalized
        .will_type
        .steps()
        .iter()
        .flat_map(|step| validate_step(*step, normalized.section(*step), ctx))
        .collect();

    if errors.is_empty() {
        Ok(ValidatedDraft {
            draft: normalized,
            validated_on: ctx.today,
        })
    } else {
        tracing::debug!(will = %draft.id, count = errors.len(), "draft validation failed");
        Err(errors)
    }
}

fn run<T: DeserializeOwned + Default>(
    step: StepKey,
    payload: &Value,
    ctx: &ValidationContext,
    rules: fn(&T, &mut Checker<'_>),
) -> Vec<FieldError> {
    let typed = match payload::decode::<T>(step, payload) {
        Ok(t) => t,
        Err(e) => return vec![e],
    };
    let mut errors = presence_errors(step, payload, ctx.today);
    let mut checker = Checker {
        step,
        today: ctx.today,
        errors: &mut errors,
    };
    rules(&typed, &mut checker);
    errors
}

// ─── Presence ───────────────────────────────────────────────────────

fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Bool(_)) | Some(Value::Number(_)) => true,
    }
}

fn presence_errors(step: StepKey, payload: &Value, today: NaiveDate) -> Vec<FieldError> {
    let resolution = rules::resolve_step(step, payload, today);
    let mut errors = Vec::new();
    for field in resolution.required {
        let value = lookup(payload, &field.path);
        match field.requirement {
            Requirement::Value if !is_filled(value) => {
                errors.push(FieldError::required(step, field.path, &field.label));
            }
            Requirement::Items(min) => {
                let count = value.and_then(Value::as_array).map_or(0, Vec::len);
                if count < min {
                    let verb = if min > 1 { "are" } else { "is" };
                    errors.push(FieldError::new(
                        step,
                        field.path,
                        FieldErrorKind::Required,
                        format!("{} {verb} required", field.label),
                    ));
                }
            }
            Requirement::Value => {}
        }
    }
    errors
}

// ─── Format and cross-field checks ──────────────────────────────────

struct Checker<'a> {
    step: StepKey,
    today: NaiveDate,
    errors: &'a mut Vec<FieldError>,
}

impl Checker<'_> {
    fn push(&mut self, path: FieldPath, kind: FieldErrorKind, message: String) {
        self.errors.push(FieldError::new(self.step, path, kind, message));
    }

    /// A filled date that parses and is not after today.
    fn past_date(&mut self, path: FieldPath, value: &Option<String>, label: &str) -> Option<NaiveDate> {
        let raw = filled(value)?;
        match parse_date(raw) {
            Err(_) => {
                self.push(
                    path,
                    FieldErrorKind::InvalidDate,
                    format!("{label} must be a date in YYYY-MM-DD form"),
                );
                None
            }
            Ok(d) if d > self.today => {
                self.push(path, FieldErrorKind::InvalidDate, format!("{label} cannot be in the future"));
                None
            }
            Ok(d) => Some(d),
        }
    }

    fn min_age(&mut self, path: FieldPath, dob: &Option<String>, label: &str, min: u32) {
        let Some(date) = self.past_date(path.clone(), dob, label) else {
            return;
        };
        if calculate_age(date, self.today) < min {
            self.push(
                path,
                FieldErrorKind::Underage,
                format!("{label} must be at least {min} years ago"),
            );
        }
    }

    fn pan(&mut self, path: FieldPath, value: &Option<String>, label: &str) {
        if let Some(raw) = filled(value) {
            if let Err(e) = Pan::new(raw) {
                self.push(path, FieldErrorKind::InvalidFormat, format!("{label}: {e}"));
            }
        }
    }

    fn aadhaar(&mut self, path: FieldPath, value: &Option<String>, label: &str) {
        if let Some(raw) = filled(value) {
            if let Err(e) = Aadhaar::new(raw) {
                self.push(path, FieldErrorKind::InvalidFormat, format!("{label}: {e}"));
            }
        }
    }

    fn digits(&mut self, path: FieldPath, value: &Option<String>, label: &str, len: usize) {
        if let Some(raw) = filled(value) {
            if raw.len() != len || !raw.bytes().all(|b| b.is_ascii_digit()) {
                self.push(
                    path,
                    FieldErrorKind::InvalidFormat,
                    format!("{label} must be exactly {len} digits"),
                );
            }
        }
    }

    fn phone(&mut self, path: FieldPath, value: &Option<String>, label: &str) {
        self.digits(path, value, label, 10);
    }

    fn email(&mut self, path: FieldPath, value: &Option<String>) {
        if let Some(raw) = filled(value) {
            if !is_email(raw) {
                self.push(path, FieldErrorKind::InvalidFormat, "Email address is not valid".into());
            }
        }
    }

    fn choice(&mut self, path: FieldPath, value: &Option<String>, choices: &[&str], label: &str) {
        if let Some(raw) = filled(value) {
            if !choices.contains(&raw) {
                self.push(
                    path,
                    FieldErrorKind::InvalidFormat,
                    format!("{label} must be one of: {}", choices.join(", ")),
                );
            }
        }
    }

    fn number(&mut self, path: FieldPath, value: &Option<Numeric>, label: &str) -> Option<Decimal> {
        match value.as_ref()? {
            Numeric::Value(d) => Some(*d),
            Numeric::Unparsed(raw) => {
                self.push(
                    path,
                    FieldErrorKind::InvalidFormat,
                    format!("{label} must be a number, got {raw:?}"),
                );
                None
            }
        }
    }

    /// Percentage in `(0, 100]`.
    fn percentage(&mut self, path: FieldPath, value: &Option<Numeric>, label: &str) -> Option<Decimal> {
        let d = self.number(path.clone(), value, label)?;
        if d <= Decimal::ZERO || d > Decimal::ONE_HUNDRED {
            self.push(
                path,
                FieldErrorKind::OutOfRange,
                format!("{label} must be greater than 0 and at most 100"),
            );
            return None;
        }
        Some(d)
    }

    fn non_negative(&mut self, path: FieldPath, value: &Option<Numeric>, label: &str) {
        if let Some(d) = self.number(path.clone(), value, label) {
            if d < Decimal::ZERO {
                self.push(path, FieldErrorKind::OutOfRange, format!("{label} cannot be negative"));
            }
        }
    }

    fn affirmed(&mut self, path: FieldPath, flag: Option<bool>, message: &str) {
        if flag != Some(true) {
            self.push(path, FieldErrorKind::NotAffirmed, message.to_string());
        }
    }
}

fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = s.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

fn normalized_name(v: &Option<String>) -> Option<String> {
    filled(v).map(|s| s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
}

fn key(name: &str) -> FieldPath {
    FieldPath::keys([name])
}

fn check_testator(t: &TestatorDetails, c: &mut Checker<'_>) {
    c.min_age(key("dateOfBirth"), &t.date_of_birth, "Date of birth", MAJORITY_AGE);
    c.digits(key("pinCode"), &t.pin_code, "PIN code", 6);
    c.pan(key("pan"), &t.pan, "PAN");
    c.aadhaar(key("aadhaar"), &t.aadhaar, "Aadhaar");
    c.email(key("email"), &t.email);
    c.phone(key("phone"), &t.phone, "Phone");
}

fn check_family(f: &FamilyDetails, c: &mut Checker<'_>) {
    c.choice(key("maritalStatus"), &f.marital_status, &MaritalStatus::CHOICES, "Marital status");

    if f.marital_status() == Some(MaritalStatus::Married) {
        let spouse = key("spouse");
        c.min_age(spouse.child("dateOfBirth"), &f.spouse.date_of_birth, "Spouse date of birth", MAJORITY_AGE);
        c.pan(spouse.child("pan"), &f.spouse.pan, "Spouse PAN");
        c.aadhaar(spouse.child("aadhaar"), &f.spouse.aadhaar, "Spouse Aadhaar");
    }

    if f.has_children == Some(true) {
        for (i, child) in f.children.iter().enumerate() {
            let path = key("children").index(i).child("dateOfBirth");
            c.past_date(path, &child.date_of_birth, &format!("Child {} date of birth", i + 1));
        }
    }

    for (i, sibling) in f.siblings.iter().enumerate() {
        let path = key("siblings").index(i).child("dateOfBirth");
        c.past_date(path, &sibling.date_of_birth, &format!("Sibling {} date of birth", i + 1));
    }
}

fn check_person(c: &mut Checker<'_>, base: FieldPath, who: &str, dob: &Option<String>, phone: &Option<String>) {
    c.min_age(base.child("dateOfBirth"), dob, &format!("{who} date of birth"), MAJORITY_AGE);
    c.phone(base.child("phone"), phone, &format!("{who} phone"));
}

fn check_guardian(c: &mut Checker<'_>, base: FieldPath, who: &str, g: &GuardianDetails) {
    check_person(c, base, who, &g.date_of_birth, &g.phone);
}

fn check_guardianship(g: &GuardianshipDetails, c: &mut Checker<'_>) {
    if g.has_minor_children != Some(true) {
        return;
    }
    check_guardian(c, key("primaryGuardian"), "Guardian", &g.primary_guardian);
    if g.has_backup_guardian == Some(true) {
        check_guardian(c, key("backupGuardian"), "Backup guardian", &g.backup_guardian);
    }
}

fn check_loan(c: &mut Checker<'_>, entry: &FieldPath, has_loan: Option<bool>, loan: &LoanDetails, n: usize) {
    if has_loan == Some(true) {
        c.non_negative(
            entry.child("loan").child("outstandingAmount"),
            &loan.outstanding_amount,
            &format!("Asset {n} outstanding loan amount"),
        );
    }
}

fn check_assets(a: &AssetsDetails, c: &mut Checker<'_>) {
    for (i, raw) in a.assets.iter().enumerate() {
        let entry = key("assets").index(i);
        let n = i + 1;
        match AssetEntry::decode(raw) {
            AssetEntry::Untyped => {}
            AssetEntry::UnknownType(t) => c.push(
                entry.child("assetType"),
                FieldErrorKind::InvalidFormat,
                format!("Asset {n} type {t:?} is not one of: {}", AssetRecord::TYPES.join(", ")),
            ),
            AssetEntry::Malformed(reason) => c.push(
                entry,
                FieldErrorKind::Malformed,
                format!("Asset {n} could not be read: {reason}"),
            ),
            AssetEntry::Record(AssetRecord::ImmovableProperty(p)) => {
                c.choice(
                    entry.child("ownershipType"),
                    &p.ownership_type,
                    &OwnershipType::CHOICES,
                    &format!("Asset {n} ownership type"),
                );
                if p.ownership_type().is_some_and(|t| t.is_shared()) {
                    c.percentage(entry.child("ownershipShare"), &p.ownership_share, &format!("Asset {n} ownership share"));
                }
                check_loan(c, &entry, p.has_loan, &p.loan, n);
            }
            AssetEntry::Record(AssetRecord::Vehicle(v)) => check_loan(c, &entry, v.has_loan, &v.loan, n),
            AssetEntry::Record(AssetRecord::JewelryValuables(j)) => {
                c.non_negative(entry.child("estimatedValue"), &j.estimated_value, &format!("Asset {n} estimated value"));
            }
            AssetEntry::Record(AssetRecord::BusinessInterest(b)) => {
                c.percentage(
                    entry.child("ownershipPercentage"),
                    &b.ownership_percentage,
                    &format!("Asset {n} ownership percentage"),
                );
            }
            AssetEntry::Record(AssetRecord::Debt(d)) => {
                c.non_negative(entry.child("outstandingAmount"), &d.outstanding_amount, &format!("Asset {n} outstanding amount"));
            }
            AssetEntry::Record(
                AssetRecord::BankAccount(_) | AssetRecord::Investment(_) | AssetRecord::DigitalAssets(_),
            ) => {}
        }
    }
}

fn check_beneficiaries(b: &BeneficiariesDetails, c: &mut Checker<'_>) {
    c.choice(
        key("distributionType"),
        &b.distribution_type,
        &DistributionType::CHOICES,
        "Distribution type",
    );
    let mode = b.distribution_type();
    let list = key("beneficiaries");

    let mut shares = Vec::with_capacity(b.beneficiaries.len());
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (i, entry) in b.beneficiaries.iter().enumerate() {
        let path = list.index(i);
        let n = i + 1;
        c.past_date(path.child("dateOfBirth"), &entry.date_of_birth, &format!("Beneficiary {n} date of birth"));
        c.pan(path.child("pan"), &entry.pan, &format!("Beneficiary {n} PAN"));
        c.aadhaar(path.child("aadhaar"), &entry.aadhaar, &format!("Beneficiary {n} Aadhaar"));

        if mode.is_some_and(|m| m.uses_shares()) {
            shares.push(c.percentage(
                path.child("sharePercentage"),
                &entry.share_percentage,
                &format!("Beneficiary {n} share"),
            ));
        }

        if filled(&entry.name).is_some() {
            if let Some(first) = seen.get(&entry.stable_key()) {
                c.push(
                    path.child("name"),
                    FieldErrorKind::Duplicate,
                    format!("Beneficiary {n} is the same person as beneficiary {}", first + 1),
                );
            } else {
                seen.insert(entry.stable_key(), i);
            }
        }
    }

    // Only meaningful once every share is a valid number.
    if !shares.is_empty() && shares.iter().all(Option::is_some) {
        let total: Decimal = shares.into_iter().flatten().sum();
        if total != Decimal::ONE_HUNDRED {
            c.push(
                list,
                FieldErrorKind::AllocationTotal,
                format!("Shares must total exactly 100% (currently {}%)", total.normalize()),
            );
        }
    }
}

fn check_charities(ch: &CharitiesDetails, c: &mut Checker<'_>) {
    if ch.has_charities != Some(true) {
        return;
    }
    for (i, charity) in ch.charities.iter().enumerate() {
        c.pan(key("charities").index(i).child("pan"), &charity.pan, &format!("Charity {} PAN", i + 1));
    }
}

fn check_executor(c: &mut Checker<'_>, base: FieldPath, who: &str, e: &ExecutorDetails) {
    c.pan(base.child("pan"), &e.pan, &format!("{who} PAN"));
    check_person(c, base, who, &e.date_of_birth, &e.phone);
}

fn check_executors(e: &ExecutorsDetails, c: &mut Checker<'_>) {
    if e.use_professional_executor == Some(true) {
        return;
    }
    check_executor(c, key("primaryExecutor"), "Executor", &e.primary_executor);
    if e.has_backup_executor == Some(true) {
        check_executor(c, key("backupExecutor"), "Backup executor", &e.backup_executor);
    }
}

fn check_dispute_resolution(d: &DisputeResolutionDetails, c: &mut Checker<'_>) {
    if d.has_dispute_resolver == Some(true) {
        c.phone(key("resolver").child("phone"), &d.resolver.phone, "Resolver phone");
    }
}

fn check_witnesses(w: &WitnessesDetails, c: &mut Checker<'_>) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (i, witness) in w.witnesses.iter().enumerate() {
        let path = key("witnesses").index(i);
        let n = i + 1;
        c.min_age(path.child("dateOfBirth"), &witness.date_of_birth, &format!("Witness {n} date of birth"), MAJORITY_AGE);
        if let Some(name) = normalized_name(&witness.name) {
            if let Some(first) = seen.get(&name) {
                c.push(
                    path.child("name"),
                    FieldErrorKind::Duplicate,
                    format!("Witness {n} has the same name as witness {}", first + 1),
                );
            } else {
                seen.insert(name, i);
            }
        }
    }
}

fn check_review(r: &ReviewDetails, c: &mut Checker<'_>) {
    c.affirmed(key("soundMind"), r.sound_mind, "You must confirm you are of sound mind");
    c.affirmed(key("freeWill"), r.free_will, "You must confirm you are making this will of your own free will");
    if let Some(raw) = filled(&r.date_of_signing) {
        match parse_date(raw) {
            Err(_) => c.push(
                key("dateOfSigning"),
                FieldErrorKind::InvalidDate,
                "Date of signing must be a date in YYYY-MM-DD form".into(),
            ),
            Ok(d) if d < c.today => c.push(
                key("dateOfSigning"),
                FieldErrorKind::InvalidDate,
                "Date of signing cannot be in the past".into(),
            ),
            Ok(_) => {}
        }
    }
}
