//! # Document Assembly
//!
//! The consumer interface for finished drafts. A [`DocumentAssembler`] only
//! ever receives a [`ValidatedDraft`], so it never has to re-check answers.
//!
//! [`OutlineAssembler`] renders a plain-text outline of the will: lettered
//! sections, then signature blocks for the testator and each witness. The
//! guardianship section is present only when there are minor children, and
//! every later section's letter shifts with it. Output is a pure function of
//! the draft and its validation date, and carries a SHA-256 digest of the
//! rendered text.

use serde::de::DeserializeOwned;
use serde::Serialize;
use testament_core::{sha256_digest, Aadhaar, ContentDigest, StepKey, WillId, MAJORITY_AGE};
use testament_schema::payload::{
    self, filled, AssetEntry, AssetsDetails, BeneficiariesDetails, CharitiesDetails,
    DisputeResolutionDetails, DistributionType, ExecutorsDetails, FamilyDetails,
    GuardianshipDetails, MaritalStatus, ReviewDetails, TestatorDetails, WitnessesDetails,
};
use testament_schema::rules::age_of;
use testament_schema::{ValidatedDraft, WillDraft};

use crate::error::AssemblyError;

pub trait DocumentAssembler: Send + Sync {
    fn assemble(&self, draft: &ValidatedDraft) -> Result<AssembledDocument, AssemblyError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSection {
    /// `A`, `B`, ... in document order.
    pub letter: String,
    pub heading: String,
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureBlock {
    pub role: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledDocument {
    pub will_id: WillId,
    pub title: String,
    pub sections: Vec<DocumentSection>,
    pub signatures: Vec<SignatureBlock>,
    /// Digest of [`AssembledDocument::render_text`].
    pub digest: ContentDigest,
}

impl AssembledDocument {
    pub fn section(&self, heading: &str) -> Option<&DocumentSection> {
        self.sections.iter().find(|s| s.heading == heading)
    }

    /// The document as plain text.
    pub fn render_text(&self) -> String {
        render(&self.title, &self.sections, &self.signatures)
    }
}

fn render(title: &str, sections: &[DocumentSection], signatures: &[SignatureBlock]) -> String {
    let mut out = String::new();
    out.push_str(title);
    out.push_str("\n\n");
    for section in sections {
        out.push_str(&format!("{}. {}\n", section.letter, section.heading.to_uppercase()));
        for para in &section.paragraphs {
            out.push_str(para);
            out.push('\n');
        }
        out.push('\n');
    }
    for block in signatures {
        out.push_str("______________________________\n");
        out.push_str(&format!("{}: {}\n", block.role, block.name));
        if let Some(address) = &block.address {
            out.push_str(address);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

fn letter(index: usize) -> String {
    (b'A'..=b'Z')
        .nth(index)
        .map(|b| char::from(b).to_string())
        .unwrap_or_else(|| (index + 1).to_string())
}

/// Deterministic plain-text will outline.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineAssembler;

impl DocumentAssembler for OutlineAssembler {
    fn assemble(&self, validated: &ValidatedDraft) -> Result<AssembledDocument, AssemblyError> {
        let draft = validated.draft();
        let today = validated.validated_on();

        let testator: TestatorDetails = read(draft, StepKey::Testator)?;
        let family: FamilyDetails = read(draft, StepKey::Family)?;
        let guardianship: GuardianshipDetails = read(draft, StepKey::Guardianship)?;
        let assets: AssetsDetails = read(draft, StepKey::Assets)?;
        let beneficiaries: BeneficiariesDetails = read(draft, StepKey::Beneficiaries)?;
        let executors: ExecutorsDetails = read(draft, StepKey::Executors)?;
        let witnesses: WitnessesDetails = read(draft, StepKey::Witnesses)?;
        let review: ReviewDetails = read(draft, StepKey::Review)?;

        let name = text(&testator.full_name);
        let mut parts: Vec<(&str, Vec<String>)> = Vec::new();

        parts.push(("Declaration", declaration(&testator, today)));
        parts.push(("Family", family_paragraphs(&family)));
        if guardianship.has_minor_children == Some(true) {
            parts.push(("Appointment of Guardian", guardian_paragraphs(&guardianship)));
        }
        parts.push(("Appointment of Executors", executor_paragraphs(&executors)));
        parts.push(("Assets", asset_paragraphs(&assets)));
        parts.push(("Bequests", bequest_paragraphs(&beneficiaries, today)));

        if draft.will_type.includes(StepKey::Charities) {
            let charities: CharitiesDetails = read(draft, StepKey::Charities)?;
            if charities.has_charities == Some(true) {
                parts.push(("Charitable Bequests", charity_paragraphs(&charities)));
            }
        }
        if draft.will_type.includes(StepKey::DisputeResolution) {
            let dispute: DisputeResolutionDetails = read(draft, StepKey::DisputeResolution)?;
            if dispute.has_dispute_resolver == Some(true) {
                parts.push(("Dispute Resolution", dispute_paragraphs(&dispute)));
            }
        }
        parts.push(("Execution", execution_paragraphs(&review)));

        let sections: Vec<DocumentSection> = parts
            .into_iter()
            .enumerate()
            .map(|(i, (heading, paragraphs))| DocumentSection {
                letter: letter(i),
                heading: heading.to_string(),
                paragraphs,
            })
            .collect();

        let mut signatures = vec![SignatureBlock {
            role: "Testator".into(),
            name: name.clone(),
            address: None,
        }];
        signatures.extend(witnesses.witnesses.iter().enumerate().map(|(i, w)| SignatureBlock {
            role: format!("Witness {}", i + 1),
            name: text(&w.name),
            address: filled(&w.address).map(str::to_string),
        }));

        let title = format!("LAST WILL AND TESTAMENT OF {}", name.to_uppercase());
        let digest = sha256_digest(render(&title, &sections, &signatures).as_bytes());
        tracing::debug!(will_id = %draft.id, sections = sections.len(), %digest, "assembled will outline");

        Ok(AssembledDocument {
            will_id: draft.id,
            title,
            sections,
            signatures,
            digest,
        })
    }
}

fn read<T: DeserializeOwned + Default>(draft: &WillDraft, step: StepKey) -> Result<T, AssemblyError> {
    payload::decode(step, draft.section(step)).map_err(|e| AssemblyError::Unreadable {
        step,
        reason: e.message,
    })
}

fn text(v: &Option<String>) -> String {
    filled(v).unwrap_or("").trim().to_string()
}

// ─── Sections ───────────────────────────────────────────────────────

fn declaration(t: &TestatorDetails, today: chrono::NaiveDate) -> Vec<String> {
    let age = age_of(&t.date_of_birth, today)
        .map(|a| format!(", aged {a} years"))
        .unwrap_or_default();
    let occupation = filled(&t.occupation)
        .map(|o| format!(", {o}"))
        .unwrap_or_default();
    let mut paras = vec![format!(
        "I, {}{age}{occupation}, residing at {}, {}, {} {}, declare this to be my last will and \
         revoke all wills and codicils made by me before.",
        text(&t.full_name),
        text(&t.address),
        text(&t.city),
        text(&t.state),
        text(&t.pin_code),
    )];
    if let Some(pan) = filled(&t.pan) {
        paras.push(format!("PAN: {pan}"));
    }
    if let Some(aadhaar) = filled(&t.aadhaar).and_then(|a| Aadhaar::new(a).ok()) {
        paras.push(format!("Aadhaar: {aadhaar}"));
    }
    paras
}

fn family_paragraphs(f: &FamilyDetails) -> Vec<String> {
    let mut paras = vec![format!("Marital status: {}", text(&f.marital_status))];
    if f.marital_status() == Some(MaritalStatus::Married) {
        paras.push(format!(
            "Spouse: {} (born {})",
            text(&f.spouse.name),
            text(&f.spouse.date_of_birth)
        ));
    }
    let children = if f.has_children == Some(true) { f.children.as_slice() } else { &[] };
    for child in children {
        let minor = if child.is_minor == Some(true) { ", a minor" } else { "" };
        paras.push(format!(
            "{}: {} (born {}){minor}",
            text(&child.relationship),
            text(&child.name),
            text(&child.date_of_birth)
        ));
    }
    for sibling in &f.siblings {
        paras.push(format!("{}: {}", text(&sibling.relationship), text(&sibling.name)));
    }
    paras
}

fn guardian_paragraphs(g: &GuardianshipDetails) -> Vec<String> {
    let primary = &g.primary_guardian;
    let mut paras = vec![format!(
        "I appoint {}, my {}, residing at {}, as guardian of the person and property of my minor children.",
        text(&primary.name),
        text(&primary.relation).to_lowercase(),
        text(&primary.address),
    )];
    if g.has_backup_guardian == Some(true) {
        paras.push(format!(
            "If {} is unable or unwilling to act, I appoint {}, my {}, as guardian in their place.",
            text(&primary.name),
            text(&g.backup_guardian.name),
            text(&g.backup_guardian.relation).to_lowercase(),
        ));
    }
    paras
}

fn executor_paragraphs(e: &ExecutorsDetails) -> Vec<String> {
    if e.use_professional_executor == Some(true) {
        return vec![format!("I appoint the {} as executor of this will.", text(&e.fallback_executor))];
    }
    let primary = &e.primary_executor;
    let mut paras = vec![format!(
        "I appoint {}, my {}, residing at {}, as executor of this will.",
        text(&primary.name),
        text(&primary.relation).to_lowercase(),
        text(&primary.address),
    )];
    if e.has_backup_executor == Some(true) {
        paras.push(format!(
            "If {} is unable or unwilling to act, I appoint {}, my {}, as executor in their place.",
            text(&primary.name),
            text(&e.backup_executor.name),
            text(&e.backup_executor.relation).to_lowercase(),
        ));
    }
    paras
}

fn asset_paragraphs(a: &AssetsDetails) -> Vec<String> {
    let records: Vec<String> = a
        .assets
        .iter()
        .filter_map(|raw| AssetEntry::decode(raw).record().map(|r| r.summary()))
        .collect();
    if records.is_empty() {
        return vec!["I declare no specific assets in this will.".into()];
    }
    let mut paras = vec!["I own the following assets:".to_string()];
    paras.extend(records.iter().enumerate().map(|(i, s)| format!("{}. {s}", i + 1)));
    paras
}

fn bequest_paragraphs(b: &BeneficiariesDetails, today: chrono::NaiveDate) -> Vec<String> {
    let mode = b.distribution_type();
    let intro = match mode {
        Some(DistributionType::Equal) => "I bequeath my estate in equal shares to:",
        Some(DistributionType::SpecificAsset) => {
            "I bequeath my assets to the following beneficiaries as allocated by me:"
        }
        _ => "I bequeath my estate in the following shares:",
    };
    let mut paras = vec![intro.to_string()];
    for (i, entry) in b.beneficiaries.iter().enumerate() {
        let share = match (mode, &entry.share_percentage) {
            (Some(m), Some(share)) if m.uses_shares() => share
                .value()
                .map(|v| format!(": {}%", v.normalize()))
                .unwrap_or_default(),
            _ => String::new(),
        };
        let guardian = match age_of(&entry.date_of_birth, today) {
            Some(age) if age < MAJORITY_AGE => format!(
                ", a minor, through {} ({})",
                text(&entry.guardian_name),
                text(&entry.guardian_relation).to_lowercase()
            ),
            _ => String::new(),
        };
        paras.push(format!(
            "{}. {} ({}){guardian}{share}",
            i + 1,
            text(&entry.name),
            text(&entry.relation).to_lowercase()
        ));
    }
    paras
}

fn charity_paragraphs(c: &CharitiesDetails) -> Vec<String> {
    c.charities
        .iter()
        .map(|ch| {
            let purpose = filled(&ch.purpose)
                .map(|p| format!(", for {}", p.to_lowercase()))
                .unwrap_or_default();
            format!("I make a gift to {}, {}{purpose}.", text(&ch.name), text(&ch.address))
        })
        .collect()
}

fn dispute_paragraphs(d: &DisputeResolutionDetails) -> Vec<String> {
    vec![format!(
        "Any dispute arising under this will shall first be referred to {}, {}, whose decision I request my heirs to respect.",
        text(&d.resolver.name),
        text(&d.resolver.relation).to_lowercase(),
    )]
}

fn execution_paragraphs(r: &ReviewDetails) -> Vec<String> {
    vec![
        "I declare that I am of sound mind and make this will of my own free will, without \
         coercion or undue influence."
            .to_string(),
        format!(
            "Signed at {} on {} in the presence of the witnesses below, who sign in my presence \
             and in the presence of each other.",
            text(&r.place_of_signing),
            text(&r.date_of_signing)
        ),
    ]
}
