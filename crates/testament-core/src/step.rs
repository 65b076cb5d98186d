//! # Step Keys and Will Types
//!
//! The wizard is a fixed linear sequence of steps. Which steps appear, and
//! in what order, is determined by the [`WillType`]. Every draft carries a
//! payload for every [`StepKey`] regardless of type.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifies one wizard step and its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKey {
    Testator,
    Family,
    Guardianship,
    Assets,
    Beneficiaries,
    Charities,
    Executors,
    DisputeResolution,
    Witnesses,
    Review,
}

impl StepKey {
    /// Every known step key, in canonical order.
    pub const ALL: [StepKey; 10] = [
        Self::Testator,
        Self::Family,
        Self::Guardianship,
        Self::Assets,
        Self::Beneficiaries,
        Self::Charities,
        Self::Executors,
        Self::DisputeResolution,
        Self::Witnesses,
        Self::Review,
    ];

    /// The camelCase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Testator => "testator",
            Self::Family => "family",
            Self::Guardianship => "guardianship",
            Self::Assets => "assets",
            Self::Beneficiaries => "beneficiaries",
            Self::Charities => "charities",
            Self::Executors => "executors",
            Self::DisputeResolution => "disputeResolution",
            Self::Witnesses => "witnesses",
            Self::Review => "review",
        }
    }

    /// Title shown in the wizard's progress indicator.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Testator => "Testator Details",
            Self::Family => "Family Members",
            Self::Guardianship => "Guardianship",
            Self::Assets => "Assets",
            Self::Beneficiaries => "Beneficiaries",
            Self::Charities => "Charitable Bequests",
            Self::Executors => "Executors",
            Self::DisputeResolution => "Dispute Resolution",
            Self::Witnesses => "Witnesses",
            Self::Review => "Review & Declaration",
        }
    }
}

impl std::fmt::Display for StepKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StepKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownStep(s.to_string()))
    }
}

/// Kind of will being drafted; fixes the step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WillType {
    #[default]
    Simple,
    Comprehensive,
}

const SIMPLE_STEPS: [StepKey; 8] = [
    StepKey::Testator,
    StepKey::Family,
    StepKey::Guardianship,
    StepKey::Assets,
    StepKey::Beneficiaries,
    StepKey::Executors,
    StepKey::Witnesses,
    StepKey::Review,
];

const COMPREHENSIVE_STEPS: [StepKey; 10] = StepKey::ALL;

impl WillType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Comprehensive => "comprehensive",
        }
    }

    /// Ordered steps for this will type. The last step is always review.
    pub fn steps(&self) -> &'static [StepKey] {
        match self {
            Self::Simple => &SIMPLE_STEPS,
            Self::Comprehensive => &COMPREHENSIVE_STEPS,
        }
    }

    /// Number of steps, `N`.
    pub fn step_count(&self) -> usize {
        self.steps().len()
    }

    /// Step at a 1-based position.
    pub fn step_at(&self, position: usize) -> Option<StepKey> {
        position.checked_sub(1).and_then(|i| self.steps().get(i).copied())
    }

    /// 1-based position of a step, if the will type uses it.
    pub fn position_of(&self, step: StepKey) -> Option<usize> {
        self.steps().iter().position(|s| *s == step).map(|i| i + 1)
    }

    pub fn includes(&self, step: StepKey) -> bool {
        self.steps().contains(&step)
    }
}

impl std::fmt::Display for WillType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WillType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Self::Simple),
            "comprehensive" => Ok(Self::Comprehensive),
            other => Err(ValidationError::UnknownWillType(other.to_string())),
        }
    }
}
