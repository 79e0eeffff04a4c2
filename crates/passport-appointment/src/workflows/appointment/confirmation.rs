use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::BookingDraft;

pub const DEFAULT_REFERENCE_PREFIX: &str = "DFA";
const SUFFIX_RANGE: u32 = 1_000_000;

/// Reference printed on the success notice, e.g. `DFA-004211`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceCode(pub String);

impl ReferenceCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terminal artifact of a booking. Holds its own copy of the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRecord {
    reference_code: ReferenceCode,
    draft: BookingDraft,
}

impl ConfirmationRecord {
    pub fn reference_code(&self) -> &ReferenceCode {
        &self.reference_code
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn email(&self) -> Option<&str> {
        self.draft.email()
    }
}

/// Issues reference codes. Codes are random, local to the process, and never checked for reuse.
#[derive(Debug, Clone)]
pub struct ConfirmationGenerator {
    prefix: String,
    rng: StdRng,
}

impl Default for ConfirmationGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_PREFIX)
    }
}

impl ConfirmationGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(prefix: impl Into<String>, seed: u64) -> Self {
        Self {
            prefix: prefix.into(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn confirm(&mut self, draft: &BookingDraft) -> ConfirmationRecord {
        ConfirmationRecord {
            reference_code: self.next_code(),
            draft: draft.clone(),
        }
    }

    fn next_code(&mut self) -> ReferenceCode {
        let suffix = self.rng.gen_range(0..SUFFIX_RANGE);
        ReferenceCode(format!("{}-{suffix:06}", self.prefix))
    }
}
