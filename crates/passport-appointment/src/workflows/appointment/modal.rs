use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalKind {
    Faq,
    Requirements,
    WhereToApply,
}

impl ModalKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Faq => "Frequently Asked Questions",
            Self::Requirements => "Requirements",
            Self::WhereToApply => "Where to Apply",
        }
    }
}

/// Single-slot register for informational overlays. Opening replaces whatever is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModalCoordinator {
    active: Option<ModalKind>,
}

impl ModalCoordinator {
    pub fn open(&mut self, kind: ModalKind) {
        self.active = Some(kind);
    }

    pub fn close(&mut self) {
        self.active = None;
    }

    pub fn is_open(&self, kind: ModalKind) -> bool {
        self.active == Some(kind)
    }

    pub fn active(&self) -> Option<ModalKind> {
        self.active
    }
}
