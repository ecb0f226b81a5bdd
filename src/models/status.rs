use serde::{Deserialize, Serialize};

/// Whether a result came out of every collaborator it asked for, or had to
/// settle for a fallback somewhere along the way.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Completeness {
    #[default]
    Complete,
    Degraded,
}

impl Completeness {
    pub fn is_degraded(&self) -> bool {
        *self == Completeness::Degraded
    }
}

/// A value tagged with how it was produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curated<T> {
    pub value: T,
    pub status: Completeness,
}

impl<T> Curated<T> {
    pub fn complete(value: T) -> Self {
        Curated {
            value,
            status: Completeness::Complete,
        }
    }

    pub fn degraded(value: T) -> Self {
        Curated {
            value,
            status: Completeness::Degraded,
        }
    }
}
