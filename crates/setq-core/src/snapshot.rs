//! Snapshot: the unit of cached state.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use setq_calendar::Session;

use crate::derive::{derive, DerivationError};

// ---------------------------------------------------------------------------
// DerivedCode
// ---------------------------------------------------------------------------

/// Exactly two ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DerivedCode(String);

impl DerivedCode {
    pub(crate) fn from_digits(a: char, b: char) -> Self {
        debug_assert!(a.is_ascii_digit() && b.is_ascii_digit());
        let mut s = String::with_capacity(2);
        s.push(a);
        s.push(b);
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DerivedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DerivedCode {
    type Error = InvalidSnapshot;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let bytes = s.as_bytes();
        if bytes.len() == 2 && bytes.iter().all(u8::is_ascii_digit) {
            Ok(Self(s))
        } else {
            Err(InvalidSnapshot::MalformedCode(s))
        }
    }
}

impl From<DerivedCode> for String {
    fn from(c: DerivedCode) -> Self {
        c.0
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable record of one derived market reading.
///
/// Only [`Snapshot::capture`] builds one, so `derived_code` always matches
/// the two text fields it was computed from. The serialized form is
/// [`SnapshotRecord`]; decoding re-derives the code and rejects a record
/// whose stored code disagrees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord", into = "SnapshotRecord")]
pub struct Snapshot {
    index_value: String,
    traded_value: String,
    derived_code: DerivedCode,
    captured_at: DateTime<FixedOffset>,
    session: Session,
}

impl Snapshot {
    /// Derive the code from the raw strings and seal the result.
    pub fn capture(
        index_value: &str,
        traded_value: &str,
        captured_at: DateTime<FixedOffset>,
        session: Session,
    ) -> Result<Self, DerivationError> {
        let derived_code = derive(index_value, traded_value)?;
        Ok(Self {
            index_value: index_value.trim().to_string(),
            traded_value: traded_value.trim().to_string(),
            derived_code,
            captured_at,
            session,
        })
    }

    pub fn index_value(&self) -> &str {
        &self.index_value
    }

    pub fn traded_value(&self) -> &str {
        &self.traded_value
    }

    pub fn derived_code(&self) -> &DerivedCode {
        &self.derived_code
    }

    pub fn captured_at(&self) -> DateTime<FixedOffset> {
        self.captured_at
    }

    /// Session that was open when this snapshot was captured.
    pub fn session(&self) -> Session {
        self.session
    }
}

// ---------------------------------------------------------------------------
// Serialized form
// ---------------------------------------------------------------------------

/// Wire / persistence shape of a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub index_value: String,
    pub traded_value: String,
    pub derived_code: String,
    pub captured_at: DateTime<FixedOffset>,
    pub session: Session,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSnapshot {
    #[error("derived code '{0}' is not two ASCII digits")]
    MalformedCode(String),
    #[error("stored code '{stored}' does not match fields (derives to '{derived}')")]
    CodeMismatch { stored: String, derived: String },
    #[error(transparent)]
    Derivation(#[from] DerivationError),
}

impl From<Snapshot> for SnapshotRecord {
    fn from(s: Snapshot) -> Self {
        Self {
            index_value: s.index_value,
            traded_value: s.traded_value,
            derived_code: s.derived_code.into(),
            captured_at: s.captured_at,
            session: s.session,
        }
    }
}

impl TryFrom<SnapshotRecord> for Snapshot {
    type Error = InvalidSnapshot;

    fn try_from(r: SnapshotRecord) -> Result<Self, Self::Error> {
        let snap = Snapshot::capture(&r.index_value, &r.traded_value, r.captured_at, r.session)?;
        if snap.derived_code.as_str() != r.derived_code {
            return Err(InvalidSnapshot::CodeMismatch {
                stored: r.derived_code,
                derived: snap.derived_code.0,
            });
        }
        Ok(snap)
    }
}
