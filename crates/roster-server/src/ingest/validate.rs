//! Row validation and normalization
//!
//! Pure function from a raw row plus group defaults to either a
//! [`NormalizedRecord`] or a [`RejectionRecord`]. Rules apply in order,
//! first match wins:
//!
//! 1. `name` column absent or empty -> `missing-name`
//! 2. `email` column absent or not syntactically valid -> `invalid-email`
//! 3. Otherwise normalize: keep every column, substituting the group's
//!    default for columns with empty values, set the subscription flag,
//!    and attach the group identity.
//!
//! No side effects; the same row and defaults always produce the same
//! result.

use regex::Regex;
use std::sync::LazyLock;

use crate::store::Group;

use super::types::{NormalizedRecord, RawRow, RejectReason, RejectionRecord};

/// Syntactic email check. Requires a local part, an `@`, and a dotted
/// domain, so `a@b.com` passes and `a@b` does not.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate(row: RawRow, group: &Group) -> Result<NormalizedRecord, RejectionRecord> {
    let name = row.get("name").unwrap_or("").trim();
    if name.is_empty() {
        return Err(RejectionRecord::from_row(row, RejectReason::MissingName));
    }

    let email = row.get("email").unwrap_or("").trim();
    if !is_valid_email(email) {
        return Err(RejectionRecord::from_row(row, RejectReason::InvalidEmail));
    }

    let name = name.to_string();
    let email = email.to_string();

    let fields = row
        .into_fields()
        .into_iter()
        .map(|(column, value)| {
            let value = if value.trim().is_empty() {
                group
                    .default_fields
                    .get(&column)
                    .cloned()
                    .unwrap_or(value)
            } else {
                value
            };
            (column, value)
        })
        .collect();

    Ok(NormalizedRecord {
        group_id: group.id,
        email,
        name,
        subscribed: true,
        fields,
    })
}
