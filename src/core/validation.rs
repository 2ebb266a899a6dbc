//! Form validation - turns untyped form input into typed records.
//!
//! [`validate_entry`] is a pure function over a [`ReferenceData`] snapshot:
//! it never touches the database, so the same rules apply whether the
//! snapshot was taken inside a transaction or built by hand in a test.
//! Every rule is checked independently and each failure contributes its own
//! message, in field order.

use crate::{
    core::{amount::parse_amount, reference::ReferenceData},
    entities::cashflow,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use serde::Deserialize;

/// Raw cash-flow entry fields exactly as submitted by the form.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[allow(missing_docs)]
pub struct EntryForm {
    pub recorded_on: String,
    pub status_id: String,
    pub type_id: String,
    pub category_id: String,
    pub subcategory_id: String,
    pub amount: String,
    pub comment: String,
}

impl EntryForm {
    /// Builds the form values for editing an existing entry.
    #[must_use]
    pub fn from_entry(entry: &cashflow::Model) -> Self {
        Self {
            recorded_on: entry.recorded_on.format("%Y-%m-%d").to_string(),
            status_id: entry.status_id.to_string(),
            type_id: entry.type_id.to_string(),
            category_id: entry.category_id.to_string(),
            subcategory_id: entry.subcategory_id.to_string(),
            amount: crate::core::amount::format_amount_plain(entry.amount_cents),
            comment: entry.comment.clone().unwrap_or_default(),
        }
    }
}

/// A validated cash-flow entry, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct NewEntry {
    pub recorded_on: NaiveDate,
    pub status_id: i64,
    pub type_id: i64,
    pub category_id: i64,
    pub subcategory_id: i64,
    pub amount_cents: i64,
    pub comment: Option<String>,
}

/// Parses a positive integer id. Empty, malformed and non-positive input
/// all count as "not provided".
#[must_use]
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Parses an ISO `YYYY-MM-DD` date.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Trims a reference name and rejects it if nothing is left.
pub fn require_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::validation("Name is required"));
    }
    Ok(name.to_string())
}

/// Validates a submitted entry against the current reference data.
///
/// # Errors
/// Returns every violated rule as a human-readable message, in field order:
/// date, status, type, category, subcategory, amount.
pub fn validate_entry(
    form: &EntryForm,
    refs: &ReferenceData,
) -> std::result::Result<NewEntry, Vec<String>> {
    let mut errors = Vec::new();

    let recorded_on = if form.recorded_on.trim().is_empty() {
        errors.push("Date is required".to_string());
        None
    } else if let Some(date) = parse_date(&form.recorded_on) {
        Some(date)
    } else {
        errors.push("Date must be a valid date in YYYY-MM-DD format".to_string());
        None
    };

    let status_id = match parse_id(&form.status_id) {
        None => {
            errors.push("Status is required".to_string());
            None
        }
        Some(id) if refs.status(id).is_none() => {
            errors.push("Selected status does not exist".to_string());
            None
        }
        Some(id) => Some(id),
    };

    let type_id = match parse_id(&form.type_id) {
        None => {
            errors.push("Type is required".to_string());
            None
        }
        Some(id) if refs.flow_type(id).is_none() => {
            errors.push("Selected type does not exist".to_string());
            None
        }
        Some(id) => Some(id),
    };

    let category_id = match parse_id(&form.category_id) {
        None => {
            errors.push("Category is required".to_string());
            None
        }
        Some(id) => match refs.category(id) {
            None => {
                errors.push("Selected category does not exist".to_string());
                None
            }
            Some(category) => {
                if type_id.is_some_and(|type_id| category.type_id != type_id) {
                    errors.push("Category does not belong to the selected type".to_string());
                }
                Some(id)
            }
        },
    };

    let subcategory_id = match parse_id(&form.subcategory_id) {
        None => {
            errors.push("Subcategory is required".to_string());
            None
        }
        Some(id) => match refs.subcategory(id) {
            None => {
                errors.push("Selected subcategory does not exist".to_string());
                None
            }
            Some(subcategory) => {
                if category_id.is_some_and(|category_id| subcategory.category_id != category_id) {
                    errors.push(
                        "Subcategory does not belong to the selected category".to_string(),
                    );
                }
                if type_id.is_some_and(|type_id| subcategory.type_id != type_id) {
                    errors.push("Subcategory does not belong to the selected type".to_string());
                }
                Some(id)
            }
        },
    };

    let amount_cents = match parse_amount(&form.amount) {
        None => {
            errors.push("Enter a valid amount".to_string());
            None
        }
        Some(cents) if cents <= 0 => {
            errors.push("Amount must be greater than zero".to_string());
            None
        }
        Some(cents) => Some(cents),
    };

    let comment = Some(form.comment.trim())
        .filter(|c| !c.is_empty())
        .map(ToString::to_string);

    match (
        recorded_on,
        status_id,
        type_id,
        category_id,
        subcategory_id,
        amount_cents,
    ) {
        (
            Some(recorded_on),
            Some(status_id),
            Some(type_id),
            Some(category_id),
            Some(subcategory_id),
            Some(amount_cents),
        ) if errors.is_empty() => Ok(NewEntry {
            recorded_on,
            status_id,
            type_id,
            category_id,
            subcategory_id,
            amount_cents,
            comment,
        }),
        _ => Err(errors),
    }
}
