//! Translation of raw store faults into the command error taxonomy.

use crate::error::{CommandError, ConstraintError, ConstraintKind};
use tabula_store::{codes, ConstraintViolation, StoreError};

/// Classifies a raw store fault.
///
/// Constraint violations become [`CommandError::Constraint`] with a
/// subtype and, when the engine named one, the offending column. Every
/// other fault passes through as [`CommandError::Store`]. The raw
/// engine message is never dropped.
pub fn translate(err: StoreError) -> CommandError {
    match err {
        StoreError::Constraint(violation) => CommandError::Constraint(classify(violation)),
        other => CommandError::Store(other),
    }
}

fn classify(violation: ConstraintViolation) -> ConstraintError {
    // Prefer the structured code; fall back to matching the engine's
    // message text for codes we do not recognize.
    let kind = match violation.code {
        codes::CONSTRAINT_NOTNULL => ConstraintKind::NotNull,
        codes::CONSTRAINT_UNIQUE => ConstraintKind::Unique,
        _ => kind_from_message(&violation.message),
    };
    ConstraintError {
        kind,
        column: column_from_message(&violation.message),
        message: violation.message,
    }
}

fn kind_from_message(message: &str) -> ConstraintKind {
    if message.contains("NOT NULL") {
        ConstraintKind::NotNull
    } else if message.contains("UNIQUE") {
        ConstraintKind::Unique
    } else {
        ConstraintKind::Other
    }
}

/// Extracts the column from messages shaped like
/// `<CONSTRAINT> constraint failed: table.column`.
fn column_from_message(message: &str) -> Option<String> {
    let (_, target) = message.rsplit_once(": ")?;
    let column = target.rsplit_once('.').map_or(target, |(_, c)| c);
    if column.is_empty() {
        None
    } else {
        Some(column.to_string())
    }
}
