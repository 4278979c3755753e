//! Identifier generation for new rows.

/// Fresh random (v4) UUID in hyphenated lowercase form.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
