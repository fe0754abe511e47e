//! Merge source batches into one logical set of rows.

use shelterlens_common::{RawShelter, ReferencePoint, SourceBatch, SourceKind};

/// Concatenate batches in the order given.
///
/// Missing addresses get the source's default and missing categories become
/// `Unknown`. A file row carrying the reference point's own name is dropped
/// (the reference is drawn separately). Rows are never de-duplicated by name.
pub fn merge(batches: Vec<SourceBatch>, reference: &ReferencePoint) -> Vec<RawShelter> {
    let capacity = batches.iter().map(|b| b.rows.len()).sum();
    let mut merged = Vec::with_capacity(capacity);

    for batch in batches {
        for mut row in batch.rows {
            if is_self_reference(&row, reference) {
                continue;
            }
            if row.address.as_deref().map_or(true, |a| a.trim().is_empty()) {
                row.address = Some(row.source.default_address().to_string());
            }
            if row.category.as_deref().map_or(true, |c| c.trim().is_empty()) {
                row.category = Some("Unknown".to_string());
            }
            merged.push(row);
        }
    }
    merged
}

fn is_self_reference(row: &RawShelter, reference: &ReferencePoint) -> bool {
    row.source == SourceKind::File && row.name.trim() == reference.name
}
