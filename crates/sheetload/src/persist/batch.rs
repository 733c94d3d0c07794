//! Default persistence: every row of a batch in one transaction.

use tracing::{info, trace, warn};

use crate::collection::RowCollection;
use crate::error::{Result, SheetloadError};
use crate::row::Row;
use crate::row_type::RowType;

use super::store::{Store, WriteError, WrittenRecords};

/// Derive and write each destination entity of a row in declared order.
///
/// Ids are threaded forward so later payloads can reference records written
/// earlier for the same row.
pub fn write_entities<R: RowType + ?Sized>(
    row_type: &R,
    row: &Row,
    store: &mut dyn Store,
) -> std::result::Result<WrittenRecords, WriteError> {
    let mut written = WrittenRecords::new();
    for entity in row_type.entities() {
        let payload = row_type.derive_payload(row, &entity, &written);
        let id = store.write(&entity, &payload)?;
        trace!(
            row = ?row.row_number(),
            entity = entity.name(),
            id,
            "wrote record"
        );
        written.insert(entity.name(), id);
    }
    Ok(written)
}

/// Persist every row inside a single transaction.
///
/// The first rejected write rolls back everything written for the batch,
/// attaches the rejection to its row and flags that row; the batch then
/// reports invalid and nothing is returned as an error. Backend failures,
/// a failed commit included, also roll back and are returned.
pub fn persist_batch<R: RowType + ?Sized>(
    row_type: &R,
    rows: &mut RowCollection,
    store: &mut dyn Store,
) -> Result<()> {
    store.begin().map_err(storage_error)?;

    let mut records = 0;
    let mut failure = None;
    for (index, row) in rows.iter().enumerate() {
        match row_type.persist_row(row, store) {
            Ok(written) => records += written.len(),
            Err(error) => {
                failure = Some((index, error));
                break;
            }
        }
    }

    match failure {
        None => {
            if let Err(error) = store.commit() {
                if let Err(rollback) = store.rollback() {
                    warn!(%rollback, "rollback after failed commit also failed");
                }
                return Err(storage_error(error));
            }
            rows.set_records_written(records);
            info!(
                row_type = row_type.name(),
                rows = rows.len(),
                records,
                "committed batch"
            );
            Ok(())
        }
        Some((index, WriteError::Rejected(error))) => {
            store.rollback().map_err(storage_error)?;
            warn!(
                row_type = row_type.name(),
                row = ?rows.get(index).and_then(Row::row_number),
                %error,
                "record rejected, batch rolled back"
            );
            rows.reject(index, error);
            Ok(())
        }
        Some((_, WriteError::Backend(message))) => {
            if let Err(rollback) = store.rollback() {
                warn!(%rollback, "rollback after backend failure also failed");
            }
            Err(SheetloadError::Storage(message))
        }
    }
}

fn storage_error(error: WriteError) -> SheetloadError {
    SheetloadError::Storage(error.to_string())
}
