//! The row-type declaration trait implemented by each kind of sheet.

use indexmap::IndexMap;
use serde_json::Value;

use crate::collection::RowCollection;
use crate::columns::HeaderSpec;
use crate::error::Result;
use crate::persist::{self, Store, WriteError, WrittenRecords};
use crate::row::{FieldRule, Row};

/// Field to value mapping written for one destination entity.
pub type Payload = IndexMap<String, Value>;

/// Descriptor of a destination record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    name: String,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Metadata and behaviour of one kind of sheet.
///
/// Only [`RowType::header_spec`] is mandatory. Every other method has a
/// default that a row type overrides when it needs to: field rules, the
/// ordered destination entities, how a row maps onto each entity, a
/// cross-row rule, and the persistence of one row or of the whole batch.
///
/// ```
/// use sheetload::{Entity, FieldRule, HeaderSpec, RowType};
///
/// struct UserSheet;
///
/// impl RowType for UserSheet {
///     fn header_spec(&self) -> Option<HeaderSpec> {
///         Some(HeaderSpec::ordered(["username", "email", "gender"]))
///     }
///
///     fn rules(&self) -> Vec<FieldRule> {
///         vec![FieldRule::required("username"), FieldRule::required("email")]
///     }
///
///     fn entities(&self) -> Vec<Entity> {
///         vec![Entity::new("users")]
///     }
/// }
/// ```
pub trait RowType {
    /// Name used in logs and error messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// First physical row holding data (1-based). Defaults to 2, skipping
    /// one header row.
    fn starting_row(&self) -> usize {
        2
    }

    /// Column layout. `None` makes every import fail with a configuration
    /// error before any row is read.
    fn header_spec(&self) -> Option<HeaderSpec>;

    fn rules(&self) -> Vec<FieldRule> {
        Vec::new()
    }

    /// Destination entities, in write order.
    fn entities(&self) -> Vec<Entity> {
        Vec::new()
    }

    /// Payload written for `entity`. `written` holds the ids already written
    /// for this row by earlier entities.
    ///
    /// The default copies every present field of the row.
    fn derive_payload(&self, row: &Row, entity: &Entity, written: &WrittenRecords) -> Payload {
        let _ = (entity, written);
        row_payload(row)
    }

    /// Rule over the whole batch, run only while every row is valid. Flag a
    /// row through the collection to stop the batch before persistence.
    fn cross_row_check(&self, rows: &mut RowCollection) {
        let _ = rows;
    }

    /// Write every entity for one row inside the open transaction.
    fn persist_row(
        &self,
        row: &Row,
        store: &mut dyn Store,
    ) -> std::result::Result<WrittenRecords, WriteError> {
        persist::write_entities(self, row, store)
    }

    /// Persist the whole batch. The default writes every row inside one
    /// transaction and rolls everything back on the first rejection.
    fn persist(&self, rows: &mut RowCollection, store: &mut dyn Store) -> Result<()> {
        persist::persist_batch(self, rows, store)
    }
}

/// Every present field of a row as a JSON string value.
pub fn row_payload(row: &Row) -> Payload {
    row.fields()
        .iter()
        .filter_map(|(field, value)| {
            value
                .as_ref()
                .map(|v| (field.clone(), Value::String(v.clone())))
        })
        .collect()
}
