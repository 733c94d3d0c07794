//! The import controller: build rows, cross-validate, persist.

use std::fmt;

use tracing::{debug, info, info_span, warn};

use crate::collection::RowCollection;
use crate::error::Result;
use crate::input::TabularSource;
use crate::persist::Store;
use crate::row::{Row, RowSchema};
use crate::row_type::RowType;

/// Configuration for an import.
#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    /// Stop reading at the first individually invalid row.
    pub halt_on_invalid_row: bool,
    /// Maximum data rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Overrides the row type's starting row.
    pub starting_row: Option<usize>,
}

impl ImportConfig {
    pub fn with_halt_on_invalid_row(mut self, halt: bool) -> Self {
        self.halt_on_invalid_row = halt;
        self
    }

    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_starting_row(mut self, starting_row: Option<usize>) -> Self {
        self.starting_row = starting_row;
        self
    }
}

/// Stage of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Building,
    CrossValidating,
    Persisting,
    Done { valid: bool },
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Building => write!(f, "building"),
            Phase::CrossValidating => write!(f, "cross-validating"),
            Phase::Persisting => write!(f, "persisting"),
            Phase::Done { valid: true } => write!(f, "done (valid)"),
            Phase::Done { valid: false } => write!(f, "done (invalid)"),
        }
    }
}

/// Runs row types over tabular sources.
///
/// Validation and persistence failures never surface as errors: they are
/// recorded on the returned [`RowCollection`]. Only configuration mistakes
/// and storage backend failures are returned as `Err`.
///
/// ```
/// use sheetload::{
///     Entity, FieldRule, HeaderSpec, Importer, MemoryStore, RowType, Sheet, TableSpec,
/// };
///
/// struct UserSheet;
///
/// impl RowType for UserSheet {
///     fn header_spec(&self) -> Option<HeaderSpec> {
///         Some(HeaderSpec::ordered(["username", "email"]))
///     }
///     fn rules(&self) -> Vec<FieldRule> {
///         vec![FieldRule::required("email")]
///     }
///     fn entities(&self) -> Vec<Entity> {
///         vec![Entity::new("users")]
///     }
/// }
///
/// let sheet = Sheet::with_header(["username", "email"], [["alice", "a@x.com"]]);
/// let mut store = MemoryStore::new().with_table(TableSpec::new("users"));
///
/// let mut rows = Importer::new().import(&UserSheet, &sheet, &mut store).unwrap();
/// assert!(rows.is_valid());
/// assert_eq!(store.count("users"), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Importer {
    config: ImportConfig,
}

impl Importer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ImportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Build, cross-validate and persist a batch.
    pub fn import<R: RowType + ?Sized>(
        &self,
        row_type: &R,
        source: &dyn TabularSource,
        store: &mut dyn Store,
    ) -> Result<RowCollection> {
        self.run(row_type, source, Some(store))
    }

    /// Build and cross-validate a batch without persisting it.
    pub fn validate<R: RowType + ?Sized>(
        &self,
        row_type: &R,
        source: &dyn TabularSource,
    ) -> Result<RowCollection> {
        self.run(row_type, source, None)
    }

    fn run<R: RowType + ?Sized>(
        &self,
        row_type: &R,
        source: &dyn TabularSource,
        mut store: Option<&mut dyn Store>,
    ) -> Result<RowCollection> {
        let span = info_span!("import", row_type = row_type.name());
        let _enter = span.enter();

        let schema = RowSchema::for_row_type(row_type)?;
        let mut rows = RowCollection::new();
        let mut phase = Phase::Building;

        loop {
            debug!(%phase, "entering phase");
            phase = match phase {
                Phase::Building => {
                    self.build(&schema, row_type, source, &mut rows);
                    Phase::CrossValidating
                }
                Phase::CrossValidating => {
                    if rows.is_valid() {
                        row_type.cross_row_check(&mut rows);
                    }
                    match (rows.is_valid(), store.is_some()) {
                        (true, true) => Phase::Persisting,
                        (valid, _) => Phase::Done { valid },
                    }
                }
                Phase::Persisting => {
                    if let Some(store) = store.as_deref_mut() {
                        row_type.persist(&mut rows, store)?;
                    }
                    Phase::Done {
                        valid: rows.is_valid(),
                    }
                }
                Phase::Done { valid } => {
                    if valid {
                        info!(rows = rows.len(), records = rows.records_written(), "import finished");
                    } else {
                        warn!(
                            row = ?rows.invalid_row().and_then(Row::row_number),
                            errors = ?rows.full_messages(),
                            "import rejected"
                        );
                    }
                    return Ok(rows);
                }
            };
        }
    }

    /// Decode every data row of the source into the collection.
    fn build<R: RowType + ?Sized>(
        &self,
        schema: &std::sync::Arc<RowSchema>,
        row_type: &R,
        source: &dyn TabularSource,
        rows: &mut RowCollection,
    ) {
        let first = self
            .config
            .starting_row
            .unwrap_or_else(|| row_type.starting_row())
            .max(1);
        let last = source.last_row();

        for number in first..=last {
            if self.config.max_rows.is_some_and(|max| rows.len() >= max) {
                debug!(max_rows = rows.len(), "row limit reached");
                break;
            }
            let cells = source.row(number).unwrap_or_default();
            let index = rows.append(Row::from_cells(schema, number, &cells));

            if self.config.halt_on_invalid_row && rows.invalid_index() == Some(index) {
                debug!(row = number, "stopping at first invalid row");
                break;
            }
        }

        debug!(rows = rows.len(), first, last, "built rows");
    }
}

/// Import with the default configuration.
pub fn import<R: RowType + ?Sized>(
    row_type: &R,
    source: &dyn TabularSource,
    store: &mut dyn Store,
) -> Result<RowCollection> {
    Importer::new().import(row_type, source, store)
}
