use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, trace};

use crate::collection::RowCollection;
use crate::columns::{ColumnMap, HeaderSpec};
use crate::error::{Result, SheetloadError};
use crate::persist::{Store, WriteError, WrittenRecords};
use crate::row::{FieldRule, Row};
use crate::row_type::{Entity, Payload, RowType, row_payload};

use super::{EntitySpec, NamedRule, RuleSpec, SheetDefinition, SourceSpec};

/// A [`RowType`] built from a [`SheetDefinition`].
///
/// Everything that can be checked without data is checked on construction:
/// the column shape, rule patterns, that rules and sources name declared
/// fields, that every entity reference points to an earlier entity, and
/// that a lookup field is one of its entity's declared fields.
#[derive(Debug, Clone)]
pub struct DeclarativeRowType {
    definition: SheetDefinition,
    header: HeaderSpec,
    rules: Vec<FieldRule>,
}

impl DeclarativeRowType {
    pub fn new(definition: SheetDefinition) -> Result<Self> {
        let name = definition.name.as_str();
        if definition.starting_row == 0 {
            return Err(SheetloadError::config(format!(
                "{}: starting_row is 1-based",
                name
            )));
        }

        let header = HeaderSpec::from_value(&definition.columns)?;
        let columns = ColumnMap::new(&header)?;
        let declared = |field: &str, context: &str| -> Result<()> {
            if columns.contains(field) {
                Ok(())
            } else {
                Err(SheetloadError::config(format!(
                    "{}: {} names undeclared field '{}'",
                    name, context, field
                )))
            }
        };

        let mut rules = Vec::new();
        for (field, specs) in &definition.rules {
            declared(field, "rule")?;
            for spec in specs {
                rules.push(compile_rule(field, spec)?);
            }
        }

        for field in &definition.unique {
            declared(field, "unique")?;
        }

        let mut earlier: HashSet<&str> = HashSet::new();
        for entity in &definition.entities {
            for source in entity.fields.values() {
                match source {
                    SourceSpec::Field(field) => {
                        declared(field, &format!("entity '{}'", entity.name))?
                    }
                    SourceSpec::Ref { entity: target } if !earlier.contains(target.as_str()) => {
                        return Err(SheetloadError::config(format!(
                            "{}: entity '{}' references '{}', which is not written before it",
                            name, entity.name, target
                        )));
                    }
                    _ => {}
                }
            }
            match &entity.lookup {
                Some(lookup) if !entity.fields.contains_key(lookup) => {
                    return Err(SheetloadError::config(format!(
                        "{}: entity '{}' looks up by '{}', which is not one of its fields",
                        name, entity.name, lookup
                    )));
                }
                _ => {}
            }
            earlier.insert(&entity.name);
        }

        debug!(
            row_type = name,
            fields = columns.len(),
            rules = rules.len(),
            entities = definition.entities.len(),
            "loaded sheet definition"
        );

        Ok(Self {
            header,
            rules,
            definition,
        })
    }

    pub fn definition(&self) -> &SheetDefinition {
        &self.definition
    }

    fn entity_spec(&self, name: &str) -> Option<&EntitySpec> {
        self.definition.entities.iter().find(|e| e.name == name)
    }
}

fn compile_rule(field: &str, spec: &RuleSpec) -> Result<FieldRule> {
    Ok(match spec {
        RuleSpec::Named(NamedRule::Required) => FieldRule::required(field),
        RuleSpec::Named(NamedRule::Email) => FieldRule::email(field),
        RuleSpec::Named(NamedRule::Integer) => FieldRule::integer(field),
        RuleSpec::Pattern { pattern } => FieldRule::pattern(field, pattern)?,
        RuleSpec::Length { length } => FieldRule::length(field, length.min, length.max),
        RuleSpec::OneOf { one_of } => FieldRule::one_of(field, one_of.iter().cloned()),
    })
}

impl RowType for DeclarativeRowType {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn starting_row(&self) -> usize {
        self.definition.starting_row
    }

    fn header_spec(&self) -> Option<HeaderSpec> {
        Some(self.header.clone())
    }

    fn rules(&self) -> Vec<FieldRule> {
        self.rules.clone()
    }

    fn entities(&self) -> Vec<Entity> {
        self.definition
            .entities
            .iter()
            .map(|e| Entity::new(e.name.clone()))
            .collect()
    }

    fn derive_payload(&self, row: &Row, entity: &Entity, written: &WrittenRecords) -> Payload {
        let Some(spec) = self.entity_spec(entity.name()) else {
            return row_payload(row);
        };
        if spec.fields.is_empty() {
            return row_payload(row);
        }

        spec.fields
            .iter()
            .map(|(target, source)| {
                let value = match source {
                    SourceSpec::Field(field) => row
                        .get(field)
                        .map(|v| Value::String(v.to_string()))
                        .unwrap_or(Value::Null),
                    SourceSpec::Ref { entity } => {
                        written.get(entity).map(Value::from).unwrap_or(Value::Null)
                    }
                    SourceSpec::Literal { literal } => literal.clone(),
                };
                (target.clone(), value)
            })
            .collect()
    }

    fn cross_row_check(&self, rows: &mut RowCollection) {
        for field in &self.definition.unique {
            if rows.check_unique(field).is_some() {
                break;
            }
        }
    }

    /// Entities with a lookup field reuse the existing record holding the
    /// same value, and are only written when none exists.
    fn persist_row(
        &self,
        row: &Row,
        store: &mut dyn Store,
    ) -> std::result::Result<WrittenRecords, WriteError> {
        let mut written = WrittenRecords::new();
        for (entity, spec) in self.entities().into_iter().zip(&self.definition.entities) {
            let payload = self.derive_payload(row, &entity, &written);

            let existing = match spec
                .lookup
                .as_deref()
                .and_then(|field| payload.get(field).map(|value| (field, value)))
            {
                Some((_, Value::Null)) | None => None,
                Some((field, value)) => store.find(&entity, field, value)?,
            };

            let id = match existing {
                Some(id) => {
                    trace!(row = ?row.row_number(), entity = entity.name(), id, "reused record");
                    id
                }
                None => {
                    let id = store.write(&entity, &payload)?;
                    trace!(row = ?row.row_number(), entity = entity.name(), id, "wrote record");
                    id
                }
            };
            written.insert(entity.name(), id);
        }
        Ok(written)
    }
}
