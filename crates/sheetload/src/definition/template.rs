use indexmap::IndexMap;
use serde_json::Value;

use crate::error::Result;

use super::{EntitySpec, SheetDefinition};

/// Render a skeleton definition for a new sheet.
///
/// Every column gets an empty rule list and a single entity named after the
/// sheet copies every field, ready to be edited.
///
/// ```
/// use sheetload::definition::{template, DeclarativeRowType, SheetDefinition};
///
/// let json = template("users", &["username", "email"]).unwrap();
/// let def = SheetDefinition::from_json(&json).unwrap();
/// assert!(DeclarativeRowType::new(def).is_ok());
/// ```
pub fn template<S: AsRef<str>>(name: &str, columns: &[S]) -> Result<String> {
    let fields: Vec<Value> = columns
        .iter()
        .map(|c| Value::String(c.as_ref().to_string()))
        .collect();

    let definition = SheetDefinition {
        name: name.to_string(),
        columns: Value::Array(fields),
        starting_row: 2,
        rules: columns
            .iter()
            .map(|c| (c.as_ref().to_string(), Vec::new()))
            .collect::<IndexMap<_, _>>(),
        unique: Vec::new(),
        entities: vec![EntitySpec {
            name: name.to_string(),
            fields: IndexMap::new(),
            lookup: None,
        }],
    };

    Ok(serde_json::to_string_pretty(&definition)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_lists_columns() {
        let json = template("students", &["name", "code"]).unwrap();
        let def = SheetDefinition::from_json(&json).unwrap();
        assert_eq!(def.name, "students");
        assert_eq!(def.columns, serde_json::json!(["name", "code"]));
        assert_eq!(def.rules.keys().collect::<Vec<_>>(), vec!["name", "code"]);
        assert_eq!(def.entities[0].name, "students");
    }
}
