//! End-to-end import scenarios against the in-memory store.

use serde_json::{Value, json};

use sheetload::{
    Entity, FieldRule, HeaderSpec, ImportConfig, Importer, MemoryStore, Payload, RowCollection,
    RowType, Sheet, SheetReader, Store, TableSpec, WriteError, WrittenRecords, Row,
};

// =============================================================================
// Row types
// =============================================================================

struct Users;

impl RowType for Users {
    fn header_spec(&self) -> Option<HeaderSpec> {
        Some(HeaderSpec::ordered(["username", "email", "gender"]))
    }

    fn rules(&self) -> Vec<FieldRule> {
        vec![
            FieldRule::required("username"),
            FieldRule::required("email"),
            FieldRule::email("email"),
        ]
    }

    fn entities(&self) -> Vec<Entity> {
        vec![Entity::new("users")]
    }

    fn cross_row_check(&self, rows: &mut RowCollection) {
        rows.check_unique("username");
    }
}

/// Each row is a student plus the benefit granted to them.
struct StudentBenefits;

impl RowType for StudentBenefits {
    fn header_spec(&self) -> Option<HeaderSpec> {
        Some(HeaderSpec::indexed([("name", 0), ("code", 1), ("amount", 2)]))
    }

    fn rules(&self) -> Vec<FieldRule> {
        vec![FieldRule::required("name")]
    }

    fn entities(&self) -> Vec<Entity> {
        vec![Entity::new("students"), Entity::new("benefits")]
    }

    fn derive_payload(&self, row: &Row, entity: &Entity, written: &WrittenRecords) -> Payload {
        let mut payload = Payload::new();
        match entity.name() {
            "students" => {
                payload.insert("name".into(), text(row, "name"));
                payload.insert("code".into(), text(row, "code"));
            }
            _ => {
                payload.insert("amount".into(), text(row, "amount"));
                payload.insert(
                    "student_id".into(),
                    written.get("students").map(Value::from).unwrap_or(Value::Null),
                );
            }
        }
        payload
    }
}

/// Enterprises are shared between rows: found first, created when missing.
struct EnterpriseEmployees;

impl RowType for EnterpriseEmployees {
    fn header_spec(&self) -> Option<HeaderSpec> {
        Some(HeaderSpec::ordered(["enterprise", "name", "email"]))
    }

    fn rules(&self) -> Vec<FieldRule> {
        vec![FieldRule::required("enterprise"), FieldRule::required("name")]
    }

    fn entities(&self) -> Vec<Entity> {
        vec![Entity::new("enterprises"), Entity::new("employees")]
    }

    fn derive_payload(&self, row: &Row, entity: &Entity, written: &WrittenRecords) -> Payload {
        let mut payload = Payload::new();
        if entity.name() == "enterprises" {
            payload.insert("name".into(), text(row, "enterprise"));
        } else {
            payload.insert("name".into(), text(row, "name"));
            payload.insert("email".into(), text(row, "email"));
            payload.insert(
                "enterprise_id".into(),
                written.last().map(|(_, id)| Value::from(id)).unwrap_or(Value::Null),
            );
        }
        payload
    }

    fn persist_row(
        &self,
        row: &Row,
        store: &mut dyn Store,
    ) -> Result<WrittenRecords, WriteError> {
        let enterprises = Entity::new("enterprises");
        let employees = Entity::new("employees");
        let mut written = WrittenRecords::new();

        let name = text(row, "enterprise");
        let enterprise_id = match store.find(&enterprises, "name", &name)? {
            Some(id) => id,
            None => store.write(&enterprises, &self.derive_payload(row, &enterprises, &written))?,
        };
        written.insert("enterprises", enterprise_id);

        let employee_id = store.write(&employees, &self.derive_payload(row, &employees, &written))?;
        written.insert("employees", employee_id);
        Ok(written)
    }
}

struct Headerless;

impl RowType for Headerless {
    fn header_spec(&self) -> Option<HeaderSpec> {
        None
    }
}

fn text(row: &Row, field: &str) -> Value {
    row.get(field).map(|v| json!(v)).unwrap_or(Value::Null)
}

fn users_store() -> MemoryStore {
    MemoryStore::new().with_table(TableSpec::new("users").required("email").unique("username"))
}

fn student_store() -> MemoryStore {
    MemoryStore::new()
        .with_table(TableSpec::new("students").required("name").unique("code"))
        .with_table(TableSpec::new("benefits").required("amount").required("student_id"))
}

fn enterprise_store() -> MemoryStore {
    MemoryStore::new()
        .with_table(TableSpec::new("enterprises").required("name").unique("name"))
        .with_table(TableSpec::new("employees").required("name").required("enterprise_id"))
}

// =============================================================================
// Field validation
// =============================================================================

#[test]
fn test_valid_users_are_persisted() {
    let sheet = Sheet::with_header(
        ["username", "email", "gender"],
        [["alice", "alice@x.com", "f"], ["bob", "bob@x.com", "m"]],
    );
    let mut store = users_store();

    let mut rows = Importer::new()
        .import(&Users, &sheet, &mut store)
        .expect("import failed");

    assert!(rows.is_valid());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.records_written(), 2);
    assert_eq!(store.count("users"), 2);
    assert_eq!(store.records("users")[1].values["username"], json!("bob"));
}

#[test]
fn test_blank_email_invalidates_row_two() {
    let sheet = Sheet::with_header(
        ["username", "email", "gender"],
        [["alice", "", "f"], ["bob", "bob@x.com", "m"]],
    );
    let mut store = users_store();

    let mut rows = Importer::new()
        .import(&Users, &sheet, &mut store)
        .expect("import failed");

    assert!(!rows.is_valid());
    assert_eq!(rows.invalid_row().and_then(Row::row_number), Some(2));
    assert_eq!(rows.full_messages(), vec!["email is required"]);
    assert_eq!(store.count("users"), 0);
}

#[test]
fn test_first_invalid_row_is_reported() {
    let sheet = Sheet::with_header(
        ["username", "email", "gender"],
        [["alice", "a@x.com", "f"], ["", "b@x.com", "m"], ["carol", "nope", "f"]],
    );

    let mut rows = Importer::new().validate(&Users, &sheet).unwrap();

    assert!(!rows.is_valid());
    assert_eq!(rows.invalid_index(), Some(1));
    assert_eq!(rows.invalid_row().and_then(Row::row_number), Some(3));
    // Asking again never moves the reported row.
    assert!(!rows.is_valid());
    assert_eq!(rows.invalid_index(), Some(1));
}

#[test]
fn test_blank_line_keeps_physical_row_numbers() {
    let sheet = SheetReader::new()
        .read_bytes(b"username,email\nalice,a@x.com\n\nbob,\n", b',')
        .unwrap();

    let mut rows = Importer::new().validate(&Users, &sheet).unwrap();

    assert_eq!(rows.len(), 3);
    assert!(!rows.is_valid());
    // The blank line is a row of its own.
    assert_eq!(rows.invalid_row().and_then(Row::row_number), Some(3));
    let bob = rows.get(2).unwrap();
    assert_eq!(bob.row_number(), Some(4));
    assert_eq!(bob.get("username"), Some("bob"));
    assert!(bob.check().full_messages().contains(&"email is required".to_string()));
}

// =============================================================================
// Cross-row validation
// =============================================================================

#[test]
fn test_duplicate_username_flags_later_row() {
    let sheet = Sheet::with_header(
        ["username", "email", "gender"],
        [
            ["alice", "a@x.com", "f"],
            ["bob", "b@x.com", "m"],
            ["alice", "a2@x.com", "f"],
        ],
    );
    let mut store = users_store();

    let mut rows = Importer::new().import(&Users, &sheet, &mut store).unwrap();

    assert!(!rows.is_valid());
    assert_eq!(rows.invalid_row().and_then(Row::row_number), Some(4));
    assert_eq!(rows.full_messages(), vec!["username is unique"]);
    assert_eq!(store.count("users"), 0);
}

#[test]
fn test_cross_row_check_skipped_for_invalid_batch() {
    let sheet = Sheet::with_header(
        ["username", "email", "gender"],
        [["alice", "", "f"], ["alice", "a@x.com", "f"]],
    );

    let rows = Importer::new().validate(&Users, &sheet).unwrap();

    assert_eq!(rows.invalid_index(), Some(0));
    assert!(rows.get(1).unwrap().errors().is_empty());
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_fan_out_links_records_of_a_row() {
    let sheet = Sheet::with_header(
        ["name", "code", "amount"],
        [["Ann", "S1", "100"], ["Ben", "S2", "250"]],
    );
    let mut store = student_store();

    let mut rows = Importer::new()
        .import(&StudentBenefits, &sheet, &mut store)
        .unwrap();

    assert!(rows.is_valid());
    assert_eq!(rows.records_written(), 4);
    let benefits = store.records("benefits");
    let students = store.records("students");
    assert_eq!(benefits[1].values["student_id"], json!(students[1].id));
    assert_eq!(benefits[1].values["amount"], json!("250"));
}

#[test]
fn test_rejected_record_rolls_back_whole_batch() {
    let sheet = Sheet::with_header(
        ["name", "code", "amount"],
        [["Ann", "S1", "100"], ["Ben", "S1", "250"], ["Cid", "S3", "75"]],
    );
    let mut store = student_store();

    let mut rows = Importer::new()
        .import(&StudentBenefits, &sheet, &mut store)
        .unwrap();

    assert!(!rows.is_valid());
    assert_eq!(rows.invalid_row().and_then(Row::row_number), Some(3));
    assert_eq!(rows.full_messages(), vec!["code has already been taken"]);
    let rejected = rows.invalid_row().unwrap().record_with_error().unwrap();
    assert_eq!(rejected.entity, "students");

    assert_eq!(store.count("students"), 0);
    assert_eq!(store.count("benefits"), 0);
    assert_eq!(rows.records_written(), 0);
    assert!(!store.in_transaction());
}

#[test]
fn test_rejection_of_later_entity_discards_earlier_entity() {
    let sheet = Sheet::with_header(["name", "code", "amount"], [["Ann", "S1", ""]]);
    let mut store = student_store();

    let mut rows = Importer::new()
        .import(&StudentBenefits, &sheet, &mut store)
        .unwrap();

    assert!(!rows.is_valid());
    assert_eq!(rows.invalid_row().and_then(Row::row_number), Some(2));
    assert_eq!(rows.full_messages(), vec!["amount can't be blank"]);
    assert_eq!(store.count("students"), 0);
}

#[test]
fn test_custom_persist_row_finds_or_creates() {
    let sheet = Sheet::with_header(
        ["enterprise", "name", "email"],
        [
            ["acme", "Ann", "ann@acme.com"],
            ["acme", "Ben", "ben@acme.com"],
            ["globex", "Cid", "cid@globex.com"],
        ],
    );
    let mut store = enterprise_store();

    let mut rows = Importer::new()
        .import(&EnterpriseEmployees, &sheet, &mut store)
        .unwrap();

    assert!(rows.is_valid());
    assert_eq!(store.count("enterprises"), 2);
    assert_eq!(store.count("employees"), 3);
    let employees = store.records("employees");
    assert_eq!(employees[0].values["enterprise_id"], employees[1].values["enterprise_id"]);
    assert_ne!(employees[0].values["enterprise_id"], employees[2].values["enterprise_id"]);
}

#[test]
fn test_backend_failure_is_an_error() {
    let sheet = Sheet::with_header(["name", "code", "amount"], [["Ann", "S1", "100"]]);
    // The benefits table is missing.
    let mut store = MemoryStore::new().with_table(TableSpec::new("students"));

    let err = Importer::new()
        .import(&StudentBenefits, &sheet, &mut store)
        .unwrap_err();

    assert!(matches!(err, sheetload::SheetloadError::Storage(_)));
    assert_eq!(store.count("students"), 0);
    assert!(!store.in_transaction());
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_missing_header_spec_is_configuration_error() {
    let sheet = Sheet::with_header(["a"], [["1"]]);
    let err = Importer::new()
        .import(&Headerless, &sheet, &mut users_store())
        .unwrap_err();
    assert!(err.is_config());
}

#[test]
fn test_halt_on_invalid_row_stops_building() {
    let sheet = Sheet::with_header(
        ["username", "email", "gender"],
        [["alice", "", "f"], ["bob", "b@x.com", "m"], ["carol", "c@x.com", "f"]],
    );
    let importer =
        Importer::with_config(ImportConfig::default().with_halt_on_invalid_row(true));

    let mut rows = importer.validate(&Users, &sheet).unwrap();

    assert_eq!(rows.len(), 1);
    assert!(!rows.is_valid());
}

#[test]
fn test_summary_reports_outcome() {
    let sheet = Sheet::with_header(
        ["username", "email", "gender"],
        [["alice", "a@x.com", "f"], ["bob", "bob-at-x", "m"]],
    );

    let rows = Importer::new().validate(&Users, &sheet).unwrap();
    let summary = rows.summary();

    assert_eq!(summary.total_rows, 2);
    assert!(!summary.valid);
    assert_eq!(summary.invalid_row_number, Some(3));
    assert_eq!(summary.messages, vec!["email is not an email"]);
    assert_eq!(summary.records_written, 0);
}
