//! Demonstration sequence exercising the accessor against a suppliers/users
//! database: table and index DDL, literal and bound inserts, filtered selects,
//! a multi-statement script, an inner join, a foreign-key `ON DELETE SET NULL`
//! cascade, and a view.
//!
//! Every statement is guarded (`IF NOT EXISTS`, `WHERE NOT EXISTS`) so the
//! sequence can run repeatedly against the same file.

use crate::core::db::{Cursor, DatabaseAccessor};
use crate::core::Result;
use tracing::info;

pub const CREATE_ENTRIES: &str = "CREATE TABLE IF NOT EXISTS entries(content TEXT, date TEXT);";

pub const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users(
    id INTEGER PRIMARY KEY,
    first_name TEXT,
    surname TEXT,
    age INTEGER
);";

pub const CREATE_AGE_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_age ON users(age);";
pub const DROP_AGE_INDEX: &str = "DROP INDEX IF EXISTS idx_age;";

// Fixed rows written as literals; only constants are ever inlined.
pub const INSERT_ROLF: &str = "INSERT INTO users (first_name, surname, age)
    SELECT 'Rolf', 'Smith', 35
    WHERE NOT EXISTS (SELECT 1 FROM users WHERE first_name = 'Rolf' AND surname = 'Smith');";
pub const INSERT_JOHN: &str = "INSERT INTO users
    SELECT NULL, 'John', 'Snow', 19
    WHERE NOT EXISTS (SELECT 1 FROM users WHERE first_name = 'John' AND surname = 'Snow');";

pub const INSERT_USER: &str = "INSERT INTO users
    SELECT NULL, ?1, ?2, ?3
    WHERE NOT EXISTS (SELECT 1 FROM users WHERE first_name = ?1 AND surname = ?2);";

pub const SELECT_OLDER_NOT_JOHN: &str =
    "SELECT * FROM users WHERE first_name != 'John' AND age > 19 ORDER BY id;";
pub const SELECT_BY_FIRST_NAME: &str = "SELECT * FROM users WHERE first_name = ?1 ORDER BY id;";

pub const SUPPLIERS_SCRIPT: &str = "
CREATE TABLE IF NOT EXISTS supplier_groups (
    group_id INTEGER PRIMARY KEY,
    group_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS suppliers (
    supplier_id   INTEGER PRIMARY KEY,
    supplier_name TEXT    NOT NULL,
    group_id      INTEGER,
    FOREIGN KEY (group_id)
    REFERENCES supplier_groups (group_id)
        ON UPDATE SET NULL
        ON DELETE SET NULL
);

INSERT INTO supplier_groups (group_name)
SELECT name FROM (SELECT 'Domestic' AS name UNION ALL SELECT 'Global' UNION ALL SELECT 'One-Time')
WHERE NOT EXISTS (SELECT 1 FROM supplier_groups);

INSERT INTO suppliers (supplier_name, group_id)
SELECT name, grp FROM (SELECT 'HP' AS name, 2 AS grp UNION ALL SELECT 'XYZ Corp', 2 UNION ALL SELECT 'ABC Corp', 3)
WHERE NOT EXISTS (SELECT 1 FROM suppliers);
";

pub const SELECT_SUPPLIER_JOIN: &str = "
SELECT supplier_name, supplier_groups.group_name
FROM suppliers
INNER JOIN supplier_groups
ON suppliers.group_id = supplier_groups.group_id
ORDER BY suppliers.supplier_id;";

pub const DELETE_ONE_TIME_GROUP: &str = "DELETE FROM supplier_groups WHERE group_id = ?1;";

pub const CREATE_SUPPLIER_VIEW: &str = "
CREATE VIEW IF NOT EXISTS suplquery
AS
SELECT supplier_name, supplier_groups.group_name
FROM suppliers
INNER JOIN supplier_groups
ON suppliers.group_id = supplier_groups.group_id;";

pub const SELECT_SUPPLIER_VIEW: &str = "SELECT * FROM suplquery;";

/// Group removed by the cascade step; its suppliers keep a NULL group.
pub const ONE_TIME_GROUP_ID: i64 = 3;

/// Result sets produced by the demonstration, in the order they were read.
#[derive(Debug, Clone, Default)]
pub struct DemoReport {
    /// Users older than 19 whose first name is not John
    pub older_users: Cursor,
    /// Users named John, looked up with a bound parameter
    pub johns: Cursor,
    /// Supplier/group join before the cascade delete
    pub supplier_groups: Cursor,
    /// Suppliers whose group was cleared by `ON DELETE SET NULL`
    pub orphaned_suppliers: Cursor,
    /// Rows read through the `suplquery` view after the delete
    pub view_rows: Cursor,
}

impl DemoReport {
    /// Labeled result sets for printing
    pub fn sections(&self) -> [(&'static str, &Cursor); 5] {
        [
            ("users older than 19, not John", &self.older_users),
            ("users named John", &self.johns),
            ("suppliers joined with groups", &self.supplier_groups),
            ("suppliers without a group", &self.orphaned_suppliers),
            ("suplquery view", &self.view_rows),
        ]
    }
}

/// Runs the demonstration against `db`, one session per phase.
pub fn run(db: &mut DatabaseAccessor) -> Result<DemoReport> {
    let mut report = DemoReport::default();

    info!("demo: schema, users and suppliers");
    db.with_open(|db| {
        db.execute(CREATE_ENTRIES, [])?;
        db.execute(CREATE_USERS, [])?;
        db.execute(CREATE_AGE_INDEX, [])?;
        db.execute(INSERT_ROLF, [])?;
        db.execute(INSERT_JOHN, [])?;
        db.execute(INSERT_USER, ("Bla", "Blo", 55))?;

        report.older_users = db.execute(SELECT_OLDER_NOT_JOHN, [])?;
        report.johns = db.execute(SELECT_BY_FIRST_NAME, ["John"])?;

        db.execute(DROP_AGE_INDEX, [])?;
        db.execute(CREATE_AGE_INDEX, [])?;
        db.execute_script(SUPPLIERS_SCRIPT)?;
        Ok(())
    })?;

    info!("demo: join");
    report.supplier_groups = db.with_open(|db| db.execute(SELECT_SUPPLIER_JOIN, []))?;

    info!("demo: foreign key cascade");
    report.orphaned_suppliers = db.with_open(|db| {
        db.execute(DELETE_ONE_TIME_GROUP, [ONE_TIME_GROUP_ID])?;
        db.execute(
            "SELECT supplier_id, supplier_name, group_id FROM suppliers WHERE group_id IS NULL ORDER BY supplier_id;",
            [],
        )
    })?;

    info!("demo: view");
    report.view_rows = db.with_open(|db| {
        db.execute(CREATE_SUPPLIER_VIEW, [])?;
        db.execute(SELECT_SUPPLIER_VIEW, [])
    })?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::AccessorFixture;
    use rusqlite::types::Value;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_demo_result_sets() {
        let mut fixture = AccessorFixture::new();
        let report = run(&mut fixture.accessor).unwrap();

        assert_eq!(
            report.older_users.rows,
            vec![
                vec![Value::Integer(1), text("Rolf"), text("Smith"), Value::Integer(35)],
                vec![Value::Integer(3), text("Bla"), text("Blo"), Value::Integer(55)],
            ]
        );
        assert_eq!(
            report.johns.rows,
            vec![vec![Value::Integer(2), text("John"), text("Snow"), Value::Integer(19)]]
        );
        assert_eq!(
            report.supplier_groups.rows,
            vec![
                vec![text("HP"), text("Global")],
                vec![text("XYZ Corp"), text("Global")],
                vec![text("ABC Corp"), text("One-Time")],
            ]
        );
        assert_eq!(
            report.orphaned_suppliers.rows,
            vec![vec![Value::Integer(3), text("ABC Corp"), Value::Null]]
        );
        assert_eq!(report.view_rows.row_count(), 2);
        assert!(!fixture.accessor.is_open());
    }

    #[test]
    fn test_demo_is_rerunnable() {
        let mut fixture = AccessorFixture::new();
        run(&mut fixture.accessor).unwrap();
        let second = run(&mut fixture.accessor).unwrap();

        assert_eq!(second.older_users.row_count(), 2);
        assert_eq!(second.johns.row_count(), 1);
        assert_eq!(second.supplier_groups.row_count(), 2);
        assert_eq!(second.orphaned_suppliers.row_count(), 1);
    }

    #[test]
    fn test_demo_leaves_expected_schema() {
        let mut fixture = AccessorFixture::new();
        run(&mut fixture.accessor).unwrap();

        let schema = fixture.accessor.with_open(|db| db.schema()).unwrap();
        for table in ["entries", "users", "suppliers", "supplier_groups"] {
            assert!(schema.tables.contains_key(table), "missing table {}", table);
        }
        assert!(schema.find_index("idx_age").is_some());
        assert!(schema.views.contains_key("suplquery"));
    }
}
