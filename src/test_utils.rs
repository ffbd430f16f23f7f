/// # Test Utilities Module
///
/// Fixtures and assertion helpers shared by the unit and integration tests:
/// - Temp-file accessor fixture with automatic cleanup
/// - Seeded supplier/group schema with `ON DELETE SET NULL`
/// - AccessError assertion helpers and macros

use crate::core::db::DatabaseAccessor;
use crate::core::Result;
use std::path::PathBuf;
use tempfile::TempDir;

/// Supplier schema used across tests; group 3 has exactly one supplier.
pub const SUPPLIER_SCHEMA: &str = "
    CREATE TABLE supplier_groups (
        group_id INTEGER PRIMARY KEY,
        group_name TEXT NOT NULL
    );
    CREATE TABLE suppliers (
        supplier_id INTEGER PRIMARY KEY,
        supplier_name TEXT NOT NULL,
        group_id INTEGER,
        FOREIGN KEY (group_id) REFERENCES supplier_groups (group_id)
            ON UPDATE SET NULL
            ON DELETE SET NULL
    );
    INSERT INTO supplier_groups (group_name) VALUES ('Domestic'), ('Global'), ('One-Time');
    INSERT INTO suppliers (supplier_name, group_id) VALUES ('HP', 2);
    INSERT INTO suppliers (supplier_name, group_id) VALUES ('XYZ Corp', 2);
    INSERT INTO suppliers (supplier_name, group_id) VALUES ('ABC Corp', 3);
";

/// Accessor on a database file inside a private temp directory.
///
/// The directory (and the database in it) is removed when the fixture drops.
pub struct AccessorFixture {
    pub dir: TempDir,
    pub accessor: DatabaseAccessor,
}

impl AccessorFixture {
    /// A closed accessor on a database file that does not exist yet
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let accessor = DatabaseAccessor::new(dir.path().join("fixture.db"));
        AccessorFixture { dir, accessor }
    }

    /// An open accessor seeded with the supplier schema
    pub fn with_suppliers() -> Result<Self> {
        let mut fixture = Self::new();
        fixture.accessor.open()?;
        fixture.accessor.execute_script(SUPPLIER_SCHEMA)?;
        Ok(fixture)
    }

    pub fn db_path(&self) -> PathBuf {
        self.accessor.path().to_path_buf()
    }
}

/// Error testing utilities specific to AccessError patterns
pub mod error_testing {
    /// Asserts the error message mentions `expected_message_fragment`, ignoring case.
    pub fn assert_error_message<T, E>(
        result: &std::result::Result<T, E>,
        expected_message_fragment: &str,
        context: &str,
    ) where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => panic!("Expected AccessError but got Ok in {}", context),
            Err(e) => {
                let error_str = e.to_string();
                assert!(
                    error_str
                        .to_lowercase()
                        .contains(&expected_message_fragment.to_lowercase()),
                    "Expected '{}' in error message '{}' context: {}",
                    expected_message_fragment,
                    error_str,
                    context
                );
            }
        }
    }
}

#[macro_export]
macro_rules! assert_access_error {
    ($result:expr, $expected_type:ident, $context:expr) => {
        match $result {
            Err($crate::core::AccessError::$expected_type(_)) => {}
            Ok(_) => panic!("Expected {} error but got Ok in {}", stringify!($expected_type), $context),
            Err(other) => panic!("Expected {} but got {:?} in {}", stringify!($expected_type), other, $context),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AccessError;

    #[test]
    fn test_fixture_starts_without_database_file() {
        let fixture = AccessorFixture::new();
        assert!(!fixture.db_path().exists());
        assert!(!fixture.accessor.is_open());
    }

    #[test]
    fn test_supplier_fixture() {
        let fixture = AccessorFixture::with_suppliers().unwrap();
        let cursor = fixture
            .accessor
            .execute("SELECT COUNT(*) FROM suppliers", [])
            .unwrap();
        assert_eq!(cursor.rows[0][0], rusqlite::types::Value::Integer(3));
    }

    #[test]
    fn test_error_assertion_macro() {
        let result: Result<i32> = Err(AccessError::NotOpen("fixture.db".to_string()));
        assert_access_error!(result, NotOpen, "macro test");
    }

    #[test]
    fn test_error_message_helper() {
        let result: Result<i32> = Err(AccessError::Config("bad level".to_string()));
        error_testing::assert_error_message(&result, "configuration", "helper test");
    }
}
