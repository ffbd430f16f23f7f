/// Schema Introspection Module
///
/// Reads tables, columns, indexes, foreign keys and views from an open
/// database through SQLite's pragma table-valued functions.

use crate::core::Result;
use rusqlite::{Connection, Row};
use std::collections::BTreeMap;

/// Represents a foreign key relationship
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    /// The table this foreign key references
    pub referenced_table: String,
    /// The column in this table that is the foreign key
    pub from_column: String,
    /// The referenced column in the foreign table (None when it targets the primary key implicitly)
    pub to_column: Option<String>,
    /// Action applied when the referenced row's key is updated (e.g. "SET NULL")
    pub on_update: String,
    /// Action applied when the referenced row is deleted
    pub on_delete: String,
}

/// Represents a database column with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Declared type name (e.g., "INTEGER", "TEXT"); empty when undeclared
    pub type_name: String,
    pub notnull: bool,
    pub pk: bool,
    pub dflt_value: Option<String>,
}

impl Column {
    fn from_pragma_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Column {
            name: row.get("name")?,
            type_name: row.get("type")?,
            notnull: row.get("notnull")?,
            pk: row.get::<_, i64>("pk")? > 0,
            dflt_value: row.get("dflt_value")?,
        })
    }
}

/// Represents a database index
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub name: String,
    pub unique: bool,
    /// Column names that make up this index
    pub columns: Vec<String>,
}

/// Represents a database table with its structure and metadata
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    fn from_database(conn: &Connection, table_name: &str) -> Result<Self> {
        Ok(Table {
            name: table_name.to_string(),
            columns: get_table_columns(conn, table_name)?,
            indexes: get_table_indexes(conn, table_name)?,
            foreign_keys: get_table_foreign_keys(conn, table_name)?,
        })
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }
}

/// Schema of one database: user tables and views, keyed by name
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub tables: BTreeMap<String, Table>,
    /// View name to its `CREATE VIEW` text
    pub views: BTreeMap<String, String>,
}

impl Schema {
    /// Creates a new Schema by introspecting the database
    pub fn from_connection(conn: &Connection) -> Result<Self> {
        let mut tables = BTreeMap::new();
        for name in get_object_names(conn, "table")? {
            let table = Table::from_database(conn, &name)?;
            tables.insert(name, table);
        }

        let mut views = BTreeMap::new();
        let mut stmt = conn.prepare("SELECT name, sql FROM sqlite_master WHERE type = 'view'")?;
        let view_iter = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        for view in view_iter {
            let (name, sql) = view?;
            views.insert(name, sql);
        }

        Ok(Schema { tables, views })
    }

    /// True when the database holds no user tables or views
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.views.is_empty()
    }

    /// Looks up an index by name across all tables
    pub fn find_index(&self, name: &str) -> Option<(&Table, &Index)> {
        self.tables
            .values()
            .find_map(|t| t.index(name).map(|i| (t, i)))
    }
}

fn get_object_names(conn: &Connection, kind: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = ?1 AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
    )?;
    let names = stmt
        .query_map([kind], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

fn get_table_columns(conn: &Connection, table_name: &str) -> Result<Vec<Column>> {
    let mut stmt = conn.prepare("SELECT * FROM pragma_table_info(?1) ORDER BY cid")?;
    let columns = stmt
        .query_map([table_name], |row| Column::from_pragma_row(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

fn get_table_indexes(conn: &Connection, table_name: &str) -> Result<Vec<Index>> {
    let mut stmt = conn.prepare("SELECT name, \"unique\" FROM pragma_index_list(?1)")?;
    let entries = stmt
        .query_map([table_name], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut info = conn.prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?;
    let mut indexes = Vec::with_capacity(entries.len());
    for (name, unique) in entries {
        let columns = info
            .query_map([&name], |row| row.get::<_, Option<String>>(0))?
            .filter_map(|c| c.transpose())
            .collect::<rusqlite::Result<Vec<_>>>()?;
        indexes.push(Index { name, unique, columns });
    }

    Ok(indexes)
}

fn get_table_foreign_keys(conn: &Connection, table_name: &str) -> Result<Vec<ForeignKey>> {
    let mut stmt = conn.prepare(
        "SELECT \"table\", \"from\", \"to\", on_update, on_delete
         FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
    )?;
    let foreign_keys = stmt
        .query_map([table_name], |row| {
            Ok(ForeignKey {
                referenced_table: row.get(0)?,
                from_column: row.get(1)?,
                to_column: row.get(2)?,
                on_update: row.get(3)?,
                on_delete: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(foreign_keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup_test_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            "
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
            CREATE INDEX idx_supplier_name ON suppliers(supplier_name);
            CREATE VIEW supplier_names AS SELECT supplier_name FROM suppliers;
        ",
        )
    }

    #[test]
    fn test_empty_schema() {
        let conn = Connection::open_in_memory().unwrap();
        let schema = Schema::from_connection(&conn).unwrap();
        assert!(schema.is_empty());
    }

    #[test]
    fn test_schema_introspection() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_schema(&conn).unwrap();

        let schema = Schema::from_connection(&conn).unwrap();
        assert_eq!(
            schema.tables.keys().collect::<Vec<_>>(),
            vec!["supplier_groups", "suppliers"]
        );

        let suppliers = &schema.tables["suppliers"];
        assert_eq!(suppliers.columns.len(), 3);
        assert!(suppliers.column("supplier_id").unwrap().pk);
        assert!(suppliers.column("supplier_name").unwrap().notnull);
        assert_eq!(suppliers.column("group_id").unwrap().type_name, "INTEGER");

        let (table, index) = schema.find_index("idx_supplier_name").unwrap();
        assert_eq!(table.name, "suppliers");
        assert!(!index.unique);
        assert_eq!(index.columns, vec!["supplier_name"]);

        assert!(schema.views.contains_key("supplier_names"));
    }

    #[test]
    fn test_foreign_key_actions() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_schema(&conn).unwrap();

        let schema = Schema::from_connection(&conn).unwrap();
        let fks = &schema.tables["suppliers"].foreign_keys;
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].referenced_table, "supplier_groups");
        assert_eq!(fks[0].from_column, "group_id");
        assert_eq!(fks[0].to_column.as_deref(), Some("group_id"));
        assert_eq!(fks[0].on_update, "SET NULL");
        assert_eq!(fks[0].on_delete, "SET NULL");
    }
}
