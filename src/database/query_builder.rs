use std::collections::BTreeMap;

use serde_json::Value;
use surrealdb::engine::any::Any;
use surrealdb::method::Query;

use crate::database::client::Db;

/// Accumulates SurrealQL statements and their bindings so several repositories can
/// contribute to one transaction.
#[derive(Debug, Default)]
pub struct SurrealQueryBuilder {
    pub sql: String,
    pub variables: BTreeMap<String, Value>,
}

impl SurrealQueryBuilder {
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            sql: initial_sql.into(),
            variables: BTreeMap::new(),
        }
    }

    pub fn query(mut self, sql: impl Into<String>) -> Self {
        self.sql.push('\n');
        self.sql.push_str(&sql.into());
        self
    }

    pub fn bind_var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn begin_transaction() -> Self {
        Self::new("BEGIN TRANSACTION;").query("LET $now = time::now();")
    }

    pub fn commit_transaction(self) -> Self {
        self.query("COMMIT TRANSACTION;")
    }

    pub fn into_db_query<'a>(self, db: &'a Db) -> Query<'a, Any> {
        db.query(self.sql).bind(self.variables)
    }
}
