//! Validated references to catalogs, schemas and tables.

use std::fmt;

use serde::Serialize;

/// Error raised when caller input does not name a valid catalog object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("{0} name must not be empty")]
    Empty(&'static str),

    #[error("`{0}` is not a fully qualified table name (expected catalog.schema.table)")]
    NotFullyQualified(String),
}

fn non_empty(kind: &'static str, value: &str) -> Result<String, ReferenceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ReferenceError::Empty(kind));
    }
    Ok(trimmed.to_string())
}

/// A catalog identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CatalogRef {
    catalog: String,
}

impl CatalogRef {
    pub fn new(catalog: &str) -> Result<Self, ReferenceError> {
        Ok(Self {
            catalog: non_empty("catalog", catalog)?,
        })
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }
}

impl fmt::Display for CatalogRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.catalog)
    }
}

/// A schema identifier, always qualified by its catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SchemaRef {
    catalog: String,
    schema: String,
}

impl SchemaRef {
    pub fn new(catalog: &str, schema: &str) -> Result<Self, ReferenceError> {
        Ok(Self {
            catalog: non_empty("catalog", catalog)?,
            schema: non_empty("schema", schema)?,
        })
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.catalog, self.schema)
    }
}

/// A three-level table name (`catalog.schema.table`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableName {
    catalog: String,
    schema: String,
    table: String,
}

impl TableName {
    /// Parse a fully qualified name. Surrounding whitespace is ignored; each of
    /// the three parts must be non-empty.
    pub fn parse(full_name: &str) -> Result<Self, ReferenceError> {
        let trimmed = full_name.trim();
        let parts: Vec<&str> = trimmed.split('.').map(str::trim).collect();

        match parts.as_slice() {
            [catalog, schema, table]
                if !catalog.is_empty() && !schema.is_empty() && !table.is_empty() =>
            {
                Ok(Self {
                    catalog: catalog.to_string(),
                    schema: schema.to_string(),
                    table: table.to_string(),
                })
            }
            _ => Err(ReferenceError::NotFullyQualified(trimmed.to_string())),
        }
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.catalog, self.schema, self.table)
    }
}
