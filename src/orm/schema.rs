//! # Record Schemas
//!
//! A `ModelSchema` is built once per record type from an explicit list of
//! field descriptors. Building validates the primary key and derives the
//! four cached statement templates.

use super::errors::{OrmError, OrmResult};
use super::field::FieldDescriptor;

/// Quote an identifier with backticks, doubling embedded backticks
pub fn escape_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Comma separated `?` placeholders
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Statement templates derived from a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTemplates {
    /// `select `pk`, `f1`, ... from `table``
    pub select: String,
    /// `insert into `table` (`f1`, ..., `pk`) values (?, ...)`
    pub insert: String,
    /// `update `table` set `f1`=?, ... where `pk`=?`
    pub update: String,
    /// `delete from `table` where `pk`=?`
    pub delete: String,
}

/// Immutable mapping between a record type and its table
#[derive(Debug, Clone)]
pub struct ModelSchema {
    model: &'static str,
    table: &'static str,
    primary_key: &'static str,
    fields: Vec<&'static str>,
    mappings: Vec<(&'static str, FieldDescriptor)>,
    templates: SqlTemplates,
}

impl ModelSchema {
    /// Start declaring the schema of `model`; the table defaults to the model name
    pub fn builder(model: &'static str) -> ModelSchemaBuilder {
        ModelSchemaBuilder {
            model,
            table: None,
            mappings: Vec::new(),
        }
    }

    pub fn model(&self) -> &'static str {
        self.model
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Attribute name of the primary key
    pub fn primary_key(&self) -> &'static str {
        self.primary_key
    }

    /// Non primary key attributes, in declaration order
    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    pub fn templates(&self) -> &SqlTemplates {
        &self.templates
    }

    pub fn field(&self, attribute: &str) -> Option<&FieldDescriptor> {
        self.mappings
            .iter()
            .find(|(name, _)| *name == attribute)
            .map(|(_, field)| field)
    }

    /// All mapped attributes with their descriptors
    pub fn mappings(&self) -> impl Iterator<Item = (&'static str, &FieldDescriptor)> {
        self.mappings.iter().map(|(name, field)| (*name, field))
    }

    /// Column an attribute is stored in
    pub fn column(&self, attribute: &str) -> Option<&'static str> {
        self.mappings
            .iter()
            .find(|(name, _)| *name == attribute)
            .map(|(name, field)| field.column_name().unwrap_or(name))
    }

    /// Attribute stored in `column`
    pub fn attribute_for_column(&self, column: &str) -> Option<&'static str> {
        self.mappings
            .iter()
            .find(|(name, field)| field.column_name().unwrap_or(name) == column)
            .map(|(name, _)| *name)
    }

    /// `create table if not exists` statement for this schema
    pub fn create_table_sql(&self) -> String {
        let columns: Vec<String> = self
            .mappings
            .iter()
            .map(|(name, field)| {
                let column = escape_ident(field.column_name().unwrap_or(name));
                let ddl = field.column_type().ddl();
                if field.is_primary_key() {
                    format!("{} {} not null primary key", column, ddl)
                } else {
                    format!("{} {}", column, ddl)
                }
            })
            .collect();
        format!(
            "create table if not exists {} ({})",
            escape_ident(self.table),
            columns.join(", ")
        )
    }
}

/// Collects field declarations for a `ModelSchema`
#[derive(Debug)]
pub struct ModelSchemaBuilder {
    model: &'static str,
    table: Option<&'static str>,
    mappings: Vec<(&'static str, FieldDescriptor)>,
}

impl ModelSchemaBuilder {
    pub fn table(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }

    pub fn field(mut self, attribute: &'static str, descriptor: FieldDescriptor) -> Self {
        self.mappings.push((attribute, descriptor));
        self
    }

    /// Validate the declaration and derive the statement templates
    pub fn build(self) -> OrmResult<ModelSchema> {
        let model = self.model;
        let table = self.table.unwrap_or(model);

        let mut primary_key = None;
        let mut fields = Vec::new();
        for (index, (name, field)) in self.mappings.iter().enumerate() {
            if self.mappings[..index].iter().any(|(seen, _)| seen == name) {
                return Err(OrmError::DuplicateField {
                    model: model.to_string(),
                    field: name.to_string(),
                });
            }
            if field.is_primary_key() {
                if primary_key.is_some() {
                    return Err(OrmError::DuplicatePrimaryKey {
                        model: model.to_string(),
                        field: name.to_string(),
                    });
                }
                if !field.column_type().can_be_primary_key() {
                    return Err(OrmError::InvalidPrimaryKey {
                        model: model.to_string(),
                        field: name.to_string(),
                    });
                }
                primary_key = Some(*name);
            } else {
                fields.push(*name);
            }
        }
        let primary_key =
            primary_key.ok_or_else(|| OrmError::MissingPrimaryKey(model.to_string()))?;

        let column_of = |attribute: &'static str| {
            self.mappings
                .iter()
                .find(|(name, _)| *name == attribute)
                .and_then(|(_, field)| field.column_name())
                .unwrap_or(attribute)
        };
        let pk_column = escape_ident(column_of(primary_key));
        let escaped_fields: Vec<String> = fields
            .iter()
            .map(|f| escape_ident(column_of(f)))
            .collect();
        let escaped_table = escape_ident(table);

        let select = if escaped_fields.is_empty() {
            format!("select {} from {}", pk_column, escaped_table)
        } else {
            format!(
                "select {}, {} from {}",
                pk_column,
                escaped_fields.join(", "),
                escaped_table
            )
        };
        let insert_columns: Vec<&str> = escaped_fields
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(pk_column.as_str()))
            .collect();
        let insert = format!(
            "insert into {} ({}) values ({})",
            escaped_table,
            insert_columns.join(", "),
            placeholders(escaped_fields.len() + 1)
        );
        let mut assignments: Vec<String> = escaped_fields.iter().map(|f| format!("{}=?", f)).collect();
        if assignments.is_empty() {
            // pk-only tables still need a valid statement that matches the row
            assignments.push(format!("{0}={0}", pk_column));
        }
        let update = format!(
            "update {} set {} where {}=?",
            escaped_table,
            assignments.join(", "),
            pk_column
        );
        let delete = format!("delete from {} where {}=?", escaped_table, pk_column);

        tracing::info!(model, table, primary_key, "found model");

        Ok(ModelSchema {
            model,
            table,
            primary_key,
            fields,
            mappings: self.mappings,
            templates: SqlTemplates {
                select,
                insert,
                update,
                delete,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_schema() -> ModelSchema {
        ModelSchema::builder("User")
            .table("users")
            .field("id", FieldDescriptor::string().ddl("varchar(50)").primary_key())
            .field("email", FieldDescriptor::string())
            .field("order", FieldDescriptor::integer())
            .field("created_at", FieldDescriptor::float())
            .build()
            .unwrap()
    }

    /// Count backtick-quoted identifiers in a statement
    fn quoted_idents(sql: &str) -> usize {
        sql.matches('`').count() / 2
    }

    #[test]
    fn test_templates() {
        let schema = user_schema();
        let t = schema.templates();
        assert_eq!(
            t.select,
            "select `id`, `email`, `order`, `created_at` from `users`"
        );
        assert_eq!(
            t.insert,
            "insert into `users` (`email`, `order`, `created_at`, `id`) values (?, ?, ?, ?)"
        );
        assert_eq!(
            t.update,
            "update `users` set `email`=?, `order`=?, `created_at`=? where `id`=?"
        );
        assert_eq!(t.delete, "delete from `users` where `id`=?");
    }

    #[test]
    fn test_templates_reference_every_column_once() {
        let schema = user_schema();
        let columns = schema.fields().len() + 1;
        let t = schema.templates();
        // every statement also names the table
        assert_eq!(quoted_idents(&t.select), columns + 1);
        assert_eq!(quoted_idents(&t.insert), columns + 1);
        assert_eq!(quoted_idents(&t.update), columns + 1);
        assert_eq!(t.insert.matches('?').count(), columns);
        assert_eq!(t.update.matches('?').count(), columns);
    }

    #[test]
    fn test_table_defaults_to_model_name() {
        let schema = ModelSchema::builder("Tag")
            .field("id", FieldDescriptor::integer().primary_key())
            .build()
            .unwrap();
        assert_eq!(schema.table(), "Tag");
        assert_eq!(schema.templates().select, "select `id` from `Tag`");
    }

    #[test]
    fn test_key_only_update_template() {
        let schema = ModelSchema::builder("Tag")
            .field("id", FieldDescriptor::integer().primary_key())
            .build()
            .unwrap();
        assert_eq!(schema.templates().update, "update `Tag` set `id`=`id` where `id`=?");
        assert_eq!(schema.templates().update.matches('?').count(), 1);
    }

    #[test]
    fn test_missing_primary_key() {
        let err = ModelSchema::builder("Broken")
            .field("name", FieldDescriptor::string())
            .build()
            .unwrap_err();
        assert!(matches!(err, OrmError::MissingPrimaryKey(ref m) if m == "Broken"));
    }

    #[test]
    fn test_duplicate_primary_key() {
        let err = ModelSchema::builder("Broken")
            .field("a", FieldDescriptor::string().primary_key())
            .field("b", FieldDescriptor::string().primary_key())
            .build()
            .unwrap_err();
        assert!(matches!(err, OrmError::DuplicatePrimaryKey { ref field, .. } if field == "b"));
    }

    #[test]
    fn test_boolean_primary_key_rejected() {
        let err = ModelSchema::builder("Broken")
            .field("flag", FieldDescriptor::boolean().primary_key())
            .build()
            .unwrap_err();
        assert!(matches!(err, OrmError::InvalidPrimaryKey { .. }));
    }

    #[test]
    fn test_duplicate_field() {
        let err = ModelSchema::builder("Broken")
            .field("id", FieldDescriptor::string().primary_key())
            .field("name", FieldDescriptor::string())
            .field("name", FieldDescriptor::text())
            .build()
            .unwrap_err();
        assert!(matches!(err, OrmError::DuplicateField { .. }));
    }

    #[test]
    fn test_custom_column_names() {
        let schema = ModelSchema::builder("Post")
            .field("id", FieldDescriptor::integer().primary_key())
            .field("title", FieldDescriptor::string().column("post_title"))
            .build()
            .unwrap();
        assert_eq!(schema.column("title"), Some("post_title"));
        assert_eq!(schema.attribute_for_column("post_title"), Some("title"));
        assert_eq!(
            schema.templates().update,
            "update `Post` set `post_title`=? where `id`=?"
        );
    }

    #[test]
    fn test_escape_ident() {
        assert_eq!(escape_ident("select"), "`select`");
        assert_eq!(escape_ident("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_create_table_sql() {
        let schema = user_schema();
        assert_eq!(
            schema.create_table_sql(),
            "create table if not exists `users` (`id` varchar(50) not null primary key, \
             `email` varchar(100), `order` bigint, `created_at` real)"
        );
    }
}
