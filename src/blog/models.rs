//! # Blog Records
//!
//! Users, blogs and comments as mapped records.

use std::sync::OnceLock;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::orm::{decode, unknown_field, FieldDescriptor, ModelSchema, OrmResult, Record, Value};

/// Placeholder shown instead of a stored password hash
pub const MASKED_PASSWORD: &str = "******";

/// Time-ordered unique id: 15-digit millisecond timestamp, uuid4 hex, `000`
pub fn next_id() -> String {
    format!(
        "{:015}{}000",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

/// Current time as float seconds since the epoch
pub fn now_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

fn generate_id() -> Value {
    Value::Text(next_id())
}

fn generate_created_at() -> Value {
    Value::Float(now_seconds())
}

fn id_field() -> FieldDescriptor {
    FieldDescriptor::string()
        .ddl("varchar(50)")
        .primary_key()
        .with_generator(generate_id)
}

fn created_at_field() -> FieldDescriptor {
    FieldDescriptor::float().with_generator(generate_created_at)
}

fn build_schema(builder: crate::orm::ModelSchemaBuilder) -> ModelSchema {
    match builder.build() {
        Ok(schema) => schema,
        Err(err) => panic!("invalid record declaration: {}", err),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Option<String>,
    pub email: Option<String>,
    pub passwd: Option<String>,
    pub admin: Option<bool>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub created_at: Option<f64>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.admin.unwrap_or(false)
    }

    /// Copy safe to hand back to clients
    pub fn masked(&self) -> Self {
        Self {
            passwd: Some(MASKED_PASSWORD.to_string()),
            ..self.clone()
        }
    }
}

impl Record for User {
    fn schema() -> &'static ModelSchema {
        static SCHEMA: OnceLock<ModelSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            build_schema(
                ModelSchema::builder("User")
                    .table("users")
                    .field("id", id_field())
                    .field("email", FieldDescriptor::string().ddl("varchar(50)"))
                    .field("passwd", FieldDescriptor::string().ddl("varchar(100)"))
                    .field("admin", FieldDescriptor::boolean().with_default(false))
                    .field("name", FieldDescriptor::string().ddl("varchar(50)"))
                    .field("image", FieldDescriptor::string().ddl("varchar(500)"))
                    .field("created_at", created_at_field()),
            )
        })
    }

    fn get_value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => self.id.clone().map(Value::from),
            "email" => self.email.clone().map(Value::from),
            "passwd" => self.passwd.clone().map(Value::from),
            "admin" => self.admin.map(Value::from),
            "name" => self.name.clone().map(Value::from),
            "image" => self.image.clone().map(Value::from),
            "created_at" => self.created_at.map(Value::from),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()> {
        match field {
            "id" => self.id = decode(field, value)?,
            "email" => self.email = decode(field, value)?,
            "passwd" => self.passwd = decode(field, value)?,
            "admin" => self.admin = decode(field, value)?,
            "name" => self.name = decode(field, value)?,
            "image" => self.image = decode(field, value)?,
            "created_at" => self.created_at = decode(field, value)?,
            _ => return Err(unknown_field(Self::schema(), field)),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Blog {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_image: Option<String>,
    pub name: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<f64>,
}

impl Record for Blog {
    fn schema() -> &'static ModelSchema {
        static SCHEMA: OnceLock<ModelSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            build_schema(
                ModelSchema::builder("Blog")
                    .table("blogs")
                    .field("id", id_field())
                    .field("user_id", FieldDescriptor::string().ddl("varchar(50)"))
                    .field("user_name", FieldDescriptor::string().ddl("varchar(50)"))
                    .field("user_image", FieldDescriptor::string().ddl("varchar(500)"))
                    .field("name", FieldDescriptor::string().ddl("varchar(50)"))
                    .field("summary", FieldDescriptor::string().ddl("varchar(200)"))
                    .field("content", FieldDescriptor::text())
                    .field("created_at", created_at_field()),
            )
        })
    }

    fn get_value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => self.id.clone().map(Value::from),
            "user_id" => self.user_id.clone().map(Value::from),
            "user_name" => self.user_name.clone().map(Value::from),
            "user_image" => self.user_image.clone().map(Value::from),
            "name" => self.name.clone().map(Value::from),
            "summary" => self.summary.clone().map(Value::from),
            "content" => self.content.clone().map(Value::from),
            "created_at" => self.created_at.map(Value::from),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()> {
        match field {
            "id" => self.id = decode(field, value)?,
            "user_id" => self.user_id = decode(field, value)?,
            "user_name" => self.user_name = decode(field, value)?,
            "user_image" => self.user_image = decode(field, value)?,
            "name" => self.name = decode(field, value)?,
            "summary" => self.summary = decode(field, value)?,
            "content" => self.content = decode(field, value)?,
            "created_at" => self.created_at = decode(field, value)?,
            _ => return Err(unknown_field(Self::schema(), field)),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: Option<String>,
    pub blog_id: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_image: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<f64>,
}

impl Record for Comment {
    fn schema() -> &'static ModelSchema {
        static SCHEMA: OnceLock<ModelSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            build_schema(
                ModelSchema::builder("Comment")
                    .table("comments")
                    .field("id", id_field())
                    .field("blog_id", FieldDescriptor::string().ddl("varchar(50)"))
                    .field("user_id", FieldDescriptor::string().ddl("varchar(50)"))
                    .field("user_name", FieldDescriptor::string().ddl("varchar(50)"))
                    .field("user_image", FieldDescriptor::string().ddl("varchar(500)"))
                    .field("content", FieldDescriptor::text())
                    .field("created_at", created_at_field()),
            )
        })
    }

    fn get_value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => self.id.clone().map(Value::from),
            "blog_id" => self.blog_id.clone().map(Value::from),
            "user_id" => self.user_id.clone().map(Value::from),
            "user_name" => self.user_name.clone().map(Value::from),
            "user_image" => self.user_image.clone().map(Value::from),
            "content" => self.content.clone().map(Value::from),
            "created_at" => self.created_at.map(Value::from),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()> {
        match field {
            "id" => self.id = decode(field, value)?,
            "blog_id" => self.blog_id = decode(field, value)?,
            "user_id" => self.user_id = decode(field, value)?,
            "user_name" => self.user_name = decode(field, value)?,
            "user_image" => self.user_image = decode(field, value)?,
            "content" => self.content = decode(field, value)?,
            "created_at" => self.created_at = decode(field, value)?,
            _ => return Err(unknown_field(Self::schema(), field)),
        }
        Ok(())
    }
}

/// Schemas of every table the application uses
pub fn all_schemas() -> Vec<&'static ModelSchema> {
    vec![User::schema(), Blog::schema(), Comment::schema()]
}
