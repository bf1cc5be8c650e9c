//! Data Mapper Tests
//!
//! CRUD on the blog records through the public mapper API.

use awesome_blog::blog::models::all_schemas;
use awesome_blog::blog::{Blog, Comment, User};
use std::sync::OnceLock;

use awesome_blog::orm::{
    decode, unknown_field, Database, FieldDescriptor, FindOptions, Limit, ModelSchema, OrmError,
    OrmResult, Record, Value,
};

async fn setup() -> Database {
    let db = Database::in_memory().await.unwrap();
    db.create_tables(&all_schemas()).await.unwrap();
    db
}

fn blog(name: &str, created_at: f64) -> Blog {
    Blog {
        user_id: Some("u1".to_string()),
        user_name: Some("Tester".to_string()),
        name: Some(name.to_string()),
        summary: Some("summary".to_string()),
        content: Some("content".to_string()),
        created_at: Some(created_at),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_insert_statement_binds_fields_then_key() {
    let schema = User::schema();
    assert_eq!(
        schema.templates().insert,
        "insert into `users` (`email`, `passwd`, `admin`, `name`, `image`, `created_at`, `id`) values (?, ?, ?, ?, ?, ?, ?)"
    );
}

#[tokio::test]
async fn test_find_all_orders_and_windows() {
    let db = setup().await;
    for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
        db.save(&mut blog(name, i as f64 + 1.0)).await.unwrap();
    }

    let newest: Vec<Blog> = db
        .find_all(
            FindOptions::new()
                .order_by("created_at desc")
                .limit(Limit::Window { offset: 1, count: 2 }),
        )
        .await
        .unwrap();
    let names: Vec<_> = newest.iter().filter_map(|b| b.name.as_deref()).collect();
    assert_eq!(names, vec!["c", "b"]);

    let filtered: Vec<Blog> = db
        .find_all(FindOptions::new().filter("`name`=?", vec![Value::from("d")]))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);

    let total = db
        .find_number::<Blog>("count(id)", None, Vec::new())
        .await
        .unwrap();
    assert_eq!(total, Some(Value::Integer(4)));
}

#[tokio::test]
async fn test_update_and_remove() {
    let db = setup().await;
    let mut comment = Comment {
        blog_id: Some("b1".to_string()),
        content: Some("first".to_string()),
        ..Default::default()
    };
    db.save(&mut comment).await.unwrap();
    let id = comment.id.clone().unwrap();

    comment.content = Some("edited".to_string());
    db.update(&comment).await.unwrap();
    let found: Comment = db.find(id.as_str()).await.unwrap().unwrap();
    assert_eq!(found.content.as_deref(), Some("edited"));

    db.remove(&comment).await.unwrap();
    assert!(db.find::<Comment>(id.as_str()).await.unwrap().is_none());

    // Removing twice affects no row
    assert!(matches!(
        db.remove(&comment).await,
        Err(OrmError::Write { affected: 0, .. })
    ));
}

#[tokio::test]
async fn test_lenient_writes_only_warn() {
    let db = setup().await.with_strict_writes(false);
    let ghost = Blog {
        id: Some("missing".to_string()),
        ..Default::default()
    };
    assert!(db.update(&ghost).await.is_ok());
}

/// Record whose only column is its primary key
#[derive(Debug, Default, Clone)]
struct Tag {
    id: Option<i64>,
}

impl Record for Tag {
    fn schema() -> &'static ModelSchema {
        static SCHEMA: OnceLock<ModelSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            ModelSchema::builder("Tag")
                .table("tags")
                .field("id", FieldDescriptor::integer().primary_key())
                .build()
                .unwrap()
        })
    }

    fn get_value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => self.id.map(Value::from),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()> {
        match field {
            "id" => self.id = decode(field, value)?,
            _ => return Err(unknown_field(Self::schema(), field)),
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_key_only_record_update() {
    let db = Database::in_memory().await.unwrap();
    db.create_tables(&[Tag::schema()]).await.unwrap();

    let mut tag = Tag { id: Some(7) };
    db.save(&mut tag).await.unwrap();
    db.update(&tag).await.unwrap();

    let missing = Tag { id: Some(8) };
    assert!(matches!(
        db.update(&missing).await,
        Err(OrmError::Write { affected: 0, .. })
    ));
}
