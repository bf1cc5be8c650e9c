//! # Blog API Handlers
//!
//! JSON endpoints for blogs, comments and users, plus sign-in and sign-out.
//! Every handler is registered in `routes()` with the parameters it binds.

use std::sync::OnceLock;

use axum::http::header::{LOCATION, REFERER, SET_COOKIE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use regex::Regex;
use serde_json::json;
use tracing::info;

use super::models::{next_id, Blog, Comment, User};
use crate::api::{page_index, ApiError, Page};
use crate::auth::cookie::{clear_cookie_header, set_cookie_header, user_to_cookie};
use crate::auth::crypto::{hash_password, password_material, sha256_hex, verify_password};
use crate::auth::{require_admin, require_user};
use crate::http_server::AppState;
use crate::orm::{Database, FindOptions, Record, Value};
use crate::web::{CallArgs, HandlerDescriptor, HandlerError, HandlerResult, Reply, RouteTable, WebResult};

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9\.\-_]+@[a-z0-9\-_]+(\.[a-z0-9\-_]+){1,4}$").expect("valid email pattern")
    })
}

/// Client-side SHA1 of the password, 40 lowercase hex chars
fn passwd_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9a-f]{40}$").expect("valid password pattern"))
}

/// Every handler of the blog API
pub fn routes() -> WebResult<RouteTable<AppState>> {
    let mut table = RouteTable::new();
    table
        .add(
            HandlerDescriptor::builder("api_blogs").get("/api/blogs").optional("page").build()?,
            api_blogs,
        )
        .add(
            HandlerDescriptor::builder("api_get_blog").get("/api/blogs/:id").param("id").build()?,
            api_get_blog,
        )
        .add(
            HandlerDescriptor::builder("api_create_blog")
                .post("/api/blogs")
                .request()
                .required("name")
                .required("summary")
                .required("content")
                .build()?,
            api_create_blog,
        )
        .add(
            HandlerDescriptor::builder("api_update_blog")
                .post("/api/blogs/:id")
                .param("id")
                .request()
                .required("name")
                .required("summary")
                .required("content")
                .build()?,
            api_update_blog,
        )
        .add(
            HandlerDescriptor::builder("api_delete_blog")
                .post("/api/blogs/:id/delete")
                .param("id")
                .request()
                .build()?,
            api_delete_blog,
        )
        .add(
            HandlerDescriptor::builder("api_comments").get("/api/comments").optional("page").build()?,
            api_comments,
        )
        .add(
            HandlerDescriptor::builder("api_create_comment")
                .post("/api/blogs/:id/comments")
                .param("id")
                .request()
                .required("content")
                .build()?,
            api_create_comment,
        )
        .add(
            HandlerDescriptor::builder("api_delete_comment")
                .post("/api/comments/:id/delete")
                .param("id")
                .request()
                .build()?,
            api_delete_comment,
        )
        .add(
            HandlerDescriptor::builder("api_get_users").get("/api/users").optional("page").build()?,
            api_get_users,
        )
        .add(
            HandlerDescriptor::builder("api_register_user")
                .post("/api/users")
                .required("email")
                .required("name")
                .required("passwd")
                .build()?,
            api_register_user,
        )
        .add(
            HandlerDescriptor::builder("authenticate")
                .post("/api/authenticate")
                .required("email")
                .required("passwd")
                .build()?,
            authenticate,
        )
        .add(
            HandlerDescriptor::builder("signout").get("/signout").request().build()?,
            signout,
        );
    Ok(table)
}

/// Trimmed argument, or a `value:invalid` error naming it
fn non_blank(args: &CallArgs, name: &str) -> Result<String, ApiError> {
    let value = args.trimmed(name);
    if value.is_empty() {
        return Err(ApiError::value(name, format!("{} cannot be empty.", name)));
    }
    Ok(value)
}

async fn count<R: Record>(db: &Database) -> Result<u64, HandlerError> {
    let num = db.find_number::<R>("count(id)", None, Vec::new()).await?;
    Ok(num.and_then(|v| v.as_i64()).unwrap_or(0).max(0) as u64)
}

/// One page of `R`, newest first
async fn page_of<R: Record>(db: &Database, args: &CallArgs) -> Result<(Page, Vec<R>), HandlerError> {
    let total = count::<R>(db).await?;
    let page = Page::with_default_size(total, page_index(args.text("page").as_deref()));
    if total == 0 {
        return Ok((page, Vec::new()));
    }
    let items = db
        .find_all(
            FindOptions::new()
                .order_by("created_at desc")
                .limit(page.limit_clause()),
        )
        .await?;
    Ok((page, items))
}

async fn find_or_not_found<R: Record>(db: &Database, id: &str, resource: &str) -> Result<R, HandlerError> {
    db.find::<R>(id)
        .await?
        .ok_or_else(|| ApiError::not_found(resource, format!("{} not found.", resource)).into())
}

async fn find_user_by_email(db: &Database, email: &str) -> Result<Option<User>, HandlerError> {
    let mut users: Vec<User> = db
        .find_all(FindOptions::new().filter("`email`=?", vec![Value::from(email)]))
        .await?;
    Ok(users.pop())
}

/// JSON reply for `user` that also sets the session cookie
fn signed_in(state: &AppState, user: &User) -> HandlerResult {
    let cookie = user_to_cookie(user, &state.session);
    let header = set_cookie_header(&state.session, &cookie, state.session.max_age_secs);
    let body = Reply::json(&user.masked())?;
    Ok(Reply::Response(([(SET_COOKIE, header)], body).into_response()))
}

async fn api_blogs(state: AppState, args: CallArgs) -> HandlerResult {
    let (page, blogs) = page_of::<Blog>(&state.db, &args).await?;
    Ok(Reply::Json(json!({ "page": page, "blogs": blogs })))
}

async fn api_get_blog(state: AppState, args: CallArgs) -> HandlerResult {
    let blog: Blog = find_or_not_found(&state.db, &args.trimmed("id"), "Blog").await?;
    Reply::json(&blog)
}

async fn api_create_blog(state: AppState, args: CallArgs) -> HandlerResult {
    let user = require_admin(args.request())?;
    let mut blog = Blog {
        user_id: user.id.clone(),
        user_name: user.name.clone(),
        user_image: user.image.clone(),
        name: Some(non_blank(&args, "name")?),
        summary: Some(non_blank(&args, "summary")?),
        content: Some(non_blank(&args, "content")?),
        ..Default::default()
    };
    state.db.save(&mut blog).await?;
    Reply::json(&blog)
}

async fn api_update_blog(state: AppState, args: CallArgs) -> HandlerResult {
    require_admin(args.request())?;
    let mut blog: Blog = find_or_not_found(&state.db, &args.trimmed("id"), "Blog").await?;
    blog.name = Some(non_blank(&args, "name")?);
    blog.summary = Some(non_blank(&args, "summary")?);
    blog.content = Some(non_blank(&args, "content")?);
    state.db.update(&blog).await?;
    Reply::json(&blog)
}

async fn api_delete_blog(state: AppState, args: CallArgs) -> HandlerResult {
    require_admin(args.request())?;
    let blog: Blog = find_or_not_found(&state.db, &args.trimmed("id"), "Blog").await?;
    state.db.remove(&blog).await?;
    Ok(Reply::Json(json!({ "id": blog.id })))
}

async fn api_comments(state: AppState, args: CallArgs) -> HandlerResult {
    let (page, comments) = page_of::<Comment>(&state.db, &args).await?;
    Ok(Reply::Json(json!({ "page": page, "comments": comments })))
}

async fn api_create_comment(state: AppState, args: CallArgs) -> HandlerResult {
    let user = require_user(args.request())?;
    let content = non_blank(&args, "content")?;
    let blog: Blog = find_or_not_found(&state.db, &args.trimmed("id"), "Blog").await?;
    let mut comment = Comment {
        blog_id: blog.id,
        user_id: user.id.clone(),
        user_name: user.name.clone(),
        user_image: user.image.clone(),
        content: Some(content),
        ..Default::default()
    };
    state.db.save(&mut comment).await?;
    Reply::json(&comment)
}

async fn api_delete_comment(state: AppState, args: CallArgs) -> HandlerResult {
    require_admin(args.request())?;
    let comment: Comment = find_or_not_found(&state.db, &args.trimmed("id"), "Comment").await?;
    state.db.remove(&comment).await?;
    Ok(Reply::Json(json!({ "id": comment.id })))
}

async fn api_get_users(state: AppState, args: CallArgs) -> HandlerResult {
    let (page, users) = page_of::<User>(&state.db, &args).await?;
    let users: Vec<User> = users.iter().map(User::masked).collect();
    Ok(Reply::Json(json!({ "page": page, "users": users })))
}

async fn api_register_user(state: AppState, args: CallArgs) -> HandlerResult {
    let name = non_blank(&args, "name")?;
    let email = args.trimmed("email");
    if !email_regex().is_match(&email) {
        return Err(ApiError::value("email", "Invalid email.").into());
    }
    let passwd = args.text("passwd").unwrap_or_default();
    if !passwd_regex().is_match(&passwd) {
        return Err(ApiError::value("passwd", "Invalid password.").into());
    }
    if find_user_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::new("register:failed", "email", "Email is already exist.").into());
    }

    let id = next_id();
    let stored = hash_password(&password_material(&id, &passwd))
        .map_err(|e| HandlerError::Internal(e.to_string()))?;
    let mut user = User {
        image: Some(format!(
            "http://www.gravatar.com/avatar/{}?d=mm&s=120",
            sha256_hex(&email)
        )),
        id: Some(id),
        name: Some(name),
        email: Some(email),
        passwd: Some(stored),
        ..Default::default()
    };
    state.db.save(&mut user).await?;
    info!(email = user.email.as_deref().unwrap_or_default(), "user registered");
    signed_in(&state, &user)
}

async fn authenticate(state: AppState, args: CallArgs) -> HandlerResult {
    let email = args.trimmed("email");
    if email.is_empty() {
        return Err(ApiError::value("email", "Invalid email.").into());
    }
    let passwd = args.text("passwd").unwrap_or_default();
    if passwd.is_empty() {
        return Err(ApiError::value("passwd", "Invalid password.").into());
    }
    let user = find_user_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::value("email", "Email not exist."))?;

    let id = user.id.as_deref().unwrap_or_default();
    let stored = user.passwd.as_deref().unwrap_or_default();
    if !verify_password(&password_material(id, &passwd), stored) {
        return Err(ApiError::value("passwd", "Invalid password.").into());
    }
    signed_in(&state, &user)
}

async fn signout(state: AppState, args: CallArgs) -> HandlerResult {
    let referer = args
        .request()
        .and_then(|r| r.header(REFERER.as_str()))
        .filter(|r| !r.is_empty())
        .unwrap_or("/")
        .to_string();
    info!("user signed out");
    let response = (
        StatusCode::FOUND,
        [
            (LOCATION, referer),
            (SET_COOKIE, clear_cookie_header(&state.session)),
        ],
    )
        .into_response();
    Ok(Reply::Response(response))
}
