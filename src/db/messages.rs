//! Queries over the `contact_messages` table.

use crate::models::message::{contact_form::NewContactMessage, contact_message::ContactMessage};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, email, subject, message, created_at, is_read";

/// Insert a validated submission and return the stored row.
pub async fn insert_message(
    pool: &SqlitePool,
    msg: &NewContactMessage,
    created_at: DateTime<Utc>,
) -> Result<ContactMessage, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO contact_messages (name, email, subject, message, created_at, is_read) VALUES (?, ?, ?, ?, ?, 0)",
    )
    .bind(&msg.name)
    .bind(&msg.email)
    .bind(&msg.subject)
    .bind(&msg.message)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(ContactMessage {
        id: res.last_insert_rowid(),
        name: msg.name.clone(),
        email: msg.email.clone(),
        subject: Some(msg.subject.clone()),
        message: msg.message.clone(),
        created_at,
        is_read: false,
    })
}

pub async fn count_messages(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages")
        .fetch_one(pool)
        .await
}

/// Newest first; equal timestamps fall back to insertion order, newest first.
pub async fn list_messages(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<Vec<ContactMessage>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM contact_messages ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
    );
    sqlx::query_as::<_, ContactMessage>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn get_message(pool: &SqlitePool, id: i64) -> Result<Option<ContactMessage>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM contact_messages WHERE id = ?");
    sqlx::query_as::<_, ContactMessage>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Returns false when no such message exists.
pub async fn set_read(pool: &SqlitePool, id: i64, is_read: bool) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("UPDATE contact_messages SET is_read = ? WHERE id = ?")
        .bind(is_read)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Returns false when no such message exists.
pub async fn delete_message(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM contact_messages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}
