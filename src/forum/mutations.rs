use rusqlite::params;

use crate::db::models::NewPost;
use crate::db::StoreError;
use crate::state::DbPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    fn counter_sql(self) -> &'static str {
        match self {
            Reaction::Like => "UPDATE posts SET like_count = like_count + 1 WHERE id = ?1",
            Reaction::Dislike => "UPDATE posts SET dislike_count = dislike_count + 1 WHERE id = ?1",
        }
    }
}

/// Insert a post and its optional category association in one transaction.
/// Returns the new post id.
pub fn create_post(pool: &DbPool, post: NewPost) -> Result<i64, StoreError> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO posts (title, content) VALUES (?1, ?2)",
        params![post.title, post.content],
    )?;
    let post_id = tx.last_insert_rowid();

    if let Some(category_id) = post.category_id {
        tx.execute(
            "INSERT INTO post_category_associations (post_id, category_id) VALUES (?1, ?2)",
            params![post_id, category_id],
        )?;
    }

    tx.commit()?;
    Ok(post_id)
}

/// Attach a comment to `post_id`. Unknown posts are rejected by the foreign key.
pub fn add_comment(pool: &DbPool, post_id: i64, content: &str) -> Result<i64, StoreError> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO comments (post_id, content) VALUES (?1, ?2)",
        params![post_id, content],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Bump the like or dislike counter of a post with a single UPDATE.
pub fn record_reaction(pool: &DbPool, post_id: i64, reaction: Reaction) -> Result<(), StoreError> {
    let conn = pool.get()?;
    let updated = conn.execute(reaction.counter_sql(), params![post_id])?;
    if updated == 0 {
        return Err(StoreError::PostNotFound(post_id));
    }
    Ok(())
}

pub fn increment_like(pool: &DbPool, post_id: i64) -> Result<(), StoreError> {
    record_reaction(pool, post_id, Reaction::Like)
}

pub fn increment_dislike(pool: &DbPool, post_id: i64) -> Result<(), StoreError> {
    record_reaction(pool, post_id, Reaction::Dislike)
}
