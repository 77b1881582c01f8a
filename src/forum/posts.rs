use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::db::models::{Category, Comment, PostView};
use crate::db::StoreError;
use crate::state::DbPool;

const LIST_POSTS_SQL: &str = "
    SELECT p.id, p.title, p.content, p.like_count, p.dislike_count,
           c.name, cm.id, cm.content
    FROM posts p
    LEFT JOIN post_category_associations pca ON pca.post_id = p.id
    LEFT JOIN categories c ON c.id = pca.category_id
    LEFT JOIN comments cm ON cm.post_id = p.id
    ORDER BY p.id DESC, cm.id ASC
";

/// One row of the posts/comments join. Comment columns are null for a post
/// without comments.
#[derive(Debug, Clone)]
pub struct JoinedRow {
    pub post_id: i64,
    pub title: String,
    pub content: String,
    pub like_count: i64,
    pub dislike_count: i64,
    pub category: Option<String>,
    pub comment_id: Option<i64>,
    pub comment_content: Option<String>,
}

/// All posts, newest first, each with its comments in insertion order.
pub fn list_posts(pool: &DbPool) -> Result<Vec<PostView>, StoreError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(LIST_POSTS_SQL)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(JoinedRow {
                post_id: row.get(0)?,
                title: row.get(1)?,
                content: row.get(2)?,
                like_count: row.get(3)?,
                dislike_count: row.get(4)?,
                category: row.get(5)?,
                comment_id: row.get(6)?,
                comment_content: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(group_rows(rows))
}

/// Fold flat join rows into one [`PostView`] per post id.
///
/// Posts keep the order in which their id is first seen. Rows for a post
/// already seen are merged into it even when they are not adjacent, and a
/// comment id is attached at most once.
pub fn group_rows<I>(rows: I) -> Vec<PostView>
where
    I: IntoIterator<Item = JoinedRow>,
{
    let mut posts: Vec<PostView> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut seen_comments: HashSet<i64> = HashSet::new();

    for row in rows {
        let slot = *index.entry(row.post_id).or_insert_with(|| {
            posts.push(PostView {
                id: row.post_id,
                title: row.title.clone(),
                content: row.content.clone(),
                like_count: row.like_count,
                dislike_count: row.dislike_count,
                category: row.category.clone(),
                comments: Vec::new(),
            });
            posts.len() - 1
        });

        if let (Some(id), Some(content)) = (row.comment_id, row.comment_content) {
            if seen_comments.insert(id) {
                posts[slot].comments.push(Comment {
                    id,
                    post_id: row.post_id,
                    content,
                });
            }
        }
    }

    posts
}

pub fn list_categories(pool: &DbPool) -> Result<Vec<Category>, StoreError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;
    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}

/// Query string of the listing pages, e.g. `?filter=liked&threshold=3`.
///
/// `threshold` stays a string: the filter form submits `threshold=` when the
/// box is cleared, and that must not reject the page.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub filter: Option<String>,
    pub threshold: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostFilter {
    #[default]
    All,
    /// More than n likes.
    Liked(i64),
    /// More than n dislikes.
    Disliked(i64),
}

impl PostFilter {
    pub fn from_query(query: &FilterQuery) -> Self {
        // Blank or unparsable counts as 0.
        let threshold = query
            .threshold
            .as_deref()
            .and_then(|t| t.trim().parse().ok())
            .unwrap_or(0);
        match query.filter.as_deref() {
            Some("liked") => PostFilter::Liked(threshold),
            Some("disliked") => PostFilter::Disliked(threshold),
            _ => PostFilter::All,
        }
    }

    pub fn matches(&self, post: &PostView) -> bool {
        match *self {
            PostFilter::All => true,
            PostFilter::Liked(n) => post.like_count > n,
            PostFilter::Disliked(n) => post.dislike_count > n,
        }
    }

    pub fn apply(&self, posts: Vec<PostView>) -> Vec<PostView> {
        posts.into_iter().filter(|p| self.matches(p)).collect()
    }

    /// Name used in the filter form.
    pub fn name(&self) -> &'static str {
        match self {
            PostFilter::All => "all",
            PostFilter::Liked(_) => "liked",
            PostFilter::Disliked(_) => "disliked",
        }
    }

    pub fn threshold(&self) -> i64 {
        match *self {
            PostFilter::All => 0,
            PostFilter::Liked(n) | PostFilter::Disliked(n) => n,
        }
    }
}
