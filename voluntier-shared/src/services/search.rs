/// Free-text search over posts

use sqlx::SqlitePool;
use tracing::debug;

use super::error::ServiceResult;
use crate::models::pagination::{Page, PageRequest};
use crate::models::post::{Post, PostListing};

/// Case-insensitive substring search over title, content, skills and tags
///
/// A missing or empty query matches every post, in the same order as the
/// home listing.
pub async fn search(
    pool: &SqlitePool,
    query: Option<&str>,
    page: PageRequest,
) -> ServiceResult<Page<PostListing>> {
    let query = query.unwrap_or_default();
    debug!(query = %query, page = page.page, "Searching posts");

    Ok(Post::search(pool, query, page).await?)
}
