//! The feed assembler: the per-viewer newest-first projection of the
//! viewer's own tweets and those of every user the viewer follows.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::db::DbPool;
use crate::entities::tweet;
use crate::error::Result;
use crate::services::graph;

/// Computes the viewer's feed page. The author set is read from the live
/// follow-edge state on every call; nothing is cached between requests.
/// Pagination slices the ordered sequence without reordering it.
pub async fn feed(db: &DbPool, viewer_id: i64, page: u64, limit: u64) -> Result<Vec<tweet::Model>> {
    let mut author_ids = graph::following_ids(db, viewer_id).await?;
    author_ids.push(viewer_id);

    let offset = (page.max(1) - 1) * limit;
    Ok(tweet::Entity::find()
        .filter(tweet::Column::UserId.is_in(author_ids))
        .order_by_desc(tweet::Column::CreatedAt)
        .order_by_desc(tweet::Column::UpdatedAt)
        .limit(limit)
        .offset(offset)
        .all(db)
        .await?)
}
