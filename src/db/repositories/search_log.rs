use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

use crate::entities::{prelude::*, search_bar};

pub use crate::entities::search_bar::Model as SearchLogEntry;

/// Row to append to the search-bar log.
#[derive(Debug, Clone)]
pub struct NewSearchLog<'a> {
    pub user_id: Option<&'a str>,
    pub request: &'a str,
    pub response: &'a str,
    pub ticker: Option<&'a str>,
    pub intent: &'a str,
}

pub struct SearchLogRepository {
    conn: DatabaseConnection,
}

impl SearchLogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, entry: NewSearchLog<'_>) -> Result<i32> {
        let active_model = search_bar::ActiveModel {
            user_id: Set(entry.user_id.map(ToString::to_string)),
            request: Set(entry.request.to_string()),
            response: Set(entry.response.to_string()),
            ticker: Set(entry.ticker.map(ToString::to_string)),
            intent: Set(entry.intent.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let res = SearchBar::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert search log")?;

        Ok(res.last_insert_id)
    }

    /// Most recent entries for one user, newest first.
    pub async fn recent_for_user(&self, user_id: &str, limit: u64) -> Result<Vec<SearchLogEntry>> {
        SearchBar::find()
            .filter(search_bar::Column::UserId.eq(user_id))
            .order_by_desc(search_bar::Column::CreatedAt)
            .order_by_desc(search_bar::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query search history")
    }
}
