//! SurrealDB implementation of [`OptionRepository`].

use atrium_core::error::AtriumResult;
use atrium_core::models::option_list::OptionList;
use atrium_core::repository::OptionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OptionListRow {
    category: String,
    items: Vec<String>,
}

#[derive(Clone)]
pub struct SurrealOptionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOptionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OptionRepository for SurrealOptionRepository<C> {
    async fn load_all(&self) -> AtriumResult<Vec<OptionList>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS category, items FROM option_list \
                 ORDER BY category ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OptionListRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| OptionList {
                category: row.category,
                values: row.items,
            })
            .collect())
    }

    async fn save(&self, list: OptionList) -> AtriumResult<()> {
        self.db
            .query(
                "UPSERT type::record('option_list', $category) SET \
                 items = $items, updated_at = time::now()",
            )
            .bind(("category", list.category))
            .bind(("items", list.values))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}
