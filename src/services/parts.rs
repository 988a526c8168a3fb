use sea_orm::{
    sea_query::{Expr, Func},
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::db::or_fallback;
use crate::entities::part_master;
use crate::errors::ServiceError;
use crate::models::PartType;

const PART_LIST_LIMIT: u64 = 200;

/// Query string of the parts search.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PartSearch {
    /// Case-insensitive substring of the SKU or name.
    pub q: Option<String>,
    /// Part type, e.g. `FASTENER`.
    #[serde(rename = "type")]
    pub part_type: Option<String>,
}

impl PartSearch {
    fn term(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    /// Known part types only; anything else is ignored rather than matching nothing.
    fn part_type(&self) -> Option<PartType> {
        self.part_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .and_then(|t| t.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PartView {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub part_type: String,
    pub make_or_buy: Option<String>,
    pub serialized: bool,
    pub uom: Option<String>,
    pub item_type: String,
    pub criticality: Option<String>,
}

impl From<part_master::Model> for PartView {
    fn from(part: part_master::Model) -> Self {
        Self {
            id: part.id,
            sku: part.sku,
            name: part.name,
            part_type: part.part_type,
            make_or_buy: part.make_buy,
            serialized: part.is_serialized,
            uom: part.uom,
            item_type: part.item_type,
            criticality: part.criticality,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PartsView {
    pub parts: Vec<PartView>,
    /// Values accepted by the `type` filter.
    pub part_types: Vec<String>,
}

#[derive(Clone)]
pub struct PartService {
    db_pool: Arc<DatabaseConnection>,
}

impl PartService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn search(&self, search: &PartSearch) -> PartsView {
        let parts = or_fallback(self.load(search).await, Vec::new(), "search_parts");
        PartsView {
            parts,
            part_types: PartType::iter().map(|t| t.as_str().to_string()).collect(),
        }
    }

    async fn load(&self, search: &PartSearch) -> Result<Vec<PartView>, ServiceError> {
        let mut query = part_master::Entity::find();

        if let Some(term) = search.term() {
            let pattern = format!("%{}%", term);
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(part_master::Column::Sku)))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(part_master::Column::Name)))
                            .like(pattern),
                    ),
            );
        }
        if let Some(part_type) = search.part_type() {
            query = query.filter(part_master::Column::PartType.eq(part_type.as_str()));
        }

        Ok(query
            .order_by_asc(part_master::Column::Sku)
            .limit(PART_LIST_LIMIT)
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(PartView::from)
            .collect())
    }
}
