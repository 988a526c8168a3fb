use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use crate::db::or_fallback;
use crate::entities::technicians;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TechnicianView {
    pub id: i64,
    pub display_name: String,
    pub title: Option<String>,
}

impl From<technicians::Model> for TechnicianView {
    fn from(tech: technicians::Model) -> Self {
        Self {
            id: tech.id,
            display_name: tech.display_name,
            title: tech.title,
        }
    }
}

#[derive(Clone)]
pub struct TechnicianService {
    db_pool: Arc<DatabaseConnection>,
}

impl TechnicianService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    /// Active technicians by display name.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Vec<TechnicianView> {
        let result = technicians::Entity::find()
            .filter(technicians::Column::Active.eq(true))
            .order_by_asc(technicians::Column::DisplayName)
            .all(&*self.db_pool)
            .await;
        or_fallback(result, Vec::new(), "list_technicians")
            .into_iter()
            .map(TechnicianView::from)
            .collect()
    }

    /// Whether `id` names an active technician.
    pub async fn exists(&self, id: i64) -> bool {
        let result = technicians::Entity::find_by_id(id)
            .filter(technicians::Column::Active.eq(true))
            .one(&*self.db_pool)
            .await;
        or_fallback(result, None, "technician_exists").is_some()
    }
}
