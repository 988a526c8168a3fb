use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use super::loaders;
use crate::db::or_fallback;
use crate::entities::{inspection_records, part_master, wo_consumption, work_orders};
use crate::errors::ServiceError;
use crate::models::{status_tone, Tone};

const WORK_ORDER_LIST_LIMIT: u64 = 100;

/// Work order row; `code` and `title` come from the target part.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WorkOrderSummary {
    pub id: i64,
    pub code: Option<String>,
    pub wo_type: String,
    pub status: String,
    pub tone: Tone,
    pub title: Option<String>,
    pub build_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WorkOrderHeader {
    pub id: i64,
    pub code: Option<String>,
    pub wo_type: String,
    pub status: String,
    pub tone: Tone,
    pub title: Option<String>,
    pub description: Option<String>,
    pub build_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ConsumptionLine {
    pub id: i64,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub qty: Decimal,
    pub unit: Option<String>,
    pub consumed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InspectionView {
    pub id: i64,
    pub result: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<inspection_records::Model> for InspectionView {
    fn from(record: inspection_records::Model) -> Self {
        Self {
            id: record.id,
            result: record.result,
            notes: record.notes,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WorkOrderDetail {
    pub header: WorkOrderHeader,
    pub consumption: Vec<ConsumptionLine>,
    pub inspections: Vec<InspectionView>,
}

#[derive(Clone)]
pub struct WorkOrderService {
    db_pool: Arc<DatabaseConnection>,
}

impl WorkOrderService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    /// Newest work orders first.
    #[instrument(skip(self))]
    pub async fn list_work_orders(&self) -> Vec<WorkOrderSummary> {
        or_fallback(self.load_list().await, Vec::new(), "list_work_orders")
    }

    async fn load_list(&self) -> Result<Vec<WorkOrderSummary>, ServiceError> {
        let db = &*self.db_pool;
        let rows = work_orders::Entity::find()
            .find_also_related(part_master::Entity)
            .order_by_desc(work_orders::Column::CreatedAt)
            .order_by_desc(work_orders::Column::Id)
            .limit(WORK_ORDER_LIST_LIMIT)
            .all(db)
            .await?;

        let mut build_ids: Vec<i64> = rows.iter().filter_map(|(wo, _)| wo.for_build_id).collect();
        build_ids.sort_unstable();
        build_ids.dedup();
        let builds = loaders::builds_by_id(db, &build_ids).await?;

        Ok(rows
            .into_iter()
            .map(|(wo, part)| WorkOrderSummary {
                id: wo.id,
                code: part.as_ref().map(|p| p.sku.clone()),
                title: part.map(|p| p.name),
                tone: status_tone(Some(&wo.status)),
                build_code: wo
                    .for_build_id
                    .and_then(|id| builds.get(&id))
                    .map(|b| b.code.clone()),
                wo_type: wo.wo_type,
                status: wo.status,
            })
            .collect())
    }

    /// Work order by numeric id. Any other key is reported as not found.
    #[instrument(skip(self))]
    pub async fn work_order_detail(&self, key: &str) -> Result<WorkOrderDetail, ServiceError> {
        let not_found = || ServiceError::NotFound(format!("Work order {} not found", key));
        let id: i64 = key.trim().parse().map_err(|_| not_found())?;

        let header = or_fallback(self.load_header(id).await, None, "work_order_header")
            .ok_or_else(not_found)?;
        let consumption = or_fallback(
            self.load_consumption(id).await,
            Vec::new(),
            "work_order_consumption",
        );
        let inspections = or_fallback(
            self.load_inspections(id).await,
            Vec::new(),
            "work_order_inspections",
        );

        Ok(WorkOrderDetail {
            header,
            consumption,
            inspections,
        })
    }

    async fn load_header(&self, id: i64) -> Result<Option<WorkOrderHeader>, ServiceError> {
        let db = &*self.db_pool;
        let Some((wo, part)) = work_orders::Entity::find_by_id(id)
            .find_also_related(part_master::Entity)
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let build_code = match wo.for_build_id {
            Some(build_id) => loaders::builds_by_id(db, &[build_id])
                .await?
                .remove(&build_id)
                .map(|b| b.code),
            None => None,
        };

        Ok(Some(WorkOrderHeader {
            id: wo.id,
            code: part.as_ref().map(|p| p.sku.clone()),
            title: part.map(|p| p.name),
            tone: status_tone(Some(&wo.status)),
            wo_type: wo.wo_type,
            status: wo.status,
            description: wo.notes,
            build_code,
        }))
    }

    async fn load_consumption(&self, id: i64) -> Result<Vec<ConsumptionLine>, ServiceError> {
        Ok(wo_consumption::Entity::find()
            .filter(wo_consumption::Column::WorkOrderId.eq(id))
            .find_also_related(part_master::Entity)
            .order_by_desc(wo_consumption::Column::ConsumedAt)
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(|(line, part)| ConsumptionLine {
                id: line.id,
                sku: part.as_ref().map(|p| p.sku.clone()),
                name: part.as_ref().map(|p| p.name.clone()),
                unit: part.and_then(|p| p.uom),
                qty: line.qty,
                consumed_at: line.consumed_at,
            })
            .collect())
    }

    async fn load_inspections(&self, id: i64) -> Result<Vec<InspectionView>, ServiceError> {
        Ok(inspection_records::Entity::find()
            .filter(inspection_records::Column::WorkOrderId.eq(id))
            .order_by_desc(inspection_records::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(InspectionView::from)
            .collect())
    }
}
