//! Data access for the matchmaking pipeline.
//!
//! Free repository functions per table, plus the [`MatchmakingStore`] trait
//! the orchestrator depends on so ranking runs can be exercised without a
//! live Postgres.

pub mod audit_repo;
pub mod request_repo;
pub mod subscription_repo;
pub mod supplier_repo;

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::{AgentUsageLog, CarbonCalculation, MaterialRequest, Supplier};

#[async_trait]
pub trait MatchmakingStore: Send + Sync {
    async fn find_material_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<MaterialRequest>, sqlx::Error>;

    /// Suppliers offering at least one of the requested materials.
    async fn find_suppliers_offering(
        &self,
        materials: &[String],
    ) -> Result<Vec<Supplier>, sqlx::Error>;

    /// Supplier ids currently on an active premium plan.
    async fn premium_supplier_ids(&self) -> Result<HashSet<Uuid>, sqlx::Error>;

    async fn insert_carbon_calculations(
        &self,
        rows: &[CarbonCalculation],
    ) -> Result<(), sqlx::Error>;

    async fn insert_usage_log(&self, log: &AgentUsageLog) -> Result<(), sqlx::Error>;

    async fn carbon_calculations_for_request(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<CarbonCalculation>, sqlx::Error>;
}

/// Postgres-backed store used by the running service.
#[derive(Clone)]
pub struct SqlxMatchmakingStore {
    pool: PgPool,
}

impl SqlxMatchmakingStore {
    pub fn new(pool: PgPool) -> Self {
        SqlxMatchmakingStore { pool }
    }
}

#[async_trait]
impl MatchmakingStore for SqlxMatchmakingStore {
    async fn find_material_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<MaterialRequest>, sqlx::Error> {
        request_repo::find_material_request(&self.pool, request_id).await
    }

    async fn find_suppliers_offering(
        &self,
        materials: &[String],
    ) -> Result<Vec<Supplier>, sqlx::Error> {
        supplier_repo::find_suppliers_offering(&self.pool, materials).await
    }

    async fn premium_supplier_ids(&self) -> Result<HashSet<Uuid>, sqlx::Error> {
        subscription_repo::premium_supplier_ids(&self.pool).await
    }

    async fn insert_carbon_calculations(
        &self,
        rows: &[CarbonCalculation],
    ) -> Result<(), sqlx::Error> {
        audit_repo::insert_carbon_calculations(&self.pool, rows).await
    }

    async fn insert_usage_log(&self, log: &AgentUsageLog) -> Result<(), sqlx::Error> {
        audit_repo::insert_usage_log(&self.pool, log).await
    }

    async fn carbon_calculations_for_request(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<CarbonCalculation>, sqlx::Error> {
        audit_repo::carbon_calculations_for_request(&self.pool, request_id).await
    }
}
