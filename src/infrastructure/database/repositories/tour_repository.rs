//! SeaORM implementation of TourRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::{db_err, from_db_count, parse_decimal, to_db_count};
use crate::domain::tour::{Tour, TourRepository, TourStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::tour;

pub struct SeaOrmTourRepository {
    db: DatabaseConnection,
}

impl SeaOrmTourRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert or replace a catalog row.
    ///
    /// The catalog belongs to another service; this exists for standalone
    /// deployments and tests.
    pub async fn upsert(&self, t: &Tour) -> DomainResult<()> {
        debug!("Upserting tour: {}", t.id);
        let now = Utc::now();
        let existing = tour::Entity::find_by_id(t.id.clone())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let model = tour::ActiveModel {
            id: Set(t.id.clone()),
            title: Set(t.title.clone()),
            price_per_person: Set(t.price_per_person.to_string()),
            discount_price: Set(t.discount_price.map(|d| d.to_string())),
            max_group_size: Set(to_db_count("max_group_size", t.max_group_size)?),
            max_total_slots: Set(to_db_count("max_total_slots", t.max_total_slots)?),
            status: Set(t.status.as_str().to_string()),
            created_at: Set(existing.as_ref().map_or(now, |m| m.created_at)),
            updated_at: Set(now),
        };

        if existing.is_some() {
            model.update(&self.db).await.map_err(db_err)?;
        } else {
            tour::Entity::insert(model)
                .exec_without_returning(&self.db)
                .await
                .map_err(db_err)?;
        }
        Ok(())
    }

    async fn find_model(&self, id: &str) -> DomainResult<tour::Model> {
        tour::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Tour",
                field: "id",
                value: id.to_string(),
            })
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: tour::Model) -> DomainResult<Tour> {
    let status = TourStatus::parse(&m.status)
        .ok_or_else(|| DomainError::Storage(format!("unknown tour status {:?}", m.status)))?;
    Ok(Tour {
        price_per_person: parse_decimal("price_per_person", &m.price_per_person)?,
        discount_price: m
            .discount_price
            .as_deref()
            .map(|d| parse_decimal("discount_price", d))
            .transpose()?,
        max_group_size: from_db_count("max_group_size", m.max_group_size)?,
        max_total_slots: from_db_count("max_total_slots", m.max_total_slots)?,
        id: m.id,
        title: m.title,
        status,
    })
}

// ── TourRepository impl ─────────────────────────────────────────

#[async_trait]
impl TourRepository for SeaOrmTourRepository {
    async fn find_published(&self, id: &str) -> DomainResult<Option<Tour>> {
        let model = tour::Entity::find_by_id(id.to_string())
            .filter(tour::Column::Status.eq(TourStatus::Published.as_str()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Tour>> {
        let model = tour::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn find_all(&self) -> DomainResult<Vec<Tour>> {
        let models = tour::Entity::find()
            .order_by_asc(tour::Column::Title)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(model_to_domain).collect()
    }

    async fn set_status(&self, id: &str, status: TourStatus) -> DomainResult<Tour> {
        debug!("Setting tour {} status to {}", id, status);
        let mut active: tour::ActiveModel = self.find_model(id).await?.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await.map_err(db_err)?;
        model_to_domain(updated)
    }

    async fn set_max_total_slots(&self, id: &str, max_total_slots: u32) -> DomainResult<Tour> {
        debug!("Setting tour {} max_total_slots to {}", id, max_total_slots);
        let slots = to_db_count("max_total_slots", max_total_slots)?;
        let mut active: tour::ActiveModel = self.find_model(id).await?.into();
        active.max_total_slots = Set(slots);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await.map_err(db_err)?;
        model_to_domain(updated)
    }
}
