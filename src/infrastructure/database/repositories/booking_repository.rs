//! SeaORM implementation of BookingRepository
//!
//! Uniqueness of pending bookings is enforced by a partial unique index and
//! status transitions are single conditional UPDATEs, so both guarantees hold
//! across processes sharing the database.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use super::{db_err, from_db_count, parse_decimal, to_db_count};
use crate::domain::booking::{Booking, BookingRepository, BookingStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::booking;
use crate::infrastructure::database::migrator::PENDING_UNIQUE_INDEX;

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> DomainResult<Option<booking::Model>> {
        booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Resolve a conditional update that touched no row.
    async fn explain_noop(&self, id: Uuid, to: BookingStatus) -> DomainError {
        match self.find_model(id).await {
            Ok(None) => DomainError::NotFound {
                entity: "Booking",
                field: "id",
                value: id.to_string(),
            },
            Ok(Some(m)) => match BookingStatus::parse(&m.status) {
                Some(from) => DomainError::InvalidTransition { from, to },
                None => DomainError::Storage(format!("unknown booking status {:?}", m.status)),
            },
            Err(e) => e,
        }
    }

    async fn reload(&self, id: Uuid) -> DomainResult<Booking> {
        let model = self.find_model(id).await?.ok_or_else(|| DomainError::NotFound {
            entity: "Booking",
            field: "id",
            value: id.to_string(),
        })?;
        model_to_domain(model)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: booking::Model) -> DomainResult<Booking> {
    let status = BookingStatus::parse(&m.status)
        .ok_or_else(|| DomainError::Storage(format!("unknown booking status {:?}", m.status)))?;
    Ok(Booking {
        total_price: parse_decimal("total_price", &m.total_price)?,
        guests_count: from_db_count("guests_count", m.guests_count)?,
        id: m.id,
        tour_id: m.tour_id,
        user_id: m.user_id,
        start_date: m.start_date,
        phone_number: m.phone_number,
        status,
        created_at: m.created_at,
        cancelled_by: m.cancelled_by,
        cancelled_at: m.cancelled_at,
    })
}

fn source_statuses(next: BookingStatus) -> Vec<&'static str> {
    BookingStatus::sources_of(next)
        .iter()
        .map(|s| s.as_str())
        .collect()
}

/// Unique violations on insert are either the pending-booking rule or a
/// primary key collision.
fn insert_err(e: DbErr, b: &Booking) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            if msg.contains(PENDING_UNIQUE_INDEX) || msg.contains("start_date") {
                DomainError::DuplicatePending {
                    tour_id: b.tour_id.clone(),
                    user_id: b.user_id.clone(),
                    start_date: b.start_date,
                }
            } else {
                DomainError::Conflict(format!("booking {}", b.id))
            }
        }
        _ => db_err(e),
    }
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn insert(&self, b: Booking) -> DomainResult<Uuid> {
        debug!("Inserting booking: {} ({} on {})", b.id, b.tour_id, b.start_date);

        let model = booking::ActiveModel {
            id: Set(b.id),
            tour_id: Set(b.tour_id.clone()),
            user_id: Set(b.user_id.clone()),
            start_date: Set(b.start_date),
            guests_count: Set(to_db_count("guests_count", b.guests_count)?),
            phone_number: Set(b.phone_number.clone()),
            total_price: Set(b.total_price.to_string()),
            status: Set(b.status.as_str().to_string()),
            created_at: Set(b.created_at),
            cancelled_by: Set(b.cancelled_by.clone()),
            cancelled_at: Set(b.cancelled_at),
        };
        booking::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| insert_err(e, &b))?;
        Ok(b.id)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Booking>> {
        self.find_model(id).await?.map(model_to_domain).transpose()
    }

    async fn find_pending_duplicate(
        &self,
        tour_id: &str,
        user_id: &str,
        start_date: NaiveDate,
    ) -> DomainResult<Option<Booking>> {
        let model = booking::Entity::find()
            .filter(booking::Column::TourId.eq(tour_id))
            .filter(booking::Column::UserId.eq(user_id))
            .filter(booking::Column::StartDate.eq(start_date))
            .filter(booking::Column::Status.eq(BookingStatus::Pending.as_str()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn transition_to_cancelled(
        &self,
        id: Uuid,
        actor_id: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<Booking> {
        debug!("Cancelling booking: {} by {}", id, actor_id);

        let result = booking::Entity::update_many()
            .col_expr(
                booking::Column::Status,
                Expr::value(BookingStatus::Cancelled.as_str()),
            )
            .col_expr(booking::Column::CancelledBy, Expr::value(actor_id.to_string()))
            .col_expr(booking::Column::CancelledAt, Expr::value(at))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.is_in(source_statuses(BookingStatus::Cancelled)))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(self.explain_noop(id, BookingStatus::Cancelled).await);
        }
        self.reload(id).await
    }

    async fn transition_to_paid(&self, id: Uuid) -> DomainResult<Booking> {
        debug!("Marking booking paid: {}", id);

        let result = booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(BookingStatus::Paid.as_str()))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.is_in(source_statuses(BookingStatus::Paid)))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(self.explain_noop(id, BookingStatus::Paid).await);
        }
        self.reload(id).await
    }

    async fn list_by_tour_and_date_range(
        &self,
        tour_id: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<Booking>> {
        let mut query = booking::Entity::find()
            .filter(booking::Column::StartDate.between(from, to));
        if let Some(tour_id) = tour_id {
            query = query.filter(booking::Column::TourId.eq(tour_id));
        }
        let models = query
            .order_by_asc(booking::Column::StartDate)
            .order_by_asc(booking::Column::TourId)
            .order_by_asc(booking::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(model_to_domain).collect()
    }

    async fn list_by_user(&self, user_id: &str) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(model_to_domain).collect()
    }

    async fn list_all(&self) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(model_to_domain).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::{init_database, run_migrations, DatabaseConfig};
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    async fn repo() -> SeaOrmBookingRepository {
        let db = init_database(&DatabaseConfig::sqlite_memory()).await.unwrap();
        run_migrations(&db).await.unwrap();
        SeaOrmBookingRepository::new(db)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, d).unwrap()
    }

    fn pending(user: &str, d: u32, guests: u32, created_offset_secs: i64) -> Booking {
        Booking::new_pending(
            "tour-a",
            user,
            day(d),
            guests,
            "+254 700 111 222",
            Decimal::from_str("599.96").unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap()
                + Duration::seconds(created_offset_secs),
        )
    }

    #[tokio::test]
    async fn stored_booking_reads_back_exactly() {
        let repo = repo().await;
        let b = pending("u1", 3, 4, 0);
        let id = repo.insert(b.clone()).await.unwrap();

        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored, b);
        assert_eq!(stored.total_price, Decimal::from_str("599.96").unwrap());
    }

    #[tokio::test]
    async fn unique_index_rejects_second_pending() {
        let repo = repo().await;
        repo.insert(pending("u1", 3, 2, 0)).await.unwrap();

        let err = repo.insert(pending("u1", 3, 1, 5)).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicatePending { .. }), "{err:?}");

        repo.insert(pending("u2", 3, 1, 5)).await.unwrap();
        repo.insert(pending("u1", 4, 1, 5)).await.unwrap();
    }

    #[tokio::test]
    async fn primary_key_collision_is_conflict() {
        let repo = repo().await;
        let b = pending("u1", 3, 2, 0);
        repo.insert(b.clone()).await.unwrap();
        repo.transition_to_paid(b.id).await.unwrap();

        let err = repo.insert(b).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)), "{err:?}");
    }

    #[tokio::test]
    async fn cancelled_booking_frees_the_key() {
        let repo = repo().await;
        let id = repo.insert(pending("u1", 3, 2, 0)).await.unwrap();
        let at = Utc.with_ymd_and_hms(2026, 10, 2, 12, 0, 0).unwrap();

        let cancelled = repo.transition_to_cancelled(id, "u1", at).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(cancelled.cancelled_by.as_deref(), Some("u1"));
        assert_eq!(cancelled.cancelled_at, Some(at));

        assert!(repo
            .find_pending_duplicate("tour-a", "u1", day(3))
            .await
            .unwrap()
            .is_none());
        repo.insert(pending("u1", 3, 2, 10)).await.unwrap();
    }

    #[tokio::test]
    async fn conditional_update_refuses_terminal_rows() {
        let repo = repo().await;
        let id = repo.insert(pending("u1", 3, 2, 0)).await.unwrap();
        let first = Utc.with_ymd_and_hms(2026, 10, 2, 12, 0, 0).unwrap();
        repo.transition_to_cancelled(id, "admin", first).await.unwrap();

        let err = repo
            .transition_to_cancelled(id, "u1", first + Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                from: BookingStatus::Cancelled,
                to: BookingStatus::Cancelled
            }
        ));
        let err = repo.transition_to_paid(id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));

        // audit fields untouched by the refused writes
        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.cancelled_by.as_deref(), Some("admin"));
        assert_eq!(stored.cancelled_at, Some(first));
    }

    #[tokio::test]
    async fn paid_booking_can_still_be_cancelled() {
        let repo = repo().await;
        let id = repo.insert(pending("u1", 3, 2, 0)).await.unwrap();
        assert_eq!(repo.transition_to_paid(id).await.unwrap().status, BookingStatus::Paid);

        let cancelled = repo
            .transition_to_cancelled(id, "admin", Utc::now())
            .await
            .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn transition_on_missing_row_is_not_found() {
        let repo = repo().await;
        let err = repo
            .transition_to_cancelled(Uuid::new_v4(), "u1", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn listings_are_ordered_and_filtered() {
        let repo = repo().await;
        repo.insert(pending("u1", 1, 1, 0)).await.unwrap();
        repo.insert(pending("u1", 2, 1, 30)).await.unwrap();
        repo.insert(pending("u2", 2, 1, 60)).await.unwrap();
        repo.insert(pending("u1", 9, 1, 90)).await.unwrap();

        let mine = repo.list_by_user("u1").await.unwrap();
        assert_eq!(mine.len(), 3);
        assert_eq!(mine[0].start_date, day(9));

        let range = repo
            .list_by_tour_and_date_range(Some("tour-a"), day(1), day(2))
            .await
            .unwrap();
        assert_eq!(range.len(), 3);
        assert!(range.iter().all(|b| b.start_date <= day(2)));

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}
