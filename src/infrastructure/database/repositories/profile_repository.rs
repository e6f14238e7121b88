//! SeaORM implementation of ContactDirectory

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use sea_orm::sea_query::OnConflict;

use super::db_err;
use crate::domain::{Contact, ContactDirectory, DomainResult};
use crate::infrastructure::database::entities::profile;

pub struct SeaOrmContactDirectory {
    db: DatabaseConnection,
}

impl SeaOrmContactDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Provision a profile row (standalone deployments and tests).
    pub async fn upsert(&self, user_id: &str, contact: &Contact) -> DomainResult<()> {
        let model = profile::ActiveModel {
            id: Set(user_id.to_string()),
            full_name: Set(contact.name.clone()),
            email: Set(Some(contact.email.clone())),
            created_at: Set(Utc::now()),
        };
        profile::Entity::insert(model)
            .on_conflict(
                OnConflict::column(profile::Column::Id)
                    .update_columns([profile::Column::FullName, profile::Column::Email])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl ContactDirectory for SeaOrmContactDirectory {
    async fn find_contact(&self, user_id: &str) -> DomainResult<Option<Contact>> {
        let model = profile::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let contact = model.and_then(|m| {
            let email = m.email.filter(|e| !e.trim().is_empty())?;
            Some(Contact {
                email,
                name: m.full_name,
            })
        });
        if contact.is_none() {
            debug!("No contact details for user {}", user_id);
        }
        Ok(contact)
    }
}
