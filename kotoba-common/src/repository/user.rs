//! User profile repository

use crate::db::{profile, Database, Table, UserProfileRecord};
use crate::models::UserProfile;
use crate::Result;
use futures::stream::BoxStream;

#[derive(Debug, Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get_user_profile(&self) -> Result<Option<UserProfile>> {
        profile::get_user_profile(&self.db)
            .await?
            .map(UserProfile::try_from)
            .transpose()
    }

    pub fn observe_user_profile(&self) -> BoxStream<'static, Result<Option<UserProfile>>> {
        self.db.observe(&[Table::UserProfile], |db| async move {
            profile::get_user_profile(&db)
                .await?
                .map(UserProfile::try_from)
                .transpose()
        })
    }

    pub async fn save_user_profile(&self, user: &UserProfile) -> Result<()> {
        profile::upsert_user_profile(&self.db, &UserProfileRecord::from(user)).await
    }

    pub async fn update_user_profile(&self, user: &UserProfile) -> Result<()> {
        profile::update_user_profile(&self.db, &UserProfileRecord::from(user)).await
    }
}
