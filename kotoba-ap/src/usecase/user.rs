//! Profile use cases

use crate::Result;
use kotoba_common::models::UserProfile;
use kotoba_common::repository::UserRepository;

pub struct GetUserProfile {
    repository: UserRepository,
}

impl GetUserProfile {
    pub fn new(repository: UserRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Result<Option<UserProfile>> {
        Ok(self.repository.get_user_profile().await?)
    }
}

pub struct SaveUserProfile {
    repository: UserRepository,
}

impl SaveUserProfile {
    pub fn new(repository: UserRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, profile: &UserProfile) -> Result<()> {
        Ok(self.repository.save_user_profile(profile).await?)
    }
}
