//! Services for the Inkwell API.
//!
//! Each service owns explicit store handles passed in at construction and
//! keeps no state between calls, so every operation is safe to invoke from
//! concurrent requests without locking.

pub mod assessment;
pub mod auth;
pub mod catalog;

pub use assessment::{AssessmentEngine, grade};
pub use auth::{AuthService, CredentialHasher};
pub use catalog::{StoryService, UserService};

use inkwell_store::Stores;
use std::sync::Arc;

/// Every service the transport layer needs, wired to one set of stores.
#[derive(Clone)]
pub struct Services {
    pub assessments: Arc<AssessmentEngine>,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub stories: Arc<StoryService>,
}

impl Services {
    pub fn new(stores: &Stores, hasher: CredentialHasher) -> Self {
        Self {
            assessments: Arc::new(AssessmentEngine::new(stores.assessments.clone())),
            auth: Arc::new(AuthService::new(stores.users.clone(), hasher)),
            users: Arc::new(UserService::new(stores.users.clone())),
            stories: Arc::new(StoryService::new(stores.stories.clone())),
        }
    }
}
