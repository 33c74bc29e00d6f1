//! Read-mostly services: the user directory and the story catalogue.

use std::sync::Arc;

use inkwell_core::command::NewStory;
use inkwell_core::error::{Error, Result};
use inkwell_core::model::{Story, User};
use inkwell_core::store::{StoryStore, UserStore};
use tracing::{error, info};

pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.users.list_users().await.map_err(|e| {
            error!(error = %e, "Failed to list users");
            Error::internal("could not list users")
        })
    }
}

pub struct StoryService {
    stories: Arc<dyn StoryStore>,
}

impl StoryService {
    pub fn new(stories: Arc<dyn StoryStore>) -> Self {
        Self { stories }
    }

    pub async fn list_stories(&self) -> Result<Vec<Story>> {
        self.stories.list_stories().await.map_err(|e| {
            error!(error = %e, "Failed to list stories");
            Error::internal("could not list stories")
        })
    }

    pub async fn add_story(&self, story: NewStory) -> Result<Story> {
        story.validate()?;
        let story = self.stories.create_story(story).await.map_err(|e| {
            error!(error = %e, "Failed to persist story");
            Error::internal("could not add story")
        })?;
        info!(story_id = story.id, title = %story.title, "Story added");
        Ok(story)
    }
}
