//! `inkwell story add` — Add a story to the catalog.

use inkwell_config::AppConfig;
use inkwell_core::command::NewStory;
use inkwell_service::StoryService;

pub async fn add(
    config: AppConfig,
    title: String,
    author: String,
    content: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let command = NewStory {
        title,
        author,
        content,
    };
    command.validate()?;

    let stores = inkwell_store::open(&config.database).await?;
    let stories = StoryService::new(stores.stories.clone());
    let story = stories.add_story(command).await?;

    println!("✅ Added story #{}: {}", story.id, story.title);
    Ok(())
}
