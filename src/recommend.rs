// ============================================
// HAPPYHOUR - Recommendation Driver
// ============================================

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::embeddings::ScoredItem;
use crate::llm::LlmClient;

pub const SYSTEM_PROMPT: &str = "You are a vibey, helpful NYC happy hour and bar recommender who helps choose the best bar from a provided list of choices.";

/// Number of spots the chat model is asked to pick
pub const PICK_COUNT: usize = 3;

/// One row of `drinks-happy-hour.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct HappyHourRow {
    pub name: String,
    pub cuisine: String,
    #[serde(default)]
    pub price_range: String,
    pub neighborhood: String,
    pub when: String,
    #[serde(default)]
    pub notes: String,
}

impl HappyHourRow {
    /// Text sent to the embedding provider, also used to list choices in the prompt
    pub fn describe(&self) -> String {
        format!(
            "Name: {}; Type: {}; Location: {}; Happy Hour Time: {}; Notes: {}",
            self.name, self.cuisine, self.neighborhood, self.when, self.notes
        )
    }
}

/// Build the user message handed to the chat model
pub fn format_rec_request<'a>(
    query: &str,
    choices: impl IntoIterator<Item = &'a HappyHourRow>,
) -> String {
    let mut lines = vec![
        "Hey dawg! Here is a summary of what I'm looking:".to_string(),
        query.to_string(),
        String::new(),
        "And here are my current choices:".to_string(),
    ];
    lines.extend(choices.into_iter().map(HappyHourRow::describe));
    lines.push(String::new());
    lines.push(format!(
        "Help me pick the {} best spots for a drink!",
        PICK_COUNT
    ));
    lines.join("\n")
}

/// Ask the chat model to choose among the search results
pub async fn recommend(
    llm: &LlmClient,
    query: &str,
    results: &[ScoredItem<'_, HappyHourRow>],
) -> Result<String> {
    let prompt = format_rec_request(query, results.iter().map(|r| r.item));
    tracing::debug!(
        "Requesting recommendation from {} over {} choices",
        llm.provider_name(),
        results.len()
    );
    llm.chat(SYSTEM_PROMPT, &prompt).await
}
