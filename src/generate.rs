//! Short texts about a location's flora, fauna and environment, written by a
//! text completion API.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ureq::Agent;

pub const DEFAULT_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-instruct";

pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct OpenAi {
    agent: Agent,
    url: String,
    key: String,
    model: String,
}

impl OpenAi {
    pub fn new(agent: Agent, url: &str, key: String, model: String) -> Self {
        Self {
            agent,
            url: url.trim_end_matches('/').to_string(),
            key,
            model,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    n: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    text: String,
}

impl TextGenerator for OpenAi {
    fn generate(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, "requesting completion");
        let response: CompletionResponse = self
            .agent
            .post(&format!("{}/v1/completions", self.url))
            .set("Authorization", &format!("Bearer {}", self.key))
            .send_json(CompletionRequest {
                model: &self.model,
                prompt,
                max_tokens: 100,
                n: 1,
                temperature: 0.7,
            })?
            .into_json()
            .context("failed to parse completion response")?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .context("completion response had no choices")?;
        Ok(choice.text.trim().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Flora,
    Fauna,
    Environment,
}

impl Topic {
    pub fn all() -> [Self; 3] {
        [Self::Flora, Self::Fauna, Self::Environment]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Flora => "Local Flora",
            Self::Fauna => "Local Fauna",
            Self::Environment => "Local Environment",
        }
    }

    pub fn prompt(&self, address: &str) -> String {
        match self {
            Self::Flora => format!(
                "Please provide a NUMBERED list of the 10 most common types of local flora in {address}, \
                with a total character limit of 2048 so the response does not stop mid-sentence. \
                After each name, say in parentheses what kind of plant it is (e.g. Sugar maple (tree)). \
                The list must include at least one thing that is not a tree.\n\
                Example:\n\
                1. American Beech (tree)\n\
                2. Speckled Alder (shrub)\n\
                3. Moonseed (vine)\n\
                4. Royal Fern (fern)\n\
                (Only use entries from this example if they are actually common at the location.)"
            ),
            Self::Fauna => format!(
                "Please provide a NUMBERED list of the 10 most common types of local fauna in {address}, \
                with a total character limit of 2048 so the response does not stop mid-sentence.\n\
                Example:\n\
                1. Pileated Woodpecker\n\
                2. American Badger\n\
                3. American Red Squirrel\n\
                (Only use entries from this example if they are actually common at the location.)"
            ),
            Self::Environment => format!(
                "Please describe the natural environment of {address}. What types of biomes are there? \
                Use a total character limit of 2048 so the response does not stop mid-sentence. \
                Do not repeat the full address; refer to the place by a short name such as its city."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_mention_location() {
        for topic in Topic::all() {
            let prompt = topic.prompt("Ann Arbor, Michigan");
            assert!(prompt.contains("Ann Arbor, Michigan"), "{topic:?}");
        }
        assert!(Topic::Flora.prompt("x").contains("NUMBERED list"));
        assert!(Topic::Environment.prompt("x").contains("biomes"));
    }

    #[test]
    fn request_shape() {
        let request = CompletionRequest {
            model: DEFAULT_MODEL,
            prompt: "hi",
            max_tokens: 100,
            n: 1,
            temperature: 0.7,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "model": "gpt-3.5-turbo-instruct",
                "prompt": "hi",
                "max_tokens": 100,
                "n": 1,
                "temperature": 0.7,
            })
        );
    }

    #[test]
    fn response_shape() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"id": "cmpl-1", "choices": [{"text": "\n\n1. Oak", "index": 0, "finish_reason": "length"}]}"#,
        )
        .unwrap();
        assert_eq!(response.choices[0].text.trim(), "1. Oak");
    }
}
