//! Task suggestions from a local Ollama-compatible model.
//!
//! A request carries the user's prompt and a small sample of existing tasks.
//! The model's answer must describe a complete task; anything less is rejected
//! as a whole. Requests run on a worker thread so the UI never waits on the
//! network.

use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SuggestionConfig;
use crate::model::plan::validate_task;
use crate::model::{Category, Lane, Task};

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("could not reach the suggestion service at {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    #[error("suggestion service did not answer within {0} seconds")]
    Timeout(u64),

    #[error("suggestion service returned HTTP {0}")]
    Status(u16),

    #[error("malformed suggestion: {0}")]
    Malformed(String),

    #[error("suggestion worker stopped without answering")]
    WorkerStopped,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    format: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: serde_json::Value,
}

/// The task fields a model must return.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    title: String,
    lane: String,
    category: String,
    start_date: String,
    end_date: String,
    #[serde(default)]
    description: Option<String>,
}

/// Blocking client for the generate endpoint.
#[derive(Debug, Clone)]
pub struct SuggestionClient {
    endpoint: String,
    model: String,
    timeout: Duration,
    sample_size: usize,
}

impl SuggestionClient {
    pub fn from_config(config: &SuggestionConfig) -> Self {
        Self {
            endpoint: config.resolved_endpoint(),
            model: config.effective_model().to_string(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
            sample_size: config.sample_size,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The leading existing tasks sent as context, at most `sample_size` of them.
    pub fn sample<'a>(&self, existing: &'a [Task]) -> &'a [Task] {
        &existing[..existing.len().min(self.sample_size)]
    }

    /// Ask the model for one task. Blocks for at most the configured timeout.
    pub fn suggest(&self, prompt: &str, existing: &[Task]) -> Result<Task, SuggestionError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: build_prompt(prompt, self.sample(existing)),
            stream: false,
            format: "json",
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| self.transport_error(e))?;

        let response = client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(SuggestionError::Status(response.status().as_u16()));
        }

        let generated: GenerateResponse = response
            .json()
            .map_err(|e| SuggestionError::Malformed(format!("unreadable response body: {e}")))?;
        parse_generated(generated.response)
    }

    /// Run [`suggest`](Self::suggest) on a worker thread.
    ///
    /// The receiver yields exactly one result.
    pub fn spawn(&self, prompt: String, existing: Vec<Task>) -> Receiver<Result<Task, SuggestionError>> {
        let (tx, rx) = mpsc::channel();
        let client = self.clone();
        std::thread::spawn(move || {
            let result = client.suggest(&prompt, &existing);
            match &result {
                Ok(task) => tracing::info!(title = %task.title, "suggestion received"),
                Err(e) => tracing::warn!(error = %e, "suggestion rejected"),
            }
            // The UI may have gone away; nothing to do then.
            let _ = tx.send(result);
        });
        rx
    }

    fn transport_error(&self, e: reqwest::Error) -> SuggestionError {
        if e.is_timeout() {
            SuggestionError::Timeout(self.timeout.as_secs())
        } else {
            SuggestionError::Transport {
                endpoint: self.endpoint.clone(),
                message: e.to_string(),
            }
        }
    }
}

/// Compose the full prompt sent to the model.
pub fn build_prompt(user_prompt: &str, sample: &[Task]) -> String {
    let lanes = Lane::ALL
        .iter()
        .enumerate()
        .map(|(i, lane)| format!("{}. {} ({})", i + 1, lane.label(), lane.key()))
        .collect::<Vec<_>>()
        .join("\n");
    let categories = Category::ALL
        .iter()
        .map(Category::key)
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        "You are a project management assistant helping to create tasks for a 3-month execution plan.\n\
         The plan has {} parallel work streams:\n{lanes}\n\n\
         Task categories: {categories}\n\n\
         Based on the user's request, suggest a well-structured task with:\n\
         - A clear, actionable title\n\
         - Appropriate lane (one of the keys above)\n\
         - Appropriate category\n\
         - Realistic start and end dates within a 3-month period\n\
         - A helpful description\n",
        Lane::ALL.len(),
    );

    if !sample.is_empty() {
        if let Ok(existing) = serde_json::to_string_pretty(sample) {
            prompt.push_str(&format!("\nExisting tasks: {existing}\n"));
        }
    }

    prompt.push_str(
        "\nRespond with a JSON object containing: title, lane, category, \
         startDate (YYYY-MM-DD), endDate (YYYY-MM-DD), description\n",
    );
    prompt.push_str(&format!(
        "\nUser request: {}\n\nGenerate a task suggestion as JSON.",
        user_prompt.trim()
    ));
    prompt
}

/// Turn the model's `response` field into a validated task.
fn parse_generated(response: serde_json::Value) -> Result<Task, SuggestionError> {
    match response {
        serde_json::Value::String(text) => parse_candidate_text(&text),
        serde_json::Value::Object(_) => candidate_from_value(response),
        serde_json::Value::Null => Err(SuggestionError::Malformed("empty response".into())),
        other => Err(SuggestionError::Malformed(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Parse model text as a task, falling back to the outermost `{ ... }` span.
pub fn parse_candidate_text(text: &str) -> Result<Task, SuggestionError> {
    let value = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => value,
        Err(_) => {
            let span = text
                .find('{')
                .zip(text.rfind('}'))
                .filter(|(open, close)| open < close)
                .map(|(open, close)| &text[open..=close])
                .ok_or_else(|| SuggestionError::Malformed("no JSON object in response".into()))?;
            serde_json::from_str(span)
                .map_err(|e| SuggestionError::Malformed(format!("invalid JSON: {e}")))?
        }
    };
    candidate_from_value(value)
}

fn candidate_from_value(value: serde_json::Value) -> Result<Task, SuggestionError> {
    let candidate: Candidate = serde_json::from_value(value)
        .map_err(|e| SuggestionError::Malformed(e.to_string()))?;

    let lane = Lane::parse(&candidate.lane)
        .ok_or_else(|| SuggestionError::Malformed(format!("unknown lane '{}'", candidate.lane)))?;
    let category = Category::parse(&candidate.category).ok_or_else(|| {
        SuggestionError::Malformed(format!("unknown category '{}'", candidate.category))
    })?;
    let start = parse_iso_date(&candidate.start_date)?;
    let end = parse_iso_date(&candidate.end_date)?;

    let mut task = Task::new(candidate.title.trim(), lane, start, end).with_category(category);
    if let Some(description) = candidate.description {
        task = task.with_description(description);
    }
    validate_task(&task).map_err(|e| SuggestionError::Malformed(e.to_string()))?;
    Ok(task)
}

fn parse_iso_date(s: &str) -> Result<NaiveDate, SuggestionError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| SuggestionError::Malformed(format!("invalid date '{s}'")))
}
