//! Task breakdown collaborator.
//!
//! The scheduling core treats breakdown as a black box behind
//! [`BreakdownSource`]; the default implementation asks a local Ollama
//! model and repairs whatever JSON comes back. Unparseable output degrades
//! to a single analysis item rather than failing the request.

use reqwest::Client;
use serde_json::{json, Value};

use crate::error::{BreakdownError, Warning};
use crate::task::{TaskBreakdown, WorkItem};

/// Produces a task breakdown from free-form text.
pub trait BreakdownSource: Send + Sync {
    fn breakdown(&self, task_text: &str) -> Result<BreakdownOutcome, BreakdownError>;
}

/// A breakdown plus the diagnostics produced while repairing it.
#[derive(Debug, Clone)]
pub struct BreakdownOutcome {
    pub breakdown: TaskBreakdown,
    pub warnings: Vec<Warning>,
}

/// Breakdown via a local Ollama model.
pub struct OllamaBreakdown {
    base_url: String,
    model: String,
}

impl OllamaBreakdown {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn prompt(task_text: &str) -> String {
        format!(
            "You are an expert project manager and task breakdown specialist. \
Analyze the given task and break it down into smaller, actionable subtasks.\n\n\
Consider the following:\n\
1. Each subtask should be specific and actionable\n\
2. Estimate realistic durations in minutes (minimum 30)\n\
3. Identify dependencies between subtasks\n\
4. Assign a priority level (high, medium, low)\n\
5. Keep subtasks in logical order\n\
6. EXCLUDE subtasks that take less than 30 minutes -- only substantial work\n\n\
Task to break down: {task_text}\n\n\
Return ONLY a JSON object with this exact structure, no markdown and no extra text:\n\
{{\n\
  \"main_task\": \"the original task\",\n\
  \"subtasks\": [\n\
    {{\n\
      \"title\": \"brief title\",\n\
      \"description\": \"detailed description\",\n\
      \"estimated_duration\": 60,\n\
      \"priority\": \"high\",\n\
      \"dependencies\": []\n\
    }}\n\
  ],\n\
  \"total_estimated_time\": 240\n\
}}"
        )
    }

    fn call(&self, prompt: &str) -> Result<String, BreakdownError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": 0.5 },
        });

        let resp: Value = crate::integrations::block_on(async {
            Client::new().post(&url).json(&body).send().await?.json().await
        })
        .map_err(|e| BreakdownError::Runtime(e.to_string()))??;

        if let Some(err) = resp.get("error") {
            return Err(BreakdownError::Api(err.to_string()));
        }

        resp["response"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| BreakdownError::Api("missing response field".to_string()))
    }
}

impl BreakdownSource for OllamaBreakdown {
    fn breakdown(&self, task_text: &str) -> Result<BreakdownOutcome, BreakdownError> {
        let raw = self.call(&Self::prompt(task_text))?;
        Ok(parse_breakdown_response(&raw, task_text))
    }
}

/// Parse the model's reply into a breakdown, repairing missing fields and
/// dropping items under the minimum duration. Never fails: a reply that is
/// not JSON degrades to a single fallback item.
pub fn parse_breakdown_response(raw: &str, original_task: &str) -> BreakdownOutcome {
    let cleaned = strip_code_fences(raw);

    let Ok(value) = serde_json::from_str::<Value>(cleaned) else {
        return fallback_outcome(
            original_task,
            "Manual task breakdown needed",
            "The model response could not be parsed. Try again with a simpler task description.",
        );
    };
    if !value.is_object() {
        return fallback_outcome(
            original_task,
            "Manual task breakdown needed",
            "The model response was not a JSON object.",
        );
    }

    let main_task = value
        .get("main_task")
        .and_then(Value::as_str)
        .unwrap_or(original_task)
        .to_string();
    let subtasks: Vec<WorkItem> = value
        .get("subtasks")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(WorkItem::from_loose_json).collect())
        .unwrap_or_default();

    let mut breakdown = TaskBreakdown::new(main_task, subtasks);
    let warnings = breakdown.drop_short_items();

    if breakdown.subtasks.is_empty() {
        let mut fallback = fallback_outcome(
            original_task,
            "Analyze task requirements",
            "Break down and understand what needs to be done.",
        );
        fallback.warnings.extend(warnings);
        return fallback;
    }

    BreakdownOutcome {
        breakdown,
        warnings,
    }
}

/// One high-priority analysis item standing in for a usable breakdown.
fn fallback_outcome(original_task: &str, title: &str, description: &str) -> BreakdownOutcome {
    let item = WorkItem::from_loose_json(&json!({
        "title": title,
        "description": description,
        "estimated_duration": 60,
        "priority": "high",
    }));
    BreakdownOutcome {
        breakdown: TaskBreakdown::new(original_task, vec![item]),
        warnings: Vec::new(),
    }
}

/// Remove a ```json ... ``` (or bare ```) wrapper, if present.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}
