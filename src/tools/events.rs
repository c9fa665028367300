//! Visit NH events lookup.
//!
//! Every outcome, including transport failures and bad statuses, is turned
//! into text for the model. `Tool::call` only fails on malformed arguments.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::error::{AgentError, Result};
use crate::tool::{ParamType, Tool, ToolParameter};

pub const DEFAULT_EVENTS_ENDPOINT: &str = "https://www.visitnh.gov/api/events/getitems";
pub const NO_EVENTS_MESSAGE: &str = "No events found for the specified date range.";
pub const FIRST_PAGE: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
        }
    }
}

impl EventsConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn default_endpoint() -> String {
    DEFAULT_EVENTS_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_results() -> usize {
    10
}

/// Request body understood by the events endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub page_number: u32,
    pub region: Vec<String>,
    pub city: Vec<String>,
    pub category: Vec<String>,
    pub start_date: String,
    pub end_date: String,
}

impl EventsQuery {
    /// Dates are forwarded verbatim; the remote service decides what it accepts.
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>, page_number: u32) -> Self {
        Self {
            page_number,
            region: Vec::new(),
            city: Vec::new(),
            category: Vec::new(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }
}

/// The two fields the agent surfaces. They are kept as raw JSON so a number
/// or `null` from the API is still printed; only a missing field is an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub title: Value,
    #[serde(rename = "startDate")]
    pub start_date: Value,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    results: Option<Vec<Value>>,
}

/// One `- {title} on {startDate}` line per record, or the fixed empty message.
pub fn format_events(events: &[EventRecord]) -> String {
    if events.is_empty() {
        return NO_EVENTS_MESSAGE.to_string();
    }
    events
        .iter()
        .map(|event| format!("- {} on {}", plain(&event.title), plain(&event.start_date)))
        .collect::<Vec<_>>()
        .join("\n")
}

// Strings without their JSON quotes; everything else as JSON text.
fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub struct EventsLookupTool {
    http: reqwest::Client,
    config: EventsConfig,
}

impl EventsLookupTool {
    /// A `max_results` of zero is raised to one.
    pub fn new(mut config: EventsConfig) -> Result<Self> {
        if config.max_results == 0 {
            tracing::warn!("events max_results of 0 raised to 1");
            config.max_results = 1;
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &EventsConfig {
        &self.config
    }

    /// Fetch one page and decode at most `max_results` records.
    pub async fn fetch(&self, query: &EventsQuery) -> Result<Vec<EventRecord>> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(query)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AgentError::UnexpectedStatus(status));
        }

        let body: EventsResponse = response.json().await?;
        let results = body.results.unwrap_or_default();
        tracing::debug!(found = results.len(), page = query.page_number, "fetched events");

        results
            .into_iter()
            .take(self.config.max_results)
            .map(|raw| serde_json::from_value::<EventRecord>(raw).map_err(AgentError::from))
            .collect()
    }

    /// Same as [`fetch`](Self::fetch) but collapsed to observation text.
    pub async fn lookup(&self, query: &EventsQuery) -> String {
        match self.fetch(query).await {
            Ok(events) => format_events(&events),
            Err(AgentError::UnexpectedStatus(status)) => {
                tracing::warn!(status = status.as_u16(), "events endpoint returned an error status");
                format!("Error fetching events: {}", status.as_u16())
            }
            Err(err) => {
                tracing::warn!(error = %err, "events lookup failed");
                format!("Error: {err}")
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventsArgs {
    start_date: String,
    end_date: String,
    #[serde(default = "first_page", deserialize_with = "page_number")]
    page_number: u32,
}

fn first_page() -> u32 {
    FIRST_PAGE
}

// Small local models tend to quote numbers.
fn page_number<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(page) => Ok(page),
        Raw::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("`{text}` is not a page number"))),
    }
}

#[async_trait]
impl Tool for EventsLookupTool {
    fn name(&self) -> &str {
        "nh_events"
    }

    fn description(&self) -> &str {
        "Get events from the Visit NH API for a given date range. Returns one line per event with its title and start date, or an error message."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![
            ToolParameter::new(
                "start_date",
                ParamType::String,
                "Start of the range as YYYY-MM-DDTHH:MM:SS, e.g. \"2026-02-07T00:00:00\"",
            ),
            ToolParameter::new(
                "end_date",
                ParamType::String,
                "End of the range as YYYY-MM-DDTHH:MM:SS, e.g. \"2026-02-08T23:59:59\"",
            ),
            ToolParameter::new("page_number", ParamType::Integer, "Result page, starting at 1")
                .with_default(json!(FIRST_PAGE)),
        ]
    }

    async fn call(&self, input: Value) -> Result<String> {
        let args: EventsArgs =
            serde_json::from_value(input).map_err(|err| AgentError::InvalidArguments {
                tool: self.name().into(),
                reason: err.to_string(),
            })?;
        tracing::debug!(
            start_date = %args.start_date,
            end_date = %args.end_date,
            page_number = args.page_number,
            "looking up events"
        );

        let query = EventsQuery::new(args.start_date, args.end_date, args.page_number);
        Ok(self.lookup(&query).await)
    }
}
