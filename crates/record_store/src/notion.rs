use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use shared::domain::{GuestType, RecordId, RsvpRecord};
use tracing::{debug, error};
use url::Url;

use crate::{RecordStore, RecordStoreError, Result};

pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub api_key: Option<String>,
    pub database_id: Option<String>,
    pub api_url: String,
    pub version: String,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            database_id: None,
            api_url: DEFAULT_NOTION_API_URL.into(),
            version: DEFAULT_NOTION_VERSION.into(),
        }
    }
}

/// Writes one page per guest into a Notion database.
#[derive(Clone)]
pub struct NotionStore {
    http: Client,
    base_url: Url,
    config: NotionConfig,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

impl NotionStore {
    pub fn new(config: NotionConfig) -> Result<Self> {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: NotionConfig) -> Result<Self> {
        let mut raw = config.api_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw)?;
        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_ok()
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(RecordStoreError::NotConfigured("Notion API key is not configured"))?;
        let database_id = self
            .config
            .database_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(RecordStoreError::NotConfigured(
                "Notion database ID is not configured",
            ))?;
        Ok((api_key, database_id))
    }
}

#[async_trait]
impl RecordStore for NotionStore {
    async fn create_record(&self, record: &RsvpRecord) -> Result<RecordId> {
        let (api_key, database_id) = self.credentials()?;
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": page_properties(record),
        });

        let response = self
            .http
            .post(self.base_url.join("v1/pages")?)
            .bearer_auth(api_key)
            .header("Notion-Version", &self.config.version)
            .json(&body)
            .send()
            .await?;
        let page: PageResponse = read_json(response).await.map_err(|err| {
            error!(guest = %record.name, day = %record.day, %err, "failed to create Notion page");
            err
        })?;

        debug!(guest = %record.name, page_id = %page.id, "created Notion page");
        Ok(RecordId(page.id))
    }

    async fn check_access(&self) -> Result<()> {
        let (api_key, database_id) = self.credentials()?;
        let response = self
            .http
            .get(self.base_url.join(&format!("v1/databases/{database_id}"))?)
            .bearer_auth(api_key)
            .header("Notion-Version", &self.config.version)
            .send()
            .await?;
        let _: Value = read_json(response).await?;
        Ok(())
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<NotionErrorBody>(&text) {
            Ok(NotionErrorBody {
                code: Some(code),
                message,
            }) => format!("{code}: {message}"),
            Ok(NotionErrorBody { message, .. }) => message,
            Err(_) if text.is_empty() => status.to_string(),
            Err(_) => text,
        };
        return Err(RecordStoreError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| RecordStoreError::InvalidResponse(e.to_string()))
}

fn rich_text(content: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": content } }] })
}

/// Maps a record onto the database's column schema.
pub(crate) fn page_properties(record: &RsvpRecord) -> Value {
    let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());

    let mut properties = Map::new();
    properties.insert(
        "Name".into(),
        json!({ "title": [{ "text": { "content": record.name } }] }),
    );
    properties.insert("Email".into(), json!({ "email": non_empty(&record.email) }));
    properties.insert(
        "Phone".into(),
        json!({ "phone_number": non_empty(&record.phone) }),
    );
    properties.insert("About".into(), rich_text(&record.about));
    properties.insert(
        "Day".into(),
        json!({ "select": { "name": record.day.display_name() } }),
    );
    properties.insert(
        "Guest Type".into(),
        json!({ "select": { "name": record.guest_type.as_str() } }),
    );

    match record.guest_type {
        GuestType::Friend => {
            if let Some(primary) = record.primary_contact.as_deref().filter(|p| !p.is_empty()) {
                properties.insert("Primary Contact".into(), rich_text(primary));
            }
        }
        GuestType::Primary => {
            if let Some(guests) = record.guests.as_ref().filter(|g| !g.is_empty()) {
                properties.insert("Guests".into(), rich_text(&guests.join(", ")));
            }
        }
    }

    Value::Object(properties)
}

#[cfg(test)]
#[path = "tests/notion_tests.rs"]
mod tests;
