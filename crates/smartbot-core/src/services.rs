//! Resource services behind the dashboard views.
//!
//! Records are opaque JSON owned by the backend; these helpers only know
//! collection paths. Dashboard widgets use the lenient variants, which log
//! and fall back to an empty value instead of failing the whole page.

use serde_json::{json, Value};
use smartbot_types::Result;
use crate::client::ApiClient;

/// Page size the backend paginates list endpoints with.
pub const PAGE_SIZE: u64 = 10;

pub const STATUS_REPLIED: &str = "replied";

/// CRUD over one REST collection, e.g. `bot-configurations/`.
#[derive(Clone)]
pub struct Collection {
    client: ApiClient,
    path: &'static str,
}

impl Collection {
    pub fn new(client: ApiClient, path: &'static str) -> Self {
        Self { client, path }
    }

    pub fn path(&self) -> &str {
        self.path
    }

    pub fn item_path(&self, id: i64) -> String {
        format!("{}{}/", self.path, id)
    }

    pub async fn list(&self) -> Result<Value> {
        self.client.get(self.path).await
    }

    pub async fn get(&self, id: i64) -> Result<Value> {
        self.client.get(&self.item_path(id)).await
    }

    pub async fn create(&self, record: &Value) -> Result<Value> {
        self.client.post(self.path, record.clone()).await
    }

    pub async fn update(&self, id: i64, record: &Value) -> Result<Value> {
        self.client.put(&self.item_path(id), record.clone()).await
    }

    pub async fn delete(&self, id: i64) -> Result<Value> {
        self.client.delete(&self.item_path(id)).await
    }
}

/// One page of a paginated list response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub count: u64,
    pub results: Vec<Value>,
}

impl Page {
    /// Accepts both the `{count, results}` envelope and a bare array.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(results) => Self {
                count: results.len() as u64,
                results,
            },
            Value::Object(mut map) => {
                let results = match map.remove("results") {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                let count = map
                    .get("count")
                    .and_then(Value::as_u64)
                    .unwrap_or(results.len() as u64);
                Self { count, results }
            }
            _ => Self::default(),
        }
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.count)
    }
}

/// Number of pages for `count` items; an empty list still has one page.
pub fn total_pages(count: u64) -> u64 {
    count.div_ceil(PAGE_SIZE).max(1)
}

/// Filters for the message list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageQuery {
    pub page: u64,
    pub status: Option<String>,
    pub message_type: Option<String>,
}

impl Default for MessageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            status: None,
            message_type: None,
        }
    }
}

impl MessageQuery {
    pub fn to_query_string(&self) -> String {
        let mut query = format!("?page={}", self.page.max(1));
        if let Some(status) = &self.status {
            query.push_str(&format!("&status={}", status));
        }
        if let Some(kind) = &self.message_type {
            query.push_str(&format!("&message_type={}", kind));
        }
        query
    }
}

/// Logs a failed dashboard call and substitutes `fallback`.
fn lenient(result: Result<Value>, what: &str, fallback: Value) -> Value {
    match result {
        Ok(value) => value,
        Err(e) => {
            log::error!("{} failed: {}; showing empty data", what, e);
            fallback
        }
    }
}

// ─── Bot Service ─────────────────────────────────────────────

#[derive(Clone)]
pub struct BotService {
    client: ApiClient,
    configurations: Collection,
    templates: Collection,
}

impl BotService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            configurations: Collection::new(client.clone(), "bot-configurations/"),
            templates: Collection::new(client.clone(), "response-templates/"),
            client,
        }
    }

    pub fn configurations(&self) -> &Collection {
        &self.configurations
    }

    pub fn templates(&self) -> &Collection {
        &self.templates
    }

    pub async fn messages(&self, query: &MessageQuery) -> Result<Page> {
        let value = self
            .client
            .get(&format!("messages/{}", query.to_query_string()))
            .await?;
        Ok(Page::from_value(value))
    }

    /// Latest messages for the dashboard overview.
    pub async fn recent_messages(&self) -> Page {
        Page::from_value(lenient(self.client.get("messages/").await, "Loading messages", json!([])))
    }

    pub async fn update_message_status(&self, id: i64, status: &str) -> Result<Value> {
        self.client
            .patch(&format!("messages/{}/", id), json!({ "status": status }))
            .await
    }

    pub async fn message_responses(&self, message_id: i64) -> Result<Page> {
        let value = self
            .client
            .get(&format!("message-responses/?message={}", message_id))
            .await?;
        Ok(Page::from_value(value))
    }

    pub async fn create_message_response(&self, response: &Value) -> Result<Value> {
        self.client.post("message-responses/", response.clone()).await
    }

    pub async fn delete_message(&self, id: i64) -> Result<Value> {
        self.client.delete(&format!("messages/{}/", id)).await
    }

    /// Send a reply, then mark the original message as replied.
    pub async fn reply_to_message(
        &self,
        message_id: i64,
        content: &str,
        template_id: Option<i64>,
    ) -> Result<Value> {
        let mut response = json!({
            "original_message": message_id,
            "content": content,
        });
        if let Some(template_id) = template_id {
            response["template_used"] = json!(template_id);
        }
        let created = self.create_message_response(&response).await?;
        self.update_message_status(message_id, STATUS_REPLIED).await?;
        Ok(created)
    }

    pub async fn dashboard_stats(&self) -> Value {
        lenient(self.client.get("dashboard-stats/").await, "Loading dashboard stats", json!({}))
    }

    pub async fn intents(&self) -> Value {
        lenient(self.client.get("api/intents/").await, "Loading intents", json!([]))
    }

    pub async fn intent_categories(&self) -> Value {
        lenient(
            self.client.get("api/intent-categories/").await,
            "Loading intent categories",
            json!([]),
        )
    }
}

// ─── Account Service ─────────────────────────────────────────

#[derive(Clone)]
pub struct AccountService {
    client: ApiClient,
    email_accounts: Collection,
    whatsapp_accounts: Collection,
}

impl AccountService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            email_accounts: Collection::new(client.clone(), "email-accounts/"),
            whatsapp_accounts: Collection::new(client.clone(), "whatsapp-accounts/"),
            client,
        }
    }

    pub fn email_accounts(&self) -> &Collection {
        &self.email_accounts
    }

    pub fn whatsapp_accounts(&self) -> &Collection {
        &self.whatsapp_accounts
    }

    pub async fn user_activities(&self) -> Value {
        lenient(
            self.client.get("accounts/user-activities/").await,
            "Loading user activities",
            json!([]),
        )
    }

    pub async fn accounts_summary(&self) -> Value {
        lenient(
            self.client.get("accounts/accounts-summary/").await,
            "Loading accounts summary",
            json!({}),
        )
    }
}
