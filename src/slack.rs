use chrono::{Local, NaiveDateTime, TimeZone};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::{AppError, Result};

/// A single `search.messages` match
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchMatch {
    /// Sender id, absent for workflow and integration posts
    pub user: Option<String>,
    pub username: Option<String>,
    pub ts: Option<String>,
    pub text: Option<String>,
    pub permalink: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub matches: Vec<SearchMatch>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlackUserProfile {
    pub real_name_normalized: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile: SlackUserProfile,
    #[serde(default)]
    pub is_bot: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackUsergroup {
    pub id: String,
    pub handle: String,
}

/// A message returned by `conversations.replies`. The first one is the thread root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadMessage {
    pub user: Option<String>,
    pub ts: String,
    pub latest_reply: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthIdentity {
    pub user_id: Option<String>,
    pub user: Option<String>,
    pub team: Option<String>,
}

#[derive(Deserialize)]
struct SearchMessagesResponse {
    messages: SearchPage,
}

#[derive(Deserialize)]
struct UsersListResponse {
    #[serde(default)]
    members: Vec<SlackUser>,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct UsergroupsListResponse {
    #[serde(default)]
    usergroups: Vec<SlackUsergroup>,
}

#[derive(Deserialize)]
struct RepliesResponse {
    #[serde(default)]
    messages: Vec<ThreadMessage>,
}

/// The Slack Web API calls the tracker depends on.
pub trait ChatApi {
    fn auth_test(&self) -> Result<AuthIdentity>;

    fn search_messages(&self, query: &str, page: u32, count: u32) -> Result<SearchPage>;

    /// Every member of the workspace, across all `users.list` pages
    fn list_users(&self) -> Result<Vec<SlackUser>>;

    fn list_usergroups(&self) -> Result<Vec<SlackUsergroup>>;

    fn conversation_replies(&self, channel: &str, thread_ts: &str) -> Result<Vec<ThreadMessage>>;
}

pub struct SlackWebClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

impl SlackWebClient {
    pub fn new(api_base: &str, token: &str) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
        }
    }

    fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = Url::parse_with_params(&format!("{}/{}", self.api_base, method), params)
            .map_err(|e| AppError::SlackApi(format!("{method}: invalid url: {e}")))?;

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| AppError::SlackApi(format!("{method}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::SlackApi(format!(
                "{method} failed with status {}",
                status.as_u16()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| AppError::JsonParse(format!("{method}: {e}")))?;

        if !body.get("ok").and_then(|v| v.as_bool()).unwrap_or(false) {
            let error = body
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            return Err(AppError::SlackApi(format!("{method}: {error}")));
        }

        serde_json::from_value(body).map_err(|e| AppError::JsonParse(format!("{method}: {e}")))
    }
}

impl ChatApi for SlackWebClient {
    fn auth_test(&self) -> Result<AuthIdentity> {
        self.call("auth.test", &[]).map_err(|e| match e {
            AppError::SlackApi(msg) => AppError::SlackAuth(msg),
            other => other,
        })
    }

    fn search_messages(&self, query: &str, page: u32, count: u32) -> Result<SearchPage> {
        let page = page.to_string();
        let count = count.to_string();
        let response: SearchMessagesResponse = self.call(
            "search.messages",
            &[
                ("query", query),
                ("sort", "timestamp"),
                ("sort_dir", "asc"),
                ("count", &count),
                ("page", &page),
            ],
        )?;
        Ok(response.messages)
    }

    fn list_users(&self) -> Result<Vec<SlackUser>> {
        let mut all_users = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut params = vec![("limit", "200")];
            if let Some(c) = cursor.as_deref() {
                params.push(("cursor", c));
            }

            let response: UsersListResponse = self.call("users.list", &params)?;
            debug!(count = response.members.len(), "fetched users.list page");
            all_users.extend(response.members);

            match response.response_metadata.and_then(|meta| meta.next_cursor) {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        Ok(all_users)
    }

    fn list_usergroups(&self) -> Result<Vec<SlackUsergroup>> {
        let response: UsergroupsListResponse = self.call("usergroups.list", &[])?;
        Ok(response.usergroups)
    }

    fn conversation_replies(&self, channel: &str, thread_ts: &str) -> Result<Vec<ThreadMessage>> {
        let response: RepliesResponse = self.call(
            "conversations.replies",
            &[("channel", channel), ("ts", thread_ts)],
        )?;
        Ok(response.messages)
    }
}

/// Convert a Slack timestamp ("1572987930.000100") to local calendar time,
/// dropping the fractional seconds.
pub fn parse_slack_ts(ts: &str) -> Result<NaiveDateTime> {
    let secs: i64 = ts
        .split('.')
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::InvalidTimestamp(ts.to_string()))?;

    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.naive_local())
        .ok_or_else(|| AppError::InvalidTimestamp(ts.to_string()))
}
