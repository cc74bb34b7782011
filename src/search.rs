use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::permalink;
use crate::slack::{ChatApi, SearchMatch, parse_slack_ts};
use crate::{AppError, Result};

pub const PAGE_SIZE: u32 = 100;

/// A message in which the support handle was referenced
#[derive(Debug, Clone, PartialEq)]
pub struct Mention {
    pub mentioner_id: Option<String>,
    pub mentioner_handle: Option<String>,
    pub timestamp: NaiveDateTime,
    pub text: String,
    pub permalink: String,
}

impl Mention {
    pub fn thread_ts(&self) -> Option<String> {
        permalink::thread_ts(&self.permalink)
    }

    /// Build a mention from a search match. Matches without a timestamp or
    /// permalink are skipped.
    fn from_match(m: SearchMatch) -> Result<Option<Self>> {
        let (Some(ts), Some(permalink)) = (m.ts, m.permalink) else {
            return Ok(None);
        };

        Ok(Some(Self {
            mentioner_id: m.user,
            mentioner_handle: m.username,
            timestamp: parse_slack_ts(&ts)?,
            text: m.text.unwrap_or_default(),
            permalink,
        }))
    }
}

/// Look up the user group id for a support handle (without the leading `@`).
pub fn resolve_usergroup_id(api: &dyn ChatApi, handle: &str) -> Result<String> {
    api.list_usergroups()?
        .into_iter()
        .find(|group| group.handle == handle)
        .map(|group| group.id)
        .ok_or_else(|| AppError::UsergroupNotFound(handle.to_string()))
}

/// Collect every search match for `query`, oldest first, across all result
/// pages. A failed page aborts the whole collection.
pub fn collect_mentions(
    api: &dyn ChatApi,
    query: &str,
    excluded_handles: &[String],
) -> Result<Vec<Mention>> {
    let mut mentions = Vec::new();
    let mut page_num = 1;

    loop {
        let page = api.search_messages(query, page_num, PAGE_SIZE)?;
        debug!(
            page = page.pagination.page,
            page_count = page.pagination.page_count,
            matches = page.matches.len(),
            "fetched search page"
        );

        for m in page.matches {
            let excluded = m
                .username
                .as_ref()
                .is_some_and(|name| excluded_handles.contains(name));
            if excluded {
                continue;
            }
            if let Some(mention) = Mention::from_match(m)? {
                mentions.push(mention);
            }
        }

        if page.pagination.page >= page.pagination.page_count {
            break;
        }
        page_num = page.pagination.page + 1;
    }

    info!(count = mentions.len(), "collected mentions");
    Ok(mentions)
}
