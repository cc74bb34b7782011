use tracing::{debug, info};

use crate::Result;
use crate::filter::{DateWindow, filter_mentions};
use crate::report::SupportRequestRow;
use crate::search::{collect_mentions, resolve_usergroup_id};
use crate::slack::ChatApi;
use crate::thread::resolve_thread;
use crate::users::fetch_directory;

#[derive(Debug, Clone)]
pub struct TrackerOptions {
    /// Support user group handle, without the leading `@`
    pub support_handle: String,
    pub window: DateWindow,
    pub excluded_handles: Vec<String>,
}

/// Build one row per support request raised against the handle.
///
/// Every stage runs to completion before the next one starts and the first
/// failing Slack call aborts the run.
pub fn run_support_tracker(
    api: &dyn ChatApi,
    options: &TrackerOptions,
    progress: Option<&dyn Fn(&str)>,
) -> Result<Vec<SupportRequestRow>> {
    let report = |message: &str| {
        if let Some(cb) = progress {
            cb(message);
        }
    };

    let identity = api.auth_test()?;
    debug!(user = ?identity.user, team = ?identity.team, "authenticated");

    report("Getting messages with support handle...");
    let query = resolve_usergroup_id(api, &options.support_handle)?;
    let mentions = collect_mentions(api, &query, &options.excluded_handles)?;
    let mentions = filter_mentions(mentions, options.window);
    info!(requests = mentions.len(), "support requests after filtering");

    report("Getting thread of messages...");
    let threads = mentions
        .iter()
        .map(|mention| resolve_thread(api, &mention.permalink))
        .collect::<Result<Vec<_>>>()?;

    let directory = fetch_directory(api)?;

    Ok(mentions
        .into_iter()
        .zip(threads)
        .map(|(mention, thread)| SupportRequestRow::assemble(mention, thread, &directory))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::AppError;
    use crate::search::tests::{FakeSlack, search_match};
    use crate::slack::{SlackUser, SlackUserProfile, SlackUsergroup, ThreadMessage, parse_slack_ts};

    fn user(id: &str, real_name: &str) -> SlackUser {
        SlackUser {
            id: id.to_string(),
            name: real_name.to_lowercase(),
            profile: SlackUserProfile {
                real_name_normalized: Some(real_name.to_string()),
            },
            is_bot: false,
        }
    }

    fn thread_message(user: &str, ts: &str, latest_reply: Option<&str>) -> ThreadMessage {
        ThreadMessage {
            user: Some(user.to_string()),
            ts: ts.to_string(),
            latest_reply: latest_reply.map(str::to_string),
        }
    }

    fn options() -> TrackerOptions {
        TrackerOptions {
            support_handle: "platform-support".to_string(),
            window: DateWindow::default(),
            excluded_handles: vec!["slackbot".to_string()],
        }
    }

    fn workspace() -> FakeSlack {
        let mut api = FakeSlack {
            usergroups: vec![SlackUsergroup {
                id: "S1".to_string(),
                handle: "platform-support".to_string(),
            }],
            users: vec![user("U1", "Alice Anders"), user("U2", "Bob Brown")],
            pages: vec![vec![
                search_match(Some("U1"), "alice", "1572987930.000100", "https://acme.slack.com/archives/C1/p1?thread_ts=1572987930.000100"),
                search_match(Some("U1"), "alice", "1572987990.000000", "https://acme.slack.com/archives/C1/p2?thread_ts=1572987930.000100"),
                search_match(Some("U2"), "bob", "1572990000.000000", "https://acme.slack.com/archives/C2/p3?thread_ts=1572990000.000000"),
            ]],
            ..Default::default()
        };
        api.threads.insert(
            ("C1".to_string(), "1572987930.000100".to_string()),
            vec![
                thread_message("U1", "1572987930.000100", Some("1572988000.000200")),
                thread_message("U1", "1572987990.000000", None),
                thread_message("U2", "1572988000.000200", None),
            ],
        );
        api.threads.insert(
            ("C2".to_string(), "1572990000.000000".to_string()),
            vec![thread_message("U2", "1572990000.000000", None)],
        );
        api
    }

    #[test]
    fn test_run_support_tracker_one_row_per_thread() {
        let api = workspace();

        let rows = run_support_tracker(&api, &options(), None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].thread_ts.as_deref(), Some("1572987930.000100"));
        assert_eq!(rows[1].thread_ts.as_deref(), Some("1572990000.000000"));
        assert!(rows[0].timestamp <= rows[1].timestamp);
        assert_eq!(*api.replies_calls.borrow(), 2);
    }

    #[test]
    fn test_run_support_tracker_resolves_names() {
        let api = workspace();

        let rows = run_support_tracker(&api, &options(), None).unwrap();
        assert_eq!(rows[0].mentioner_name.as_deref(), Some("Alice Anders"));
        assert_eq!(rows[0].asker_name.as_deref(), Some("Alice Anders"));
        assert_eq!(rows[0].responder_name.as_deref(), Some("Bob Brown"));
        assert_eq!(rows[0].respond_ts, Some(parse_slack_ts("1572988000").unwrap()));

        assert_eq!(rows[1].asker_name.as_deref(), Some("Bob Brown"));
        assert!(rows[1].responder_name.is_none());
        assert!(rows[1].last_msg_ts.is_none());
    }

    #[test]
    fn test_run_support_tracker_departed_user_keeps_row() {
        let mut api = workspace();
        api.users.retain(|u| u.id != "U2");

        let rows = run_support_tracker(&api, &options(), None).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].responder_name.is_none());
        assert!(rows[0].respond_ts.is_some());
        assert!(rows[1].mentioner_name.is_none());
    }

    #[test]
    fn test_run_support_tracker_reports_progress() {
        let api = workspace();
        let messages = RefCell::new(Vec::new());
        let record = |m: &str| messages.borrow_mut().push(m.to_string());

        run_support_tracker(&api, &options(), Some(&record)).unwrap();
        assert_eq!(
            *messages.borrow(),
            vec![
                "Getting messages with support handle...",
                "Getting thread of messages...",
            ]
        );
    }

    #[test]
    fn test_run_support_tracker_unknown_handle() {
        let api = workspace();
        let mut options = options();
        options.support_handle = "nobody".to_string();

        let result = run_support_tracker(&api, &options, None);
        assert!(matches!(result, Err(AppError::UsergroupNotFound(_))));
        assert!(api.requested_pages.borrow().is_empty());
    }

    #[test]
    fn test_run_support_tracker_thread_failure_aborts() {
        let mut api = workspace();
        api.threads.clear();

        let result = run_support_tracker(&api, &options(), None);
        assert!(matches!(result, Err(AppError::SlackApi(_))));
    }
}
