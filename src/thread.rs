use chrono::NaiveDateTime;
use tracing::debug;

use crate::permalink::parse_thread_ref;
use crate::slack::{ChatApi, ThreadMessage, parse_slack_ts};
use crate::{AppError, Result};

/// Who asked, who answered first and when the thread last moved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadRecord {
    pub asker_id: Option<String>,
    pub ask_ts: Option<NaiveDateTime>,
    pub responder_id: Option<String>,
    pub respond_ts: Option<NaiveDateTime>,
    pub last_ts: Option<NaiveDateTime>,
}

/// Walk the thread a permalink points into.
///
/// Returns `Ok(None)` when the permalink carries no thread reference.
pub fn resolve_thread(api: &dyn ChatApi, permalink: &str) -> Result<Option<ThreadRecord>> {
    let Some(thread) = parse_thread_ref(permalink) else {
        debug!(permalink, "permalink has no thread reference");
        return Ok(None);
    };

    let messages = api.conversation_replies(&thread.channel, &thread.thread_ts)?;
    let Some((root, replies)) = messages.split_first() else {
        return Err(AppError::EmptyThread {
            channel: thread.channel,
            thread_ts: thread.thread_ts,
        });
    };

    let asker_id = root.user.clone();
    let (responder_id, respond_ts) = match first_responder(replies, asker_id.as_deref())? {
        Some((id, ts)) => (Some(id), Some(ts)),
        None => (None, None),
    };

    debug!(
        channel = %thread.channel,
        thread_ts = %thread.thread_ts,
        replies = replies.len(),
        answered = responder_id.is_some(),
        "resolved thread"
    );

    Ok(Some(ThreadRecord {
        asker_id,
        ask_ts: Some(parse_slack_ts(&root.ts)?),
        responder_id,
        respond_ts,
        last_ts: root.latest_reply.as_deref().map(parse_slack_ts).transpose()?,
    }))
}

/// The first reply written by someone other than the asker.
pub fn first_responder(
    replies: &[ThreadMessage],
    asker_id: Option<&str>,
) -> Result<Option<(String, NaiveDateTime)>> {
    replies
        .iter()
        .find_map(|reply| {
            reply
                .user
                .as_deref()
                .filter(|user| Some(*user) != asker_id)
                .map(|user| (user, reply))
        })
        .map(|(user, reply)| parse_slack_ts(&reply.ts).map(|ts| (user.to_string(), ts)))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::tests::FakeSlack;

    const PERMALINK: &str =
        "https://acme.slack.com/archives/C1/p1572988000000200?thread_ts=1572987930.000100&cid=C1";

    fn message(user: &str, ts: &str) -> ThreadMessage {
        ThreadMessage {
            user: Some(user.to_string()),
            ts: ts.to_string(),
            latest_reply: None,
        }
    }

    fn root(user: &str, ts: &str, latest_reply: Option<&str>) -> ThreadMessage {
        ThreadMessage {
            latest_reply: latest_reply.map(str::to_string),
            ..message(user, ts)
        }
    }

    fn fake_with_thread(messages: Vec<ThreadMessage>) -> FakeSlack {
        let mut api = FakeSlack::default();
        api.threads.insert(
            ("C1".to_string(), "1572987930.000100".to_string()),
            messages,
        );
        api
    }

    #[test]
    fn test_first_responder_skips_asker_replies() {
        let replies = vec![
            message("U1", "1572987940.000000"),
            message("U1", "1572987950.000000"),
            message("U2", "1572987960.000000"),
            message("U3", "1572987970.000000"),
        ];

        let (responder, ts) = first_responder(&replies, Some("U1")).unwrap().unwrap();
        assert_eq!(responder, "U2");
        assert_eq!(ts, parse_slack_ts("1572987960.000000").unwrap());
    }

    #[test]
    fn test_first_responder_only_asker_replied() {
        let replies = vec![
            message("U1", "1572987940.000000"),
            message("U1", "1572987950.000000"),
        ];

        assert_eq!(first_responder(&replies, Some("U1")).unwrap(), None);
    }

    #[test]
    fn test_first_responder_no_replies() {
        assert_eq!(first_responder(&[], Some("U1")).unwrap(), None);
    }

    #[test]
    fn test_first_responder_ignores_replies_without_author() {
        let replies = vec![
            ThreadMessage {
                user: None,
                ts: "1572987940.000000".to_string(),
                latest_reply: None,
            },
            message("U2", "1572987950.000000"),
        ];

        let (responder, _) = first_responder(&replies, Some("U1")).unwrap().unwrap();
        assert_eq!(responder, "U2");
    }

    #[test]
    fn test_resolve_thread_answered() {
        let api = fake_with_thread(vec![
            root("U1", "1572987930.000100", Some("1572990000.000300")),
            message("U1", "1572987990.000000"),
            message("U2", "1572988000.000200"),
            message("U1", "1572990000.000300"),
        ]);

        let record = resolve_thread(&api, PERMALINK).unwrap().unwrap();
        assert_eq!(record.asker_id.as_deref(), Some("U1"));
        assert_eq!(record.ask_ts, Some(parse_slack_ts("1572987930").unwrap()));
        assert_eq!(record.responder_id.as_deref(), Some("U2"));
        assert_eq!(record.respond_ts, Some(parse_slack_ts("1572988000").unwrap()));
        assert_eq!(record.last_ts, Some(parse_slack_ts("1572990000").unwrap()));
    }

    #[test]
    fn test_resolve_thread_unanswered() {
        let api = fake_with_thread(vec![
            root("U1", "1572987930.000100", Some("1572987990.000000")),
            message("U1", "1572987990.000000"),
        ]);

        let record = resolve_thread(&api, PERMALINK).unwrap().unwrap();
        assert_eq!(record.asker_id.as_deref(), Some("U1"));
        assert!(record.responder_id.is_none());
        assert!(record.respond_ts.is_none());
        assert!(record.last_ts.is_some());
    }

    #[test]
    fn test_resolve_thread_is_idempotent() {
        let api = fake_with_thread(vec![
            root("U1", "1572987930.000100", Some("1572988000.000200")),
            message("U2", "1572988000.000200"),
        ]);

        let first = resolve_thread(&api, PERMALINK).unwrap();
        let second = resolve_thread(&api, PERMALINK).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_thread_without_thread_reference() {
        let api = FakeSlack::default();

        let record =
            resolve_thread(&api, "https://acme.slack.com/archives/C1/p1572987930000100").unwrap();
        assert!(record.is_none());
        assert_eq!(*api.replies_calls.borrow(), 0);
    }

    #[test]
    fn test_resolve_thread_empty_reply_list() {
        let api = fake_with_thread(Vec::new());

        let result = resolve_thread(&api, PERMALINK);
        assert!(matches!(result, Err(AppError::EmptyThread { .. })));
    }

    #[test]
    fn test_resolve_thread_fetch_error_propagates() {
        let api = FakeSlack::default();

        let result = resolve_thread(&api, PERMALINK);
        assert!(matches!(result, Err(AppError::SlackApi(_))));
    }
}
