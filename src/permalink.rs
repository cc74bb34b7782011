//! Thread references extracted from Slack message permalinks.
//!
//! A threaded permalink looks like
//! `https://acme.slack.com/archives/C024BE91L/p1572988000000200?thread_ts=1572987930.000100&cid=C024BE91L`.
//! The `thread_ts` query value names the thread root, the path segment after
//! `archives` names the channel. Top-level messages carry no `thread_ts`.

use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRef {
    pub channel: String,
    pub thread_ts: String,
}

/// The thread token of a permalink, if it points into a thread.
pub fn thread_ts(permalink: &str) -> Option<String> {
    let (_, query) = permalink.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);

    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "thread_ts")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// The channel id of a permalink, taken from the segment after `archives`.
pub fn channel(permalink: &str) -> Option<String> {
    let path = permalink.split(['?', '#']).next()?;
    let mut segments = path.split('/').skip_while(|segment| *segment != "archives");
    segments.next()?;

    segments
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

pub fn parse_thread_ref(permalink: &str) -> Option<ThreadRef> {
    let thread_ts = thread_ts(permalink)?;
    let channel = channel(permalink)?;
    Some(ThreadRef { channel, thread_ts })
}
