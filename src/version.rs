//! Project version derivation.
//!
//! The version string is derived from a [`RepoSnapshot`] in three tiers:
//!
//! 1. **Tag**: the describe string matches the tag grammar, e.g. `v1.2.3` or
//!    `release-1.2-5-g<40 hex digits>`. The version body (and commit distance
//!    suffix, if any) is used as written.
//! 2. **Branch name**: the branch matches the branch grammar, e.g.
//!    `release-2.0`. The version becomes `<body>.0.<unix time>`.
//! 3. **Fallback**: `0.0.<unix time>`.
//!
//! `-dirty` and then `-untracked` are appended to whatever tier produced the
//! version.
//!
//! # Grammar
//!
//! Both grammars start the same way:
//!
//! ```text
//! prefix    := "r" | "rel" | "release" | "v" | "ver" | "version"   (any case)
//! separator := "-" | "/"
//! body      := ( digit | "a" | "b" | "c" | "." )+
//! ```
//!
//! ```text
//! tag    := [prefix] [separator] body [ "-" digit+ "-g" hex{40} ]
//! branch := [prefix] [separator] body
//! ```
//!
//! Whitespace between tokens is skipped. A grammar only matches when it
//! consumes the whole input.

use std::fmt;

use chrono::{
    DateTime,
    Utc,
};

use crate::repo::RepoSnapshot;

/// Release prefixes accepted in front of a version body.
const RELEASE_PREFIXES: [&str; 6] = ["r", "rel", "release", "v", "ver", "version"];

/// Length of a full commit id in the describe suffix.
const COMMIT_ID_LEN: usize = 40;

/// Where the project version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// The describe string matched the tag grammar.
    Tag,
    /// The branch name matched the branch grammar.
    BranchName,
    /// Neither grammar matched; the version is `0.0.<time>`.
    Fallback,
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Tag => "tag",
            Self::BranchName => "branch name",
            Self::Fallback => "fallback",
        };
        f.write_str(text)
    }
}

/// Version information derived from a repository snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// The project version, including `-dirty`/`-untracked` suffixes.
    pub proj_version: String,
    pub proj_version_from: VersionSource,
    pub commit_hash: String,
    pub branch: String,
    pub describe: String,
    pub dirty: bool,
    pub untracked_count: usize,
    /// Unix time (seconds) the version was derived at.
    pub timestamp: i64,
    /// `timestamp` rendered like C's `asctime` in UTC.
    pub time_str: String,
    /// Short host name of the machine running the build.
    pub build_host: String,
}

/// Derive version information using the current time.
pub fn derive(snapshot: &RepoSnapshot) -> VersionInfo {
    derive_at(snapshot, Utc::now())
}

/// Derive version information as of `now`.
///
/// Never fails: inputs that match neither grammar fall back to
/// `0.0.<unix time>`.
pub fn derive_at(snapshot: &RepoSnapshot, now: DateTime<Utc>) -> VersionInfo {
    let timestamp = now.timestamp();

    let (mut proj_version, proj_version_from) =
        if let Some(version) = match_tag(&snapshot.describe) {
            (version, VersionSource::Tag)
        } else if let Some(body) = match_branch(&snapshot.branch) {
            (format!("{}.0.{}", body, timestamp), VersionSource::BranchName)
        } else {
            (format!("0.0.{}", timestamp), VersionSource::Fallback)
        };

    // `-dirty` always precedes `-untracked`.
    if snapshot.dirty {
        proj_version.push_str("-dirty");
    }
    if snapshot.untracked_count > 0 {
        proj_version.push_str("-untracked");
    }

    VersionInfo {
        proj_version,
        proj_version_from,
        commit_hash: snapshot.commit_hash.clone(),
        branch: snapshot.branch.clone(),
        describe: snapshot.describe.clone(),
        dirty: snapshot.dirty,
        untracked_count: snapshot.untracked_count,
        timestamp,
        time_str: now.format("%a %b %e %H:%M:%S %Y").to_string(),
        build_host: short_host_name(),
    }
}

/// Match a describe string against the tag grammar.
///
/// Returns the version body followed by the commit distance suffix exactly as
/// written, e.g. `1.2.3-5-g<commit>`.
pub fn match_tag(describe: &str) -> Option<String> {
    match_prefixed(describe, |rest| {
        let (body, rest) = split_body(rest)?;
        let rest = rest.trim();
        if rest.is_empty() {
            return Some(body.to_string());
        }
        commit_distance_suffix(rest).map(|suffix| format!("{}{}", body, suffix))
    })
}

/// Match a branch name against the branch grammar, returning the version body.
pub fn match_branch(branch: &str) -> Option<&str> {
    match_prefixed(branch, |rest| {
        let (body, rest) = split_body(rest)?;
        rest.trim().is_empty().then_some(body)
    })
}

/// Try `tail` on what follows every allowed prefix/separator combination.
fn match_prefixed<'a, T>(input: &'a str, tail: impl Fn(&'a str) -> Option<T>) -> Option<T> {
    let input = input.trim_start();

    let mut heads = vec![input];
    heads.extend(
        RELEASE_PREFIXES
            .iter()
            .filter_map(|prefix| strip_prefix_ignore_case(input, prefix)),
    );

    heads.into_iter().find_map(|head| {
        let head = head.trim_start();
        head.strip_prefix(['-', '/'])
            .and_then(|rest| tail(rest.trim_start()))
            .or_else(|| tail(head))
    })
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &input[prefix.len()..])
}

fn is_body_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, 'a' | 'b' | 'c' | '.')
}

/// Split the leading version body off `input`; `None` if there is none.
fn split_body(input: &str) -> Option<(&str, &str)> {
    let end = input
        .find(|c: char| !is_body_char(c))
        .unwrap_or(input.len());
    (end > 0).then(|| input.split_at(end))
}

/// Validate a `-<distance>-g<commit id>` suffix and return it unchanged.
///
/// The commit id must be a full 40 digit lowercase hex id; describe output
/// with any other abbreviation length does not match.
fn commit_distance_suffix(input: &str) -> Option<&str> {
    let (distance, commit_id) = input.strip_prefix('-')?.split_once("-g")?;

    let distance_ok = !distance.is_empty() && distance.bytes().all(|b| b.is_ascii_digit());
    let commit_ok = commit_id.len() == COMMIT_ID_LEN
        && commit_id
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));

    (distance_ok && commit_ok).then_some(input)
}

/// Host name up to the first dot, or `unknown`.
fn short_host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|os| os.into_string().ok())
        .and_then(|host| host.split('.').next().map(str::to_string))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
