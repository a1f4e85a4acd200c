// src/models.rs
//! Record, comment, and RRSet models plus the canonicalization and wire
//! serialization rules the zone operations rely on.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// A single record inside an RRSet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub content: String, // "192.0.2.1" or "ns1.example.net."
    #[serde(default)]
    pub disabled: bool,
}

impl Record {
    pub fn new(content: impl Into<String>) -> Result<Self> {
        Self::with_disabled(content, false)
    }

    pub fn with_disabled(content: impl Into<String>, disabled: bool) -> Result<Self> {
        let content = content.into();
        if content.is_empty() {
            return Err(Error::validation("record content must not be empty"));
        }
        Ok(Record { content, disabled })
    }
}

impl TryFrom<Value> for Record {
    type Error = Error;

    /// Dispatch over the accepted JSON shapes: a bare content string, a
    /// `[content, disabled]` pair, or an object with exactly the key
    /// `content` and optionally `disabled`.
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(content) => Record::new(content),
            Value::Array(items) => {
                let [content, disabled] = <[Value; 2]>::try_from(items).map_err(|items| {
                    Error::validation(format!(
                        "record pair must be [content, disabled], got {}",
                        Value::Array(items)
                    ))
                })?;
                let Value::String(content) = content else {
                    return Err(Error::validation(format!(
                        "record content must be a string, got {content}"
                    )));
                };
                let Value::Bool(disabled) = disabled else {
                    return Err(Error::validation(format!(
                        "record disabled flag must be a boolean, got {disabled}"
                    )));
                };
                Record::with_disabled(content, disabled)
            }
            Value::Object(map) => {
                for key in map.keys() {
                    if key != "content" && key != "disabled" {
                        return Err(Error::validation(format!(
                            "record object has unexpected key {key:?}"
                        )));
                    }
                }
                let content = match map.get("content") {
                    Some(Value::String(content)) => content.clone(),
                    Some(other) => {
                        return Err(Error::validation(format!(
                            "record content must be a string, got {other}"
                        )));
                    }
                    None => {
                        return Err(Error::validation("record object is missing 'content'"));
                    }
                };
                let disabled = match map.get("disabled") {
                    Some(Value::Bool(disabled)) => *disabled,
                    Some(other) => {
                        return Err(Error::validation(format!(
                            "record disabled flag must be a boolean, got {other}"
                        )));
                    }
                    None => false,
                };
                Record::with_disabled(content, disabled)
            }
            other => Err(Error::validation(format!(
                "unsupported record shape: {other}"
            ))),
        }
    }
}

/// The shapes accepted wherever records are handed in: [`RRSet::new`]
/// normalizes every input into a [`Record`] or fails with
/// [`Error::Validation`].
#[derive(Debug, Clone)]
pub enum RecordInput {
    Content(String),
    Pair(String, bool),
    Record(Record),
    Json(Value),
}

impl RecordInput {
    fn into_record(self) -> Result<Record> {
        match self {
            RecordInput::Content(content) => Record::new(content),
            RecordInput::Pair(content, disabled) => Record::with_disabled(content, disabled),
            RecordInput::Record(record) => Ok(record),
            RecordInput::Json(value) => Record::try_from(value),
        }
    }
}

impl From<&str> for RecordInput {
    fn from(content: &str) -> Self {
        RecordInput::Content(content.to_string())
    }
}

impl From<String> for RecordInput {
    fn from(content: String) -> Self {
        RecordInput::Content(content)
    }
}

impl From<(&str, bool)> for RecordInput {
    fn from((content, disabled): (&str, bool)) -> Self {
        RecordInput::Pair(content.to_string(), disabled)
    }
}

impl From<(String, bool)> for RecordInput {
    fn from((content, disabled): (String, bool)) -> Self {
        RecordInput::Pair(content, disabled)
    }
}

impl From<Record> for RecordInput {
    fn from(record: Record) -> Self {
        RecordInput::Record(record)
    }
}

impl From<Value> for RecordInput {
    fn from(value: Value) -> Self {
        RecordInput::Json(value)
    }
}

/// A comment attached to an RRSet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub content: String,
    #[serde(default)]
    pub account: String,
    /// Unix timestamp of the last change to the comment.
    #[serde(default = "now_timestamp")]
    pub modified_at: i64,
}

impl Comment {
    /// New comment with an empty account, modified now.
    pub fn new(content: impl Into<String>) -> Self {
        Comment {
            content: content.into(),
            account: String::new(),
            modified_at: now_timestamp(),
        }
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    pub fn with_modified_at(mut self, modified_at: i64) -> Self {
        self.modified_at = modified_at;
        self
    }
}

fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// API keyword attached to an RRSet mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Changetype {
    #[default]
    Replace,
    Delete,
}

impl fmt::Display for Changetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Changetype::Replace => f.write_str("REPLACE"),
            Changetype::Delete => f.write_str("DELETE"),
        }
    }
}

/// A resource record set: all records sharing a name, type, and TTL.
///
/// Serializes to the wire shape the zones endpoint expects, with the
/// record type under the field name `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RRSet {
    pub name: String, // "www.example.com."
    #[serde(rename = "type")]
    pub rtype: String, // "A", "CNAME", ...
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    #[serde(default)]
    pub changetype: Changetype,
    pub records: Vec<Record>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

fn default_ttl() -> u32 {
    3600
}

impl RRSet {
    /// Build an RRSet with the default TTL (3600) and changetype
    /// (REPLACE), normalizing every record input per [`RecordInput`].
    pub fn new<N, T, I>(name: N, rtype: T, records: I) -> Result<Self>
    where
        N: Into<String>,
        T: Into<String>,
        I: IntoIterator,
        I::Item: Into<RecordInput>,
    {
        let records = records
            .into_iter()
            .map(|record| record.into().into_record())
            .collect::<Result<Vec<_>>>()?;
        Ok(RRSet {
            name: name.into(),
            rtype: rtype.into(),
            ttl: default_ttl(),
            changetype: Changetype::default(),
            records,
            comments: Vec::new(),
        })
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_changetype(mut self, changetype: Changetype) -> Self {
        self.changetype = changetype;
        self
    }

    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments;
        self
    }

    /// Make the record name canonical by appending `zone` when the name
    /// does not already end in `.`; for CNAME sets the record contents
    /// are treated the same way. `zone` itself must be canonical.
    ///
    /// The mutation cannot be reverted, and re-applying with a different
    /// zone would suffix again, so callers pass the owning zone only.
    pub fn ensure_canonical(&mut self, zone: &str) -> Result<()> {
        if !zone.ends_with('.') {
            return Err(Error::canonical(zone));
        }
        if !self.name.ends_with('.') {
            debug!("canonicalizing {} with {}", self.name, zone);
            self.name = format!("{}.{}", self.name, zone);
        }
        if self.rtype == "CNAME" {
            for record in &mut self.records {
                if !record.content.ends_with('.') {
                    debug!("canonicalizing {} with {}", record.content, zone);
                    record.content = format!("{}.{}", record.content, zone);
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for RRSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contents: Vec<&str> = self.records.iter().map(|r| r.content.as_str()).collect();
        write!(
            f,
            "(ttl={}) {}  {}  {:?}",
            self.ttl, self.name, self.rtype, contents
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_from_bare_string() {
        let rrset = RRSet::new("example.com.", "A", ["192.0.2.1", "192.0.2.2"]).unwrap();
        assert_eq!(rrset.records.len(), 2);
        assert_eq!(rrset.records[0].content, "192.0.2.1");
        assert!(!rrset.records[0].disabled);
        assert_eq!(rrset.ttl, 3600);
        assert_eq!(rrset.changetype, Changetype::Replace);
        assert!(rrset.comments.is_empty());
    }

    #[test]
    fn record_from_mixed_inputs() {
        let rrset = RRSet::new(
            "example.com.",
            "A",
            [
                json!("192.0.2.1"),
                json!({"content": "192.0.2.2", "disabled": true}),
                json!("192.0.2.3"),
            ],
        )
        .unwrap();
        let disabled: Vec<bool> = rrset.records.iter().map(|r| r.disabled).collect();
        assert_eq!(disabled, vec![false, true, false]);
    }

    #[test]
    fn record_from_pair() {
        let rrset = RRSet::new("example.com.", "A", [("192.0.2.1", true)]).unwrap();
        assert!(rrset.records[0].disabled);
    }

    #[test]
    fn record_object_with_extra_key_fails() {
        let result = RRSet::new(
            "test",
            "TXT",
            [json!({"content": "x", "disabled": false, "foo": "bar"})],
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn record_object_without_content_fails() {
        let result = RRSet::new("test", "TXT", [json!({"disabled": true})]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn record_empty_content_fails() {
        assert!(matches!(Record::new(""), Err(Error::Validation(_))));
    }

    #[test]
    fn record_pair_with_wrong_arity_fails() {
        let result = RRSet::new("test", "TXT", [json!(["x", true, "y"])]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn ensure_canonical_requires_canonical_zone() {
        let mut rrset = RRSet::new("www", "A", ["192.0.2.1"]).unwrap();
        let err = rrset.ensure_canonical("example.org").unwrap_err();
        assert!(matches!(err, Error::Canonical(name) if name == "example.org"));
    }

    #[test]
    fn ensure_canonical_appends_zone() {
        let mut rrset = RRSet::new("www", "A", ["192.0.2.1"]).unwrap();
        rrset.ensure_canonical("example.org.").unwrap();
        assert_eq!(rrset.name, "www.example.org.");
        // non-CNAME contents are untouched
        assert_eq!(rrset.records[0].content, "192.0.2.1");
    }

    #[test]
    fn ensure_canonical_leaves_canonical_names_alone() {
        let mut rrset = RRSet::new("www.example.org.", "A", ["192.0.2.1"]).unwrap();
        rrset.ensure_canonical("example.org.").unwrap();
        rrset.ensure_canonical("example.org.").unwrap();
        assert_eq!(rrset.name, "www.example.org.");
    }

    #[test]
    fn ensure_canonical_rewrites_cname_contents() {
        let mut rrset = RRSet::new("www", "CNAME", ["example.com"]).unwrap();
        rrset.ensure_canonical("example.org.").unwrap();
        assert_eq!(rrset.name, "www.example.org.");
        assert_eq!(rrset.records[0].content, "example.com.example.org.");
    }

    #[test]
    fn comment_defaults() {
        let comment = Comment::new("a note");
        assert_eq!(comment.account, "");
        assert!(comment.modified_at > 0);

        let pinned = Comment::new("a note")
            .with_account("admin")
            .with_modified_at(1625097600);
        assert_eq!(
            serde_json::to_value(&pinned).unwrap(),
            json!({"content": "a note", "account": "admin", "modified_at": 1625097600})
        );
    }

    #[test]
    fn wire_serialization_uses_type_field() {
        let records = vec![
            RecordInput::from("192.0.2.1"),
            RecordInput::from(("192.0.2.2", true)),
        ];
        let rrset = RRSet::new("example.com.", "A", records)
            .unwrap()
            .with_ttl(300);
        let wire = serde_json::to_value(&rrset).unwrap();
        assert_eq!(
            wire,
            json!({
                "name": "example.com.",
                "type": "A",
                "ttl": 300,
                "changetype": "REPLACE",
                "records": [
                    {"content": "192.0.2.1", "disabled": false},
                    {"content": "192.0.2.2", "disabled": true},
                ],
                "comments": [],
            })
        );
        assert!(wire.get("rtype").is_none());
    }

    #[test]
    fn wire_deserialization_fills_defaults() {
        let rrset: RRSet = serde_json::from_value(json!({
            "name": "example.com.",
            "type": "NS",
            "records": [{"content": "ns1.example.net."}],
        }))
        .unwrap();
        assert_eq!(rrset.ttl, 3600);
        assert_eq!(rrset.changetype, Changetype::Replace);
        assert!(rrset.comments.is_empty());
        assert!(!rrset.records[0].disabled);
    }

    #[test]
    fn changetype_wire_keywords() {
        assert_eq!(serde_json::to_value(Changetype::Delete).unwrap(), "DELETE");
        assert_eq!(Changetype::Replace.to_string(), "REPLACE");
    }

    #[test]
    fn display_is_compact() {
        let rrset = RRSet::new("example.com.", "A", ["192.0.2.1"]).unwrap();
        assert_eq!(
            rrset.to_string(),
            "(ttl=3600) example.com.  A  [\"192.0.2.1\"]"
        );
    }
}
