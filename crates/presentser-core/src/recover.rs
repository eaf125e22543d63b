//! Rebuild records from server logs.
//!
//! Every autosave logs a `key=<key> payload=<json>` line. If the record file
//! is lost, replaying those lines recovers the last payload per user.

use crate::record::RecordPatch;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::OnceLock;

static KEY_RE: OnceLock<Regex> = OnceLock::new();

fn key_re() -> &'static Regex {
    KEY_RE.get_or_init(|| Regex::new(r"\bkey=(\S+)").expect("static regex"))
}

/// The message the server logs for every autosave. Recovery reads exactly
/// this shape back.
pub fn autosave_log_line(key: &str, payload: &Value) -> String {
    format!("autosave: saving key={key} payload={payload}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineFailure {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Recovery {
    pub records: BTreeMap<String, RecordPatch>,
    pub failures: Vec<LineFailure>,
}

/// Scan log text for autosave lines. The last payload seen for a key wins.
pub fn recover_from_log(text: &str) -> Recovery {
    let mut out = Recovery::default();
    for (idx, line) in text.lines().enumerate() {
        if !line.contains("autosave") || !line.contains("payload=") {
            continue;
        }
        match parse_line(line) {
            Ok((key, patch)) => {
                out.records.insert(key, patch);
            }
            Err(reason) => out.failures.push(LineFailure {
                line: idx + 1,
                reason,
            }),
        }
    }
    out
}

fn parse_line(line: &str) -> Result<(String, RecordPatch), String> {
    let (before, after) = line
        .split_once("payload=")
        .ok_or_else(|| "missing payload".to_string())?;
    let key = key_re()
        .captures(before)
        .map(|c| c[1].to_string())
        .ok_or_else(|| "missing key".to_string())?;

    let start = after.find('{').ok_or_else(|| "payload has no '{'".to_string())?;
    let end = after.rfind('}').ok_or_else(|| "payload has no '}'".to_string())?;
    if end < start {
        return Err("payload braces out of order".to_string());
    }
    let payload = parse_payload(&after[start..=end])?;
    let patch = RecordPatch::from_payload(&payload);
    let key = patch.username.clone().unwrap_or(key);
    Ok((key, patch))
}

/// Parse a payload object. Older logs printed dict literals with single
/// quotes and `None`/`True`/`False`, which are normalized to JSON first.
fn parse_payload(raw: &str) -> Result<Map<String, Value>, String> {
    if let Ok(map) = serde_json::from_str::<Map<String, Value>>(raw) {
        return Ok(map);
    }
    serde_json::from_str::<Map<String, Value>>(&normalize_dict_literal(raw))
        .map_err(|e| e.to_string())
}

/// Rewrite a dict literal as JSON. Only string delimiters and bare
/// `None`/`True`/`False` tokens change; string contents are kept.
fn normalize_dict_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push('"');
                copy_quoted(&mut chars, c, &mut out);
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !(next.is_ascii_alphanumeric() || next == '_') {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                out.push_str(match word.as_str() {
                    "None" => "null",
                    "True" => "true",
                    "False" => "false",
                    other => other,
                });
            }
            c => out.push(c),
        }
    }
    out
}

/// Copy the body of a string opened by `quote`, emitting a JSON string body
/// and its closing `"`.
fn copy_quoted(chars: &mut Peekable<Chars<'_>>, quote: char, out: &mut String) {
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\'') => out.push('\''),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            '"' if quote == '\'' => out.push_str("\\\""),
            c if c == quote => {
                out.push('"');
                return;
            }
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_json_payload() {
        let log = r#"2026-01-05T10:00:00Z  INFO autosave: saving key=alice payload={"present":30,"total":40,"target":null,"gender":"female","username":"alice","first_name":null}"#;
        let rec = recover_from_log(log);
        assert!(rec.failures.is_empty());
        let alice = &rec.records["alice"];
        assert_eq!(alice.present, Some(30.0));
        assert_eq!(alice.total, Some(40.0));
        assert_eq!(alice.target, None);
        assert_eq!(alice.gender.as_deref(), Some("female"));
    }

    #[test]
    fn recovers_legacy_dict_payload() {
        let log = "INFO:app:autosave: saving key=Ravi payload={'present': '12', 'total': '20', 'target': None, 'gender': 'male', 'username': None, 'first_name': 'Ravi'}";
        let rec = recover_from_log(log);
        let ravi = &rec.records["Ravi"];
        assert_eq!(ravi.present, Some(12.0));
        assert_eq!(ravi.total, Some(20.0));
        assert_eq!(ravi.first_name.as_deref(), Some("Ravi"));
    }

    #[test]
    fn legacy_apostrophe_in_double_quoted_value() {
        let log = r#"INFO:app:autosave: saving key=local payload={'present': '3', 'total': '4', 'username': "D'Souza", 'first_name': None}"#;
        let rec = recover_from_log(log);
        assert!(rec.failures.is_empty(), "{:?}", rec.failures);
        let patch = &rec.records["D'Souza"];
        assert_eq!(patch.present, Some(3.0));
        assert_eq!(patch.first_name, None);
    }

    #[test]
    fn legacy_escaped_quotes_survive() {
        let log = r#"autosave: saving key=x payload={'username': 'O\'Neil', 'first_name': 'say "hi"', 'total': 1}"#;
        let rec = recover_from_log(log);
        assert!(rec.failures.is_empty(), "{:?}", rec.failures);
        assert_eq!(rec.records["O'Neil"].first_name.as_deref(), Some("say \"hi\""));
    }

    #[test]
    fn legacy_keyword_inside_string_is_kept() {
        let log = "autosave: saving key=sam payload={'first_name': 'True', 'gender': 'None', 'target': None, 'present': 1, 'total': 2}";
        let rec = recover_from_log(log);
        let sam = &rec.records["sam"];
        assert_eq!(sam.first_name.as_deref(), Some("True"));
        assert_eq!(sam.gender.as_deref(), Some("None"));
        assert_eq!(sam.target, None);
    }

    #[test]
    fn server_log_line_round_trips() {
        let payload = serde_json::json!({
            "present": "7",
            "total": 9,
            "username": "kiran",
            "first_name": "Kiran D'Costa",
        });
        let log = format!(
            "2026-01-05T10:00:00.000000Z  INFO presentser_server::routes::records: {}\n",
            autosave_log_line("kiran", &payload)
        );
        let rec = recover_from_log(&log);
        assert!(rec.failures.is_empty(), "{:?}", rec.failures);
        let kiran = &rec.records["kiran"];
        assert_eq!(kiran.present, Some(7.0));
        assert_eq!(kiran.total, Some(9.0));
        assert_eq!(kiran.first_name.as_deref(), Some("Kiran D'Costa"));
    }

    #[test]
    fn username_overrides_key_and_last_wins() {
        let log = "\
autosave: saving key=local payload={\"present\": 1, \"total\": 2, \"username\": \" meera \"}
unrelated line
autosave: saving key=meera payload={\"present\": 5, \"total\": 6}";
        let rec = recover_from_log(log);
        assert_eq!(rec.records.len(), 1);
        assert_eq!(rec.records["meera"].present, Some(5.0));
    }

    #[test]
    fn bad_lines_are_reported_not_fatal() {
        let log = "\
autosave: saving key=a payload={broken
autosave payload={\"present\": 1}
autosave: saving key=b payload={\"present\": 2, \"total\": 3}";
        let rec = recover_from_log(log);
        assert_eq!(rec.records.len(), 1);
        assert_eq!(rec.failures.len(), 2);
        assert_eq!(rec.failures[0].line, 1);
        assert_eq!(rec.failures[1].line, 2);
    }

    #[test]
    fn lines_without_autosave_are_ignored() {
        let rec = recover_from_log("GET /api/status payload={\"x\":1}\n");
        assert!(rec.records.is_empty());
        assert!(rec.failures.is_empty());
    }
}
