//! Flattening of response+user records into a tabular row set
//!
//! Headers come from the schema registry in questionnaire order, prefixed
//! by the identity columns. Wide mode expands each multi-choice question
//! into one binary column per known option; observed values outside the
//! known option list are dropped there (the schema is authoritative).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use smes_common::answers::AnswerValue;
use smes_common::db::{ResponseRecord, UserRecord};
use smes_common::schema::{self, InputKind};

/// Which responses to include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportScope {
    #[default]
    All,
    /// Only responses whose owning user has the submitted flag
    Completed,
    /// Only responses without a submitted owner (including orphans)
    Incomplete,
}

/// One cell of the exported table
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
}

impl Cell {
    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(n) => n.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

/// The built table: header row plus one row per exported response
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

const IDENTITY_COLUMNS: &[&str] = &["User_ID", "Email", "Name", "Status", "Submitted_At"];

/// Column name for one option of a one-hot expanded multi-choice question
fn one_hot_column(key: &str, option: &str) -> String {
    let alnum: String = option.chars().filter(char::is_ascii_alphanumeric).collect();
    format!("{}_{}", key, alnum)
}

fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Narrow-mode rendering of an answer value (lists joined with `" | "`)
pub fn narrow_value(value: Option<&AnswerValue>) -> String {
    match value {
        None => String::new(),
        Some(AnswerValue::One(s)) => s.clone(),
        Some(AnswerValue::Many(v)) => v.join(" | "),
    }
}

/// Flatten the snapshot into headers and rows
pub fn build_rows(
    responses: &[ResponseRecord],
    users: &[UserRecord],
    scope: ExportScope,
    wide: bool,
) -> RowSet {
    let users_by_id: HashMap<&str, &UserRecord> =
        users.iter().map(|u| (u.id.as_str(), u)).collect();

    let mut headers: Vec<String> = IDENTITY_COLUMNS.iter().map(|c| c.to_string()).collect();
    for q in schema::questions() {
        if wide && q.kind == InputKind::MultiChoice {
            for option in q.options.unwrap_or_default() {
                headers.push(one_hot_column(q.key, option));
            }
        } else {
            headers.push(q.key.to_string());
        }
        if q.allow_comment {
            headers.push(schema::comment_key(q.key));
        }
    }

    let included = responses.iter().filter(|r| {
        let submitted = users_by_id.get(r.id.as_str()).is_some_and(|u| u.submitted);
        match scope {
            ExportScope::All => true,
            ExportScope::Completed => submitted,
            ExportScope::Incomplete => !submitted,
        }
    });

    let mut rows = Vec::new();
    for response in included {
        let user = users_by_id.get(response.id.as_str());

        let mut row: Vec<Cell> = vec![
            Cell::Text(response.id.clone()),
            Cell::Text(user.map(|u| u.email.clone()).unwrap_or_default()),
            Cell::Text(user.map(|u| u.name.clone()).unwrap_or_default()),
            Cell::Text(
                if user.is_some_and(|u| u.submitted) {
                    "Completed"
                } else {
                    "In Progress"
                }
                .to_string(),
            ),
            Cell::Text(format_timestamp(user.and_then(|u| u.submitted_at))),
        ];

        for q in schema::questions() {
            let value = response.answers.get(q.key);
            if wide && q.kind == InputKind::MultiChoice {
                let selected: Vec<&String> = value
                    .filter(|v| !v.is_empty())
                    .map(|v| v.as_list().collect())
                    .unwrap_or_default();
                for option in q.options.unwrap_or_default() {
                    let hit = selected.iter().any(|s| s.as_str() == *option);
                    row.push(Cell::Int(hit as i64));
                }
            } else {
                row.push(Cell::Text(narrow_value(value)));
            }
            if q.allow_comment {
                let comment = response.answers.get(&schema::comment_key(q.key));
                row.push(Cell::Text(narrow_value(comment)));
            }
        }

        rows.push(row);
    }

    RowSet { headers, rows }
}

/// The codebook sheet: one row per exported column group, describing the
/// question behind it
pub fn codebook_rows() -> RowSet {
    let headers = vec![
        "Column Name".to_string(),
        "Label".to_string(),
        "Question Text".to_string(),
        "Options".to_string(),
    ];

    let mut rows = Vec::new();
    for q in schema::questions() {
        rows.push(vec![
            Cell::from(q.key),
            Cell::from(q.label),
            Cell::from(q.prompt),
            Cell::Text(
                q.options
                    .map(|opts| opts.join("; "))
                    .unwrap_or_else(|| "Free text".to_string()),
            ),
        ]);
        if q.allow_comment {
            rows.push(vec![
                Cell::Text(schema::comment_key(q.key)),
                Cell::Text(format!("{} Comment", q.label)),
                Cell::from("Optional comment"),
                Cell::from("Free text"),
            ]);
        }
    }

    RowSet { headers, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use smes_common::answers::AnswerMap;

    fn user(id: &str, submitted: bool) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            name: format!("Name {}", id),
            email: format!("{}@example.lk", id),
            submitted,
            submitted_at: submitted.then(Utc::now),
            created_at: Utc::now(),
        }
    }

    fn response(id: &str, entries: &[(&str, AnswerValue)]) -> ResponseRecord {
        let mut answers = AnswerMap::new();
        for (k, v) in entries {
            answers.insert(k.to_string(), v.clone());
        }
        ResponseRecord {
            id: id.to_string(),
            answers,
            submitted_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_headers_follow_registry_order() {
        let set = build_rows(&[], &[], ExportScope::All, false);
        assert_eq!(&set.headers[..5], IDENTITY_COLUMNS);
        assert_eq!(set.headers[5], "grade");
        // Comment columns sit beside their question
        let idx = set
            .headers
            .iter()
            .position(|h| h == "misleading_content")
            .unwrap();
        assert_eq!(set.headers[idx + 1], "misleading_content_comment");
    }

    #[test]
    fn test_scope_filters_on_owner_flag() {
        let users = vec![user("a", true), user("b", false)];
        let responses = vec![
            response("a", &[("grade", "Grade 11".into())]),
            response("b", &[("grade", "Grade 12".into())]),
            // Orphan response counts as not submitted
            response("c", &[("grade", "Grade 13".into())]),
        ];

        let completed = build_rows(&responses, &users, ExportScope::Completed, false);
        assert_eq!(completed.rows.len(), 1);
        assert_eq!(completed.rows[0][0], Cell::from("a"));

        let incomplete = build_rows(&responses, &users, ExportScope::Incomplete, false);
        assert_eq!(incomplete.rows.len(), 2);

        let all = build_rows(&responses, &users, ExportScope::All, false);
        assert_eq!(all.rows.len(), 3);
    }

    #[test]
    fn test_wide_mode_one_hot_encoding() {
        let users = vec![user("a", true)];
        let responses = vec![response(
            "a",
            &[(
                "ethics_meaning",
                AnswerValue::from(vec!["Honest", "Not harming", "Unlisted value"]),
            )],
        )];

        let set = build_rows(&responses, &users, ExportScope::All, true);

        // One column per known option, none for the unknown value
        let known = ["Honest", "Fair", "Responsible", "Not harming", "Dont know"];
        for option in known {
            let column = one_hot_column("ethics_meaning", option);
            assert!(set.headers.contains(&column), "missing column {}", column);
        }
        assert!(!set.headers.iter().any(|h| h.contains("Unlisted")));
        // The narrow column is replaced, not kept alongside
        assert!(!set.headers.iter().any(|h| h == "ethics_meaning"));

        let row = &set.rows[0];
        let cell = |name: &str| {
            let idx = set.headers.iter().position(|h| h == name).unwrap();
            row[idx].clone()
        };
        assert_eq!(cell(&one_hot_column("ethics_meaning", "Honest")), Cell::Int(1));
        assert_eq!(cell(&one_hot_column("ethics_meaning", "Fair")), Cell::Int(0));
        assert_eq!(
            cell(&one_hot_column("ethics_meaning", "Not harming")),
            Cell::Int(1)
        );
    }

    #[test]
    fn test_narrow_mode_joins_lists() {
        let users = vec![user("a", true)];
        let responses = vec![response(
            "a",
            &[("ethics_meaning", AnswerValue::from(vec!["Honest", "Fair"]))],
        )];

        let set = build_rows(&responses, &users, ExportScope::All, false);
        let idx = set.headers.iter().position(|h| h == "ethics_meaning").unwrap();
        assert_eq!(set.rows[0][idx], Cell::from("Honest | Fair"));
    }

    #[test]
    fn test_missing_answers_export_as_empty() {
        let users = vec![user("a", false)];
        let responses = vec![response("a", &[])];

        let set = build_rows(&responses, &users, ExportScope::All, false);
        let idx = set.headers.iter().position(|h| h == "grade").unwrap();
        assert_eq!(set.rows[0][idx], Cell::from(""));
        assert_eq!(set.rows[0][3], Cell::from("In Progress"));
        // No submitted timestamp
        assert_eq!(set.rows[0][4], Cell::from(""));
    }

    #[test]
    fn test_codebook_covers_all_questions() {
        let set = codebook_rows();
        assert_eq!(set.headers.len(), 4);
        let keys: Vec<String> = set.rows.iter().map(|r| r[0].as_text()).collect();
        for q in schema::questions() {
            assert!(keys.contains(&q.key.to_string()));
        }
        assert!(keys.contains(&"laws_adequate_comment".to_string()));
    }
}
