//! Chart configuration builder
//!
//! Stateless presentation layer: a pure function from aggregated data to
//! the chart configuration the dashboard page renders. No business logic
//! lives here; empty aggregates simply produce no chart.

use serde::Serialize;

use smes_common::db::ResponseRecord;
use smes_common::schema::{self, InputKind, QuestionDef};

use super::aggregate::aggregate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Doughnut,
    Bar,
    Line,
}

/// Everything the client needs to draw one chart
#[derive(Debug, Clone, Serialize)]
pub struct ChartConfig {
    /// Question key, used as the DOM element id
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

/// Chart form for a question; None for free-text questions
pub fn chart_kind(question: &QuestionDef) -> Option<ChartKind> {
    match question.kind {
        InputKind::MultiChoice => Some(ChartKind::Bar),
        InputKind::SingleChoice => {
            let option_count = question.options.map(<[_]>::len).unwrap_or(0);
            if option_count <= 3 {
                Some(ChartKind::Pie)
            } else if option_count <= 5 {
                Some(ChartKind::Doughnut)
            } else {
                Some(ChartKind::Bar)
            }
        }
        InputKind::FreeText | InputKind::LongText => None,
    }
}

/// Build the chart for one question, or None when the question is
/// free-text or nothing has been observed yet
pub fn chart_for_question(
    responses: &[ResponseRecord],
    question: &QuestionDef,
) -> Option<ChartConfig> {
    let kind = chart_kind(question)?;
    let table = aggregate(responses, question.key);
    if table.is_empty() {
        return None;
    }

    Some(ChartConfig {
        id: question.key.to_string(),
        title: question.label.to_string(),
        kind,
        labels: table.labels(),
        values: table.counts(),
    })
}

/// Charts for every chartable question, in questionnaire order
pub fn all_charts(responses: &[ResponseRecord]) -> Vec<ChartConfig> {
    schema::questions()
        .iter()
        .filter_map(|q| chart_for_question(responses, q))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smes_common::answers::{AnswerMap, AnswerValue};

    fn record(id: &str, key: &str, value: AnswerValue) -> ResponseRecord {
        let mut answers = AnswerMap::new();
        answers.insert(key.to_string(), value);
        ResponseRecord {
            id: id.to_string(),
            answers,
            submitted_at: None,
        }
    }

    #[test]
    fn test_kind_by_option_count() {
        assert_eq!(
            chart_kind(schema::question("heard_ethics").unwrap()),
            Some(ChartKind::Pie)
        );
        assert_eq!(
            chart_kind(schema::question("primary_device").unwrap()),
            Some(ChartKind::Doughnut)
        );
        assert_eq!(
            chart_kind(schema::question("district").unwrap()),
            Some(ChartKind::Bar)
        );
        assert_eq!(
            chart_kind(schema::question("ethics_meaning").unwrap()),
            Some(ChartKind::Bar)
        );
        assert_eq!(chart_kind(schema::question("desired_change").unwrap()), None);
    }

    #[test]
    fn test_empty_aggregate_produces_no_chart() {
        let responses = vec![record("a", "grade", "Grade 11".into())];
        let q = schema::question("trust_level").unwrap();
        assert!(chart_for_question(&responses, q).is_none());
    }

    #[test]
    fn test_chart_carries_table_in_observation_order() {
        let responses = vec![
            record("a", "heard_ethics", "No".into()),
            record("b", "heard_ethics", "Yes".into()),
            record("c", "heard_ethics", "No".into()),
        ];

        let chart = chart_for_question(&responses, schema::question("heard_ethics").unwrap())
            .expect("chart");
        assert_eq!(chart.kind, ChartKind::Pie);
        assert_eq!(chart.labels, vec!["No", "Yes"]);
        assert_eq!(chart.values, vec![2, 1]);
    }

    #[test]
    fn test_free_text_questions_excluded_from_all_charts() {
        let responses = vec![record("a", "desired_change", "More balance".into())];
        let charts = all_charts(&responses);
        assert!(charts.iter().all(|c| c.id != "desired_change"));
    }
}
