//! Completion funnel over the questionnaire sections
//!
//! Each checkpoint is either a count supplied by the caller (registered
//! users, submitted users) or a list of fields whose joint presence means
//! the participant reached that stage. The output series is not forced to
//! be monotonic; a record satisfying a late checkpoint but not an early
//! one shows up as-is.

use serde::Serialize;

use smes_common::db::ResponseRecord;

/// How a checkpoint's count is obtained
#[derive(Debug, Clone)]
pub enum CheckpointRule {
    /// Value supplied directly by the caller
    Direct(u64),
    /// Count of records where every listed field is present and non-empty
    RequiredFields(&'static [&'static str]),
}

/// A named stage of the completion funnel
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub label: &'static str,
    pub rule: CheckpointRule,
}

/// One computed funnel point
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FunnelStage {
    pub label: String,
    pub count: u64,
}

/// The survey's checkpoint list, anchored by the two direct counts
pub fn survey_checkpoints(users_total: u64, users_completed: u64) -> Vec<Checkpoint> {
    vec![
        Checkpoint {
            label: "Started",
            rule: CheckpointRule::Direct(users_total),
        },
        Checkpoint {
            label: "Demographics",
            rule: CheckpointRule::RequiredFields(&["grade", "district"]),
        },
        Checkpoint {
            label: "Accessibility",
            rule: CheckpointRule::RequiredFields(&["primary_device"]),
        },
        Checkpoint {
            label: "Awareness",
            rule: CheckpointRule::RequiredFields(&["heard_ethics"]),
        },
        Checkpoint {
            label: "Regulation",
            rule: CheckpointRule::RequiredFields(&["know_laws"]),
        },
        Checkpoint {
            label: "Student Voice",
            rule: CheckpointRule::RequiredFields(&["student_voice"]),
        },
        Checkpoint {
            label: "Completed",
            rule: CheckpointRule::Direct(users_completed),
        },
    ]
}

/// Compute one integer per checkpoint
pub fn compute_funnel(
    checkpoints: &[Checkpoint],
    responses: &[ResponseRecord],
) -> Vec<FunnelStage> {
    checkpoints
        .iter()
        .map(|checkpoint| {
            let count = match &checkpoint.rule {
                CheckpointRule::Direct(n) => *n,
                CheckpointRule::RequiredFields(fields) => responses
                    .iter()
                    .filter(|r| {
                        fields.iter().all(|field| {
                            r.answers.get(*field).is_some_and(|v| !v.is_empty())
                        })
                    })
                    .count() as u64,
            };

            FunnelStage {
                label: checkpoint.label.to_string(),
                count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smes_common::answers::{AnswerMap, AnswerValue};

    fn record(id: &str, entries: &[(&str, &str)]) -> ResponseRecord {
        let mut answers = AnswerMap::new();
        for (k, v) in entries {
            answers.insert(k.to_string(), AnswerValue::One(v.to_string()));
        }
        ResponseRecord {
            id: id.to_string(),
            answers,
            submitted_at: None,
        }
    }

    #[test]
    fn test_direct_counts_pass_through() {
        let stages = compute_funnel(&survey_checkpoints(42, 17), &[]);
        assert_eq!(stages.first().unwrap().count, 42);
        assert_eq!(stages.last().unwrap().count, 17);
    }

    #[test]
    fn test_field_checkpoint_requires_all_fields() {
        let responses = vec![
            record("a", &[("grade", "Grade 11"), ("district", "Colombo")]),
            record("b", &[("grade", "Grade 12")]),
            record("c", &[("grade", "Grade 10"), ("district", "")]),
        ];

        let stages = compute_funnel(&survey_checkpoints(3, 0), &responses);
        let demographics = stages.iter().find(|s| s.label == "Demographics").unwrap();
        // Only "a" has both fields non-empty
        assert_eq!(demographics.count, 1);
    }

    #[test]
    fn test_field_checkpoints_bounded_by_started() {
        // Every response belongs to a registered user, so no field-list
        // checkpoint can exceed the Started count. Catches schema drift
        // between the form and the funnel field lists.
        let responses: Vec<ResponseRecord> = (0..5)
            .map(|i| {
                record(
                    &format!("u-{}", i),
                    &[
                        ("grade", "Grade 11"),
                        ("district", "Galle"),
                        ("primary_device", "Smartphone"),
                        ("heard_ethics", "Yes"),
                        ("know_laws", "No"),
                        ("student_voice", "Yes"),
                    ],
                )
            })
            .collect();

        let stages = compute_funnel(&survey_checkpoints(5, 5), &responses);
        let started = stages[0].count;
        for stage in &stages {
            assert!(
                stage.count <= started,
                "{} exceeds Started ({} > {})",
                stage.label,
                stage.count,
                started
            );
        }
    }
}
