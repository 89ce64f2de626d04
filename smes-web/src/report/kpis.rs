//! Headline dashboard numbers

use std::collections::HashSet;

use serde::Serialize;

use smes_common::db::{ResponseRecord, UserRecord};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Kpis {
    pub total_users: u64,
    pub completed: u64,
    /// Rounded percentage, 0 when no users are registered
    pub completion_rate: u32,
    pub drop_off_rate: u32,
    /// Distinct non-empty district values across all responses
    pub districts: u64,
}

pub fn compute_kpis(users: &[UserRecord], responses: &[ResponseRecord]) -> Kpis {
    let total = users.len() as u64;
    let completed = users.iter().filter(|u| u.submitted).count() as u64;
    let incomplete = total - completed;

    let rate = |part: u64| -> u32 {
        if total == 0 {
            0
        } else {
            ((part as f64 / total as f64) * 100.0).round() as u32
        }
    };

    let mut districts: HashSet<&str> = HashSet::new();
    for response in responses {
        if let Some(value) = response.answers.get("district") {
            for district in value.as_list() {
                if !district.is_empty() {
                    districts.insert(district);
                }
            }
        }
    }

    Kpis {
        total_users: total,
        completed,
        completion_rate: rate(completed),
        drop_off_rate: rate(incomplete),
        districts: districts.len() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use smes_common::answers::{AnswerMap, AnswerValue};

    fn user(id: &str, submitted: bool) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            name: format!("User {}", id),
            email: format!("{}@example.lk", id),
            submitted,
            submitted_at: submitted.then(Utc::now),
            created_at: Utc::now(),
        }
    }

    fn response_with_district(id: &str, district: &str) -> ResponseRecord {
        let mut answers = AnswerMap::new();
        if !district.is_empty() {
            answers.insert("district".into(), AnswerValue::One(district.to_string()));
        }
        ResponseRecord {
            id: id.to_string(),
            answers,
            submitted_at: None,
        }
    }

    #[test]
    fn test_rates_over_hundred_users() {
        let users: Vec<UserRecord> = (0..100).map(|i| user(&i.to_string(), i < 60)).collect();
        let responses: Vec<ResponseRecord> = vec![
            response_with_district("0", "Colombo"),
            response_with_district("1", "Kandy"),
            response_with_district("2", "Colombo"),
            response_with_district("3", ""),
        ];

        let kpis = compute_kpis(&users, &responses);
        assert_eq!(kpis.total_users, 100);
        assert_eq!(kpis.completed, 60);
        assert_eq!(kpis.completion_rate, 60);
        assert_eq!(kpis.drop_off_rate, 40);
        assert_eq!(kpis.districts, 2);
    }

    #[test]
    fn test_no_users_yields_zero_rates() {
        let kpis = compute_kpis(&[], &[]);
        assert_eq!(kpis.completion_rate, 0);
        assert_eq!(kpis.drop_off_rate, 0);
        assert_eq!(kpis.districts, 0);
    }
}
