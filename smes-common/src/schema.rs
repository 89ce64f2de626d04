//! Survey schema registry
//!
//! The single authoritative definition of the questionnaire. The form
//! validation layer, the aggregator, the chart builder, and the exporter all
//! consume this registry by reference; no consumer keeps its own copy of the
//! question list.

use serde::Serialize;

use crate::answers::{AnswerMap, AnswerValue};

/// How a question is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Exactly one option (radio group or dropdown)
    SingleChoice,
    /// Zero or more options (checkbox group); stored as an ordered list
    MultiChoice,
    /// Short free text
    FreeText,
    /// Multi-line free text
    LongText,
}

/// A single question definition
#[derive(Debug, Clone, Serialize)]
pub struct QuestionDef {
    /// Stable storage key, unique across the questionnaire
    pub key: &'static str,
    /// Short column/chart label
    pub label: &'static str,
    /// Full question text shown to the participant
    pub prompt: &'static str,
    /// Section this question belongs to ("a".."h")
    pub section: &'static str,
    pub kind: InputKind,
    /// Fixed option list; None for free-text questions
    pub options: Option<&'static [&'static str]>,
    pub required: bool,
    /// Whether an optional `<key>_comment` companion field exists
    pub allow_comment: bool,
}

/// Survey section header
#[derive(Debug, Clone, Serialize)]
pub struct SectionDef {
    pub id: &'static str,
    pub title: &'static str,
}

pub const SECTIONS: &[SectionDef] = &[
    SectionDef { id: "a", title: "Demographics" },
    SectionDef { id: "b", title: "Media Access" },
    SectionDef { id: "c", title: "Ethics Awareness" },
    SectionDef { id: "d", title: "Experiences" },
    SectionDef { id: "e", title: "Trust & Impact" },
    SectionDef { id: "f", title: "Laws & Solutions" },
    SectionDef { id: "g", title: "Media Type Ethics Rating" },
    SectionDef { id: "h", title: "Final Thoughts" },
];

const ETHICS_SCALE: &[&str] = &["Very Good", "Good", "Neutral", "Poor", "Very Poor"];
const YES_NO_UNSURE: &[&str] = &["Yes", "No", "Not sure"];

const DISTRICTS: &[&str] = &[
    "Ampara",
    "Anuradhapura",
    "Badulla",
    "Batticaloa",
    "Colombo",
    "Galle",
    "Gampaha",
    "Hambantota",
    "Jaffna",
    "Kalutara",
    "Kandy",
    "Kegalle",
    "Mullaitivu / Kilinochchi / Mannar / Vavuniya",
    "Kurunegala",
    "Matale",
    "Matara",
    "Monaragala",
    "Nuwara Eliya",
    "Polonnaruwa",
    "Puttalam",
    "Ratnapura",
    "Trincomalee",
];

/// The questionnaire, in presentation order.
///
/// Question numbers used in validation messages and the dashboard are
/// positions in this list (1-indexed).
pub const QUESTIONS: &[QuestionDef] = &[
    // Section A - Demographics
    QuestionDef {
        key: "grade",
        label: "Grade",
        prompt: "What grade are you in?",
        section: "a",
        kind: InputKind::SingleChoice,
        options: Some(&["Grade 10", "Grade 11", "Grade 12", "Grade 13"]),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "district",
        label: "District",
        prompt: "Which district are you from?",
        section: "a",
        kind: InputKind::SingleChoice,
        options: Some(DISTRICTS),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "school_type",
        label: "School Type",
        prompt: "What type of school do you attend?",
        section: "a",
        kind: InputKind::SingleChoice,
        options: Some(&[
            "National School",
            "Provincial Council Government School",
            "Private / International School",
        ]),
        required: true,
        allow_comment: false,
    },
    // Section B - Media Access
    QuestionDef {
        key: "primary_device",
        label: "Primary Device",
        prompt: "Primary device for media",
        section: "b",
        kind: InputKind::SingleChoice,
        options: Some(&[
            "Smartphone",
            "Tablet",
            "Laptop / Computer",
            "Television",
            "No device access",
        ]),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "internet_access",
        label: "Internet Access",
        prompt: "How do you access internet?",
        section: "b",
        kind: InputKind::SingleChoice,
        options: Some(&[
            "Home Wi-Fi",
            "Mobile Data",
            "School Internet",
            "Internet Café",
            "Rarely use",
        ]),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "media_hours",
        label: "Media Hours",
        prompt: "Daily media consumption",
        section: "b",
        kind: InputKind::SingleChoice,
        options: Some(&[
            "Less than 1 hour",
            "1-3 hours",
            "3-5 hours",
            "More than 5 hours",
        ]),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "own_device",
        label: "Own Device",
        prompt: "Do you own your device?",
        section: "b",
        kind: InputKind::SingleChoice,
        options: Some(&["Yes", "No", "Shared with family"]),
        required: true,
        allow_comment: false,
    },
    // Section C - Ethics Awareness
    QuestionDef {
        key: "heard_ethics",
        label: "Heard Ethics",
        prompt: "Have you heard of media ethics?",
        section: "c",
        kind: InputKind::SingleChoice,
        options: Some(&["Yes", "Slightly", "No"]),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "ethics_meaning",
        label: "Ethics Meaning",
        prompt: "What does media ethics mean to you?",
        section: "c",
        kind: InputKind::MultiChoice,
        options: Some(&["Honest", "Fair", "Responsible", "Not harming", "Dont know"]),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "ethics_level",
        label: "Ethics Level",
        prompt: "How ethical is Sri Lankan media?",
        section: "c",
        kind: InputKind::SingleChoice,
        options: Some(&[
            "Very ethical",
            "Somewhat ethical",
            "Not very ethical",
            "Not at all ethical",
        ]),
        required: true,
        allow_comment: false,
    },
    // Section D - Experiences
    QuestionDef {
        key: "misleading_content",
        label: "Misleading Content",
        prompt: "Have you seen misleading content?",
        section: "d",
        kind: InputKind::SingleChoice,
        options: Some(YES_NO_UNSURE),
        required: true,
        allow_comment: true,
    },
    QuestionDef {
        key: "unfair_content",
        label: "Unfair Content",
        prompt: "Have you seen unfair content?",
        section: "d",
        kind: InputKind::SingleChoice,
        options: Some(YES_NO_UNSURE),
        required: true,
        allow_comment: true,
    },
    QuestionDef {
        key: "problematic_platform",
        label: "Problematic Platform",
        prompt: "Most problematic platform?",
        section: "d",
        kind: InputKind::SingleChoice,
        options: Some(&[
            "Television",
            "Social Media/Web",
            "Radio",
            "Newspapers",
            "Not sure",
        ]),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "ignored_ethics",
        label: "Ignored Ethics",
        prompt: "Seen ethics violations ignored?",
        section: "d",
        kind: InputKind::SingleChoice,
        options: Some(YES_NO_UNSURE),
        required: true,
        allow_comment: false,
    },
    // Section E - Trust & Impact
    QuestionDef {
        key: "trust_level",
        label: "Trust Level",
        prompt: "Trust in Sri Lankan media",
        section: "e",
        kind: InputKind::SingleChoice,
        options: Some(&["Very high", "Some extent", "Very low", "Not at all"]),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "unethical_trust",
        label: "Unethical vs Trust",
        prompt: "Does unethical content affect trust?",
        section: "e",
        kind: InputKind::SingleChoice,
        options: Some(YES_NO_UNSURE),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "unethical_impact_youth",
        label: "Impact on Youth",
        prompt: "Does unethical content impact youth?",
        section: "e",
        kind: InputKind::SingleChoice,
        options: Some(YES_NO_UNSURE),
        required: true,
        allow_comment: true,
    },
    QuestionDef {
        key: "question_authenticity",
        label: "Verify News",
        prompt: "How often do you verify news?",
        section: "e",
        kind: InputKind::SingleChoice,
        options: Some(&["Constantly", "Sometimes", "Very rarely", "Never"]),
        required: true,
        allow_comment: true,
    },
    // Section F - Laws & Solutions
    QuestionDef {
        key: "know_laws",
        label: "Know Laws",
        prompt: "Do you know media laws?",
        section: "f",
        kind: InputKind::SingleChoice,
        options: Some(YES_NO_UNSURE),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "laws_adequate",
        label: "Laws Adequate",
        prompt: "Are current laws adequate?",
        section: "f",
        kind: InputKind::SingleChoice,
        options: Some(YES_NO_UNSURE),
        required: true,
        allow_comment: true,
    },
    QuestionDef {
        key: "best_solution",
        label: "Best Solution",
        prompt: "Best solution for ethics?",
        section: "f",
        kind: InputKind::SingleChoice,
        options: Some(&[
            "New laws",
            "Improve existing laws",
            "Better implementation",
            "Self-regulation",
        ]),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "responsibility_who",
        label: "Responsibility",
        prompt: "Who is responsible?",
        section: "f",
        kind: InputKind::SingleChoice,
        options: Some(&[
            "Government",
            "Media Orgs",
            "Journalists",
            "Social Media",
            "Public",
        ]),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "new_laws_suggestions",
        label: "Law Suggestions",
        prompt: "Suggestions for new laws",
        section: "f",
        kind: InputKind::LongText,
        options: None,
        required: true,
        allow_comment: false,
    },
    // Section G - Media Type Ethics Rating
    QuestionDef {
        key: "tv_ethics",
        label: "TV Ethics",
        prompt: "TV ethical standards",
        section: "g",
        kind: InputKind::SingleChoice,
        options: Some(ETHICS_SCALE),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "radio_ethics",
        label: "Radio Ethics",
        prompt: "Radio ethical standards",
        section: "g",
        kind: InputKind::SingleChoice,
        options: Some(ETHICS_SCALE),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "newspaper_ethics",
        label: "Newspaper Ethics",
        prompt: "Newspaper ethical standards",
        section: "g",
        kind: InputKind::SingleChoice,
        options: Some(ETHICS_SCALE),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "social_web_ethics",
        label: "Social/Web Ethics",
        prompt: "Social media/web ethical standards",
        section: "g",
        kind: InputKind::SingleChoice,
        options: Some(ETHICS_SCALE),
        required: true,
        allow_comment: false,
    },
    // Section H - Final Thoughts
    QuestionDef {
        key: "student_voice",
        label: "Student Voice",
        prompt: "Should students have a voice?",
        section: "h",
        kind: InputKind::SingleChoice,
        options: Some(YES_NO_UNSURE),
        required: true,
        allow_comment: true,
    },
    QuestionDef {
        key: "school_curriculum",
        label: "School Curriculum",
        prompt: "Should ethics be in curriculum?",
        section: "h",
        kind: InputKind::SingleChoice,
        options: Some(YES_NO_UNSURE),
        required: true,
        allow_comment: true,
    },
    QuestionDef {
        key: "biggest_ethical_problem",
        label: "Biggest Problem",
        prompt: "Biggest ethical problem?",
        section: "h",
        kind: InputKind::LongText,
        options: None,
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "current_state",
        label: "Current State",
        prompt: "Current state of media ethics",
        section: "h",
        kind: InputKind::SingleChoice,
        options: Some(&["Improving", "Getting worse", "No change", "Not sure"]),
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "desired_change",
        label: "Desired Change",
        prompt: "What change do you want?",
        section: "h",
        kind: InputKind::LongText,
        options: None,
        required: true,
        allow_comment: false,
    },
    QuestionDef {
        key: "other_thoughts",
        label: "Other Thoughts",
        prompt: "Any other thoughts?",
        section: "h",
        kind: InputKind::LongText,
        options: None,
        required: false,
        allow_comment: false,
    },
];

/// All questions in presentation order
pub fn questions() -> &'static [QuestionDef] {
    QUESTIONS
}

/// Look up a question by storage key
pub fn question(key: &str) -> Option<&'static QuestionDef> {
    QUESTIONS.iter().find(|q| q.key == key)
}

/// 1-indexed position of a question in the questionnaire
pub fn question_number(key: &str) -> Option<usize> {
    QUESTIONS.iter().position(|q| q.key == key).map(|i| i + 1)
}

/// Storage key of the optional comment companion field
pub fn comment_key(key: &str) -> String {
    format!("{}_comment", key)
}

/// Validate a submission against the registry.
///
/// Returns the labels of unanswered required questions, in questionnaire
/// order, formatted as `Qn: <prompt>`. An empty result means the submission
/// is acceptable. Unknown keys in `answers` are ignored.
pub fn validate_answers(answers: &AnswerMap) -> Vec<String> {
    let mut missing = Vec::new();

    for (idx, q) in QUESTIONS.iter().enumerate() {
        if !q.required {
            continue;
        }

        let answered = match answers.get(q.key) {
            None => false,
            Some(value) => match (q.kind, value) {
                // Whitespace-only free text does not count as an answer
                (InputKind::FreeText | InputKind::LongText, AnswerValue::One(s)) => {
                    !s.trim().is_empty()
                }
                _ => !value.is_empty(),
            },
        };

        if !answered {
            missing.push(format!("Q{}: {}", idx + 1, q.prompt));
        }
    }

    missing
}
