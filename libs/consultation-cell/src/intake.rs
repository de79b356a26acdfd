//! Fixed intake questionnaire.
//!
//! The question list is ordered and versioned implicitly by snapshot:
//! each persisted answer carries the question text as it read at
//! submission time, so later wording changes never rewrite history.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const CHIEF_COMPLAINT_KEY: &str = "chief_complaint";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Text,
    Textarea,
    Select,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntakeQuestion {
    pub key: &'static str,
    pub text: &'static str,
    pub question_type: QuestionType,
    pub options: &'static [&'static str],
    pub required: bool,
}

pub const INTAKE_QUESTIONS: &[IntakeQuestion] = &[
    IntakeQuestion {
        key: CHIEF_COMPLAINT_KEY,
        text: "What is your main concern today?",
        question_type: QuestionType::Text,
        options: &[],
        required: true,
    },
    IntakeQuestion {
        key: "symptoms",
        text: "Describe your symptoms in detail.",
        question_type: QuestionType::Textarea,
        options: &[],
        required: true,
    },
    IntakeQuestion {
        key: "duration",
        text: "How long have you had these symptoms?",
        question_type: QuestionType::Text,
        options: &[],
        required: true,
    },
    IntakeQuestion {
        key: "severity",
        text: "On a scale of 1-10, how severe are your symptoms?",
        question_type: QuestionType::Select,
        options: &["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"],
        required: true,
    },
    IntakeQuestion {
        key: "current_medications",
        text: "List any medications you are currently taking.",
        question_type: QuestionType::Textarea,
        options: &[],
        required: false,
    },
    IntakeQuestion {
        key: "allergies",
        text: "Do you have any known drug allergies?",
        question_type: QuestionType::Textarea,
        options: &[],
        required: true,
    },
    IntakeQuestion {
        key: "medical_history",
        text: "Do you have any chronic conditions or past surgeries?",
        question_type: QuestionType::Textarea,
        options: &[],
        required: false,
    },
    IntakeQuestion {
        key: "previous_treatment",
        text: "Have you tried any treatments for this issue?",
        question_type: QuestionType::Textarea,
        options: &[],
        required: false,
    },
];

/// An intake row ready for insertion alongside a new consultation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeRowInsert {
    pub question_key: String,
    pub question_text: String,
    pub answer: String,
    pub sort_order: i32,
}

/// Build intake rows from submitted answers in fixed question order.
/// Unanswered or blank entries are dropped, never stored empty.
pub fn build_intake_rows(answers: &HashMap<String, String>) -> Vec<IntakeRowInsert> {
    INTAKE_QUESTIONS
        .iter()
        .enumerate()
        .filter_map(|(i, question)| {
            let answer = answers.get(question.key)?.trim();
            if answer.is_empty() {
                return None;
            }
            Some(IntakeRowInsert {
                question_key: question.key.to_string(),
                question_text: question.text.to_string(),
                answer: answer.to_string(),
                sort_order: i as i32,
            })
        })
        .collect()
}

/// The chief complaint answer, if present and non-blank.
pub fn chief_complaint(answers: &HashMap<String, String>) -> Option<&str> {
    answers
        .get(CHIEF_COMPLAINT_KEY)
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
}
