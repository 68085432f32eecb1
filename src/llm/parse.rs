// src/llm/parse.rs

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::QUIZ_LENGTH;

static QUESTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Q\s*(\d+)\s*[:.)]\s*(.+)$").expect("valid regex"));
static ANSWER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^A\s*(\d+)\s*[:.)]\s*(.+)$").expect("valid regex"));

/// Provider output that could not be turned into the expected structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    EmptyCompletion,
    NoQuestions,
    InvalidAnswer(String),
    CountMismatch { questions: usize, answers: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyCompletion => write!(f, "completion was empty"),
            ParseError::NoQuestions => write!(f, "no Qn:/An: pairs found in quiz output"),
            ParseError::InvalidAnswer(answer) => {
                write!(f, "quiz answer '{}' is neither True nor False", answer)
            }
            ParseError::CountMismatch { questions, answers } => write!(
                f,
                "quiz output has {} questions but {} answers",
                questions, answers
            ),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub explanation: String,
    pub example: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSheet {
    pub questions: Vec<String>,
    pub answers: Vec<String>,
}

/// Splits a summary on its first line break: explanation before, example after.
pub fn parse_summary(raw: &str) -> Result<Summary, ParseError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ParseError::EmptyCompletion);
    }

    let (explanation, example) = match text.split_once('\n') {
        Some((head, tail)) => (head.trim(), tail.trim()),
        None => (text, ""),
    };

    Ok(Summary {
        explanation: explanation.to_string(),
        example: example.to_string(),
    })
}

/// Detailed explanations are passed through untouched once known to be non-empty.
pub fn parse_detail(raw: &str) -> Result<String, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::EmptyCompletion);
    }
    Ok(raw.to_string())
}

/// Reads `Qn: ...` / `An: True|False` lines, keeping at most `QUIZ_LENGTH` pairs.
///
/// Fewer pairs than requested is accepted. Unpaired lines or answers that are
/// not booleans are errors.
pub fn parse_quiz(raw: &str) -> Result<QuizSheet, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::EmptyCompletion);
    }

    let mut questions = Vec::new();
    let mut answers = Vec::new();

    for line in raw.lines() {
        // Providers like to bold the labels.
        let line = line.replace("**", "");
        let line = line.trim();

        if let Some(caps) = QUESTION_LINE.captures(line) {
            questions.push(caps[2].trim().to_string());
        } else if let Some(caps) = ANSWER_LINE.captures(line) {
            answers.push(normalize_answer(&caps[2])?);
        }
    }

    if questions.is_empty() && answers.is_empty() {
        return Err(ParseError::NoQuestions);
    }
    if questions.len() != answers.len() {
        return Err(ParseError::CountMismatch {
            questions: questions.len(),
            answers: answers.len(),
        });
    }

    questions.truncate(QUIZ_LENGTH);
    answers.truncate(QUIZ_LENGTH);

    Ok(QuizSheet { questions, answers })
}

fn normalize_answer(raw: &str) -> Result<String, ParseError> {
    let word = raw.trim().trim_end_matches(['.', '!']).trim();
    let mut chars = word.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    };

    match capitalized.as_str() {
        "True" | "False" => Ok(capitalized),
        _ => Err(ParseError::InvalidAnswer(raw.trim().to_string())),
    }
}
