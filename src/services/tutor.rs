// src/services/tutor.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    config::{LlmConfig, QUIZ_LENGTH},
    error::AppError,
    llm::{
        CompletionRequest, LlmProvider,
        parse::{Summary, parse_detail, parse_quiz, parse_summary},
        prompts::{detail_prompt, quiz_prompt, summary_prompt},
    },
    models::{
        quiz::{QuizAttempt, QuizResult, QuizReviewItem, QuizTicket},
        topic::Topic,
    },
    repository::Repository,
    services::progression,
};

/// Generation settings shared by every call.
const TEMPERATURE: f32 = 0.0;

/// Turns topics into explanations and quizzes through the LLM provider and
/// stores what comes back.
#[derive(Clone)]
pub struct Tutor {
    llm: Arc<dyn LlmProvider>,
    repo: Arc<dyn Repository>,
    summary_model: String,
    quiz_model: String,
}

impl Tutor {
    pub fn new(llm: Arc<dyn LlmProvider>, repo: Arc<dyn Repository>, config: &LlmConfig) -> Self {
        Self {
            llm,
            repo,
            summary_model: config.summary_model.clone(),
            quiz_model: config.quiz_model.clone(),
        }
    }

    async fn generate(&self, model: &str, prompt: String) -> Result<String, AppError> {
        let request = CompletionRequest {
            model: model.to_string(),
            prompt,
            temperature: TEMPERATURE,
        };
        Ok(self.llm.complete(&request).await?)
    }

    /// Beginner summary plus one real-life example. The explanation becomes
    /// the topic's content.
    pub async fn summarize_topic(
        &self,
        topic: &Topic,
        schedule_title: &str,
    ) -> Result<Summary, AppError> {
        tracing::info!("Summarizing {} #{}", topic.utid, topic.seq_number);
        let raw = self
            .generate(&self.summary_model, summary_prompt(&topic.title, schedule_title))
            .await?;
        let summary = parse_summary(&raw)?;

        self.repo
            .set_topic_content(&topic.utid, topic.seq_number, &summary.explanation)
            .await?;
        Ok(summary)
    }

    /// Child-friendly bullet points, stored and returned as generated.
    pub async fn detail_explain(&self, topic: &Topic) -> Result<String, AppError> {
        tracing::info!("Explaining {} #{} in detail", topic.utid, topic.seq_number);
        let raw = self
            .generate(&self.summary_model, detail_prompt(&topic.title))
            .await?;
        let detail = parse_detail(&raw)?;

        self.repo
            .set_topic_content(&topic.utid, topic.seq_number, &detail)
            .await?;
        Ok(detail)
    }

    /// Generates a true/false quiz and keeps its answer key until it is submitted.
    pub async fn generate_quiz(&self, topic: &Topic) -> Result<QuizAttempt, AppError> {
        tracing::info!("Generating quiz for {} #{}", topic.utid, topic.seq_number);
        let raw = self
            .generate(&self.quiz_model, quiz_prompt(&topic.title, QUIZ_LENGTH))
            .await?;
        let sheet = parse_quiz(&raw)?;

        if sheet.questions.len() < QUIZ_LENGTH {
            tracing::warn!(
                "Quiz for {} #{} has only {} questions",
                topic.utid,
                topic.seq_number,
                sheet.questions.len()
            );
        }

        let attempt = QuizAttempt {
            id: Uuid::new_v4(),
            utid: topic.utid.clone(),
            seq_number: topic.seq_number,
            questions: sheet.questions,
            answers: sheet.answers,
        };
        self.repo.save_quiz_attempt(&attempt).await?;
        Ok(attempt)
    }

    /// Scores the submission and overwrites the topic's score.
    ///
    /// The referenced attempt is consumed, so a ticket can be scored once.
    /// Without a ticket nothing can match.
    pub async fn submit_quiz(
        &self,
        topic: &Topic,
        ticket: Option<&QuizTicket>,
        submitted: &[Option<String>],
    ) -> Result<QuizResult, AppError> {
        let attempt = match ticket {
            Some(ticket) => {
                if !ticket.is_for(&topic.utid, topic.seq_number) {
                    return Err(AppError::BadRequest(
                        "Quiz token belongs to a different topic".to_string(),
                    ));
                }
                let attempt = self
                    .repo
                    .take_quiz_attempt(ticket.attempt_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::BadRequest("Quiz was already submitted or has expired".to_string())
                    })?;
                Some(attempt)
            }
            None => None,
        };

        let result = score_quiz(submitted, attempt.as_ref());
        progression::record_quiz_score(&*self.repo, &topic.utid, topic.seq_number, result.score)
            .await?;
        tracing::info!(
            "Quiz for {} #{} scored {}/{}",
            topic.utid,
            topic.seq_number,
            result.score,
            result.total
        );
        Ok(result)
    }
}

/// Counts exact (case-sensitive) matches over `QUIZ_LENGTH` indices.
/// Indices missing on either side never match.
pub fn score_quiz(submitted: &[Option<String>], attempt: Option<&QuizAttempt>) -> QuizResult {
    let (questions, answers) = match attempt {
        Some(a) => (a.questions.as_slice(), a.answers.as_slice()),
        None => (&[][..], &[][..]),
    };

    let review: Vec<QuizReviewItem> = (0..QUIZ_LENGTH)
        .map(|i| QuizReviewItem {
            question: questions.get(i).cloned(),
            submitted: submitted.get(i).cloned().flatten(),
            correct: answers.get(i).cloned(),
        })
        .collect();

    let score = review
        .iter()
        .filter(|item| item.correct.is_some() && item.submitted == item.correct)
        .count() as i32;

    QuizResult {
        score,
        total: QUIZ_LENGTH,
        review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(answers: &[&str]) -> QuizAttempt {
        QuizAttempt {
            id: Uuid::new_v4(),
            utid: "u-1".to_string(),
            seq_number: 1,
            questions: answers.iter().enumerate().map(|(i, _)| format!("q{i}")).collect(),
            answers: answers.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn submit(answers: &[&str]) -> Vec<Option<String>> {
        answers.iter().map(|a| Some(a.to_string())).collect()
    }

    #[test]
    fn test_all_correct_scores_five() {
        let key = ["True", "False", "True", "True", "False"];
        let result = score_quiz(&submit(&key), Some(&attempt(&key)));
        assert_eq!(result.score, 5);
        assert_eq!(result.total, 5);
    }

    #[test]
    fn test_all_wrong_scores_zero() {
        let key = ["True", "False", "True", "True", "False"];
        let wrong = ["False", "True", "False", "False", "True"];
        assert_eq!(score_quiz(&submit(&wrong), Some(&attempt(&key))).score, 0);
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let key = ["True"];
        assert_eq!(score_quiz(&submit(&["true"]), Some(&attempt(&key))).score, 0);
    }

    #[test]
    fn test_short_key_never_matches_missing_indices() {
        let key = ["True", "False", "True"];
        let result = score_quiz(
            &submit(&["True", "False", "True", "True", "False"]),
            Some(&attempt(&key)),
        );
        assert_eq!(result.score, 3);
        assert_eq!(result.review[3].correct, None);
        assert_eq!(result.review[4].correct, None);
        assert_eq!(result.review[4].submitted.as_deref(), Some("False"));
    }

    #[test]
    fn test_missing_attempt_scores_zero() {
        let result = score_quiz(&submit(&["True"; 5]), None);
        assert_eq!(result.score, 0);
        assert!(result.review.iter().all(|r| r.question.is_none()));
    }

    #[test]
    fn test_unanswered_questions() {
        let key = ["True", "True"];
        let result = score_quiz(&[None, Some("True".to_string())], Some(&attempt(&key)));
        assert_eq!(result.score, 1);
        assert_eq!(result.review.len(), QUIZ_LENGTH);
    }

    struct FixedQuiz;

    #[async_trait::async_trait]
    impl LlmProvider for FixedQuiz {
        async fn complete(&self, _: &CompletionRequest) -> Result<String, crate::llm::LlmError> {
            Ok("Q1: Ice floats.\nA1: True\nQ2: Fire is cold.\nA2: False\n".to_string())
        }
    }

    async fn tutor_with_topic() -> (Tutor, Topic) {
        use crate::{
            models::{schedule::CreateScheduleRequest, user::NewUser},
            repository::MemoryRepository,
        };

        let repo = Arc::new(MemoryRepository::new());
        let user = repo
            .create_user(NewUser {
                username: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "x".to_string(),
            })
            .await
            .unwrap();
        let (_, mut topics) = progression::create_schedule(
            &*repo,
            user.user_id,
            CreateScheduleRequest {
                title: "Science".to_string(),
                topics: vec!["Water".to_string()],
            },
        )
        .await
        .unwrap();

        let config = LlmConfig {
            api_key: "unused".to_string(),
            base_url: "http://localhost".to_string(),
            summary_model: "summary".to_string(),
            quiz_model: "quiz".to_string(),
        };
        (Tutor::new(Arc::new(FixedQuiz), repo, &config), topics.remove(0))
    }

    #[tokio::test]
    async fn test_quiz_is_scored_from_the_stored_key_once() {
        let (tutor, topic) = tutor_with_topic().await;
        let attempt = tutor.generate_quiz(&topic).await.unwrap();
        let ticket = QuizTicket::for_attempt(&attempt);
        let answers = vec![Some("True".to_string()), Some("False".to_string())];

        let result = tutor.submit_quiz(&topic, Some(&ticket), &answers).await.unwrap();
        assert_eq!(result.score, 2);
        assert_eq!(result.review[1].correct.as_deref(), Some("False"));

        let err = tutor
            .submit_quiz(&topic, Some(&ticket), &answers)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let stored = tutor.repo.find_topic(&topic.utid, 1).await.unwrap().unwrap();
        assert_eq!(stored.score, Some(2));
    }

    #[tokio::test]
    async fn test_unknown_attempt_is_rejected() {
        let (tutor, topic) = tutor_with_topic().await;
        let ticket = QuizTicket {
            attempt_id: Uuid::new_v4(),
            utid: topic.utid.clone(),
            seq_number: topic.seq_number,
        };
        let err = tutor.submit_quiz(&topic, Some(&ticket), &[]).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
