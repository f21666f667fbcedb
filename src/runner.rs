use std::sync::Arc;

use teloxide::types::UserId;
use tracing::instrument;

use crate::{
    catalog::{Catalog, CategoryProfile},
    state::{Session, SessionStore},
};

pub const ANSWER_PREFIX: &str = "ans|";

/// A question ready to be rendered with one button per answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionCard {
    pub number: usize,
    pub total: usize,
    pub text: String,
    pub answers: Vec<String>,
}

impl QuestionCard {
    /// `(label, payload)` per answer, in source order.
    pub fn buttons(&self) -> impl Iterator<Item = (&str, String)> {
        self.answers
            .iter()
            .enumerate()
            .map(|(idx, label)| (label.as_str(), format!("{ANSWER_PREFIX}{idx}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub category: String,
    pub profile: CategoryProfile,
}

impl QuizResult {
    pub fn caption(&self) -> String {
        self.profile.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Question(QuestionCard),
    Result(QuizResult),
    /// No quiz in progress, nothing to render.
    Idle,
}

pub struct QuizRunner {
    catalog: Arc<Catalog>,
    sessions: SessionStore,
}

impl QuizRunner {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            sessions: SessionStore::new(),
        }
    }

    /// Full reset of the user's session followed by the first question.
    #[instrument(level = "info", skip(self))]
    pub async fn start_quiz(&self, user: UserId) -> Step {
        let session = Session::started(&self.catalog);
        let step = self.step_for(&session);
        self.sessions.reset(user, session).await;
        tracing::info!(%user, "Quiz started");
        step
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn ask_question(&self, user: UserId) -> Step {
        self.sessions
            .with_existing(user, |session| self.step_for(session))
            .await
            .unwrap_or(Step::Idle)
    }

    #[instrument(level = "info", skip(self))]
    pub async fn submit_answer(&self, user: UserId, answer_index: usize) -> Step {
        self.sessions
            .with_existing(user, |session| {
                if !session.is_started() {
                    tracing::info!(%user, "Answer without a started quiz");
                    return Step::Idle;
                }
                let Some(question) = self.catalog.question(session.question_index) else {
                    tracing::info!(%user, "Answer after the quiz was completed");
                    return Step::Idle;
                };
                let Some(answer) = question.answers().get(answer_index) else {
                    tracing::warn!(
                        %user,
                        answer_index,
                        question = session.question_index,
                        "Answer index out of range, repeating question"
                    );
                    return self.step_for(session);
                };

                tracing::info!(
                    %user,
                    question = question.text(),
                    answer = answer.text(),
                    "Answer accepted"
                );
                session.apply_weights(answer.weights());
                session.question_index += 1;
                self.step_for(session)
            })
            .await
            .unwrap_or_else(|| {
                tracing::info!(%user, "Answer without a session");
                Step::Idle
            })
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn compute_result(&self, user: UserId) -> Option<QuizResult> {
        self.sessions
            .with_existing(user, |session| self.result_for(session))
            .await
            .flatten()
    }

    pub async fn request_feedback(&self, user: UserId) {
        self.sessions
            .with_session(user, |session| session.awaiting_feedback = true)
            .await
    }

    /// Clears the feedback flag. Returns whether it was set.
    pub async fn take_feedback(&self, user: UserId) -> bool {
        self.sessions
            .with_existing(user, |session| {
                std::mem::replace(&mut session.awaiting_feedback, false)
            })
            .await
            .unwrap_or(false)
    }

    pub async fn session(&self, user: UserId) -> Option<Session> {
        self.sessions.get(user).await
    }

    fn step_for(&self, session: &Session) -> Step {
        if !session.is_started() {
            return Step::Idle;
        }
        match self.catalog.question(session.question_index) {
            Some(question) => Step::Question(QuestionCard {
                number: session.question_index + 1,
                total: self.catalog.questions().len(),
                text: question.text().to_owned(),
                answers: question
                    .answers()
                    .iter()
                    .map(|answer| answer.text().to_owned())
                    .collect(),
            }),
            None => self.result_for(session).map_or(Step::Idle, Step::Result),
        }
    }

    fn result_for(&self, session: &Session) -> Option<QuizResult> {
        let winner = session.leader()?;
        tracing::info!(winner, scores = ?session.scores(), "Quiz result computed");
        Some(QuizResult {
            category: winner.to_owned(),
            profile: self.catalog.category(winner).cloned().unwrap_or_default(),
        })
    }
}
