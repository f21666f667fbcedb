use std::path::PathBuf;

use teloxide::types::UserId;
use tracing::instrument;

use crate::{
    commands::Command,
    keyboard::{self, Keyboard},
    media::MediaLibrary,
    runner::{QuizResult, QuizRunner, Step, ANSWER_PREFIX},
};

pub const WELCOME_TEXT: &str = "Приветствуем!\n\n\
    Вы попали в место, где вам помогут взять животное под опеку!\n\n\
    Участие в программе «Клуб друзей зоопарка» — это помощь в содержании наших обитателей, \
    а также ваш личный вклад в дело сохранения биоразнообразия Земли и развитие нашего зоопарка.\n\n\
    Чтобы определиться с животным, пройдите небольшую викторину «Какое у вас тотемное животное?»";
pub const CONTACT_TEXT: &str = "По вопросам опекунства звоните по телефону +7 (962) 971-38-75 \
    или пишите на почту zoofriends@moscowzoo.ru";
pub const HELP_TEXT: &str = "/start — меню\n\
    🧩 Викторина — начать викторину\n\
    📝 Отзыв — оставить отзыв\n\
    ✉️ Связь — связаться с поддержкой";
pub const FEEDBACK_PROMPT: &str = "Пожалуйста, напишите свой отзыв:";
pub const FEEDBACK_THANKS: &str = "Спасибо за ваш отзыв! 😊";
pub const FALLBACK_TEXT: &str = "Нажмите кнопку меню или /start";
pub const WHATS_NEXT: &str = "Что дальше?";

/// Inbound event as seen by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Command(Command),
    Callback(String),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Welcome,
    StartQuiz,
    Answer(usize),
    MalformedAnswer,
    Restart,
    Contact,
    Feedback,
    Help,
    FreeText,
    Ignore,
}

/// Outbound message, independent of the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text {
        text: String,
        keyboard: Option<Keyboard>,
    },
    Photo {
        path: PathBuf,
        caption: Option<String>,
        keyboard: Option<Keyboard>,
    },
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Reply::Text {
            text: text.into(),
            keyboard: None,
        }
    }

    fn with_menu(text: impl Into<String>) -> Self {
        Reply::Text {
            text: text.into(),
            keyboard: Some(Keyboard::MainMenu),
        }
    }

    /// Text stand-in for a captioned photo that could not be sent. Keeps the
    /// caption and keyboard; a bare photo has nothing to fall back to.
    pub fn text_fallback(&self) -> Option<Reply> {
        match self {
            Reply::Photo {
                caption: Some(caption),
                keyboard,
                ..
            } => Some(Reply::Text {
                text: caption.clone(),
                keyboard: keyboard.clone(),
            }),
            _ => None,
        }
    }
}

/// Pure lookup by event signature. Buttons and menu labels win over the
/// free-text branch; unknown `/commands` are not free text.
pub fn route(event: &Event) -> Route {
    match event {
        Event::Command(Command::Start) => Route::Welcome,
        Event::Command(Command::Help) => Route::Help,
        Event::Callback(data) => match data.as_str() {
            keyboard::START_QUIZ => Route::StartQuiz,
            keyboard::RESTART => Route::Restart,
            keyboard::CONTACT => Route::Contact,
            keyboard::FEEDBACK => Route::Feedback,
            other => match other.strip_prefix(ANSWER_PREFIX) {
                Some(idx) => idx.parse().map_or(Route::MalformedAnswer, Route::Answer),
                None => Route::Ignore,
            },
        },
        Event::Text(text) => match text.as_str() {
            keyboard::MENU_QUIZ => Route::StartQuiz,
            keyboard::MENU_FEEDBACK => Route::Feedback,
            keyboard::MENU_CONTACT => Route::Contact,
            keyboard::MENU_HELP => Route::Help,
            other if other.starts_with('/') => Route::Ignore,
            _ => Route::FreeText,
        },
    }
}

pub struct DialogueRouter {
    runner: QuizRunner,
    media: MediaLibrary,
    logo: String,
}

impl DialogueRouter {
    pub fn new(runner: QuizRunner, media: MediaLibrary, logo: impl Into<String>) -> Self {
        Self {
            runner,
            media,
            logo: logo.into(),
        }
    }

    pub fn runner(&self) -> &QuizRunner {
        &self.runner
    }

    #[instrument(level = "info", skip(self))]
    pub async fn handle(&self, user: UserId, event: &Event) -> Vec<Reply> {
        let route = route(event);
        tracing::debug!(?route, "Event routed");

        match route {
            Route::Welcome => self.welcome().await,
            Route::StartQuiz | Route::Restart => {
                let step = self.runner.start_quiz(user).await;
                self.render(step).await
            }
            Route::Answer(idx) => {
                let step = self.runner.submit_answer(user, idx).await;
                self.render(step).await
            }
            Route::MalformedAnswer => {
                tracing::warn!(%user, ?event, "Malformed answer payload");
                let step = self.runner.ask_question(user).await;
                self.render(step).await
            }
            Route::Contact => vec![Reply::with_menu(CONTACT_TEXT)],
            Route::Help => vec![Reply::with_menu(HELP_TEXT)],
            Route::Feedback => {
                self.runner.request_feedback(user).await;
                vec![Reply::text(FEEDBACK_PROMPT)]
            }
            Route::FreeText => {
                if self.runner.take_feedback(user).await {
                    // Feedback is acknowledged and dropped, never stored.
                    tracing::info!(%user, "Feedback received");
                    vec![Reply::with_menu(FEEDBACK_THANKS)]
                } else {
                    vec![Reply::with_menu(FALLBACK_TEXT)]
                }
            }
            Route::Ignore => {
                tracing::warn!(%user, ?event, "Unhandled event");
                Vec::new()
            }
        }
    }

    async fn welcome(&self) -> Vec<Reply> {
        let mut replies = Vec::with_capacity(2);
        if let Some(path) = self.media.resolve(&self.logo).await {
            replies.push(Reply::Photo {
                path,
                caption: None,
                keyboard: None,
            });
        }
        replies.push(Reply::with_menu(WELCOME_TEXT));
        replies
    }

    async fn render(&self, step: Step) -> Vec<Reply> {
        match step {
            Step::Question(card) => {
                let buttons = card
                    .buttons()
                    .map(|(label, payload)| (label.to_owned(), payload))
                    .collect();
                vec![Reply::Text {
                    text: format!("Вопрос {}/{}\n\n{}", card.number, card.total, card.text),
                    keyboard: Some(Keyboard::Answers(buttons)),
                }]
            }
            Step::Result(result) => self.result(result).await,
            Step::Idle => vec![Reply::with_menu(FALLBACK_TEXT)],
        }
    }

    async fn result(&self, result: QuizResult) -> Vec<Reply> {
        let caption = result.caption();
        let card = match self.media.resolve(result.profile.image()).await {
            Some(path) => Reply::Photo {
                path,
                caption: Some(caption),
                keyboard: Some(Keyboard::ProfileActions),
            },
            None => Reply::Text {
                text: caption,
                keyboard: Some(Keyboard::ProfileActions),
            },
        };

        vec![
            card,
            Reply::Text {
                text: WHATS_NEXT.to_owned(),
                keyboard: Some(Keyboard::ResultActions),
            },
        ]
    }
}
