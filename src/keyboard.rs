use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

pub const MENU_QUIZ: &str = "🧩 Викторина";
pub const MENU_FEEDBACK: &str = "📝 Отзыв";
pub const MENU_CONTACT: &str = "✉️ Связь";
pub const MENU_HELP: &str = "ℹ️ Помощь";

pub const START_QUIZ: &str = "start_quiz";
pub const CONTACT: &str = "contact";
pub const RESTART: &str = "restart";
pub const FEEDBACK: &str = "feedback";

/// Keyboards the bot attaches to its replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Persistent reply menu under the input field.
    MainMenu,
    /// `(label, payload)` pairs, one button per row.
    Answers(Vec<(String, String)>),
    /// Share and restart after a result.
    ResultActions,
    /// Contact and feedback under the result card.
    ProfileActions,
}

impl Keyboard {
    pub fn inline_markup(&self) -> Option<InlineKeyboardMarkup> {
        match self {
            Keyboard::MainMenu => None,
            Keyboard::Answers(answers) => Some(answers_keyboard(answers)),
            Keyboard::ResultActions => Some(result_keyboard()),
            Keyboard::ProfileActions => Some(profile_keyboard()),
        }
    }

    pub fn markup(&self) -> ReplyMarkup {
        match self.inline_markup() {
            Some(inline) => ReplyMarkup::InlineKeyboard(inline),
            None => ReplyMarkup::Keyboard(main_keyboard()),
        }
    }
}

pub(crate) fn main_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![KeyboardButton::new(MENU_QUIZ), KeyboardButton::new(MENU_FEEDBACK)],
        vec![KeyboardButton::new(MENU_CONTACT), KeyboardButton::new(MENU_HELP)],
    ];

    KeyboardMarkup::new(keyboard).resize_keyboard()
}

pub(crate) fn answers_keyboard(answers: &[(String, String)]) -> InlineKeyboardMarkup {
    let keyboard: Vec<Vec<InlineKeyboardButton>> = answers
        .iter()
        .map(|(label, payload)| vec![InlineKeyboardButton::callback(label, payload)])
        .collect();

    InlineKeyboardMarkup::new(keyboard)
}

pub(crate) fn result_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::switch_inline_query("🔗 Поделиться", "")],
        vec![InlineKeyboardButton::callback("🔄 Сначала", RESTART)],
    ])
}

pub(crate) fn profile_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(MENU_CONTACT, CONTACT),
        InlineKeyboardButton::callback(MENU_FEEDBACK, FEEDBACK),
    ]])
}
