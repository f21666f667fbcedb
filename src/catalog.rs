use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::instrument;

use crate::error::CatalogError;

pub const QUIZ_FILE: &str = "quiz.json";
pub const CATEGORIES_FILE: &str = "animals.json";

#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    text: String,
    #[serde(default)]
    answers: Vec<Answer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Answer {
    text: String,
    #[serde(default, deserialize_with = "weight_keys")]
    weights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CategoryProfile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
    #[serde(default, rename = "guardian_link", alias = "link")]
    link: String,
}

/// Weights may be written either as a list of category keys or as an
/// object keyed by category. Only key membership matters.
#[derive(Deserialize)]
#[serde(untagged)]
enum WeightsRepr {
    Keys(Vec<String>),
    Table(IndexMap<String, serde_json::Value>),
}

fn weight_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match WeightsRepr::deserialize(deserializer)? {
        WeightsRepr::Keys(keys) => keys,
        WeightsRepr::Table(table) => table.into_keys().collect(),
    })
}

impl Question {
    pub fn new(text: impl Into<String>, answers: Vec<Answer>) -> Self {
        Self {
            text: text.into(),
            answers,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }
}

impl Answer {
    pub fn new<I, S>(text: impl Into<String>, weights: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text: text.into(),
            weights: weights.into_iter().map(Into::into).collect(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn weights(&self) -> &[String] {
        &self.weights
    }
}

impl CategoryProfile {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: image.into(),
            link: link.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn link(&self) -> &str {
        &self.link
    }
}

impl fmt::Display for CategoryProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "🎉 Ваше животное — {}\n\n{}\n\nУзнать о программе опеки: {}",
            self.name, self.description, self.link
        )
    }
}

/// Read-only question and category tables shared by every session.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<Question>,
    categories: IndexMap<String, CategoryProfile>,
}

impl Catalog {
    /// Builds a catalog without validating weight keys against the
    /// declared categories.
    pub fn new(questions: Vec<Question>, categories: IndexMap<String, CategoryProfile>) -> Self {
        Self {
            questions,
            categories,
        }
    }

    /// Loads `quiz.json` and `animals.json` from `data_dir`. Any missing file,
    /// parse failure or dangling weight key aborts the whole load.
    #[instrument(level = "info", skip(data_dir), fields(data_dir = %data_dir.as_ref().display()))]
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let data_dir = data_dir.as_ref();
        let questions: Vec<Question> = read_json(data_dir.join(QUIZ_FILE))?;
        let categories: IndexMap<String, CategoryProfile> =
            read_json(data_dir.join(CATEGORIES_FILE))?;

        let catalog = Self::new(questions, categories);
        catalog.validate()?;

        tracing::info!(
            questions = catalog.questions.len(),
            categories = catalog.categories.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.questions.is_empty() {
            return Err(CatalogError::EmptyQuiz);
        }
        if self.categories.is_empty() {
            return Err(CatalogError::EmptyCategories);
        }

        for (q_idx, question) in self.questions.iter().enumerate() {
            if question.answers.is_empty() {
                return Err(CatalogError::QuestionWithoutAnswers { question: q_idx + 1 });
            }
            for (a_idx, answer) in question.answers.iter().enumerate() {
                if let Some(key) = answer
                    .weights
                    .iter()
                    .find(|key| !self.categories.contains_key(key.as_str()))
                {
                    return Err(CatalogError::UnknownCategory {
                        question: q_idx + 1,
                        answer: a_idx + 1,
                        key: key.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, idx: usize) -> Option<&Question> {
        self.questions.get(idx)
    }

    pub fn categories(&self) -> &IndexMap<String, CategoryProfile> {
        &self.categories
    }

    pub fn category(&self, key: &str) -> Option<&CategoryProfile> {
        self.categories.get(key)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: PathBuf) -> Result<T, CatalogError> {
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(source) => return Err(CatalogError::Io { path, source }),
    };
    serde_json::from_slice(&bytes).map_err(|source| CatalogError::Parse { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const QUIZ: &str = r#"[
        {
            "question": "Где бы вы жили?",
            "answers": [
                { "text": "В саванне", "weights": ["lion"] },
                { "text": "В лесу", "weights": { "owl": 1, "bear": 1 } },
                { "text": "Не знаю" }
            ]
        }
    ]"#;

    const ANIMALS: &str = r#"{
        "owl": { "name": "Сова", "description": "Ночная птица", "image": "media/images/owl.jpg", "guardian_link": "https://example.org/owl" },
        "lion": { "name": "Лев", "description": "Царь зверей", "image": "lion.jpg", "guardian_link": "https://example.org/lion" },
        "bear": { "name": "Медведь" }
    }"#;

    fn write_catalog(quiz: &str, animals: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(QUIZ_FILE), quiz).unwrap();
        fs::write(dir.path().join(CATEGORIES_FILE), animals).unwrap();
        dir
    }

    #[test]
    fn loads_categories_in_file_order() {
        let dir = write_catalog(QUIZ, ANIMALS);
        let catalog = Catalog::load(dir.path()).unwrap();

        let keys: Vec<&str> = catalog.categories().keys().map(String::as_str).collect();
        assert_eq!(keys, ["owl", "lion", "bear"]);
        assert_eq!(catalog.category("owl").unwrap().link(), "https://example.org/owl");
    }

    #[test]
    fn accepts_both_weight_notations() {
        let dir = write_catalog(QUIZ, ANIMALS);
        let catalog = Catalog::load(dir.path()).unwrap();
        let answers = catalog.question(0).unwrap().answers();

        assert_eq!(answers[0].weights(), ["lion"]);
        assert_eq!(answers[1].weights(), ["owl", "bear"]);
        assert!(answers[2].weights().is_empty());
    }

    #[test]
    fn absent_profile_fields_default_to_empty() {
        let dir = write_catalog(QUIZ, ANIMALS);
        let catalog = Catalog::load(dir.path()).unwrap();
        let bear = catalog.category("bear").unwrap();

        assert_eq!(bear.name(), "Медведь");
        assert_eq!(bear.description(), "");
        assert_eq!(bear.image(), "");
        assert_eq!(bear.link(), "");
    }

    #[test]
    fn rejects_unknown_weight_key() {
        let quiz = r#"[{ "question": "?", "answers": [{ "text": "a", "weights": ["tiger"] }] }]"#;
        let dir = write_catalog(quiz, ANIMALS);

        match Catalog::load(dir.path()) {
            Err(CatalogError::UnknownCategory { question, answer, key }) => {
                assert_eq!((question, answer, key.as_str()), (1, 1, "tiger"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CATEGORIES_FILE), ANIMALS).unwrap();

        assert!(matches!(
            Catalog::load(dir.path()),
            Err(CatalogError::Io { .. })
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        let dir = write_catalog("[{ \"question\": ", ANIMALS);
        assert!(matches!(
            Catalog::load(dir.path()),
            Err(CatalogError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_empty_quiz_and_answerless_questions() {
        let dir = write_catalog("[]", ANIMALS);
        assert!(matches!(Catalog::load(dir.path()), Err(CatalogError::EmptyQuiz)));

        let dir = write_catalog(r#"[{ "question": "?", "answers": [] }]"#, ANIMALS);
        assert!(matches!(
            Catalog::load(dir.path()),
            Err(CatalogError::QuestionWithoutAnswers { question: 1 })
        ));
    }

    #[test]
    fn shipped_catalog_is_valid() {
        let catalog = Catalog::load(Path::new(env!("CARGO_MANIFEST_DIR")).join("data")).unwrap();
        assert!(!catalog.questions().is_empty());
        assert!(catalog.category("lion").is_some());
    }

    #[test]
    fn profile_caption() {
        let profile = CategoryProfile::new("Лев", "Царь зверей", "lion.jpg", "https://example.org");
        assert_eq!(
            profile.to_string(),
            "🎉 Ваше животное — Лев\n\nЦарь зверей\n\nУзнать о программе опеки: https://example.org"
        );
    }
}
