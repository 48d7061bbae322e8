use serde::{Deserialize, Serialize};

use quiz_core::model::PoolSelector;
use quiz_core::{QuestionGenerator, ScoringPolicy};

use crate::error::ConfigError;

pub const ENV_DB_URL: &str = "QUIZ_DB_URL";
pub const ENV_POINTS_PER_CORRECT: &str = "QUIZ_POINTS_PER_CORRECT";
pub const ENV_QUESTION_COUNT: &str = "QUIZ_QUESTION_COUNT";
pub const ENV_DECOYS: &str = "QUIZ_DECOYS";

const DEFAULT_DB_URL: &str = "sqlite:quiz.sqlite3?mode=rwc";

//
// ─── QUIZ SETTINGS ─────────────────────────────────────────────────────────────
//

/// Shape of one quiz: how many questions, how many decoys per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettings {
    pub question_count: usize,
    pub decoys_per_question: usize,
}

impl QuizSettings {
    /// Personal libraries are small, so personal quizzes are short.
    pub const PERSONAL: Self = Self {
        question_count: 5,
        decoys_per_question: 3,
    };

    pub const GENERAL: Self = Self {
        question_count: 10,
        decoys_per_question: 3,
    };

    #[must_use]
    pub fn defaults_for(pool: PoolSelector) -> Self {
        match pool {
            PoolSelector::Personal => Self::PERSONAL,
            PoolSelector::General => Self::GENERAL,
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSettings` if either count is zero.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.question_count == 0 {
            return Err(ConfigError::InvalidSettings(
                "question_count must be at least 1",
            ));
        }
        if self.decoys_per_question == 0 {
            return Err(ConfigError::InvalidSettings(
                "decoys_per_question must be at least 1",
            ));
        }
        Ok(self)
    }

    #[must_use]
    pub fn generator(&self) -> QuestionGenerator {
        QuestionGenerator::new(self.question_count, self.decoys_per_question)
    }
}

//
// ─── ENGINE CONFIG ─────────────────────────────────────────────────────────────
//

/// Everything a host needs to assemble the services.
///
/// Missing JSON fields fall back to [`EngineConfig::default`]. A settings
/// block that names only some fields takes the rest from its own pool's
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEngineConfig")]
pub struct EngineConfig {
    pub database_url: String,
    pub scoring: ScoringPolicy,
    pub personal_settings: QuizSettings,
    pub general_settings: QuizSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DB_URL.to_owned(),
            scoring: ScoringPolicy::default(),
            personal_settings: QuizSettings::PERSONAL,
            general_settings: QuizSettings::GENERAL,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the JSON is malformed or a value is invalid.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()
    }

    /// Defaults overridden by the `QUIZ_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable does not parse or the result is
    /// invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// Override fields from the process environment.
    ///
    /// # Errors
    ///
    /// See [`EngineConfig::apply_env_with`].
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|var| std::env::var(var).ok())
    }

    /// Override fields from `lookup`. `QUIZ_QUESTION_COUNT` and `QUIZ_DECOYS`
    /// apply to both pools.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnv` for unparsable numbers and any
    /// validation error of the resulting config.
    pub fn apply_env_with(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(ENV_DB_URL).filter(|v| !v.trim().is_empty()) {
            self.database_url = url;
        }
        if let Some(points) = parse_var::<u32>(&lookup, ENV_POINTS_PER_CORRECT)? {
            self.scoring.points_per_correct = points;
        }
        if let Some(count) = parse_var::<usize>(&lookup, ENV_QUESTION_COUNT)? {
            self.personal_settings.question_count = count;
            self.general_settings.question_count = count;
        }
        if let Some(decoys) = parse_var::<usize>(&lookup, ENV_DECOYS)? {
            self.personal_settings.decoys_per_question = decoys;
            self.general_settings.decoys_per_question = decoys;
        }
        self.validate()
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the scoring policy or either settings block
    /// is invalid.
    pub fn validate(self) -> Result<Self, ConfigError> {
        self.scoring.validate()?;
        self.personal_settings.validate()?;
        self.general_settings.validate()?;
        Ok(self)
    }

    #[must_use]
    pub fn settings_for(&self, pool: PoolSelector) -> QuizSettings {
        match pool {
            PoolSelector::Personal => self.personal_settings,
            PoolSelector::General => self.general_settings,
        }
    }
}

/// JSON shape of [`EngineConfig`] before defaults are filled in.
#[derive(Deserialize)]
struct RawEngineConfig {
    database_url: Option<String>,
    scoring: Option<ScoringPolicy>,
    personal_settings: Option<PartialSettings>,
    general_settings: Option<PartialSettings>,
}

#[derive(Deserialize)]
struct PartialSettings {
    question_count: Option<usize>,
    decoys_per_question: Option<usize>,
}

impl PartialSettings {
    fn over(this: Option<Self>, base: QuizSettings) -> QuizSettings {
        let Some(this) = this else {
            return base;
        };
        QuizSettings {
            question_count: this.question_count.unwrap_or(base.question_count),
            decoys_per_question: this.decoys_per_question.unwrap_or(base.decoys_per_question),
        }
    }
}

impl From<RawEngineConfig> for EngineConfig {
    fn from(raw: RawEngineConfig) -> Self {
        let defaults = Self::default();
        Self {
            database_url: raw.database_url.unwrap_or(defaults.database_url),
            scoring: raw.scoring.unwrap_or(defaults.scoring),
            personal_settings: PartialSettings::over(
                raw.personal_settings,
                defaults.personal_settings,
            ),
            general_settings: PartialSettings::over(
                raw.general_settings,
                defaults.general_settings,
            ),
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
    }
}
