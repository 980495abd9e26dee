use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::{AutomationGrader, MatchScorer, Matcher, SignalSaturation, ThresholdGate};
use crate::models::{MatchWeights, RubricPoints};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub grading: GradingSettings,
    #[serde(default)]
    pub gates: GateSettings,
    #[serde(default)]
    pub analyzer: AnalyzerSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default = "default_experience_decay")]
    pub experience_decay: f64,
    #[serde(default = "default_display_threshold")]
    pub display_threshold: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            experience_decay: default_experience_decay(),
            display_threshold: default_display_threshold(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_topic_weight")]
    pub topic: f64,
    #[serde(default = "default_experience_weight")]
    pub experience: f64,
    #[serde(default = "default_language_weight")]
    pub language: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            topic: default_topic_weight(),
            experience: default_experience_weight(),
            language: default_language_weight(),
        }
    }
}

fn default_topic_weight() -> f64 { 0.40 }
fn default_experience_weight() -> f64 { 0.30 }
fn default_language_weight() -> f64 { 0.30 }
fn default_experience_decay() -> f64 { 40.0 }
fn default_display_threshold() -> f64 { 70.0 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradingSettings {
    #[serde(default)]
    pub rubric: RubricConfig,
    #[serde(default)]
    pub saturation: SaturationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RubricConfig {
    #[serde(default = "default_language_points")]
    pub language_match: u32,
    #[serde(default = "default_function_points")]
    pub functions: u32,
    #[serde(default = "default_logic_points")]
    pub logic: u32,
    #[serde(default = "default_documentation_points")]
    pub documentation: u32,
    #[serde(default = "default_complexity_points")]
    pub complexity: u32,
    #[serde(default = "default_structure_points")]
    pub structure: u32,
}

impl Default for RubricConfig {
    fn default() -> Self {
        Self {
            language_match: default_language_points(),
            functions: default_function_points(),
            logic: default_logic_points(),
            documentation: default_documentation_points(),
            complexity: default_complexity_points(),
            structure: default_structure_points(),
        }
    }
}

fn default_language_points() -> u32 { 20 }
fn default_function_points() -> u32 { 25 }
fn default_logic_points() -> u32 { 20 }
fn default_documentation_points() -> u32 { 10 }
fn default_complexity_points() -> u32 { 15 }
fn default_structure_points() -> u32 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct SaturationConfig {
    #[serde(default = "default_saturation_functions")]
    pub functions: u32,
    #[serde(default = "default_saturation_controls")]
    pub control_structures: u32,
    #[serde(default = "default_saturation_comments")]
    pub comment_ratio: f64,
}

impl Default for SaturationConfig {
    fn default() -> Self {
        Self {
            functions: default_saturation_functions(),
            control_structures: default_saturation_controls(),
            comment_ratio: default_saturation_comments(),
        }
    }
}

fn default_saturation_functions() -> u32 { 3 }
fn default_saturation_controls() -> u32 { 5 }
fn default_saturation_comments() -> f64 { 0.2 }

#[derive(Debug, Clone, Deserialize)]
pub struct GateSettings {
    #[serde(default = "default_join_min")]
    pub join_min_score: f64,
    #[serde(default = "default_task_min")]
    pub task_min_score: f64,
    #[serde(default = "default_weekly_pass_above")]
    pub weekly_challenge_pass_above: u32,
    #[serde(default = "default_weekly_max")]
    pub weekly_challenge_max: u32,
    #[serde(default = "default_learning_support")]
    pub learning_support_failures: usize,
    #[serde(default = "default_skill_map_points")]
    pub skill_map_points: u32,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            join_min_score: default_join_min(),
            task_min_score: default_task_min(),
            weekly_challenge_pass_above: default_weekly_pass_above(),
            weekly_challenge_max: default_weekly_max(),
            learning_support_failures: default_learning_support(),
            skill_map_points: default_skill_map_points(),
        }
    }
}

fn default_join_min() -> f64 { 70.0 }
fn default_task_min() -> f64 { 80.0 }
fn default_weekly_pass_above() -> u32 { 6 }
fn default_weekly_max() -> u32 { 10 }
fn default_learning_support() -> usize { 8 }
fn default_skill_map_points() -> u32 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerSettings {
    /// "heuristic" (built in) or "remote"
    #[serde(default = "default_analyzer_mode")]
    pub mode: String,
    pub endpoint: Option<String>,
    #[serde(default = "default_analyzer_timeout")]
    pub timeout_secs: u64,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            mode: default_analyzer_mode(),
            endpoint: None,
            timeout_secs: default_analyzer_timeout(),
        }
    }
}

fn default_analyzer_mode() -> String { "heuristic".to_string() }
fn default_analyzer_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_l1_size")]
    pub l1_cache_size: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            l1_cache_size: default_l1_size(),
        }
    }
}

fn default_cache_ttl() -> u64 { 300 }
fn default_l1_size() -> u64 { 10_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> u16 { 20 }
fn default_max_limit() -> u16 { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TECHSYNC__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., TECHSYNC__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("TECHSYNC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("TECHSYNC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject weights, rubrics and thresholds the scoring core would refuse
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matcher()?;
        self.grader()?;

        for (name, value) in [
            ("scoring.display_threshold", self.scoring.display_threshold),
            ("gates.join_min_score", self.gates.join_min_score),
            ("gates.task_min_score", self.gates.task_min_score),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Message(format!(
                    "{} must be between 0 and 100, got {}",
                    name, value
                )));
            }
        }
        if self.gates.weekly_challenge_max == 0
            || self.gates.weekly_challenge_pass_above >= self.gates.weekly_challenge_max
        {
            return Err(ConfigError::Message(format!(
                "gates.weekly_challenge_pass_above ({}) must be below a non-zero gates.weekly_challenge_max ({})",
                self.gates.weekly_challenge_pass_above, self.gates.weekly_challenge_max
            )));
        }

        match self.analyzer.mode.as_str() {
            "heuristic" => {}
            "remote" if self.analyzer.endpoint.is_some() => {}
            "remote" => {
                return Err(ConfigError::Message(
                    "analyzer.endpoint is required in remote mode".to_string(),
                ))
            }
            other => {
                return Err(ConfigError::Message(format!(
                    "unknown analyzer mode: {}",
                    other
                )))
            }
        }
        Ok(())
    }

    pub fn match_weights(&self) -> MatchWeights {
        MatchWeights {
            topic: self.scoring.weights.topic,
            experience: self.scoring.weights.experience,
            language: self.scoring.weights.language,
        }
    }

    pub fn matcher(&self) -> Result<Matcher, ConfigError> {
        let scorer = MatchScorer::new(self.match_weights(), self.scoring.experience_decay)
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(Matcher::new(scorer, self.scoring.display_threshold))
    }

    pub fn grader(&self) -> Result<AutomationGrader, ConfigError> {
        let rubric = &self.grading.rubric;
        let saturation = &self.grading.saturation;
        AutomationGrader::new(
            RubricPoints {
                language_match: rubric.language_match,
                functions: rubric.functions,
                logic: rubric.logic,
                documentation: rubric.documentation,
                complexity: rubric.complexity,
                structure: rubric.structure,
            },
            SignalSaturation {
                functions: saturation.functions,
                control_structures: saturation.control_structures,
                comment_ratio: saturation.comment_ratio,
            },
        )
        .map_err(|e| ConfigError::Message(e.to_string()))
    }

    pub fn gate(&self) -> ThresholdGate {
        ThresholdGate {
            join_min_score: self.gates.join_min_score,
            task_min_score: self.gates.task_min_score,
            weekly_challenge_pass_above: self.gates.weekly_challenge_pass_above,
            weekly_challenge_max: self.gates.weekly_challenge_max,
            learning_support_failures: self.gates.learning_support_failures,
            skill_map_points: self.gates.skill_map_points,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            scoring: ScoringSettings::default(),
            grading: GradingSettings::default(),
            gates: GateSettings::default(),
            analyzer: AnalyzerSettings::default(),
            cache: CacheSettings::default(),
            matching: MatchingSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}
