use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LitmergeError, Result};
use crate::models::SourceTag;

/// Root application configuration, loaded from `~/.config/litmerge/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub data_dir: String,
    pub award_files: Vec<String>,
    pub bibliographic_file: String,
    pub reception_file: String,
    pub bestseller_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award_year_min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award_year_max: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: String,
    pub pretty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Source whose records drive matching and define output identity.
    pub primary_source: SourceTag,
    pub similarity_threshold: f64,
    pub primary_order: PrimaryOrder,
    /// Fold repeated primary listings of one book into a single cluster.
    pub fold_primary_duplicates: bool,
}

/// Order in which primary records are offered to the matcher. Matching is
/// greedy, so this decides who claims an ambiguous candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryOrder {
    #[default]
    AsListed,
    /// Stable sort by year ascending; records without a year go last.
    ByYear,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            award_files: vec![
                "booker_prize.json".to_string(),
                "national_book_award.json".to_string(),
                "pulitzer_prize.json".to_string(),
            ],
            bibliographic_file: "google_books.json".to_string(),
            reception_file: "openlibrary_books.json".to_string(),
            bestseller_file: "nyt_bestsellers.json".to_string(),
            award_year_min: Some(2020),
            award_year_max: Some(2025),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: "merged_data".to_string(),
            pretty: true,
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            primary_source: SourceTag::Award,
            similarity_threshold: 0.85,
            primary_order: PrimaryOrder::AsListed,
            fold_primary_duplicates: true,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/litmerge/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("LITMERGE_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("litmerge")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.matching.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(LitmergeError::ConfigError(format!(
                "similarity_threshold must be within [0, 1], got {threshold}"
            )));
        }
        if let (Some(min), Some(max)) = (self.input.award_year_min, self.input.award_year_max)
            && min > max
        {
            return Err(LitmergeError::ConfigError(format!(
                "award_year_min ({min}) is after award_year_max ({max})"
            )));
        }
        Ok(())
    }

    // ─── Derived paths ─────────────────────────────────────

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.input.data_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output.output_dir)
    }

    pub fn award_paths(&self) -> Vec<PathBuf> {
        self.input
            .award_files
            .iter()
            .map(|name| self.data_dir().join(name))
            .collect()
    }

    pub fn bibliographic_path(&self) -> PathBuf {
        self.data_dir().join(&self.input.bibliographic_file)
    }

    pub fn reception_path(&self) -> PathBuf {
        self.data_dir().join(&self.input.reception_file)
    }

    pub fn bestseller_path(&self) -> PathBuf {
        self.data_dir().join(&self.input.bestseller_file)
    }

    /// Whether an award listing year falls inside the configured window.
    pub fn award_year_in_range(&self, year: Option<i32>) -> bool {
        let (min, max) = (self.input.award_year_min, self.input.award_year_max);
        if min.is_none() && max.is_none() {
            return true;
        }
        match year {
            Some(y) => min.is_none_or(|m| y >= m) && max.is_none_or(|m| y <= m),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.matching.primary_source, SourceTag::Award);
        assert_eq!(cfg.matching.similarity_threshold, 0.85);
        assert_eq!(cfg.input.award_files.len(), 3);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.matching.primary_order = PrimaryOrder::ByYear;
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.matching.primary_order, PrimaryOrder::ByYear);
        assert_eq!(loaded.input.reception_file, cfg.input.reception_file);
        assert_eq!(loaded.output.output_dir, cfg.output.output_dir);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let cfg =
            AppConfig::load_from(Path::new("/tmp/nonexistent_litmerge_config.toml")).unwrap();
        assert_eq!(cfg.output.output_dir, "merged_data");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[matching]\nprimary_source = \"bibliographic_api\"\nsimilarity_threshold = 0.9\n",
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.matching.primary_source, SourceTag::BibliographicApi);
        assert_eq!(cfg.matching.similarity_threshold, 0.9);
        assert!(cfg.matching.fold_primary_duplicates);
        assert_eq!(cfg.input.bestseller_file, "nyt_bestsellers.json");
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[matching]\nsimilarity_threshold = 1.5\n").unwrap();

        assert!(matches!(
            AppConfig::load_from(&path),
            Err(LitmergeError::ConfigError(_))
        ));
    }

    #[test]
    fn test_award_year_window() {
        let cfg = AppConfig::default();
        assert!(cfg.award_year_in_range(Some(2020)));
        assert!(cfg.award_year_in_range(Some(2025)));
        assert!(!cfg.award_year_in_range(Some(2019)));
        assert!(!cfg.award_year_in_range(None));

        let mut open = AppConfig::default();
        open.input.award_year_min = None;
        open.input.award_year_max = None;
        assert!(open.award_year_in_range(None));
    }

    #[test]
    fn test_derived_paths() {
        let cfg = AppConfig::default();
        assert!(cfg.bibliographic_path().ends_with("google_books.json"));
        assert_eq!(cfg.award_paths().len(), 3);
        assert!(cfg.award_paths()[0].starts_with("data"));
    }
}
