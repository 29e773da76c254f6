use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;

/// Configuration for notesearch project directories
pub struct NoteSearchDirs {
    project_dirs: Option<ProjectDirs>,
}

impl NoteSearchDirs {
    /// Create a new NoteSearchDirs instance
    pub fn new() -> Self {
        let project_dirs = ProjectDirs::from("com", "notesearch", "notesearch");
        Self { project_dirs }
    }

    /// Get the default directory holding the knowledge base
    pub fn default_db_dir(&self) -> PathBuf {
        match &self.project_dirs {
            Some(dirs) => dirs.data_dir().to_path_buf(),
            None => {
                // Fallback to ./db if ProjectDirs fails
                std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join("db")
            }
        }
    }

    /// Get the default knowledge base file path
    pub fn default_db_path(&self) -> PathBuf {
        self.default_db_dir().join("app_notes.json")
    }

    /// Ensure the knowledge base directory exists
    pub fn ensure_db_dir(&self) -> std::io::Result<PathBuf> {
        let db_dir = self.default_db_dir();
        std::fs::create_dir_all(&db_dir)?;
        Ok(db_dir)
    }
}

impl Default for NoteSearchDirs {
    fn default() -> Self {
        Self::new()
    }
}

/// Vendor application-note libraries searched by default, as `site:` filters.
pub const DEFAULT_SITES: &[&str] = &[
    "site:ti.com/lit/an",
    "site:analog.com/en/technical-documentation/application-notes",
    "site:st.com/resource/en/application_note",
    "site:infineon.com/dgdl",
    "site:nxp.com/docs/en/application-note",
    "site:ww1.microchip.com/downloads/en/AppNotes/",
    "site:renesas.com/us/en/document/apn/",
    "site:onsemi.com/pub/Collateral/",
    "site:maximintegrated.com/en/design/technical-documents/app-notes/",
    "site:vishay.com/docs/",
    "site:rohm.com/documents/en/application-notes",
];

/// Longest pause a [`DelayRange`] will ever produce.
pub const MAX_PAUSE: Duration = Duration::from_secs(300);

/// A pause drawn uniformly from `[min_secs, max_secs]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    pub const fn none() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Rejects bounds that are negative, not finite or longer than [`MAX_PAUSE`].
    pub fn validate(&self) -> anyhow::Result<()> {
        for secs in [self.min_secs, self.max_secs] {
            if !secs.is_finite() || secs < 0.0 {
                anyhow::bail!("pause of {} seconds is not a valid duration", secs);
            }
            if secs > MAX_PAUSE.as_secs_f64() {
                anyhow::bail!(
                    "pause of {} seconds exceeds the maximum of {} seconds",
                    secs,
                    MAX_PAUSE.as_secs()
                );
            }
        }
        Ok(())
    }

    /// Picks a pause inside the range; a degenerate or inverted range yields `min_secs`.
    /// Bounds outside `[0, MAX_PAUSE]` are clamped.
    pub fn sample<R: rand::Rng>(&self, rng: &mut R) -> Duration {
        let min = clamp_secs(self.min_secs);
        let max = clamp_secs(self.max_secs);
        let secs = if max > min {
            rng.gen_range(min..=max)
        } else {
            min
        };
        Duration::try_from_secs_f64(secs).unwrap_or(MAX_PAUSE)
    }
}

fn clamp_secs(secs: f64) -> f64 {
    if secs.is_nan() {
        return 0.0;
    }
    secs.clamp(0.0, MAX_PAUSE.as_secs_f64())
}

/// Tuning for the site-filtered web search backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    /// `site:` filters, one search request each.
    pub sites: Vec<String>,
    /// Upper bound on candidates taken from a single site.
    pub per_site: usize,
    /// Pause after each site that returned results.
    pub delay: DelayRange,
    /// Pause after a site that returned nothing.
    pub empty_delay: DelayRange,
    /// Pause after a failed request.
    pub error_delay: DelayRange,
    /// HTTP timeout per request, in seconds.
    pub timeout_secs: u64,
    /// Search endpoint accepting a form-encoded `q` parameter.
    pub endpoint: String,
    /// Shuffle `sites` for every query so the same vendors are not always first.
    pub shuffle_sites: bool,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            sites: DEFAULT_SITES.iter().map(|s| s.to_string()).collect(),
            per_site: 3,
            delay: DelayRange::new(2.0, 4.0),
            empty_delay: DelayRange::new(1.0, 2.0),
            error_delay: DelayRange::new(5.0, 5.0),
            timeout_secs: 20,
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
            shuffle_sites: true,
        }
    }
}

impl WebSearchConfig {
    /// Loads a configuration from a JSON file; missing fields take their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {:?}: {}", path, e))?;
        let config: WebSearchConfig = serde_json::from_str(&data)
            .map_err(|e| anyhow::anyhow!("Failed to parse config {:?}: {}", path, e))?;
        for (name, range) in [
            ("delay", &config.delay),
            ("empty_delay", &config.empty_delay),
            ("error_delay", &config.error_delay),
        ] {
            range
                .validate()
                .map_err(|e| anyhow::anyhow!("Invalid `{}` in config {:?}: {}", name, path, e))?;
        }
        info!(
            "Loaded web search config from {:?} ({} sites)",
            path,
            config.sites.len()
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_db_path_file_name() {
        let dirs = NoteSearchDirs::new();
        assert!(dirs.default_db_path().ends_with("app_notes.json"));
    }

    #[test]
    fn test_default_config_covers_vendor_sites() {
        let config = WebSearchConfig::default();
        assert_eq!(config.sites.len(), DEFAULT_SITES.len());
        assert_eq!(config.per_site, 3);
        assert!(config.shuffle_sites);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"per_site": 5, "sites": ["site:ti.com/lit/an"]}}"#).unwrap();
        let config = WebSearchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.per_site, 5);
        assert_eq!(config.sites, vec!["site:ti.com/lit/an".to_string()]);
        assert_eq!(config.timeout_secs, 20);
    }

    #[test]
    fn test_invalid_config_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(WebSearchConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_delay_sample_stays_in_range() {
        let mut rng = rand::thread_rng();
        let range = DelayRange::new(0.5, 1.5);
        for _ in 0..50 {
            let d = range.sample(&mut rng).as_secs_f64();
            assert!((0.5..=1.5).contains(&d));
        }
        assert_eq!(DelayRange::none().sample(&mut rng), Duration::ZERO);
        assert_eq!(
            DelayRange::new(2.0, 1.0).sample(&mut rng),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn test_config_with_huge_pause_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"delay": {{"min_secs": 1.0, "max_secs": 1e300}}}}"#).unwrap();
        let err = WebSearchConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("delay"));
    }

    #[test]
    fn test_config_with_negative_pause_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"error_delay": {{"min_secs": -1.0, "max_secs": 2.0}}}}"#).unwrap();
        assert!(WebSearchConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_out_of_range_delay_sample_is_clamped() {
        let mut rng = rand::thread_rng();
        for range in [
            DelayRange::new(1.0, 1e300),
            DelayRange::new(f64::INFINITY, f64::INFINITY),
            DelayRange::new(f64::NAN, f64::NAN),
            DelayRange::new(-5.0, -1.0),
        ] {
            assert!(range.sample(&mut rng) <= MAX_PAUSE);
        }
        assert_eq!(DelayRange::new(-5.0, -1.0).sample(&mut rng), Duration::ZERO);
        assert_eq!(DelayRange::new(1e300, 1e300).sample(&mut rng), MAX_PAUSE);
    }
}
