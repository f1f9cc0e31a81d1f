use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::DEFAULT_OUTPUT_PREFIX;
use crate::ParamgenError;
use crate::ParamgenResult;

/// Supported settings file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"paramgen.toml",
	".paramgen.toml",
	".config/paramgen.toml",
];

/// Prefix of the timestamped directory used when a job names no output
/// directory.
pub const DEFAULT_OUTPUT_DIR_PREFIX: &str = "files-generated";

/// Settings loaded from a `paramgen.toml` file. Every field is optional.
///
/// ```toml
/// output_prefix = "job_"
/// exclude_prefixes = ["DEBUG_", "//"]
/// default_output_prefix = "generated-"
/// fail_on_empty = true
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParamgenConfig {
	/// File name prefix for generated files. The 1-indexed counter is
	/// appended to it.
	pub output_prefix: String,
	/// Configuration lines starting with any of these prefixes are skipped.
	pub exclude_prefixes: Vec<String>,
	/// Prefix of the output directory created for jobs that do not name one.
	/// The current unix time in seconds is appended to it.
	pub default_output_prefix: String,
	/// Treat a job that expands to zero combinations as an error instead of
	/// a warning.
	pub fail_on_empty: bool,
}

impl Default for ParamgenConfig {
	fn default() -> Self {
		Self {
			output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
			exclude_prefixes: Vec::new(),
			default_output_prefix: DEFAULT_OUTPUT_DIR_PREFIX.to_string(),
			fail_on_empty: false,
		}
	}
}

impl ParamgenConfig {
	/// Resolve the settings path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the settings from the first discovered file at `root`.
	/// Returns `None` if no file exists.
	pub fn load(root: &Path) -> ParamgenResult<Option<ParamgenConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		Self::parse(&content).map(Some)
	}

	pub fn parse(content: &str) -> ParamgenResult<ParamgenConfig> {
		toml::from_str(content).map_err(|e| ParamgenError::ConfigParse(e.to_string()))
	}

	/// Like [`ParamgenConfig::load`] but falls back to the defaults.
	pub fn load_or_default(root: &Path) -> ParamgenResult<ParamgenConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}
}
