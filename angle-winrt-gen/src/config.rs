//! Configuration types for `winrt-projects.toml`.
//!
//! Every field has a built-in default, so an empty file (or no file at all)
//! yields the stock ANGLE WinRT matrix.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gyp: GypConfig,
    /// Targets to generate, in order.  Omitting `[[target]]` entirely keeps
    /// the built-in matrix.
    #[serde(default = "builtin_targets")]
    pub target: Vec<TargetConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gyp: GypConfig::default(),
            target: builtin_targets(),
        }
    }
}

/// Layout of the ANGLE checkout and the gyp invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GypConfig {
    /// Root of the ANGLE checkout.  Defaults to the current directory.
    /// A relative path read from a TOML file is resolved against the file's
    /// parent directory.
    pub angle_dir: Option<PathBuf>,
    /// gyp executable.  Relative paths are resolved against `angle_dir`.
    pub tool: Option<PathBuf>,
    /// gyp output backend (`--format`).
    pub format: String,
    /// File under the script directory passed as `--include`.
    pub include: PathBuf,
    /// Root build-description file under the script directory.
    pub root_file: PathBuf,
}

impl Default for GypConfig {
    fn default() -> Self {
        Self {
            angle_dir: None,
            tool: None,
            format: "msvs".to_string(),
            include: PathBuf::from("common.gypi"),
            root_file: PathBuf::from("angle.gyp"),
        }
    }
}

impl GypConfig {
    pub fn angle_dir(&self) -> &Path {
        self.angle_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// Directory holding the gyp build files (`<angle_dir>/build`).
    pub fn script_dir(&self) -> PathBuf {
        self.angle_dir().join("build")
    }

    /// Returns the gyp executable, falling back to the copy vendored under
    /// `third_party/gyp`.
    pub fn tool_path(&self) -> PathBuf {
        match &self.tool {
            Some(tool) => self.angle_dir().join(tool),
            None => self
                .angle_dir()
                .join("third_party")
                .join("gyp")
                .join(default_tool_name()),
        }
    }

    pub fn include_path(&self) -> PathBuf {
        self.script_dir().join(&self.include)
    }

    pub fn root_file_path(&self) -> PathBuf {
        self.script_dir().join(&self.root_file)
    }
}

fn default_tool_name() -> &'static str {
    // Without a shell, Windows will not find the batch wrapper by stem.
    if cfg!(windows) { "gyp.bat" } else { "gyp" }
}

/// One project generation run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetConfig {
    /// Passed verbatim as `--generator-output`.
    pub output_dir: PathBuf,
    /// Build the Windows Phone variant.
    #[serde(default)]
    pub winphone: bool,
    /// Visual Studio version handed to the msvs generator (e.g. `2013e`).
    pub msvs_version: String,
    pub app_type_revision: String,
    /// May be empty; the define is emitted either way.
    #[serde(default)]
    pub target_platform_version: String,
}

impl TargetConfig {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        winphone: bool,
        msvs_version: &str,
        app_type_revision: &str,
        target_platform_version: &str,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            winphone,
            msvs_version: msvs_version.to_string(),
            app_type_revision: app_type_revision.to_string(),
            target_platform_version: target_platform_version.to_string(),
        }
    }
}

/// Windows 8.1 desktop and phone, then Windows 10.
pub fn builtin_targets() -> Vec<TargetConfig> {
    vec![
        TargetConfig::new("winrt/8.1/windows", false, "2013e", "8.1", ""),
        TargetConfig::new("winrt/8.1/windowsphone", true, "2013e", "8.1", ""),
        TargetConfig::new("winrt/10", false, "2015", "10.0", "10.0.10240.0"),
    ]
}

/// Load and parse a `winrt-projects.toml` configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let mut config = parse_config(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {}", path.display(), e))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    if let Some(dir) = config.gyp.angle_dir.take() {
        config.gyp.angle_dir = Some(if dir.is_relative() {
            base_dir.join(dir)
        } else {
            dir
        });
    }
    Ok(config)
}

/// Parse configuration text without touching the filesystem.
pub fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}
