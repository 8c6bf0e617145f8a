//! `pbxforge.toml` configuration.
//!
//! Every field has a default, so an empty file (or no file at all) describes
//! the SignalAir application. Command-line flags are applied on top by the
//! command handlers.

use std::path::Path;
use std::path::PathBuf;

use pbxforge_core::FileDescriptor;
use pbxforge_core::GroupRule;
use pbxforge_core::PatchPlan;
use pbxforge_core::ProjectSpec;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::error::CliError;
use crate::error::Result;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "pbxforge.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub generate: GenerateConfig,
    pub patch: PatchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub bundle_id: String,
    pub deployment_target: String,
    pub swift_version: String,
    /// Extensions (without the dot) of files compiled by the target
    pub source_extensions: Vec<String>,
    /// `bundleIdPrefix` of the xcodegen spec
    pub organization_prefix: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "SignalAir".to_string(),
            bundle_id: "com.signalair.app".to_string(),
            deployment_target: "15.0".to_string(),
            swift_version: "5.0".to_string(),
            source_extensions: vec!["swift".to_string()],
            organization_prefix: "com.signalair".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Directory holding the `<name>` source folder; the bundle is written here
    pub root: PathBuf,
    pub use_xcodegen: bool,
    pub xcodegen_command: String,
    /// Counter-based identifiers instead of random ones
    pub deterministic_ids: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            use_xcodegen: false,
            xcodegen_command: "xcodegen".to_string(),
            deterministic_ids: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    pub project_file: PathBuf,
    pub target: Option<String>,
    pub files: Vec<FileDescriptor>,
    pub groups: Vec<GroupRuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRuleConfig {
    /// Regular expression matched against the declared file path
    pub pattern: String,
    pub group: String,
}

impl Default for PatchConfig {
    fn default() -> Self {
        let files = [
            ("AutonomousSystemManager.swift", "Core/Services"),
            ("AutomaticSecurityMonitor.swift", "Core/Security"),
            ("AutomaticBanSystem.swift", "Core/Security"),
            ("AutomaticSystemMaintenance.swift", "Core/Services"),
            ("SystemHealthMonitor.swift", "Core/Services"),
        ]
        .into_iter()
        .map(|(name, dir)| FileDescriptor::new(name, format!("SignalAir/{dir}/{name}")))
        .collect();

        Self {
            project_file: PathBuf::from("SignalAir-iOS/SignalAir Rescue.xcodeproj/project.pbxproj"),
            target: None,
            files,
            groups: vec![
                GroupRuleConfig {
                    pattern: "Services".to_string(),
                    group: "Core/Services".to_string(),
                },
                GroupRuleConfig {
                    pattern: "Security".to_string(),
                    group: "Core/Security".to_string(),
                },
            ],
        }
    }
}

impl Config {
    /// Load `explicit`, or `pbxforge.toml` from `cwd` when present, or the
    /// built-in defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        match explicit {
            Some(path) if path.is_file() => Self::from_file(path),
            Some(path) => Err(CliError::ConfigNotFound(path.to_path_buf())),
            None => {
                let default = cwd.join(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(&default)
                } else {
                    debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            return Err(CliError::InvalidConfig(
                "project name cannot be empty".to_string(),
            ));
        }
        if self.project.name.contains('/') {
            return Err(CliError::InvalidConfig(format!(
                "project name `{}` cannot contain `/`",
                self.project.name
            )));
        }
        if self.project.bundle_id.trim().is_empty() {
            return Err(CliError::InvalidConfig(
                "bundle id cannot be empty".to_string(),
            ));
        }
        if self.project.source_extensions.is_empty() {
            return Err(CliError::InvalidConfig(
                "at least one source extension is required".to_string(),
            ));
        }
        if self.generate.use_xcodegen && self.generate.xcodegen_command.trim().is_empty() {
            return Err(CliError::InvalidConfig(
                "xcodegen_command cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn project_spec(&self) -> ProjectSpec {
        ProjectSpec {
            name: self.project.name.clone(),
            bundle_id: self.project.bundle_id.clone(),
            deployment_target: self.project.deployment_target.clone(),
            swift_version: self.project.swift_version.clone(),
        }
    }

    /// Files and compiled group rules of the `[patch]` section.
    pub fn patch_plan(&self) -> Result<PatchPlan> {
        let rules = self
            .patch
            .groups
            .iter()
            .map(|rule| GroupRule::new(&rule.pattern, rule.group.as_str()))
            .collect::<pbxforge_core::Result<Vec<_>>>()?;
        Ok(PatchPlan {
            files: self.patch.files.clone(),
            rules,
            target: self.patch.target.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn defaults_describe_signalair() {
        let config = Config::default();
        assert_eq!(config.project.name, "SignalAir");
        assert_eq!(config.project.bundle_id, "com.signalair.app");
        assert_eq!(config.patch.files.len(), 5);
        assert_eq!(
            config.patch.files[0].path,
            "SignalAir/Core/Services/AutonomousSystemManager.swift"
        );
        config.validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"
[project]
name = "Demo"

[patch]
target = "Demo"
groups = [{ pattern = "Views/", group = "Demo/Views" }]
"#,
        )
        .unwrap();

        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.project.name, "Demo");
        assert_eq!(config.project.bundle_id, "com.signalair.app");
        assert_eq!(config.generate, GenerateConfig::default());

        let plan = config.patch_plan().unwrap();
        assert_eq!(plan.target.as_deref(), Some("Demo"));
        assert_eq!(plan.rules.len(), 1);
        assert_eq!(plan.rules[0].anchor, "Demo/Views");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert!(matches!(err, CliError::ConfigNotFound(_)));
    }

    #[test]
    fn missing_default_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::load(None, dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[project\nname = 1").unwrap();
        let err = Config::load(Some(&path), dir.path()).unwrap_err();
        assert!(matches!(err, CliError::Config { path: ref p, .. } if p == &path));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let mut config = Config::default();
        config.patch.groups[0].pattern = "(".to_string();
        let err = config.patch_plan().unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(pbxforge_core::PbxError::InvalidPattern(_))
        ));
    }
}
