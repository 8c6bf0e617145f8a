//! `project.yml` rendering for the external `xcodegen` generator.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::Value as Yaml;

use crate::error::Result;
use crate::synth::ProjectSpec;

pub const SPEC_FILE_NAME: &str = "project.yml";

#[derive(Debug, Clone, Serialize)]
pub struct XcodegenSpec {
    pub name: String,
    pub options: XcodegenOptions,
    pub targets: BTreeMap<String, XcodegenTarget>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XcodegenOptions {
    pub bundle_id_prefix: String,
    pub deployment_target: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct XcodegenTarget {
    #[serde(rename = "type")]
    pub kind: String,
    pub platform: String,
    pub sources: Vec<XcodegenSource>,
    pub settings: XcodegenSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct XcodegenSource {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct XcodegenSettings {
    pub base: BTreeMap<String, Yaml>,
    pub debug: BTreeMap<String, Yaml>,
    pub release: BTreeMap<String, Yaml>,
}

impl XcodegenSpec {
    /// Single iOS application target built from the directory named after
    /// the project, Markdown files excluded.
    pub fn for_project(spec: &ProjectSpec, bundle_id_prefix: &str) -> Self {
        let name = spec.name.clone();
        let base = settings([
            ("PRODUCT_BUNDLE_IDENTIFIER", Yaml::from(spec.bundle_id.as_str())),
            ("SWIFT_VERSION", Yaml::from(spec.swift_version.as_str())),
            ("TARGETED_DEVICE_FAMILY", Yaml::from("1,2")),
            (
                "IPHONEOS_DEPLOYMENT_TARGET",
                Yaml::from(spec.deployment_target.as_str()),
            ),
            ("ENABLE_BITCODE", Yaml::from(false)),
            ("SWIFT_EMIT_LOC_STRINGS", Yaml::from(true)),
            ("GENERATE_INFOPLIST_FILE", Yaml::from(false)),
            ("INFOPLIST_FILE", Yaml::from(format!("{name}/Info.plist"))),
            ("ASSETCATALOG_COMPILER_APPICON_NAME", Yaml::from("AppIcon")),
            (
                "ASSETCATALOG_COMPILER_GLOBAL_ACCENT_COLOR_NAME",
                Yaml::from("AccentColor"),
            ),
        ]);
        let target = XcodegenTarget {
            kind: "application".to_string(),
            platform: "iOS".to_string(),
            sources: vec![XcodegenSource {
                path: name.clone(),
                excludes: vec!["*.md".to_string()],
            }],
            settings: XcodegenSettings {
                base,
                debug: settings([(
                    "SWIFT_ACTIVE_COMPILATION_CONDITIONS",
                    Yaml::from("DEBUG"),
                )]),
                release: settings([("SWIFT_COMPILATION_MODE", Yaml::from("wholemodule"))]),
            },
        };

        Self {
            options: XcodegenOptions {
                bundle_id_prefix: bundle_id_prefix.to_string(),
                deployment_target: BTreeMap::from([(
                    "iOS".to_string(),
                    spec.deployment_target.clone(),
                )]),
            },
            targets: BTreeMap::from([(name.clone(), target)]),
            name,
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn settings<const N: usize>(pairs: [(&str, Yaml); N]) -> BTreeMap<String, Yaml> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_application_target() {
        let spec = ProjectSpec::new("SignalAir", "com.signalair.app");
        let yaml = XcodegenSpec::for_project(&spec, "com.signalair")
            .to_yaml()
            .unwrap();

        let parsed: Yaml = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["name"], Yaml::from("SignalAir"));
        assert_eq!(parsed["options"]["bundleIdPrefix"], Yaml::from("com.signalair"));
        assert_eq!(parsed["options"]["deploymentTarget"]["iOS"], Yaml::from("15.0"));

        let target = &parsed["targets"]["SignalAir"];
        assert_eq!(target["type"], Yaml::from("application"));
        assert_eq!(target["sources"][0]["path"], Yaml::from("SignalAir"));
        assert_eq!(target["sources"][0]["excludes"][0], Yaml::from("*.md"));
        assert_eq!(
            target["settings"]["base"]["PRODUCT_BUNDLE_IDENTIFIER"],
            Yaml::from("com.signalair.app")
        );
        assert_eq!(target["settings"]["base"]["ENABLE_BITCODE"], Yaml::from(false));
        assert_eq!(
            target["settings"]["release"]["SWIFT_COMPILATION_MODE"],
            Yaml::from("wholemodule")
        );
    }
}
