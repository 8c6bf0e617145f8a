//! Fresh project synthesis.
//!
//! Builds a complete single-target application project from a list of
//! discovered source files. Every cross reference goes through identifiers
//! minted during the same run, so the result always passes
//! [`ProjectDescription::validate`].

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::identifier::IdentifierSource;
use crate::identifier::ObjectId;
use crate::model::ProjectDescription;
use crate::objects::APPLICATION_PRODUCT_TYPE;
use crate::objects::BuildConfiguration;
use crate::objects::BuildFile;
use crate::objects::BuildPhase;
use crate::objects::BuildPhaseKind;
use crate::objects::ConfigurationList;
use crate::objects::FileDescriptor;
use crate::objects::FileReference;
use crate::objects::Group;
use crate::objects::NativeTarget;
use crate::objects::ProjectObject;
use crate::settings::Configuration;
use crate::settings::project_settings;
use crate::settings::target_settings;
use crate::value::Dict;
use crate::value::Value;

/// Identifiers a synthesis run mints on top of two per source file.
pub const FIXED_IDENTIFIER_COUNT: usize = 15;

const LAST_UPGRADE_CHECK: &str = "1500";
const CREATED_ON_TOOLS_VERSION: &str = "15.0";
const COMPATIBILITY_VERSION: &str = "Xcode 14.0";
const INFO_PLIST: &str = "Info.plist";

/// Inputs of a fresh project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpec {
    /// Application name; also the name of the scanned source directory.
    pub name: String,
    /// Reverse-DNS bundle identifier.
    pub bundle_id: String,
    pub deployment_target: String,
    pub swift_version: String,
}

impl ProjectSpec {
    pub fn new(name: impl Into<String>, bundle_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bundle_id: bundle_id.into(),
            deployment_target: "15.0".to_string(),
            swift_version: "5.0".to_string(),
        }
    }
}

/// Output of [`synthesize_project`].
#[derive(Debug, Clone)]
pub struct SynthesizedProject {
    pub description: ProjectDescription,
    /// The application target; the scheme refers to it.
    pub target_id: ObjectId,
    pub product_name: String,
}

/// Per-file identifiers, in the order the files were given.
#[derive(Debug, Clone)]
struct SourceEntry<'a> {
    file: &'a FileDescriptor,
    build_file: ObjectId,
    file_ref: ObjectId,
}

/// Assemble the project description for `spec` and `files`.
pub fn synthesize_project<S: IdentifierSource>(
    spec: &ProjectSpec,
    files: &[FileDescriptor],
    ids: &mut S,
) -> Result<SynthesizedProject> {
    let entries: Vec<SourceEntry<'_>> = files
        .iter()
        .map(|file| SourceEntry {
            file,
            build_file: ids.next_id(),
            file_ref: ids.next_id(),
        })
        .collect();

    let project_id = ids.next_id();
    let main_group_id = ids.next_id();
    let source_group_id = ids.next_id();
    let products_group_id = ids.next_id();
    let target_id = ids.next_id();
    let target_config_list_id = ids.next_id();
    let project_config_list_id = ids.next_id();
    let product_id = ids.next_id();
    let info_plist_id = ids.next_id();
    let frameworks_phase_id = ids.next_id();
    let sources_phase_id = ids.next_id();
    let project_debug_id = ids.next_id();
    let project_release_id = ids.next_id();
    let target_debug_id = ids.next_id();
    let target_release_id = ids.next_id();

    let mut description = ProjectDescription::new(&spec.name, project_id.clone());

    for entry in &entries {
        description.insert(BuildFile {
            id: entry.build_file.clone(),
            file_ref: entry.file_ref.clone(),
        })?;
    }

    description.insert(FileReference::application_product(
        product_id.clone(),
        &spec.name,
    ))?;
    description.insert(FileReference::source(info_plist_id.clone(), INFO_PLIST))?;
    for entry in &entries {
        description.insert(FileReference::source(
            entry.file_ref.clone(),
            entry.file.path.as_str(),
        ))?;
    }

    description.insert(BuildPhase {
        id: frameworks_phase_id.clone(),
        kind: BuildPhaseKind::Frameworks,
        files: Vec::new(),
    })?;

    description.insert(Group {
        id: main_group_id.clone(),
        name: None,
        path: None,
        children: vec![source_group_id.clone(), products_group_id.clone()],
    })?;
    let mut source_children = vec![info_plist_id];
    source_children.extend(entries.iter().map(|e| e.file_ref.clone()));
    description.insert(Group {
        id: source_group_id,
        name: None,
        path: Some(spec.name.clone()),
        children: source_children,
    })?;
    description.insert(Group {
        id: products_group_id.clone(),
        name: Some("Products".to_string()),
        path: None,
        children: vec![product_id.clone()],
    })?;

    description.insert(NativeTarget {
        id: target_id.clone(),
        name: spec.name.clone(),
        product_name: spec.name.clone(),
        product_reference: product_id,
        product_type: APPLICATION_PRODUCT_TYPE.to_string(),
        build_configuration_list: target_config_list_id.clone(),
        build_phases: vec![sources_phase_id.clone(), frameworks_phase_id],
    })?;

    description.insert(ProjectObject {
        id: project_id,
        attributes: project_attributes(&target_id),
        build_configuration_list: project_config_list_id.clone(),
        compatibility_version: COMPATIBILITY_VERSION.to_string(),
        development_region: "en".to_string(),
        known_regions: vec!["en".to_string(), "Base".to_string()],
        main_group: main_group_id,
        product_ref_group: products_group_id,
        targets: vec![target_id.clone()],
    })?;

    description.insert(BuildPhase {
        id: sources_phase_id,
        kind: BuildPhaseKind::Sources,
        files: entries.iter().map(|e| e.build_file.clone()).collect(),
    })?;

    let configurations = [
        (project_debug_id.clone(), Configuration::Debug, false),
        (project_release_id.clone(), Configuration::Release, false),
        (target_debug_id.clone(), Configuration::Debug, true),
        (target_release_id.clone(), Configuration::Release, true),
    ];
    for (id, configuration, is_target) in configurations {
        let settings = if is_target {
            target_settings(&spec.name, &spec.bundle_id, &spec.swift_version)
        } else {
            project_settings(configuration, &spec.deployment_target)
        };
        description.insert(BuildConfiguration {
            id,
            name: configuration.name().to_string(),
            settings,
        })?;
    }

    description.insert(ConfigurationList {
        id: target_config_list_id,
        configurations: vec![target_debug_id, target_release_id],
        default_configuration: Configuration::Release.name().to_string(),
    })?;
    description.insert(ConfigurationList {
        id: project_config_list_id,
        configurations: vec![project_debug_id, project_release_id],
        default_configuration: Configuration::Release.name().to_string(),
    })?;

    description.validate()?;
    debug!(
        "Synthesized project {} with {} sources ({} objects)",
        spec.name,
        entries.len(),
        description.len()
    );

    Ok(SynthesizedProject {
        description,
        target_id,
        product_name: spec.name.clone(),
    })
}

fn project_attributes(target_id: &ObjectId) -> Dict {
    let mut target_attributes = Dict::new();
    target_attributes.insert(
        target_id.as_str(),
        Dict::from_pairs([("CreatedOnToolsVersion", CREATED_ON_TOOLS_VERSION)]),
    );
    let mut attributes = Dict::new();
    attributes.insert("BuildIndependentTargetsInParallel", "1");
    attributes.insert("LastSwiftUpdateCheck", LAST_UPGRADE_CHECK);
    attributes.insert("LastUpgradeCheck", LAST_UPGRADE_CHECK);
    attributes.insert("TargetAttributes", Value::Dict(target_attributes));
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::SequentialIdentifiers;
    use crate::model::isa;

    #[test]
    fn target_lists_the_real_sources_phase() {
        let spec = ProjectSpec::new("Demo", "com.example.demo");
        let files = [FileDescriptor::from_path("A.swift")];
        let project = synthesize_project(&spec, &files, &mut SequentialIdentifiers::default()).unwrap();

        let target = project.description.find_target(None).unwrap();
        assert_eq!(target.id, project.target_id);
        let sources = project
            .description
            .build_phase(target, isa::SOURCES_BUILD_PHASE)
            .unwrap();
        assert_eq!(sources.references("files").len(), 1);
    }

    #[test]
    fn empty_source_list_still_validates() {
        let spec = ProjectSpec::new("Empty", "com.example.empty");
        let project = synthesize_project(&spec, &[], &mut SequentialIdentifiers::default()).unwrap();
        assert_eq!(project.description.len(), FIXED_IDENTIFIER_COUNT);
    }
}
