//! Registering additional source files in an existing project.
//!
//! A patch runs in two passes. The first resolves every anchor it needs (the
//! target, its Sources build phase, and the group of each planned file) and
//! fails without touching the document when any of them is missing. The
//! second pass mints identifiers and appends the new objects.
//!
//! Applying the same plan twice registers every file twice; callers that
//! need idempotence must check the report of a previous run.

use std::collections::HashMap;

use regex::Regex;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::error::PbxError;
use crate::error::Result;
use crate::identifier::IdentifierSource;
use crate::identifier::ObjectId;
use crate::identifier::mint_unique;
use crate::model::ProjectDescription;
use crate::model::isa;
use crate::objects::BuildFile;
use crate::objects::FileDescriptor;
use crate::objects::FileReference;
use crate::objects::SourceTree;

/// Sends files whose declared path matches `pattern` to the group `anchor`.
#[derive(Debug, Clone)]
pub struct GroupRule {
    pub pattern: Regex,
    /// Slash-joined group path, matched against the tail of each group's
    /// display path.
    pub anchor: String,
}

impl GroupRule {
    pub fn new(pattern: &str, anchor: impl Into<String>) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            anchor: anchor.into(),
        })
    }

    fn matches(&self, file: &FileDescriptor) -> bool {
        self.pattern.is_match(&file.path)
    }
}

/// What to add, and where.
#[derive(Debug, Clone, Default)]
pub struct PatchPlan {
    pub files: Vec<FileDescriptor>,
    /// Checked in order; the first matching rule decides the group.
    pub rules: Vec<GroupRule>,
    /// Target name; `None` picks the first target of the project.
    pub target: Option<String>,
}

/// One file registered by [`apply_patch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedFile {
    pub name: String,
    pub path: String,
    pub file_ref: ObjectId,
    pub build_file: ObjectId,
    /// Anchor of the group the reference was placed in.
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub target: String,
    pub added: Vec<AddedFile>,
}

impl PatchReport {
    pub fn orphans(&self) -> impl Iterator<Item = &AddedFile> {
        self.added.iter().filter(|file| file.group.is_none())
    }
}

/// Register `plan.files` in `project`.
pub fn apply_patch<S: IdentifierSource>(
    project: &mut ProjectDescription,
    plan: &PatchPlan,
    ids: &mut S,
) -> Result<PatchReport> {
    let target = project.find_target(plan.target.as_deref())?;
    let target_name = target
        .get_str("name")
        .map_or_else(|| target.id.to_string(), str::to_string);
    let sources_phase = project.build_phase(target, isa::SOURCES_BUILD_PHASE)?;
    sources_phase.ensure_list("files")?;
    let sources_phase = sources_phase.id.clone();

    let placements = resolve_groups(project, plan)?;

    let mut added = Vec::with_capacity(plan.files.len());
    for (file, placement) in plan.files.iter().zip(placements) {
        let file_ref_id = mint_unique(ids, project);
        let file_ref = match &placement {
            Some(_) => FileReference::source(file_ref_id.clone(), file.name.as_str()),
            None => {
                warn!(
                    "{} matches no group rule; registering it without a group",
                    file.path
                );
                let mut reference = FileReference::source(file_ref_id.clone(), file.path.as_str());
                reference.name = Some(file.name.clone());
                reference.source_tree = SourceTree::SourceRoot;
                reference
            }
        };
        project.insert(file_ref)?;

        let build_file_id = mint_unique(ids, project);
        project.insert(BuildFile {
            id: build_file_id.clone(),
            file_ref: file_ref_id.clone(),
        })?;

        push_child(project, &sources_phase, "files", &build_file_id)?;
        if let Some((group_id, _)) = &placement {
            push_child(project, group_id, "children", &file_ref_id)?;
        }

        debug!("Registered {} as {file_ref_id} / {build_file_id}", file.path);
        added.push(AddedFile {
            name: file.name.clone(),
            path: file.path.clone(),
            file_ref: file_ref_id,
            build_file: build_file_id,
            group: placement.map(|(_, anchor)| anchor),
        });
    }

    info!("Added {} files to target {target_name}", added.len());
    Ok(PatchReport {
        target: target_name,
        added,
    })
}

/// Group id and anchor for every planned file, or `None` when no rule matches.
fn resolve_groups(
    project: &ProjectDescription,
    plan: &PatchPlan,
) -> Result<Vec<Option<(ObjectId, String)>>> {
    let parents = project.group_parents();
    let mut resolved: HashMap<&str, ObjectId> = HashMap::new();
    let mut placements = Vec::with_capacity(plan.files.len());
    for file in &plan.files {
        let Some(rule) = plan.rules.iter().find(|rule| rule.matches(file)) else {
            placements.push(None);
            continue;
        };
        let group = match resolved.get(rule.anchor.as_str()) {
            Some(group) => group.clone(),
            None => {
                let group = find_group(project, &rule.anchor, &parents)?;
                if let Some(object) = project.get(&group) {
                    object.ensure_list("children")?;
                }
                resolved.insert(rule.anchor.as_str(), group.clone());
                group
            }
        };
        placements.push(Some((group, rule.anchor.clone())));
    }
    Ok(placements)
}

/// First group, in document order, whose display path ends with `anchor`.
pub fn find_group(
    project: &ProjectDescription,
    anchor: &str,
    parents: &HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let anchor = anchor.trim_matches('/');
    let suffix = format!("/{anchor}");
    project
        .objects_of(isa::GROUP)
        .find(|group| {
            let path = project.group_display_path(&group.id, parents);
            path == anchor || path.ends_with(&suffix)
        })
        .map(|group| group.id.clone())
        .ok_or_else(|| PbxError::GroupNotFound {
            anchor: anchor.to_string(),
        })
}

fn push_child(
    project: &mut ProjectDescription,
    owner: &ObjectId,
    key: &str,
    child: &ObjectId,
) -> Result<()> {
    project
        .get_mut(owner)
        .ok_or_else(|| PbxError::DanglingReference {
            from: child.to_string(),
            key: key.to_string(),
            target: owner.to_string(),
        })?
        .push_reference(key, child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::SequentialIdentifiers;
    use crate::model::Object;
    use crate::objects::Group;
    use crate::value::Value;

    fn project_with_groups() -> ProjectDescription {
        let mut project = ProjectDescription::new("Demo", ObjectId::new("ROOT"));
        let groups = [
            ("MAIN", None, vec!["APP"]),
            ("APP", Some("Demo"), vec!["CORE"]),
            ("CORE", Some("Core"), vec!["SERVICES", "SECURITY"]),
            ("SERVICES", Some("Services"), vec![]),
            ("SECURITY", Some("Security"), vec![]),
        ];
        for (id, path, children) in groups {
            project
                .insert(Group {
                    id: ObjectId::new(id),
                    name: None,
                    path: path.map(str::to_string),
                    children: children.into_iter().map(ObjectId::new).collect(),
                })
                .unwrap();
        }
        project.insert(Object::new(ObjectId::new("ROOT"), isa::PROJECT)).unwrap();
        project
    }

    #[test]
    fn anchors_match_display_path_suffixes() {
        let project = project_with_groups();
        let parents = project.group_parents();
        assert_eq!(
            find_group(&project, "Core/Services", &parents).unwrap(),
            ObjectId::new("SERVICES")
        );
        assert_eq!(
            find_group(&project, "Demo/Core", &parents).unwrap(),
            ObjectId::new("CORE")
        );
        // Partial component names do not match.
        assert!(matches!(
            find_group(&project, "re/Services", &parents),
            Err(PbxError::GroupNotFound { .. })
        ));
    }

    #[test]
    fn first_matching_rule_wins() {
        let project = project_with_groups();
        let plan = PatchPlan {
            files: vec![FileDescriptor::from_path("App/Core/Services/SecurityService.swift")],
            rules: vec![
                GroupRule::new("Services", "Core/Services").unwrap(),
                GroupRule::new("Security", "Core/Security").unwrap(),
            ],
            target: None,
        };
        let placements = resolve_groups(&project, &plan).unwrap();
        assert_eq!(
            placements,
            vec![Some((ObjectId::new("SERVICES"), "Core/Services".to_string()))]
        );
    }

    #[test]
    fn project_without_targets_is_left_alone() {
        let mut project = project_with_groups();
        let before = project.len();
        let plan = PatchPlan {
            files: vec![FileDescriptor::from_path("X.swift")],
            ..PatchPlan::default()
        };
        let err = apply_patch(&mut project, &plan, &mut SequentialIdentifiers::default()).unwrap_err();
        assert!(matches!(err, PbxError::NoTargets));
        assert_eq!(project.len(), before);
    }

    #[test]
    fn malformed_group_children_fail_before_any_insert() {
        let mut project = project_with_groups();
        let mut target = Object::new(ObjectId::new("TARGET"), isa::NATIVE_TARGET);
        target.props.insert("name", "Demo");
        target.props.insert("buildPhases", Value::ids([&ObjectId::new("SOURCES")]));
        project.insert(target).unwrap();
        let mut sources = Object::new(ObjectId::new("SOURCES"), isa::SOURCES_BUILD_PHASE);
        sources.props.insert("files", Value::Array(Vec::new()));
        project.insert(sources).unwrap();
        project
            .get_mut(&ObjectId::new("ROOT"))
            .unwrap()
            .push_reference("targets", &ObjectId::new("TARGET"))
            .unwrap();
        project
            .get_mut(&ObjectId::new("SERVICES"))
            .unwrap()
            .props
            .insert("children", "SERVICES_CHILDREN");

        let before = project.len();
        let plan = PatchPlan {
            files: vec![
                FileDescriptor::from_path("App/Other.swift"),
                FileDescriptor::from_path("App/Core/Services/X.swift"),
            ],
            rules: vec![GroupRule::new("Services", "Core/Services").unwrap()],
            target: None,
        };
        let err = apply_patch(&mut project, &plan, &mut SequentialIdentifiers::default()).unwrap_err();
        assert!(matches!(
            err,
            PbxError::UnexpectedValue { ref key, .. } if key == "children"
        ));
        assert_eq!(project.len(), before);
        assert_eq!(
            project.get(&ObjectId::new("SOURCES")).unwrap().props.get_array("files"),
            Some(&[][..])
        );
    }
}
