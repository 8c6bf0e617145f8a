//! In-memory model of a project description.
//!
//! Objects stay generic (`isa` plus an ordered property dictionary) so that
//! documents written by other tools survive a parse/patch/write cycle. The
//! typed entities in [`crate::objects`] build these objects, and the lookup
//! helpers below read them back.

use std::collections::HashMap;

use crate::error::PbxError;
use crate::error::Result;
use crate::identifier::ObjectId;
use crate::parser::parse_plist;
use crate::value::Dict;
use crate::value::Value;

/// `isa` tags of the objects this crate creates or navigates.
pub mod isa {
    pub const BUILD_FILE: &str = "PBXBuildFile";
    pub const FILE_REFERENCE: &str = "PBXFileReference";
    pub const FRAMEWORKS_BUILD_PHASE: &str = "PBXFrameworksBuildPhase";
    pub const GROUP: &str = "PBXGroup";
    pub const NATIVE_TARGET: &str = "PBXNativeTarget";
    pub const PROJECT: &str = "PBXProject";
    pub const RESOURCES_BUILD_PHASE: &str = "PBXResourcesBuildPhase";
    pub const SOURCES_BUILD_PHASE: &str = "PBXSourcesBuildPhase";
    pub const VARIANT_GROUP: &str = "PBXVariantGroup";
    pub const BUILD_CONFIGURATION: &str = "XCBuildConfiguration";
    pub const CONFIGURATION_LIST: &str = "XCConfigurationList";
}

pub const DEFAULT_ARCHIVE_VERSION: &str = "1";
pub const DEFAULT_OBJECT_VERSION: &str = "56";

/// One entry of the `objects` dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub id: ObjectId,
    pub props: Dict,
}

impl Object {
    pub fn new(id: ObjectId, isa: &str) -> Self {
        let mut props = Dict::new();
        props.insert("isa", isa);
        Self { id, props }
    }

    pub fn isa(&self) -> &str {
        self.props.get_str("isa").unwrap_or_default()
    }

    pub fn is(&self, isa: &str) -> bool {
        self.isa() == isa
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.props.get_str(key)
    }

    /// Single reference stored under `key`.
    pub fn reference(&self, key: &str) -> Option<ObjectId> {
        self.props.get_str(key).map(ObjectId::new)
    }

    /// Reference list stored under `key`; non-string entries are skipped.
    pub fn references(&self, key: &str) -> Vec<ObjectId> {
        self.props
            .get_array(key)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_str)
            .map(ObjectId::new)
            .collect()
    }

    /// Whether `key` can take [`Object::push_reference`]: it is a list or absent.
    pub fn ensure_list(&self, key: &str) -> Result<()> {
        match self.props.get(key) {
            None | Some(Value::Array(_)) => Ok(()),
            Some(_) => Err(PbxError::UnexpectedValue {
                object: self.id.to_string(),
                key: key.to_string(),
                expected: "a list",
            }),
        }
    }

    /// Append a reference to the list under `key`, creating the list if needed.
    pub fn push_reference(&mut self, key: &str, id: &ObjectId) -> Result<()> {
        self.ensure_list(key)?;
        if !self.props.contains_key(key) {
            self.props.insert(key, Value::Array(Vec::new()));
        }
        if let Some(items) = self.props.get_array_mut(key) {
            items.push(Value::from(id));
        }
        Ok(())
    }

    /// `name`, falling back to `path`, the label Xcode shows for files and groups.
    pub fn display_name(&self) -> Option<&str> {
        self.get_str("name").or_else(|| self.get_str("path"))
    }
}

/// A complete project description: the `objects` table and its root.
#[derive(Debug, Clone)]
pub struct ProjectDescription {
    name: String,
    pub archive_version: String,
    pub object_version: String,
    pub classes: Dict,
    objects: Vec<Object>,
    index: HashMap<ObjectId, usize>,
    root_object: ObjectId,
}

impl ProjectDescription {
    /// Empty description whose root object will be `root_object`.
    pub fn new(name: impl Into<String>, root_object: ObjectId) -> Self {
        Self {
            name: name.into(),
            archive_version: DEFAULT_ARCHIVE_VERSION.to_string(),
            object_version: DEFAULT_OBJECT_VERSION.to_string(),
            classes: Dict::new(),
            objects: Vec::new(),
            index: HashMap::new(),
            root_object,
        }
    }

    /// Parse `project.pbxproj` text.
    ///
    /// `name` is the project name Xcode derives from the enclosing
    /// `.xcodeproj` directory; it only shows up in reference comments.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self> {
        let root = parse_plist(text)?;
        let root_object = root
            .get_str("rootObject")
            .map(ObjectId::new)
            .ok_or_else(|| PbxError::missing_key(&"<root>", "rootObject"))?;
        let mut description = Self::new(name, root_object);
        if let Some(version) = root.get_str("archiveVersion") {
            description.archive_version = version.to_string();
        }
        if let Some(version) = root.get_str("objectVersion") {
            description.object_version = version.to_string();
        }
        if let Some(classes) = root.get_dict("classes") {
            description.classes = classes.clone();
        }
        let objects = root
            .get_dict("objects")
            .ok_or_else(|| PbxError::missing_key(&"<root>", "objects"))?;
        for (id, value) in objects.iter() {
            let props = value.as_dict().ok_or_else(|| PbxError::UnexpectedValue {
                object: id.to_string(),
                key: "objects".to_string(),
                expected: "a dictionary",
            })?;
            if props.get_str("isa").is_none() {
                return Err(PbxError::MissingIsa(id.to_string()));
            }
            description.insert(Object {
                id: ObjectId::new(id),
                props: props.clone(),
            })?;
        }
        if !description.contains(&description.root_object) {
            return Err(PbxError::DanglingReference {
                from: "<root>".to_string(),
                key: "rootObject".to_string(),
                target: description.root_object.to_string(),
            });
        }
        Ok(description)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn root_object(&self) -> &ObjectId {
        &self.root_object
    }

    /// Add an object. Reusing an identifier is an error.
    pub fn insert(&mut self, object: impl Into<Object>) -> Result<()> {
        let object = object.into();
        if self.index.contains_key(&object.id) {
            return Err(PbxError::DuplicateIdentifier(object.id.to_string()));
        }
        self.index.insert(object.id.clone(), self.objects.len());
        self.objects.push(object);
        Ok(())
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &ObjectId) -> Option<&Object> {
        self.index.get(id).map(|&i| &self.objects[i])
    }

    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut Object> {
        self.index.get(id).map(|&i| &mut self.objects[i])
    }

    /// Like [`get`](Self::get) but a missing object is a dangling reference.
    pub fn require(&self, from: &ObjectId, key: &str, id: &ObjectId) -> Result<&Object> {
        self.get(id).ok_or_else(|| PbxError::DanglingReference {
            from: from.to_string(),
            key: key.to_string(),
            target: id.to_string(),
        })
    }

    /// All objects in insertion order.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn objects_of<'a>(&'a self, isa: &'a str) -> impl Iterator<Item = &'a Object> + 'a {
        self.objects.iter().filter(move |o| o.is(isa))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The `PBXProject` object.
    pub fn project(&self) -> Result<&Object> {
        let root = self.require(&self.root_object, "rootObject", &self.root_object)?;
        if !root.is(isa::PROJECT) {
            return Err(PbxError::UnexpectedValue {
                object: root.id.to_string(),
                key: "isa".to_string(),
                expected: isa::PROJECT,
            });
        }
        Ok(root)
    }

    /// Targets listed by the project object, in declaration order.
    pub fn targets(&self) -> Result<Vec<&Object>> {
        let project = self.project()?;
        project
            .references("targets")
            .iter()
            .map(|id| self.require(&project.id, "targets", id))
            .collect()
    }

    /// Find a target by name, or the first declared target when `name` is `None`.
    pub fn find_target(&self, name: Option<&str>) -> Result<&Object> {
        let targets = self.targets()?;
        match name {
            Some(name) => targets
                .into_iter()
                .find(|t| t.get_str("name") == Some(name))
                .ok_or_else(|| PbxError::TargetNotFound(name.to_string())),
            None => targets.into_iter().next().ok_or(PbxError::NoTargets),
        }
    }

    /// The build phase of `target` whose isa is `phase_isa`.
    pub fn build_phase(&self, target: &Object, phase_isa: &'static str) -> Result<&Object> {
        for id in target.references("buildPhases") {
            let phase = self.require(&target.id, "buildPhases", &id)?;
            if phase.is(phase_isa) {
                return Ok(phase);
            }
        }
        Err(PbxError::MissingBuildPhase {
            target: target
                .get_str("name")
                .map_or_else(|| target.id.to_string(), str::to_string),
            phase: phase_isa,
        })
    }

    /// Map from every group child to the group that lists it.
    pub fn group_parents(&self) -> HashMap<ObjectId, ObjectId> {
        let mut parents = HashMap::new();
        for group in self
            .objects
            .iter()
            .filter(|o| o.is(isa::GROUP) || o.is(isa::VARIANT_GROUP))
        {
            for child in group.references("children") {
                parents.entry(child).or_insert_with(|| group.id.clone());
            }
        }
        parents
    }

    /// Slash-joined labels from the top of the group tree down to `id`.
    ///
    /// Groups without a name or path (the main group) contribute nothing.
    pub fn group_display_path(&self, id: &ObjectId, parents: &HashMap<ObjectId, ObjectId>) -> String {
        let mut components = Vec::new();
        let mut current = Some(id.clone());
        let mut guard = 0usize;
        while let Some(cur) = current {
            if let Some(label) = self.get(&cur).and_then(Object::display_name) {
                components.push(label.to_string());
            }
            current = parents.get(&cur).cloned();
            guard += 1;
            if guard > self.objects.len() {
                break;
            }
        }
        components.reverse();
        components.join("/")
    }

    /// Check that every reference held by a known object resolves.
    pub fn validate(&self) -> Result<()> {
        self.project()?;
        for object in &self.objects {
            for key in single_reference_keys(object.isa()) {
                if let Some(target) = object.reference(key) {
                    self.require(&object.id, key, &target)?;
                }
            }
            for key in reference_list_keys(object.isa()) {
                for target in object.references(key) {
                    let referenced = self.require(&object.id, key, &target)?;
                    if *key == "files" && !referenced.is(isa::BUILD_FILE) {
                        return Err(PbxError::UnexpectedValue {
                            object: object.id.to_string(),
                            key: key.to_string(),
                            expected: "PBXBuildFile references",
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

fn single_reference_keys(tag: &str) -> &'static [&'static str] {
    match tag {
        isa::BUILD_FILE => &["fileRef"],
        isa::NATIVE_TARGET => &["buildConfigurationList", "productReference"],
        isa::PROJECT => &["buildConfigurationList", "mainGroup", "productRefGroup"],
        _ => &[],
    }
}

fn reference_list_keys(tag: &str) -> &'static [&'static str] {
    match tag {
        isa::GROUP | isa::VARIANT_GROUP => &["children"],
        isa::SOURCES_BUILD_PHASE | isa::FRAMEWORKS_BUILD_PHASE | isa::RESOURCES_BUILD_PHASE => {
            &["files"]
        }
        isa::NATIVE_TARGET => &["buildPhases"],
        isa::PROJECT => &["targets"],
        isa::CONFIGURATION_LIST => &["buildConfigurations"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ObjectId {
        ObjectId::new(raw)
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let mut project = ProjectDescription::new("Demo", id("ROOT"));
        project.insert(Object::new(id("A"), isa::GROUP)).unwrap();
        let err = project.insert(Object::new(id("A"), isa::GROUP)).unwrap_err();
        assert!(matches!(err, PbxError::DuplicateIdentifier(raw) if raw == "A"));
    }

    #[test]
    fn parsing_a_document_with_a_repeated_object_id_fails() {
        let text = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	objects = {
		AAA = {isa = PBXFileReference; path = One.swift; sourceTree = "<group>"; };
		AAA = {isa = PBXFileReference; path = Two.swift; sourceTree = "<group>"; };
		ROOT = {isa = PBXProject; targets = (); };
	};
	rootObject = ROOT;
}
"#;
        let err = ProjectDescription::parse("Demo", text).unwrap_err();
        assert!(matches!(
            err,
            PbxError::Parse { line: 6, ref message, .. } if message == "duplicate key `AAA`"
        ));
    }

    #[test]
    fn parses_large_object_tables() {
        use std::fmt::Write as _;

        let count = 20_000;
        let mut text = String::from("{\n\tobjects = {\n");
        for n in 0..count {
            let _ = writeln!(
                text,
                "\t\tF{n:023} = {{isa = PBXFileReference; path = File{n}.swift; sourceTree = \"<group>\"; }};"
            );
        }
        text.push_str("\t\tROOT = {isa = PBXProject; targets = (); };\n\t};\n\trootObject = ROOT;\n}\n");

        let project = ProjectDescription::parse("Large", &text).unwrap();
        assert_eq!(project.len(), count + 1);
        let last = project.get(&id(&format!("F{:023}", count - 1))).unwrap();
        assert_eq!(last.get_str("path"), Some("File19999.swift"));
    }

    #[test]
    fn validate_reports_dangling_build_file() {
        let mut project = ProjectDescription::new("Demo", id("ROOT"));
        let mut root = Object::new(id("ROOT"), isa::PROJECT);
        root.props.insert("targets", Value::Array(Vec::new()));
        project.insert(root).unwrap();
        let mut build_file = Object::new(id("BF"), isa::BUILD_FILE);
        build_file.props.insert("fileRef", "MISSING");
        project.insert(build_file).unwrap();

        let err = project.validate().unwrap_err();
        assert!(matches!(
            err,
            PbxError::DanglingReference { ref from, ref target, .. } if from == "BF" && target == "MISSING"
        ));
    }

    #[test]
    fn group_display_path_joins_ancestors() {
        let mut project = ProjectDescription::new("Demo", id("ROOT"));
        let mut main = Object::new(id("MAIN"), isa::GROUP);
        main.push_reference("children", &id("CORE")).unwrap();
        let mut core = Object::new(id("CORE"), isa::GROUP);
        core.props.insert("path", "Core");
        core.push_reference("children", &id("SERVICES")).unwrap();
        let mut services = Object::new(id("SERVICES"), isa::GROUP);
        services.props.insert("path", "Services");
        for object in [main, core, services] {
            project.insert(object).unwrap();
        }

        let parents = project.group_parents();
        assert_eq!(
            project.group_display_path(&id("SERVICES"), &parents),
            "Core/Services"
        );
    }
}
