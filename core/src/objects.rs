//! Typed entities of a project description.
//!
//! Each entity converts into a generic [`Object`] with its keys in the order
//! Xcode writes them (`isa` first, the rest alphabetical).

use serde::Deserialize;
use serde::Serialize;

use crate::identifier::ObjectId;
use crate::model::Object;
use crate::model::isa;
use crate::value::Dict;
use crate::value::Value;

/// Bit mask Xcode stores on every build phase.
pub const BUILD_ACTION_MASK: &str = "2147483647";

/// A source file to register: its file name and its path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub path: String,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Descriptor whose name is the last component of `path`.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self { name, path }
    }

    pub fn extension(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(_, ext)| ext)
    }
}

/// Where a file reference's path is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTree {
    Group,
    BuiltProductsDir,
    SourceRoot,
    Sdk,
}

impl SourceTree {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Group => "<group>",
            Self::BuiltProductsDir => "BUILT_PRODUCTS_DIR",
            Self::SourceRoot => "SOURCE_ROOT",
            Self::Sdk => "SDKROOT",
        }
    }
}

/// File type classification of a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    /// `lastKnownFileType`, for files on disk.
    LastKnown(String),
    /// `explicitFileType`, for build products.
    Explicit(String),
}

impl FileType {
    /// Classification for a file extension; unknown extensions are plain text.
    pub fn for_extension(ext: Option<&str>) -> Self {
        let kind = match ext {
            Some("swift") => "sourcecode.swift",
            Some("m") => "sourcecode.c.objc",
            Some("mm") => "sourcecode.cpp.objcpp",
            Some("h") => "sourcecode.c.h",
            Some("c") => "sourcecode.c.c",
            Some("cpp") | Some("cc") => "sourcecode.cpp.cpp",
            Some("metal") => "sourcecode.metal",
            Some("plist") => "text.plist.xml",
            Some("xcassets") => "folder.assetcatalog",
            Some("storyboard") => "file.storyboard",
            Some("xib") => "file.xib",
            Some("strings") => "text.plist.strings",
            Some("json") => "text.json",
            Some("entitlements") => "text.plist.entitlements",
            _ => "text",
        };
        Self::LastKnown(kind.to_string())
    }
}

/// `PBXFileReference`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub id: ObjectId,
    pub name: Option<String>,
    pub path: String,
    pub file_type: FileType,
    pub source_tree: SourceTree,
    pub include_in_index: Option<bool>,
}

impl FileReference {
    /// Source file reference relative to its enclosing group.
    pub fn source(id: ObjectId, path: impl Into<String>) -> Self {
        let path = path.into();
        let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_string());
        Self {
            id,
            name: None,
            file_type: FileType::for_extension(ext.as_deref()),
            path,
            source_tree: SourceTree::Group,
            include_in_index: None,
        }
    }

    /// Application bundle produced by a target.
    pub fn application_product(id: ObjectId, product_name: &str) -> Self {
        Self {
            id,
            name: None,
            path: format!("{product_name}.app"),
            file_type: FileType::Explicit("wrapper.application".to_string()),
            source_tree: SourceTree::BuiltProductsDir,
            include_in_index: Some(false),
        }
    }
}

impl From<FileReference> for Object {
    fn from(file: FileReference) -> Self {
        let mut object = Object::new(file.id, isa::FILE_REFERENCE);
        let (explicit, last_known) = match file.file_type {
            FileType::Explicit(kind) => (Some(kind), None),
            FileType::LastKnown(kind) => (None, Some(kind)),
        };
        if let Some(kind) = explicit {
            object.props.insert("explicitFileType", kind);
        }
        if let Some(include) = file.include_in_index {
            object
                .props
                .insert("includeInIndex", if include { "1" } else { "0" });
        }
        if let Some(kind) = last_known {
            object.props.insert("lastKnownFileType", kind);
        }
        if let Some(name) = file.name {
            object.props.insert("name", name);
        }
        object.props.insert("path", file.path);
        object.props.insert("sourceTree", file.source_tree.as_str());
        object
    }
}

/// `PBXBuildFile`: ties a file reference into a build phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFile {
    pub id: ObjectId,
    pub file_ref: ObjectId,
}

impl From<BuildFile> for Object {
    fn from(build_file: BuildFile) -> Self {
        let mut object = Object::new(build_file.id, isa::BUILD_FILE);
        object.props.insert("fileRef", build_file.file_ref);
        object
    }
}

/// `PBXGroup`: presentational folder in the navigator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: ObjectId,
    pub name: Option<String>,
    pub path: Option<String>,
    pub children: Vec<ObjectId>,
}

impl From<Group> for Object {
    fn from(group: Group) -> Self {
        let mut object = Object::new(group.id, isa::GROUP);
        object.props.insert("children", Value::ids(&group.children));
        if let Some(name) = group.name {
            object.props.insert("name", name);
        }
        if let Some(path) = group.path {
            object.props.insert("path", path);
        }
        object
            .props
            .insert("sourceTree", SourceTree::Group.as_str());
        object
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhaseKind {
    Sources,
    Frameworks,
    Resources,
}

impl BuildPhaseKind {
    pub const fn isa(self) -> &'static str {
        match self {
            Self::Sources => isa::SOURCES_BUILD_PHASE,
            Self::Frameworks => isa::FRAMEWORKS_BUILD_PHASE,
            Self::Resources => isa::RESOURCES_BUILD_PHASE,
        }
    }

    /// Label used in comments (`/* Sources */`, `/* A.swift in Sources */`).
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sources => "Sources",
            Self::Frameworks => "Frameworks",
            Self::Resources => "Resources",
        }
    }

    pub fn from_isa(tag: &str) -> Option<Self> {
        match tag {
            isa::SOURCES_BUILD_PHASE => Some(Self::Sources),
            isa::FRAMEWORKS_BUILD_PHASE => Some(Self::Frameworks),
            isa::RESOURCES_BUILD_PHASE => Some(Self::Resources),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPhase {
    pub id: ObjectId,
    pub kind: BuildPhaseKind,
    pub files: Vec<ObjectId>,
}

impl From<BuildPhase> for Object {
    fn from(phase: BuildPhase) -> Self {
        let mut object = Object::new(phase.id, phase.kind.isa());
        object.props.insert("buildActionMask", BUILD_ACTION_MASK);
        object.props.insert("files", Value::ids(&phase.files));
        object
            .props
            .insert("runOnlyForDeploymentPostprocessing", "0");
        object
    }
}

/// `PBXNativeTarget`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeTarget {
    pub id: ObjectId,
    pub name: String,
    pub product_name: String,
    pub product_reference: ObjectId,
    pub product_type: String,
    pub build_configuration_list: ObjectId,
    pub build_phases: Vec<ObjectId>,
}

pub const APPLICATION_PRODUCT_TYPE: &str = "com.apple.product-type.application";

impl From<NativeTarget> for Object {
    fn from(target: NativeTarget) -> Self {
        let mut object = Object::new(target.id, isa::NATIVE_TARGET);
        object
            .props
            .insert("buildConfigurationList", target.build_configuration_list);
        object
            .props
            .insert("buildPhases", Value::ids(&target.build_phases));
        object.props.insert("buildRules", Value::Array(Vec::new()));
        object.props.insert("dependencies", Value::Array(Vec::new()));
        object.props.insert("name", target.name);
        object.props.insert("productName", target.product_name);
        object
            .props
            .insert("productReference", target.product_reference);
        object.props.insert("productType", target.product_type);
        object
    }
}

/// `XCBuildConfiguration`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub id: ObjectId,
    pub name: String,
    pub settings: Dict,
}

impl From<BuildConfiguration> for Object {
    fn from(config: BuildConfiguration) -> Self {
        let mut object = Object::new(config.id, isa::BUILD_CONFIGURATION);
        object.props.insert("buildSettings", config.settings);
        object.props.insert("name", config.name);
        object
    }
}

/// `XCConfigurationList`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationList {
    pub id: ObjectId,
    pub configurations: Vec<ObjectId>,
    pub default_configuration: String,
}

impl From<ConfigurationList> for Object {
    fn from(list: ConfigurationList) -> Self {
        let mut object = Object::new(list.id, isa::CONFIGURATION_LIST);
        object
            .props
            .insert("buildConfigurations", Value::ids(&list.configurations));
        object.props.insert("defaultConfigurationIsVisible", "0");
        object
            .props
            .insert("defaultConfigurationName", list.default_configuration);
        object
    }
}

/// `PBXProject`, the root object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectObject {
    pub id: ObjectId,
    pub attributes: Dict,
    pub build_configuration_list: ObjectId,
    pub compatibility_version: String,
    pub development_region: String,
    pub known_regions: Vec<String>,
    pub main_group: ObjectId,
    pub product_ref_group: ObjectId,
    pub targets: Vec<ObjectId>,
}

impl From<ProjectObject> for Object {
    fn from(project: ProjectObject) -> Self {
        let mut object = Object::new(project.id, isa::PROJECT);
        object.props.insert("attributes", project.attributes);
        object
            .props
            .insert("buildConfigurationList", project.build_configuration_list);
        object
            .props
            .insert("compatibilityVersion", project.compatibility_version);
        object
            .props
            .insert("developmentRegion", project.development_region);
        object.props.insert("hasScannedForEncodings", "0");
        object
            .props
            .insert("knownRegions", Value::strings(project.known_regions));
        object.props.insert("mainGroup", project.main_group);
        object
            .props
            .insert("productRefGroup", project.product_ref_group);
        object.props.insert("projectDirPath", "");
        object.props.insert("projectRoot", "");
        object.props.insert("targets", Value::ids(&project.targets));
        object
    }
}
