//! Xcode project generation and patching.
//!
//! This crate reads and writes `project.pbxproj` documents through a
//! structured object model, synthesizes fresh single-target application
//! projects from a source tree, renders their shared build scheme, and
//! registers additional source files in existing projects.

pub mod discovery;
pub mod error;
pub mod identifier;
pub mod layout;
pub mod model;
pub mod objects;
pub mod parser;
pub mod patch;
pub mod scheme;
pub mod settings;
pub mod synth;
pub mod value;
pub mod writer;
pub mod xcodegen;

pub use discovery::discover_sources;
pub use error::PbxError;
pub use error::Result;
pub use identifier::IdentifierSource;
pub use identifier::ObjectId;
pub use identifier::RandomIdentifiers;
pub use identifier::SequentialIdentifiers;
pub use identifier::generate_identifier;
pub use identifier::mint_unique;
pub use layout::ProjectBundle;
pub use layout::WrittenArtifacts;
pub use layout::write_atomic;
pub use model::Object;
pub use model::ProjectDescription;
pub use objects::FileDescriptor;
pub use parser::parse_plist;
pub use patch::GroupRule;
pub use patch::PatchPlan;
pub use patch::PatchReport;
pub use patch::apply_patch;
pub use scheme::BuildableReference;
pub use scheme::render_scheme;
pub use synth::ProjectSpec;
pub use synth::SynthesizedProject;
pub use synth::synthesize_project;
pub use value::Dict;
pub use value::Value;
pub use writer::write_project;
pub use xcodegen::XcodegenSpec;
