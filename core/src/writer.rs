//! Serializer producing Xcode-style `project.pbxproj` text.
//!
//! Layout follows what Xcode itself writes: one `/* Begin … section */`
//! block per isa in alphabetical order, file references and build files on
//! a single line, tab indentation, and a `/* comment */` after every
//! reference to a named object.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fmt::Write as _;

use crate::identifier::ObjectId;
use crate::model::Object;
use crate::model::ProjectDescription;
use crate::model::isa;
use crate::objects::BuildPhaseKind;
use crate::value::Dict;
use crate::value::Value;

/// First line of every project file.
pub const UTF8_HEADER: &str = "// !$*UTF8*$!";

/// Keys whose values are identifiers Xcode leaves uncommented.
const UNCOMMENTED_KEYS: &[&str] = &["remoteGlobalIDString", "mainGroup"];

/// Render a project description.
pub fn write_project(project: &ProjectDescription) -> String {
    let writer = Writer::new(project);
    writer.render()
}

struct Writer<'a> {
    project: &'a ProjectDescription,
    comments: HashMap<&'a ObjectId, String>,
    out: String,
}

impl<'a> Writer<'a> {
    fn new(project: &'a ProjectDescription) -> Self {
        let comments = collect_comments(project);
        Self {
            project,
            comments,
            out: String::new(),
        }
    }

    fn render(mut self) -> String {
        let project = self.project;
        self.out.push_str(UTF8_HEADER);
        self.out.push_str("\n{\n");
        let _ = writeln!(
            self.out,
            "\tarchiveVersion = {};",
            quote(&project.archive_version)
        );
        self.out.push_str("\tclasses = ");
        self.write_dict(&project.classes, 1);
        self.out.push_str(";\n");
        let _ = writeln!(
            self.out,
            "\tobjectVersion = {};",
            quote(&project.object_version)
        );
        self.out.push_str("\tobjects = {\n");

        let sections: BTreeSet<&str> = project.objects().iter().map(Object::isa).collect();
        for section in sections {
            let _ = write!(self.out, "\n/* Begin {section} section */\n");
            for object in project.objects_of(section) {
                self.write_object(object);
            }
            let _ = writeln!(self.out, "/* End {section} section */");
        }

        self.out.push_str("\t};\n");
        self.out.push_str("\trootObject = ");
        self.write_reference(project.root_object().as_str(), None);
        self.out.push_str(";\n}\n");
        self.out
    }

    fn write_object(&mut self, object: &Object) {
        self.out.push_str("\t\t");
        self.write_reference(object.id.as_str(), None);
        self.out.push_str(" = ");
        if is_single_line(object.isa()) {
            self.write_inline_dict(&object.props);
            self.out.push_str(";\n");
        } else {
            self.write_dict(&object.props, 2);
            self.out.push_str(";\n");
        }
    }

    /// A string value, followed by the comment of the object it names.
    fn write_reference(&mut self, value: &str, key: Option<&str>) {
        self.out.push_str(&quote(value));
        if key.is_some_and(|k| UNCOMMENTED_KEYS.contains(&k)) {
            return;
        }
        if let Some(comment) = self.comments.get(&ObjectId::new(value)) {
            let _ = write!(self.out, " /* {comment} */");
        }
    }

    fn write_value(&mut self, value: &Value, indent: usize, key: Option<&str>) {
        match value {
            Value::String(s) => self.write_reference(s, key),
            Value::Array(items) => {
                self.out.push_str("(\n");
                for item in items {
                    push_tabs(&mut self.out, indent + 1);
                    self.write_value(item, indent + 1, key);
                    self.out.push_str(",\n");
                }
                push_tabs(&mut self.out, indent);
                self.out.push(')');
            }
            Value::Dict(dict) => self.write_dict(dict, indent),
        }
    }

    fn write_dict(&mut self, dict: &Dict, indent: usize) {
        self.out.push_str("{\n");
        for (k, v) in dict.iter() {
            push_tabs(&mut self.out, indent + 1);
            self.out.push_str(&quote(k));
            self.out.push_str(" = ");
            self.write_value(v, indent + 1, Some(k));
            self.out.push_str(";\n");
        }
        push_tabs(&mut self.out, indent);
        self.out.push('}');
    }

    fn write_inline_value(&mut self, value: &Value, key: Option<&str>) {
        match value {
            Value::String(s) => self.write_reference(s, key),
            Value::Array(items) => {
                self.out.push('(');
                for item in items {
                    self.write_inline_value(item, key);
                    self.out.push_str(", ");
                }
                self.out.push(')');
            }
            Value::Dict(dict) => self.write_inline_dict(dict),
        }
    }

    fn write_inline_dict(&mut self, dict: &Dict) {
        self.out.push('{');
        for (k, v) in dict.iter() {
            self.out.push_str(&quote(k));
            self.out.push_str(" = ");
            self.write_inline_value(v, Some(k));
            self.out.push_str("; ");
        }
        self.out.push('}');
    }
}

fn is_single_line(tag: &str) -> bool {
    tag == isa::BUILD_FILE || tag == isa::FILE_REFERENCE
}

fn push_tabs(out: &mut String, count: usize) {
    for _ in 0..count {
        out.push('\t');
    }
}

/// Quote a string unless it only contains characters Xcode leaves bare.
pub fn quote(s: &str) -> Cow<'_, str> {
    let bare = !s.is_empty()
        && !s.contains("//")
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '/'));
    if bare {
        return Cow::Borrowed(s);
    }
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

/// Comment text for every object that has one.
fn collect_comments(project: &ProjectDescription) -> HashMap<&ObjectId, String> {
    let mut phase_of_build_file: HashMap<ObjectId, String> = HashMap::new();
    let mut owner_of_list: HashMap<ObjectId, &Object> = HashMap::new();
    for object in project.objects() {
        if let Some(kind) = BuildPhaseKind::from_isa(object.isa()) {
            let label = object
                .get_str("name")
                .unwrap_or_else(|| kind.label())
                .to_string();
            for file in object.references("files") {
                phase_of_build_file
                    .entry(file)
                    .or_insert_with(|| label.clone());
            }
        }
        if let Some(list) = object.reference("buildConfigurationList") {
            owner_of_list.entry(list).or_insert(object);
        }
    }

    let mut comments = HashMap::new();
    for object in project.objects() {
        let comment = match object.isa() {
            isa::BUILD_FILE => {
                let file_name = object
                    .reference("fileRef")
                    .and_then(|id| project.get(&id))
                    .and_then(Object::display_name)
                    .unwrap_or("(null)");
                Some(match phase_of_build_file.get(&object.id) {
                    Some(phase) => format!("{file_name} in {phase}"),
                    None => file_name.to_string(),
                })
            }
            isa::PROJECT => Some("Project object".to_string()),
            isa::CONFIGURATION_LIST => owner_of_list.get(&object.id).map(|owner| {
                let owner_name = if owner.is(isa::PROJECT) {
                    project.name()
                } else {
                    owner.get_str("name").unwrap_or_default()
                };
                format!(
                    "Build configuration list for {} \"{}\"",
                    owner.isa(),
                    owner_name
                )
            }),
            tag => match BuildPhaseKind::from_isa(tag) {
                Some(kind) => Some(
                    object
                        .get_str("name")
                        .unwrap_or_else(|| kind.label())
                        .to_string(),
                ),
                None => object.display_name().map(str::to_string),
            },
        };
        if let Some(comment) = comment {
            comments.insert(&object.id, comment);
        }
    }
    comments
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn quoting_follows_xcode_rules() {
        assert_eq!(quote("sourcecode.swift"), "sourcecode.swift");
        assert_eq!(quote("Core/Services"), "Core/Services");
        assert_eq!(quote("<group>"), "\"<group>\"");
        assert_eq!(quote("gnu++20"), "\"gnu++20\"");
        assert_eq!(quote("DEBUG $(inherited)"), "\"DEBUG $(inherited)\"");
        assert_eq!(quote(""), "\"\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn writes_minimal_document() {
        let text = "// !$*UTF8*$!
{
	archiveVersion = 1;
	classes = {
	};
	objectVersion = 56;
	objects = {

/* Begin PBXGroup section */
		MAIN = {
			isa = PBXGroup;
			children = (
			);
			sourceTree = \"<group>\";
		};
/* End PBXGroup section */

/* Begin PBXProject section */
		ROOT /* Project object */ = {
			isa = PBXProject;
			mainGroup = MAIN;
			targets = (
			);
		};
/* End PBXProject section */
	};
	rootObject = ROOT /* Project object */;
}
";
        let project = ProjectDescription::parse("Demo", text).unwrap();
        assert_eq!(write_project(&project), text);
    }
}
