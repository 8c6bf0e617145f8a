//! Shared build scheme (`.xcscheme`) rendering.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::identifier::ObjectId;

const LAST_UPGRADE_VERSION: &str = "1500";
const SCHEME_VERSION: &str = "1.3";
const LLDB_DEBUGGER: &str = "Xcode.DebuggerFoundation.Debugger.LLDB";
const LLDB_LAUNCHER: &str = "Xcode.DebuggerFoundation.Launcher.LLDB";

/// The target a scheme builds and runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildableReference {
    pub blueprint_id: ObjectId,
    pub blueprint_name: String,
    pub buildable_name: String,
    /// Name of the `.xcodeproj` container, without extension.
    pub container: String,
}

impl BuildableReference {
    /// Reference to an application target of the project called `project_name`.
    pub fn for_target(target_id: &ObjectId, target_name: &str, project_name: &str) -> Self {
        Self {
            blueprint_id: target_id.clone(),
            blueprint_name: target_name.to_string(),
            buildable_name: format!("{target_name}.app"),
            container: project_name.to_string(),
        }
    }
}

/// Render the scheme XML with Build, Test, Launch, Profile, Analyze and
/// Archive actions.
pub fn render_scheme(target: &BuildableReference) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<Scheme\n");
    attr(&mut out, 1, "LastUpgradeVersion", LAST_UPGRADE_VERSION, false);
    attr(&mut out, 1, "version", SCHEME_VERSION, true);

    open(&mut out, 1, "BuildAction");
    attr(&mut out, 2, "parallelizeBuildables", "YES", false);
    attr(&mut out, 2, "buildImplicitDependencies", "YES", true);
    line(&mut out, 2, "<BuildActionEntries>");
    open(&mut out, 3, "BuildActionEntry");
    attr(&mut out, 4, "buildForTesting", "YES", false);
    attr(&mut out, 4, "buildForRunning", "YES", false);
    attr(&mut out, 4, "buildForProfiling", "YES", false);
    attr(&mut out, 4, "buildForArchiving", "YES", false);
    attr(&mut out, 4, "buildForAnalyzing", "YES", true);
    buildable_reference(&mut out, 4, target);
    line(&mut out, 3, "</BuildActionEntry>");
    line(&mut out, 2, "</BuildActionEntries>");
    line(&mut out, 1, "</BuildAction>");

    open(&mut out, 1, "TestAction");
    attr(&mut out, 2, "buildConfiguration", "Debug", false);
    attr(&mut out, 2, "selectedDebuggerIdentifier", LLDB_DEBUGGER, false);
    attr(&mut out, 2, "selectedLauncherIdentifier", LLDB_LAUNCHER, false);
    attr(&mut out, 2, "shouldUseLaunchSchemeArgsEnv", "YES", true);
    line(&mut out, 2, "<Testables>");
    line(&mut out, 2, "</Testables>");
    line(&mut out, 1, "</TestAction>");

    open(&mut out, 1, "LaunchAction");
    attr(&mut out, 2, "buildConfiguration", "Debug", false);
    attr(&mut out, 2, "selectedDebuggerIdentifier", LLDB_DEBUGGER, false);
    attr(&mut out, 2, "selectedLauncherIdentifier", LLDB_LAUNCHER, false);
    attr(&mut out, 2, "launchStyle", "0", false);
    attr(&mut out, 2, "useCustomWorkingDirectory", "NO", false);
    attr(&mut out, 2, "ignoresPersistentStateOnLaunch", "NO", false);
    attr(&mut out, 2, "debugDocumentVersioning", "YES", false);
    attr(&mut out, 2, "debugServiceExtension", "internal", false);
    attr(&mut out, 2, "allowLocationSimulation", "YES", true);
    runnable(&mut out, 2, target);
    line(&mut out, 1, "</LaunchAction>");

    open(&mut out, 1, "ProfileAction");
    attr(&mut out, 2, "buildConfiguration", "Release", false);
    attr(&mut out, 2, "shouldUseLaunchSchemeArgsEnv", "YES", false);
    attr(&mut out, 2, "savedToolIdentifier", "", false);
    attr(&mut out, 2, "useCustomWorkingDirectory", "NO", false);
    attr(&mut out, 2, "debugDocumentVersioning", "YES", true);
    runnable(&mut out, 2, target);
    line(&mut out, 1, "</ProfileAction>");

    open(&mut out, 1, "AnalyzeAction");
    attr(&mut out, 2, "buildConfiguration", "Debug", true);
    line(&mut out, 1, "</AnalyzeAction>");

    open(&mut out, 1, "ArchiveAction");
    attr(&mut out, 2, "buildConfiguration", "Release", false);
    attr(&mut out, 2, "revealArchiveInOrganizer", "YES", true);
    line(&mut out, 1, "</ArchiveAction>");

    out.push_str("</Scheme>\n");
    out
}

fn runnable(out: &mut String, depth: usize, target: &BuildableReference) {
    open(out, depth, "BuildableProductRunnable");
    attr(out, depth + 1, "runnableDebuggingMode", "0", true);
    buildable_reference(out, depth + 1, target);
    line(out, depth, "</BuildableProductRunnable>");
}

fn buildable_reference(out: &mut String, depth: usize, target: &BuildableReference) {
    let container = format!("container:{}.xcodeproj", target.container);
    open(out, depth, "BuildableReference");
    attr(out, depth + 1, "BuildableIdentifier", "primary", false);
    attr(out, depth + 1, "BlueprintIdentifier", target.blueprint_id.as_str(), false);
    attr(out, depth + 1, "BuildableName", &target.buildable_name, false);
    attr(out, depth + 1, "BlueprintName", &target.blueprint_name, false);
    attr(out, depth + 1, "ReferencedContainer", &container, true);
    line(out, depth, "</BuildableReference>");
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("   ");
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    indent(out, depth);
    out.push_str(text);
    out.push('\n');
}

fn open(out: &mut String, depth: usize, element: &str) {
    indent(out, depth);
    out.push('<');
    out.push_str(element);
    out.push('\n');
}

/// One `name = "value"` line; `last` closes the start tag.
fn attr(out: &mut String, depth: usize, name: &str, value: &str, last: bool) {
    indent(out, depth);
    let _ = write!(out, "{name} = \"{}\"", escape_xml(value));
    if last {
        out.push('>');
    }
    out.push('\n');
}

/// Escape a string for use inside a double-quoted XML attribute.
pub fn escape_xml(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_reference_carries_the_target_id() {
        let target = BuildableReference::for_target(&ObjectId::new("ABC123"), "Demo", "Demo");
        let xml = render_scheme(&target);
        assert_eq!(xml.matches("BlueprintIdentifier = \"ABC123\"").count(), 3);
        assert_eq!(xml.matches("BuildableName = \"Demo.app\"").count(), 3);
        assert!(xml.contains("ReferencedContainer = \"container:Demo.xcodeproj\">"));
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Scheme\n"));
        assert!(xml.ends_with("</Scheme>\n"));
    }

    #[test]
    fn build_action_layout() {
        let target = BuildableReference::for_target(&ObjectId::new("T"), "Demo", "Demo");
        let xml = render_scheme(&target);
        let expected = "   <BuildAction
      parallelizeBuildables = \"YES\"
      buildImplicitDependencies = \"YES\">
      <BuildActionEntries>
         <BuildActionEntry
";
        assert!(xml.contains(expected), "{xml}");
        assert!(xml.contains("   <AnalyzeAction\n      buildConfiguration = \"Debug\">\n   </AnalyzeAction>\n"));
    }

    #[test]
    fn names_are_escaped() {
        let target = BuildableReference::for_target(&ObjectId::new("T"), "R&D", "Lab \"One\"");
        let xml = render_scheme(&target);
        assert!(xml.contains("BlueprintName = \"R&amp;D\""));
        assert!(xml.contains("container:Lab &quot;One&quot;.xcodeproj"));
        assert_eq!(escape_xml("plain"), "plain");
    }
}
