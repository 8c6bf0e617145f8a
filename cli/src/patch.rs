use std::path::Path;
use std::path::PathBuf;

use pbxforge_core::PatchReport;
use pbxforge_core::ProjectDescription;
use pbxforge_core::RandomIdentifiers;
use pbxforge_core::apply_patch;
use pbxforge_core::write_atomic;
use pbxforge_core::write_project;
use tracing::info;

use crate::PatchArgs;
use crate::config::Config;
use crate::error::Result;

#[derive(Debug)]
pub struct PatchOutcome {
    pub project_file: PathBuf,
    pub report: PatchReport,
    /// The patched document, when nothing was written.
    pub dry_run_output: Option<String>,
}

/// Read the project file, register the configured files and write it back.
pub fn run_patch(config: &Config, args: &PatchArgs) -> Result<PatchOutcome> {
    let project_file = args
        .project
        .clone()
        .unwrap_or_else(|| config.patch.project_file.clone());
    let mut plan = config.patch_plan()?;
    if args.target.is_some() {
        plan.target = args.target.clone();
    }

    let text = std::fs::read_to_string(&project_file)?;
    let mut project = ProjectDescription::parse(project_name(&project_file), &text)?;
    let report = apply_patch(&mut project, &plan, &mut RandomIdentifiers)?;
    let patched = write_project(&project);

    let dry_run_output = if args.dry_run {
        Some(patched)
    } else {
        write_atomic(&project_file, &patched)?;
        info!("Wrote {}", project_file.display());
        None
    };

    Ok(PatchOutcome {
        project_file,
        report,
        dry_run_output,
    })
}

/// Name of the `.xcodeproj` bundle enclosing `project_file`.
fn project_name(project_file: &Path) -> String {
    project_file
        .parent()
        .and_then(|bundle| bundle.file_stem())
        .map_or_else(|| "Project".to_string(), |stem| stem.to_string_lossy().into_owned())
}
