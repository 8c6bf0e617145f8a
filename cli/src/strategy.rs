//! Ordered fallback chain of project generation strategies.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use pbxforge_core::BuildableReference;
use pbxforge_core::ObjectId;
use pbxforge_core::ProjectBundle;
use pbxforge_core::ProjectSpec;
use pbxforge_core::RandomIdentifiers;
use pbxforge_core::SequentialIdentifiers;
use pbxforge_core::XcodegenSpec;
use pbxforge_core::discover_sources;
use pbxforge_core::render_scheme;
use pbxforge_core::synthesize_project;
use pbxforge_core::write_atomic;
use pbxforge_core::write_project;
use pbxforge_core::xcodegen::SPEC_FILE_NAME;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::error::CliError;
use crate::error::Result;

/// Everything a strategy needs to produce a project bundle.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub spec: ProjectSpec,
    /// Holds the `<name>` source directory; the bundle is written here.
    pub root: PathBuf,
    pub source_extensions: Vec<String>,
    pub organization_prefix: String,
    pub deterministic_ids: bool,
}

impl GenerationContext {
    pub fn bundle(&self) -> ProjectBundle {
        ProjectBundle::new(&self.root, &self.spec.name)
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.spec.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub strategy: &'static str,
    pub project_file: PathBuf,
    /// Set when the strategy wrote the scheme itself.
    pub scheme_file: Option<PathBuf>,
    pub target_id: Option<ObjectId>,
    pub source_count: Option<usize>,
}

pub trait GenerationStrategy {
    fn name(&self) -> &'static str;

    fn generate(&self, ctx: &GenerationContext) -> Result<GenerationOutcome>;
}

/// Runs `xcodegen generate` against a rendered `project.yml`.
#[derive(Debug, Clone)]
pub struct XcodegenStrategy {
    command: String,
}

impl XcodegenStrategy {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn run(&self, ctx: &GenerationContext) -> Result<()> {
        let output = Command::new(&self.command)
            .arg("generate")
            .current_dir(&ctx.root)
            .output()
            .map_err(|source| CliError::ToolUnavailable {
                tool: self.command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(CliError::ToolFailed {
                tool: self.command.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl GenerationStrategy for XcodegenStrategy {
    fn name(&self) -> &'static str {
        "xcodegen"
    }

    fn generate(&self, ctx: &GenerationContext) -> Result<GenerationOutcome> {
        let yaml = XcodegenSpec::for_project(&ctx.spec, &ctx.organization_prefix).to_yaml()?;
        let spec_file = ctx.root.join(SPEC_FILE_NAME);
        if spec_file.exists() {
            return Err(CliError::SpecFileExists(spec_file));
        }
        write_atomic(&spec_file, &yaml)?;

        let result = self.run(ctx);
        // Removed whether or not the tool succeeded.
        if let Err(err) = fs::remove_file(&spec_file) {
            debug!("Could not remove {}: {err}", spec_file.display());
        }
        result?;

        Ok(GenerationOutcome {
            strategy: self.name(),
            project_file: ctx.bundle().project_file(),
            scheme_file: None,
            target_id: None,
            source_count: None,
        })
    }
}

/// Discovers sources and writes the project and scheme directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualAssembly;

impl GenerationStrategy for ManualAssembly {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn generate(&self, ctx: &GenerationContext) -> Result<GenerationOutcome> {
        let files = discover_sources(&ctx.source_dir(), &ctx.source_extensions)?;
        let project = if ctx.deterministic_ids {
            synthesize_project(&ctx.spec, &files, &mut SequentialIdentifiers::default())?
        } else {
            synthesize_project(&ctx.spec, &files, &mut RandomIdentifiers)?
        };

        let scheme = render_scheme(&BuildableReference::for_target(
            &project.target_id,
            &project.product_name,
            &ctx.spec.name,
        ));
        let written = ctx
            .bundle()
            .write_generated(&write_project(&project.description), &scheme)?;

        Ok(GenerationOutcome {
            strategy: self.name(),
            project_file: written.project_file,
            scheme_file: Some(written.scheme_file),
            target_id: Some(project.target_id),
            source_count: Some(files.len()),
        })
    }
}

/// Tries each strategy in order until one succeeds.
#[derive(Default)]
pub struct StrategyChain {
    strategies: Vec<Box<dyn GenerationStrategy>>,
}

impl StrategyChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, strategy: impl GenerationStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn run(&self, ctx: &GenerationContext) -> Result<GenerationOutcome> {
        let mut failures = Vec::new();
        for strategy in &self.strategies {
            debug!("Trying {} strategy", strategy.name());
            match strategy.generate(ctx) {
                Ok(outcome) => {
                    info!("Generated {} with the {} strategy", ctx.spec.name, outcome.strategy);
                    return Ok(outcome);
                }
                Err(err) => {
                    warn!("{} strategy failed: {err}", strategy.name());
                    failures.push(format!("{}: {err}", strategy.name()));
                }
            }
        }
        Err(CliError::AllStrategiesFailed(failures))
    }
}
