use tracing::info;

use crate::GenerateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::strategy::GenerationContext;
use crate::strategy::GenerationOutcome;
use crate::strategy::ManualAssembly;
use crate::strategy::StrategyChain;
use crate::strategy::XcodegenStrategy;

/// Apply the command-line overrides to `config` and run the strategy chain.
pub fn run_generate(config: &Config, args: &GenerateArgs) -> Result<GenerationOutcome> {
    let mut config = config.clone();
    if let Some(name) = &args.name {
        config.project.name = name.clone();
    }
    if let Some(bundle_id) = &args.bundle_id {
        config.project.bundle_id = bundle_id.clone();
    }
    if let Some(root) = &args.root {
        config.generate.root = root.clone();
    }
    config.generate.use_xcodegen |= args.xcodegen;
    config.generate.deterministic_ids |= args.deterministic;
    config.validate()?;

    let ctx = GenerationContext {
        spec: config.project_spec(),
        root: config.generate.root.clone(),
        source_extensions: config.project.source_extensions.clone(),
        organization_prefix: config.project.organization_prefix.clone(),
        deterministic_ids: config.generate.deterministic_ids,
    };
    info!(
        "Generating {} ({}) from {}",
        ctx.spec.name,
        ctx.spec.bundle_id,
        ctx.source_dir().display()
    );

    strategy_chain(&config).run(&ctx)
}

fn strategy_chain(config: &Config) -> StrategyChain {
    let chain = StrategyChain::new();
    let chain = if config.generate.use_xcodegen {
        chain.with(XcodegenStrategy::new(&config.generate.xcodegen_command))
    } else {
        chain
    };
    chain.with(ManualAssembly)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xcodegen_is_opt_in() {
        let mut config = Config::default();
        assert_eq!(strategy_chain(&config).len(), 1);
        config.generate.use_xcodegen = true;
        assert_eq!(strategy_chain(&config).len(), 2);
    }

    #[test]
    fn overrides_are_validated() {
        let args = GenerateArgs {
            name: Some(String::new()),
            ..GenerateArgs::default()
        };
        let err = run_generate(&Config::default(), &args).unwrap_err();
        assert!(matches!(err, crate::CliError::InvalidConfig(_)));
    }
}
