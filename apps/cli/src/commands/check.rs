//! `obsbox check`: validate without starting anything.

use std::path::Path;

use anyhow::Context;
use obsbox_generator::Generator;

use crate::cli::CheckArgs;

pub fn run(path: &Path, args: &CheckArgs) -> anyhow::Result<()> {
    let config = obsbox_config::load(path)
        .with_context(|| format!("invalid configuration {}", path.display()))?;
    // Building the graph catches bounds and operator names the resolver copies through.
    let generator = Generator::new(&config).context("failed to build runtime graph")?;

    let instances = &config.instances;
    println!(
        "configuration OK: {} metrics, {} instances ({} clocks, {} sources, {} values)",
        config.metrics.len(),
        instances.len(),
        instances.clocks.len(),
        instances.sources.len(),
        instances.values.len(),
    );
    println!(
        "runtime graph: {} clocks, {} sources, {} values",
        generator.clock_count(),
        generator.source_count(),
        generator.value_count(),
    );

    if args.print {
        let yaml = serde_yaml::to_string(&config).context("failed to render configuration")?;
        print!("{yaml}");
    }
    Ok(())
}
