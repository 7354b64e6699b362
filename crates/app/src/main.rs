use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use storyboard_fx_core::{
    highlight, lyrics, particles, spectrum, EffectSpec, Element, MonospaceMetrics, ProjectConfig,
    StageConfig, Storyboard,
};
use tracing_subscriber::EnvFilter;

fn main() -> storyboard_fx_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            project,
            output,
            seed,
        } => run_generate(&project, &output, seed),
        Commands::Validate { project } => run_validate(&project),
    }
}

fn run_generate(
    project_path: &Path,
    output: &Path,
    seed: Option<u64>,
) -> storyboard_fx_core::Result<()> {
    tracing::info!(project = ?project_path, ?output, "generating storyboard");

    let project = ProjectConfig::load(project_path)?;
    let base_dir = project_path.parent().unwrap_or_else(|| Path::new("."));
    let seed = seed.or(project.seed);

    let mut storyboard = Storyboard::new();
    for effect in &project.effects {
        let elements = run_effect(effect, base_dir, &project.stage, seed)?;
        tracing::info!(effect = effect.name(), elements = elements.len(), "effect done");
        storyboard.extend(elements);
    }

    let json = serde_json::to_string_pretty(&storyboard)?;
    std::fs::write(output, json)?;
    tracing::info!(
        elements = storyboard.len(),
        commands = storyboard.command_count(),
        "storyboard written"
    );
    Ok(())
}

fn run_validate(project_path: &Path) -> storyboard_fx_core::Result<()> {
    let project = ProjectConfig::load(project_path)?;
    project.validate()?;
    tracing::info!(effects = project.effects.len(), "project is valid");
    Ok(())
}

fn run_effect(
    effect: &EffectSpec,
    base_dir: &Path,
    stage: &StageConfig,
    seed: Option<u64>,
) -> storyboard_fx_core::Result<Vec<Element>> {
    match effect {
        EffectSpec::Highlight {
            window,
            sprite,
            circles,
            sliders,
            config,
        } => highlight(*window, sprite, circles, sliders, config),
        EffectSpec::Particles {
            window,
            sprite,
            config,
        } => {
            let mut config = config.clone();
            config.seed = config.seed.or(seed);
            let report = particles::generate(*window, sprite, stage, &config)?;
            if report.culled > 0 {
                tracing::info!(culled = report.culled, "particles left the playfield");
            }
            Ok(report.elements)
        }
        EffectSpec::Spectrum {
            window,
            sprite,
            schema,
            config,
        } => {
            let schema = spectrum::load_schema(base_dir.join(schema))?;
            let frames = spectrum::extract_frames(&schema, *window);
            spectrum(*window, sprite, &frames, schema.fps, stage, config)
        }
        EffectSpec::Lyrics { source, config } => {
            let cues = lyrics::load_cues(base_dir.join(source), None)?;
            let mut config = config.clone();
            config.font.path = config.font.path.map(|path| base_dir.join(path));
            let mut metrics = MonospaceMetrics::new(config.font.size);
            lyrics(&cues, &mut metrics, stage, &config)
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Procedural storyboard effect generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every effect of a project file and write the produced elements.
    Generate {
        /// Project file describing the effects to generate.
        #[arg(short, long)]
        project: PathBuf,
        /// Output path for the generated elements (JSON).
        #[arg(short, long)]
        output: PathBuf,
        /// Seed for particle effects that do not pin their own.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check windows and effect parameters without generating anything.
    Validate {
        /// Project file to check.
        #[arg(short, long)]
        project: PathBuf,
    },
}
