use anyhow::Context;
use clap::{Parser, Subcommand};
use mirrorscene_assets::{ModelLoader, ModelSource};
use mirrorscene_common::{CUBE_SIZE_RANGE, FOV_RANGE, StageSettings};
use mirrorscene_render::TraceRenderer;
use mirrorscene_scene::Scene;
use mirrorscene_stage::Stage;
use mirrorscene_tools::{MeshInfo, SceneInspector, SceneSummary};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mirrorscene-cli", about = "Headless tools for the mirror scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default parameters
    Info,
    /// Import a glTF model and list what it contains
    Inspect {
        /// Path to a .gltf or .glb file
        model: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Build the stage and run frames through the trace renderer
    Simulate {
        /// glTF model (defaults to the built-in scene)
        #[arg(short, long)]
        model: Option<PathBuf>,
        /// YAML settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of frames to run
        #[arg(short, long, default_value = "2")]
        frames: u32,
    },
}

#[derive(Serialize)]
struct InspectReport {
    summary: SceneSummary,
    meshes: Vec<MeshInfo>,
}

impl InspectReport {
    fn new(scene: &Scene) -> Self {
        Self {
            summary: SceneInspector::summary(scene),
            meshes: SceneInspector::list_meshes(scene),
        }
    }
}

fn simulate(settings: &StageSettings, frames: u32) -> anyhow::Result<Vec<String>> {
    let mut stage = Stage::new(settings, (settings.window.width, settings.window.height));
    let source = ModelSource::from_path(settings.model.clone());
    let model = ModelLoader::spawn(source.clone())
        .wait()
        .with_context(|| format!("loading model {source}"))?;
    let report = stage.install_model(model);

    let mut lines = vec![format!(
        "model {source}: {} meshes, mirror {}",
        report.meshes,
        if report.mirror.is_some() { "on" } else { "off" }
    )];
    let mut renderer = TraceRenderer::new();
    for frame in 0..frames {
        stage.frame(&mut renderer)?;
        let calls = renderer.drain_calls();
        tracing::debug!(frame, calls = calls.len(), "frame simulated");
        for call in calls {
            lines.push(format!("frame {frame}: {call}"));
        }
    }
    Ok(lines)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let defaults = StageSettings::default();
            println!("mirrorscene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "fov: {} (range {}..={})",
                defaults.scene.fov,
                FOV_RANGE.start(),
                FOV_RANGE.end()
            );
            println!(
                "cube target: {} (range {}..={})",
                defaults.scene.cube_render_target_size,
                CUBE_SIZE_RANGE.start(),
                CUBE_SIZE_RANGE.end()
            );
            println!("mirror mesh: {}", defaults.mirror.mesh_name);
        }
        Commands::Inspect { model, json } => {
            let scene = mirrorscene_assets::import_gltf(&model)
                .with_context(|| format!("importing {}", model.display()))?;
            let report = InspectReport::new(&scene);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.summary);
                for mesh in &report.meshes {
                    println!("  {mesh}");
                }
            }
        }
        Commands::Simulate {
            model,
            config,
            frames,
        } => {
            let mut settings = match config {
                Some(path) => StageSettings::load(&path)
                    .with_context(|| format!("loading settings from {}", path.display()))?,
                None => StageSettings::default(),
            };
            if model.is_some() {
                settings.model = model;
            }
            for line in simulate(&settings, frames)? {
                println!("{line}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulate_builtin_scene() {
        let lines = simulate(&StageSettings::default(), 2).unwrap();
        assert!(lines[0].contains("mirror on"));
        // One capture and one render per frame
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("frame 0: capture"));
        assert!(lines[2].starts_with("frame 0: render"));
        assert!(!lines[1].contains("Sphere"));
        assert!(lines[2].contains("Sphere"));
    }

    #[test]
    fn simulate_reports_missing_model() {
        let settings = StageSettings {
            model: Some(PathBuf::from("/no/such/model.gltf")),
            ..StageSettings::default()
        };
        assert!(simulate(&settings, 1).is_err());
    }

    #[test]
    fn inspect_report_serializes() {
        let scene = mirrorscene_assets::demo_model();
        let report = InspectReport::new(&scene);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["meshes"], 6);
        assert_eq!(json["meshes"].as_array().unwrap().len(), 6);
    }
}
