use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use anm_exporter::{export, ExportSettings, SceneDump};


#[derive(Parser)]
#[command(name = "anm-exporter")]
#[command(about = "Encode a recorded scene into an nuccAnm animation chunk", long_about = None)]
struct Cli {
    /// Scene dump: skeletons, actions and the sampled state of every frame
    scene: PathBuf,

    /// Directory the chunk folder is created in
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// JSON export settings; flags below override it
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long)]
    looped: bool,

    /// Export material entries
    #[arg(long)]
    materials: bool,

    /// Keep every keyframe and curve as sampled
    #[arg(long)]
    no_optimize: bool,

    /// Path recorded for the animation chunk in _page.json
    #[arg(long)]
    anm_chunk_path: Option<String>,

    #[arg(long)]
    progress: bool,
}

impl Cli {
    fn settings(&self) -> Result<ExportSettings> {
        let mut settings = match &self.settings {
            Some(path) => ExportSettings::from_json_file(path)
                .with_context(|| format!("reading settings {}", path.display()))?,
            None => ExportSettings::default(),
        };

        settings.looped |= self.looped;
        settings.export_materials |= self.materials;
        settings.optimize &= !self.no_optimize;
        settings.show_progress |= self.progress;
        if let Some(path) = &self.anm_chunk_path {
            settings.anm_chunk_path = Some(path.clone());
        }

        Ok(settings)
    }
}


fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = cli.settings()?;

    let now = Instant::now();
    let dump = SceneDump::from_json_file(&cli.scene)
        .with_context(|| format!("reading scene {}", cli.scene.display()))?;
    let (scene, mut frames) = dump.into_parts();

    let anm = export(&scene, &mut frames, &settings).context("encoding animation")?;
    let dir = anm
        .write_to_dir(&cli.out_dir)
        .with_context(|| format!("writing to {}", cli.out_dir.display()))?;

    info!("{} exported in {:?}", anm.name, now.elapsed());
    println!("{}", dir.display());
    Ok(())
}
