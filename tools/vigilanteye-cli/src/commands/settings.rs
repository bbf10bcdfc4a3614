//! Show and update camera settings.

use clap::Subcommand;

use vigilanteye_common::{parse_resolution, CameraSettings, FacingMode, FileStore};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Update one or more settings
    Set {
        /// Capture resolution, e.g. 1280x720
        #[arg(long)]
        resolution: Option<String>,

        /// Capture frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// Camera facing mode: user|environment
        #[arg(long)]
        facing: Option<String>,
    },
}

pub fn run(action: Option<SettingsAction>) -> anyhow::Result<()> {
    let mut store = FileStore::new();
    let mut settings = CameraSettings::load(&store);

    match action {
        None => {
            println!("Camera settings:");
            println!("  Resolution: {}", settings.resolution_label());
            println!("  FPS: {}", settings.fps);
            println!("  Facing mode: {}", settings.facing_mode.as_str());
        }
        Some(SettingsAction::Set {
            resolution,
            fps,
            facing,
        }) => {
            if let Some(resolution) = resolution {
                let (width, height) = parse_resolution(&resolution)
                    .ok_or_else(|| anyhow::anyhow!("Invalid resolution: {resolution}"))?;
                settings.width = width;
                settings.height = height;
            }
            if let Some(fps) = fps {
                if fps == 0 {
                    anyhow::bail!("FPS must be at least 1");
                }
                settings.fps = fps;
            }
            if let Some(facing) = facing {
                settings.facing_mode = match facing.as_str() {
                    "user" => FacingMode::User,
                    "environment" => FacingMode::Environment,
                    other => anyhow::bail!("Unknown facing mode: {other}"),
                };
            }

            settings.save(&mut store).map_err(|e| anyhow::anyhow!("{e}"))?;
            println!(
                "Saved: {} @ {}fps ({})",
                settings.resolution_label(),
                settings.fps,
                settings.facing_mode.as_str()
            );
        }
    }

    Ok(())
}
