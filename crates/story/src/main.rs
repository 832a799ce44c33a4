use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use hue_ring_story::{StoryOptions, init, run};
use hue_ring_ui::HueRingSettings;
use smol::Executor;

fn main() -> anyhow::Result<()> {
    init()?;

    // `cargo run -- [output.png] [settings.json]`
    let mut args = std::env::args().skip(1);
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("hue-ring.png"));
    let settings = match args.next() {
        Some(path) => HueRingSettings::load(&path)
            .with_context(|| format!("failed to load settings from {path}"))?,
        None => HueRingSettings::default(),
    };

    let options = StoryOptions {
        settings,
        ..Default::default()
    };

    let executor = Arc::new(Executor::new());
    let pixmap = smol::block_on(executor.run(run(executor.clone(), options)))?;
    pixmap
        .save_png(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!("hue ring written to {}", output.display());
    Ok(())
}
