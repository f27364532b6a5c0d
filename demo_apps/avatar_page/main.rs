//! Avatar page
//!
//! Usage: `avatar_page [MODEL_PATH] [--pedestal] [--readout]`
//!
//! Without a path the model is read from `public/avatar.glb`.

use avatar_stage::app::App;
use avatar_stage::config::{StageConfig, StageFeatures};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut config = StageConfig::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--pedestal" => config.features |= StageFeatures::PEDESTAL,
            "--readout" => config.features |= StageFeatures::POINTER_READOUT,
            path => config.model_path = path.into(),
        }
    }

    log::info!("Starting avatar page with {}", config.model_path.display());

    App::new().with_title("Avatar").with_config(config).run()?;
    Ok(())
}
