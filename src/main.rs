use motion_stage::{App, StageApp, StageConfig};

const CONFIG_PATH: &str = "motion_stage.json";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = StageConfig::load_or_default(CONFIG_PATH)?;
    let (width, height) = (config.window.width, config.window.height);

    App::new()
        .with_title(config.window.title.clone())
        .with_window_size(width, height)
        .with_settings(config.window.render_settings())
        .run_with::<StageApp>(config)?;

    Ok(())
}
