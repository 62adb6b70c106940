use crate::{AppSettings, RawSettings};
use color_eyre::eyre::Result;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

pub fn load_app_settings() -> Result<AppSettings> {
    // Need to load from dotenv to get it to overwrite secrets from env.
    dotenv::from_path(".env").ok();
    load_app_settings_from(Path::new("config/settings.yaml"))
}

/// Loads settings from a yaml file, overlaid with `APP__SECTION__KEY` environment variables.
pub fn load_app_settings_from(config_path: &Path) -> Result<AppSettings> {
    let config_path = config_path.canonicalize()?;

    let builder = config::Config::builder()
        .add_source(config::File::from(config_path))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("api.allowed_origins"),
        );

    let raw_settings = builder.build()?.try_deserialize::<RawSettings>()?;
    let settings = AppSettings::try_from(raw_settings)?;

    fs::create_dir_all(&settings.storage.root)?;
    tracing::debug!("Storage root: {}", settings.storage.root.display());

    Ok(settings)
}

pub static SETTINGS: LazyLock<AppSettings> =
    LazyLock::new(|| load_app_settings().expect("Cannot load app settings."));

#[must_use]
pub fn settings() -> &'static AppSettings {
    &SETTINGS
}
