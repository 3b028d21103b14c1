use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub drive: DriveSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DriveSettings {
    /// Provider-issued client secret file (`{installed|web: {...}}`), never
    /// written by this service.
    pub credentials_path: String,
    /// Where the authorized-user record is persisted after consent.
    pub token_path: String,
    /// The fixed local file relayed by `POST /upload`.
    pub source_path: String,
    pub scope: String,
    pub redirect_uri: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("DRIVERELAY"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 4000)?
            .set_default("drive.credentials_path", "credentials.json")?
            .set_default("drive.token_path", "token.json")?
            .set_default("drive.source_path", "notion.pdf")?
            .set_default("drive.scope", "https://www.googleapis.com/auth/drive.file")?
            .set_default("drive.redirect_uri", "http://localhost:4000/oauth2callback")?
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;

        // Bare PORT override, kept for parity with PaaS-style environments.
        if let Ok(port) = std::env::var("PORT") {
            settings.app.port = port
                .parse()
                .map_err(|_| ConfigError::Message(format!("invalid PORT value: {port}")))?;
        }

        Ok(settings)
    }
}
