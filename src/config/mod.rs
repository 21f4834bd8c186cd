pub mod settings;

pub use settings::{CaptureConfig, GraniteConfig, UiConfig, PROJECT_CONFIG_FILE};
