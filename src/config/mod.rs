//! Provider, task and pricing configuration.

pub mod loader;
pub mod types;

pub use loader::{asset_dir, load, load_from_dir, CONFIG_FILE_NAME, HOME_ENV_VAR, PROMPTS_DIR_NAME};
pub use types::{
    Configuration, DebugConfig, FallbackConfig, ModelPricing, ParameterOverrides, ProviderConfig,
    TaskModel, DEFAULT_COMPLEXITY,
};
