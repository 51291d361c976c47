pub mod load;
pub mod save;
pub mod types;

pub use load::{SETTINGS_FILE, load_settings};
pub use save::{save_settings, save_settings_to};
pub use types::{BotSettings, Config, InvalidConfig, Language, PipelineConfig, UserSettings};
