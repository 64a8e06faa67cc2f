mod settings;

pub use settings::{OpenAiConfig, SearchSettings, Settings};
