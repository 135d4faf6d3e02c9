use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DbConfig {
    /// Path to the project database file (typically relative to project root).
    pub path: String,
}

impl DbConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Where and how the generated C# file is written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Generated file path, relative to the project root unless absolute.
    pub path: String,
    pub namespace: String,
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_header: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "generated/ffmpeg.functions.inline.g.cs".to_string(),
            namespace: "FFmpeg.AutoGen".to_string(),
            type_name: "ffmpeg".to_string(),
            file_header: None,
        }
    }
}

fn default_workers() -> usize {
    1
}

/// Serializable project configuration, stored at `.inline-port/project.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Human-friendly project name.
    pub name: String,
    /// Optional description / notes.
    pub description: Option<String>,
    /// Version of the config format itself.
    pub config_version: String,
    pub db: DbConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Worker threads used by `translate` unless overridden on the command line.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl ProjectConfig {
    /// Create a new project configuration using the given name and db path.
    pub fn new(name: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            config_version: "0.1.0".to_string(),
            db: DbConfig::new(db_path),
            output: OutputConfig::default(),
            workers: default_workers(),
        }
    }
}
