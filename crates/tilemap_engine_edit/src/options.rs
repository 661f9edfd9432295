use std::fs;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Editor behaviour settings, persisted as `options.toml` in the user's
/// config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorOptions {
    /// Maximum number of undo entries, 0 keeps everything.
    #[serde(default)]
    pub undo_limit: usize,

    /// Make the first layer added to an empty map the current layer.
    #[serde(default = "default_true")]
    pub select_first_added_layer: bool,

    /// Ask the views to start editing the name of a freshly added layer.
    #[serde(default = "default_true")]
    pub request_new_layer_name: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            undo_limit: 0,
            select_first_added_layer: true,
            request_new_layer_name: true,
        }
    }
}

impl EditorOptions {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load_options() -> Result<Self> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("org", "mapeditor", "tilemap_editor") {
            let options_file = proj_dirs.config_dir().join("options.toml");
            if options_file.exists() {
                let content = fs::read_to_string(&options_file)?;
                return Self::from_toml(&content);
            }
        }
        Ok(EditorOptions::default())
    }

    pub fn store_options(&self) -> Result<()> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("org", "mapeditor", "tilemap_editor") {
            let file_name = proj_dirs.config_dir().join("options.toml");
            let mut write_name = file_name.clone();
            write_name.set_extension("new");

            fs::create_dir_all(proj_dirs.config_dir())?;
            fs::write(&write_name, self.to_toml()?)?;
            fs::rename(&write_name, &file_name)?;
        }
        Ok(())
    }
}
