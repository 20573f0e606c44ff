use inkpad_core::{
    brush::{BrushSettings, EraserSettings},
    state::Canvas,
};

const DOCUMENTATION: &str = r##"# Inkpad settings. You may edit this file, but be aware that formatting and comments will not
# be preserved. Every key is optional, missing keys take their default value.

# [brush]
# size = 5.0              # Base stroke width, in logical pixels.
# color = "#000000"       # `#rgb`, `#rrggbb`, or `#rrggbbaa`.
# pressure_enabled = true
# pressure_factor = 1.0   # Width is `size * (0.5 + pressure * pressure_factor)`.
# [eraser]
# size = 20.0
# mode = "pixel"          # One of "pixel", "stroke", "rect".
# [canvas]
# width = 1080.0
# height = 1080.0
# scale_factor = 1.0      # Physical pixels per logical pixel.
# [history]
# limit = 30              # Number of undo steps kept.

"##;

#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub limit: usize,
}
impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            limit: inkpad_core::history::DEFAULT_LIMIT,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    pub brush: BrushSettings,
    pub eraser: EraserSettings,
    pub canvas: Canvas,
    pub history: HistorySettings,
}
impl Settings {
    const FILENAME: &'static str = "settings.toml";
    /// Where settings live when not given explicitly.
    #[must_use]
    pub fn default_path() -> Option<std::path::PathBuf> {
        let mut dir = super::preferences_dir()?;
        dir.push(Self::FILENAME);
        Some(dir)
    }
    /// Read settings from `path`, or default them if unreadable for any reason.
    ///
    /// The second element is `false` if the defaults were used.
    #[must_use]
    pub fn load_or_default(path: &std::path::Path) -> (Self, bool) {
        let settings: anyhow::Result<Self> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let settings : Self = toml::from_str(&string)?;

            Ok(settings)
        };

        match settings {
            Ok(settings) => (settings, true),
            Err(e) => {
                log::warn!("Settings at {path:?} weren't available, defaulting: {e:#}");
                (Self::default(), false)
            }
        }
    }
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            // Explicity do *not* create recursively. If not found, the user probably has a good reason.
            // Ignore errors (could already exist). Any real errors will be emitted by file access below.
            let _ = std::fs::DirBuilder::new().create(parent);
        }
        let mut string = toml::ser::to_string_pretty(self)?;
        // Prefix some documentation.
        string = DOCUMENTATION.to_owned() + &string;
        std::fs::write(path, string)?;
        Ok(())
    }
    #[must_use]
    pub fn engine_config(&self) -> inkpad_core::EngineConfig {
        inkpad_core::EngineConfig {
            canvas: self.canvas,
            brush: self.brush,
            eraser: self.eraser,
            history_limit: Some(self.history.limit),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use inkpad_core::brush::EraserMode;
    #[test]
    fn partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r##"
            [brush]
            color = "#ff0000"
            [eraser]
            mode = "rect"
            [history]
            limit = 5
            "##,
        )
        .unwrap();
        assert_eq!(
            settings.brush.color,
            "#f00".parse::<inkpad_core::color::Color>().unwrap()
        );
        assert_eq!(settings.brush.size, BrushSettings::default().size);
        assert_eq!(settings.eraser.mode, EraserMode::Rect);
        assert_eq!(settings.canvas, Canvas::default());
        assert_eq!(settings.engine_config().history_limit, Some(5));
    }
    #[test]
    fn saved_file_reloads() {
        let settings = Settings {
            history: HistorySettings { limit: 12 },
            ..Default::default()
        };
        let string = DOCUMENTATION.to_owned() + &toml::ser::to_string_pretty(&settings).unwrap();
        let reloaded: Settings = toml::from_str(&string).unwrap();
        assert_eq!(reloaded, settings);
    }
    #[test]
    fn bad_values_rejected() {
        assert!(toml::from_str::<Settings>("[brush]\ncolor = \"red\"").is_err());
        assert!(toml::from_str::<Settings>("[eraser]\nmode = \"lasso\"").is_err());
    }
}
