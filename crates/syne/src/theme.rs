//! Accent color and light/dark mode preference.
//!
//! The preference is persisted in the key-value store and applied to a
//! [`StyleRoot`] as the attributes, classes and CSS custom properties the
//! stylesheets key off of.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::storage::{KeyValueStore, THEME_COLOR_KEY, THEME_MODE_KEY};

pub const THEME_ATTRIBUTE: &str = "data-theme";
pub const DARK_CLASS: &str = "dark";

const SHADES: [&str; 10] = [
    "50", "100", "200", "300", "400", "500", "600", "700", "800", "900",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeColor {
    #[default]
    Blue,
    Purple,
    Green,
    Orange,
    Pink,
}

impl ThemeColor {
    pub const ALL: [ThemeColor; 5] = [
        ThemeColor::Blue,
        ThemeColor::Purple,
        ThemeColor::Green,
        ThemeColor::Orange,
        ThemeColor::Pink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeColor::Blue => "blue",
            ThemeColor::Purple => "purple",
            ThemeColor::Green => "green",
            ThemeColor::Orange => "orange",
            ThemeColor::Pink => "pink",
        }
    }

    /// Shades 50 through 900, lightest first.
    pub fn palette(&self) -> [&'static str; 10] {
        match self {
            ThemeColor::Blue => [
                "#eff6ff", "#dbeafe", "#bfdbfe", "#93c5fd", "#60a5fa", "#3b82f6", "#2563eb",
                "#1d4ed8", "#1e40af", "#1e3a8a",
            ],
            ThemeColor::Purple => [
                "#faf5ff", "#f3e8ff", "#e9d5ff", "#d8b4fe", "#c084fc", "#a855f7", "#9333ea",
                "#7e22ce", "#6b21a8", "#581c87",
            ],
            ThemeColor::Green => [
                "#f0fdf4", "#dcfce7", "#bbf7d0", "#86efac", "#4ade80", "#22c55e", "#16a34a",
                "#15803d", "#166534", "#14532d",
            ],
            ThemeColor::Orange => [
                "#fff7ed", "#ffedd5", "#fed7aa", "#fdba74", "#fb923c", "#f97316", "#ea580c",
                "#c2410c", "#9a3412", "#7c2d12",
            ],
            ThemeColor::Pink => [
                "#fdf2f8", "#fce7f3", "#fbcfe8", "#f9a8d4", "#f472b6", "#ec4899", "#db2777",
                "#be185d", "#9f1239", "#831843",
            ],
        }
    }

    pub fn shade(&self, shade: &str) -> Option<&'static str> {
        SHADES
            .iter()
            .position(|s| *s == shade)
            .map(|idx| self.palette()[idx])
    }

    /// Every CSS custom property this color sets on the root.
    pub fn css_properties(&self) -> Vec<(String, &'static str)> {
        let palette = self.palette();
        let mut props: Vec<(String, &'static str)> = SHADES
            .iter()
            .zip(palette.iter())
            .map(|(shade, value)| (format!("--color-primary-{}", shade), *value))
            .collect();

        // component library aliases
        let aliases = [
            ("--el-color-primary", 5),
            ("--el-color-primary-light-3", 4),
            ("--el-color-primary-light-5", 3),
            ("--el-color-primary-light-7", 2),
            ("--el-color-primary-light-8", 1),
            ("--el-color-primary-light-9", 0),
            ("--el-color-primary-dark-2", 6),
        ];
        props.extend(
            aliases
                .iter()
                .map(|(name, idx)| (name.to_string(), palette[*idx])),
        );
        props
    }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        ThemeColor::ALL
            .iter()
            .copied()
            .find(|color| color.as_str() == s)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown theme color '{}' (expected one of: blue, purple, green, orange, pink)",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

impl FromStr for ThemeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            _ => Err(anyhow::anyhow!("Unknown theme mode '{}'", s)),
        }
    }
}

/// The element the theme is applied to.
pub trait StyleRoot {
    fn set_attribute(&mut self, name: &str, value: &str);
    fn remove_attribute(&mut self, name: &str);
    fn set_property(&mut self, name: &str, value: &str);
    fn add_class(&mut self, class: &str);
    fn remove_class(&mut self, class: &str);
}

/// In-memory root element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentRoot {
    pub attributes: BTreeMap<String, String>,
    pub properties: BTreeMap<String, String>,
    pub classes: BTreeSet<String>,
}

impl DocumentRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// The opening `<html>` tag carrying the current state.
    pub fn opening_tag(&self) -> String {
        let mut tag = String::from("<html");
        if !self.classes.is_empty() {
            let classes: Vec<&str> = self.classes.iter().map(String::as_str).collect();
            tag.push_str(&format!(" class=\"{}\"", classes.join(" ")));
        }
        for (name, value) in &self.attributes {
            tag.push_str(&format!(" {}=\"{}\"", name, value));
        }
        if !self.properties.is_empty() {
            let style: Vec<String> = self
                .properties
                .iter()
                .map(|(name, value)| format!("{}: {}", name, value))
                .collect();
            tag.push_str(&format!(" style=\"{}\"", style.join("; ")));
        }
        tag.push('>');
        tag
    }
}

impl StyleRoot for DocumentRoot {
    fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    fn set_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
    }

    fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }
}

/// Active theme preference backed by the key-value store.
pub struct ThemeStore {
    storage: Arc<dyn KeyValueStore>,
    color: ThemeColor,
    mode: ThemeMode,
}

impl ThemeStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            color: ThemeColor::default(),
            mode: ThemeMode::default(),
        }
    }

    pub fn color(&self) -> ThemeColor {
        self.color
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    /// Restores the persisted preference and applies it. Missing values fall
    /// back to the defaults; unrecognized ones are also dropped from storage.
    pub fn init(&mut self, root: &mut dyn StyleRoot) {
        self.color = self.restore(THEME_COLOR_KEY).unwrap_or_default();
        self.mode = self.restore(THEME_MODE_KEY).unwrap_or_default();
        log::debug!("Theme initialized: {} / {}", self.color, self.mode.as_str());
        self.apply(root);
    }

    /// Validates, persists and applies a color given by name.
    pub fn set_color(&mut self, value: &str, root: &mut dyn StyleRoot) -> Result<ThemeColor> {
        let color: ThemeColor = value.parse()?;
        self.set_color_typed(color, root)?;
        Ok(color)
    }

    pub fn set_color_typed(&mut self, color: ThemeColor, root: &mut dyn StyleRoot) -> Result<()> {
        log::info!("Setting theme color: {}", color);
        self.storage.set(THEME_COLOR_KEY, color.as_str())?;
        self.color = color;
        apply_color(color, root);
        Ok(())
    }

    pub fn set_mode(&mut self, mode: ThemeMode, root: &mut dyn StyleRoot) -> Result<()> {
        log::info!("Setting theme mode: {}", mode.as_str());
        self.storage.set(THEME_MODE_KEY, mode.as_str())?;
        self.mode = mode;
        apply_mode(mode, root);
        Ok(())
    }

    pub fn toggle_mode(&mut self, root: &mut dyn StyleRoot) -> Result<ThemeMode> {
        let mode = self.mode.toggled();
        self.set_mode(mode, root)?;
        Ok(mode)
    }

    pub fn apply(&self, root: &mut dyn StyleRoot) {
        apply_color(self.color, root);
        apply_mode(self.mode, root);
    }

    fn restore<T: FromStr>(&self, key: &str) -> Option<T> {
        let saved = self.storage.get(key)?;
        match saved.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring unrecognized stored {} '{}'", key, saved);
                if let Err(e) = self.storage.remove(key) {
                    log::warn!("Failed to clear stored {}: {}", key, e);
                }
                None
            }
        }
    }
}

/// Blue lives in the base stylesheet, so it carries no `data-theme`.
pub fn apply_color(color: ThemeColor, root: &mut dyn StyleRoot) {
    root.remove_attribute(THEME_ATTRIBUTE);
    if color != ThemeColor::Blue {
        root.set_attribute(THEME_ATTRIBUTE, color.as_str());
    }
    for (name, value) in color.css_properties() {
        root.set_property(&name, value);
    }
}

pub fn apply_mode(mode: ThemeMode, root: &mut dyn StyleRoot) {
    match mode {
        ThemeMode::Dark => root.add_class(DARK_CLASS),
        ThemeMode::Light => root.remove_class(DARK_CLASS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn storage() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStorage::new())
    }

    #[test]
    fn test_init_without_saved_value_applies_default() {
        let mut root = DocumentRoot::new();
        let mut store = ThemeStore::new(storage());
        store.init(&mut root);

        assert_eq!(store.color(), ThemeColor::Blue);
        assert_eq!(store.mode(), ThemeMode::Light);
        assert!(root.attribute(THEME_ATTRIBUTE).is_none());
        assert_eq!(root.property("--color-primary-500"), Some("#3b82f6"));
        assert!(!root.has_class(DARK_CLASS));
    }

    #[test]
    fn test_set_color_survives_reload() {
        let shared = storage();
        let mut root = DocumentRoot::new();
        let mut store = ThemeStore::new(shared.clone());
        store.init(&mut root);
        assert_eq!(store.set_color("purple", &mut root).unwrap(), ThemeColor::Purple);
        assert_eq!(root.attribute(THEME_ATTRIBUTE), Some("purple"));

        // fresh load over the same storage
        let mut fresh_root = DocumentRoot::new();
        let mut reloaded = ThemeStore::new(shared.clone());
        reloaded.init(&mut fresh_root);
        assert_eq!(reloaded.color(), ThemeColor::Purple);
        assert_eq!(fresh_root.attribute(THEME_ATTRIBUTE), Some("purple"));
        assert_eq!(fresh_root.property("--el-color-primary"), Some("#a855f7"));
        assert_eq!(shared.get(THEME_COLOR_KEY).as_deref(), Some("purple"));
    }

    #[test]
    fn test_invalid_color_is_rejected_and_not_persisted() {
        let shared = storage();
        let mut root = DocumentRoot::new();
        let mut store = ThemeStore::new(shared.clone());
        store.init(&mut root);

        assert!(store.set_color("magenta", &mut root).is_err());
        assert_eq!(store.color(), ThemeColor::Blue);
        assert!(shared.get(THEME_COLOR_KEY).is_none());
    }

    #[test]
    fn test_unrecognized_stored_value_falls_back() {
        let shared = storage();
        shared.set(THEME_COLOR_KEY, "chartreuse").unwrap();
        shared.set(THEME_MODE_KEY, "sepia").unwrap();

        let mut root = DocumentRoot::new();
        let mut store = ThemeStore::new(shared.clone());
        store.init(&mut root);

        assert_eq!(store.color(), ThemeColor::Blue);
        assert_eq!(store.mode(), ThemeMode::Light);
        assert!(shared.get(THEME_COLOR_KEY).is_none());
        assert!(shared.get(THEME_MODE_KEY).is_none());
    }

    #[test]
    fn test_switching_back_to_blue_clears_attribute() {
        let mut root = DocumentRoot::new();
        let mut store = ThemeStore::new(storage());
        store.set_color("green", &mut root).unwrap();
        assert_eq!(root.attribute(THEME_ATTRIBUTE), Some("green"));
        store.set_color("blue", &mut root).unwrap();
        assert!(root.attribute(THEME_ATTRIBUTE).is_none());
        assert_eq!(root.property("--color-primary-50"), Some("#eff6ff"));
    }

    #[test]
    fn test_toggle_mode() {
        let shared = storage();
        let mut root = DocumentRoot::new();
        let mut store = ThemeStore::new(shared.clone());
        store.init(&mut root);

        assert_eq!(store.toggle_mode(&mut root).unwrap(), ThemeMode::Dark);
        assert!(root.has_class(DARK_CLASS));
        assert!(root.opening_tag().starts_with("<html class=\"dark\""));

        let mut reloaded = ThemeStore::new(shared);
        let mut fresh_root = DocumentRoot::new();
        reloaded.init(&mut fresh_root);
        assert_eq!(reloaded.mode(), ThemeMode::Dark);
    }

    #[test]
    fn test_css_properties() {
        let props = ThemeColor::Orange.css_properties();
        assert_eq!(props.len(), 17);
        assert!(props.contains(&("--el-color-primary-dark-2".to_string(), "#ea580c")));
        assert_eq!(ThemeColor::Pink.shade("900"), Some("#831843"));
        assert!(ThemeColor::Pink.shade("950").is_none());
    }
}
