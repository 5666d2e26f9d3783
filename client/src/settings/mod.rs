use avatar::{ControllerConfig, InputSnapshot};
use bevy::prelude::*;
use bevy::window::{MonitorSelection, PresentMode, PrimaryWindow, WindowMode, WindowResolution};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::character::AvatarController;

pub const SETTINGS_FILE_PATH: &str = "./avatar_settings.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowModeSetting {
    Windowed,
    Fullscreen,
}

impl Default for WindowModeSetting {
    fn default() -> Self {
        Self::Windowed
    }
}

impl WindowModeSetting {
    pub fn to_bevy(self) -> WindowMode {
        match self {
            Self::Windowed => WindowMode::Windowed,
            Self::Fullscreen => WindowMode::BorderlessFullscreen(MonitorSelection::Current),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub mode: WindowModeSetting,
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Avatar".into(),
            width: 1280,
            height: 720,
            mode: WindowModeSetting::Windowed,
            vsync: true,
        }
    }
}

/// Keys feeding each [`InputSnapshot`] flag. Any bound key counts as held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: Vec<KeyCode>,
    pub backward: Vec<KeyCode>,
    pub left: Vec<KeyCode>,
    pub right: Vec<KeyCode>,
    pub dance: Vec<KeyCode>,
    pub sprint: Vec<KeyCode>,
    pub toggle_control_mode: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: vec![KeyCode::KeyW],
            backward: vec![KeyCode::KeyS],
            left: vec![KeyCode::KeyA],
            right: vec![KeyCode::KeyD],
            dance: vec![KeyCode::Space],
            sprint: vec![KeyCode::ShiftLeft, KeyCode::ShiftRight],
            toggle_control_mode: KeyCode::KeyV,
        }
    }
}

impl KeyBindings {
    /// Reads the held state of every bound key.
    pub fn snapshot(&self, keys: &ButtonInput<KeyCode>) -> InputSnapshot {
        let held = |bound: &[KeyCode]| keys.any_pressed(bound.iter().copied());
        InputSnapshot {
            forward: held(&self.forward),
            backward: held(&self.backward),
            left: held(&self.left),
            right: held(&self.right),
            space: held(&self.dance),
            shift: held(&self.sprint),
        }
    }
}

/// Names of the animations inside the avatar glTF, one per state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipNames {
    pub idle: String,
    pub walk: String,
    pub run: String,
    pub dance: String,
}

impl Default for ClipNames {
    fn default() -> Self {
        Self {
            idle: "idle".into(),
            walk: "walk".into(),
            run: "run".into(),
            dance: "dance".into(),
        }
    }
}

impl ClipNames {
    pub fn name_for(&self, kind: avatar::StateKind) -> &str {
        match kind {
            avatar::StateKind::Idle => &self.idle,
            avatar::StateKind::Walk => &self.walk,
            avatar::StateKind::Run => &self.run,
            avatar::StateKind::Dance => &self.dance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarAssetSettings {
    /// glTF path relative to the asset root.
    pub model_path: String,
    pub scale: f32,
    pub clips: ClipNames,
}

impl Default for AvatarAssetSettings {
    fn default() -> Self {
        Self {
            model_path: "models/avatar.glb".into(),
            scale: 1.0,
            clips: ClipNames::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, Resource)]
#[serde(default)]
pub struct GameSettings {
    pub window: WindowSettings,
    pub controls: KeyBindings,
    pub avatar: AvatarAssetSettings,
    pub controller: ControllerConfig,
}

#[derive(Debug, Error)]
pub enum SettingsIoError {
    #[error("failed to read settings file: {0}")]
    Read(std::io::Error),
    #[error("failed to write settings file: {0}")]
    Write(std::io::Error),
    #[error("failed to decode YAML settings: {0}")]
    Deserialize(serde_yaml::Error),
    #[error("failed to encode YAML settings: {0}")]
    Serialize(serde_yaml::Error),
}

#[derive(Resource, Clone)]
pub struct SettingsResource {
    pub current: GameSettings,
}

impl SettingsResource {
    pub fn new(current: GameSettings) -> Self {
        Self { current }
    }
}

pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, apply_runtime_settings);
    }
}

pub fn load_settings_or_default() -> GameSettings {
    let path = Path::new(SETTINGS_FILE_PATH);

    if !path.exists() {
        return GameSettings::default();
    }

    match load_settings_from_path(path) {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!(
                "Failed to load settings from '{}': {}. Falling back to defaults.",
                SETTINGS_FILE_PATH, error
            );
            GameSettings::default()
        }
    }
}

pub fn ensure_settings_file_exists(settings: &GameSettings) -> Result<(), SettingsIoError> {
    let path = Path::new(SETTINGS_FILE_PATH);
    if path.exists() {
        return Ok(());
    }

    write_settings_to_path(settings, path)
}

pub fn save_settings(settings: &GameSettings) -> Result<(), SettingsIoError> {
    write_settings_to_path(settings, Path::new(SETTINGS_FILE_PATH))
}

pub fn present_mode_for(window: &WindowSettings) -> PresentMode {
    if window.vsync {
        PresentMode::AutoVsync
    } else {
        PresentMode::AutoNoVsync
    }
}

fn load_settings_from_path(path: &Path) -> Result<GameSettings, SettingsIoError> {
    let raw = fs::read_to_string(path).map_err(SettingsIoError::Read)?;
    decode_settings(&raw)
}

/// Decodes settings, replacing an out-of-range controller section with defaults.
pub fn decode_settings(raw: &str) -> Result<GameSettings, SettingsIoError> {
    let mut settings =
        serde_yaml::from_str::<GameSettings>(raw).map_err(SettingsIoError::Deserialize)?;
    if let Err(error) = settings.controller.validate() {
        eprintln!("Ignoring controller tuning from settings: {error}. Using defaults.");
        settings.controller = ControllerConfig::default();
    }
    Ok(settings)
}

fn write_settings_to_path(settings: &GameSettings, path: &Path) -> Result<(), SettingsIoError> {
    let encoded = serde_yaml::to_string(settings).map_err(SettingsIoError::Serialize)?;
    fs::write(path, encoded).map_err(SettingsIoError::Write)
}

fn apply_runtime_settings(
    settings: Res<SettingsResource>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut controllers: Query<&mut AvatarController>,
    mut last_applied: Local<Option<GameSettings>>,
) {
    if last_applied.as_ref() == Some(&settings.current) {
        return;
    }

    if let Ok(mut window) = windows.single_mut() {
        let target_mode = settings.current.window.mode.to_bevy();
        window.mode = target_mode;
        if matches!(target_mode, WindowMode::Windowed) {
            window.resolution =
                WindowResolution::new(settings.current.window.width, settings.current.window.height);
        }
        window.present_mode = present_mode_for(&settings.current.window);
    }

    for mut controller in &mut controllers {
        if controller.0.config() != &settings.current.controller {
            controller.0.set_config(settings.current.controller);
        }
    }

    *last_applied = Some(settings.current.clone());
}
