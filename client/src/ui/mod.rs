use crate::app::state::AppState;
use crate::character::AvatarController;
use crate::control_mode::ControlMode;
use crate::settings::{self, KeyBindings, SettingsResource};
use avatar::ControllerConfig;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, draw_hud_egui);
    }
}

/// What the HUD shows about one avatar.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarReadout {
    pub state: &'static str,
    pub forward_speed: f32,
    pub position: [f32; 3],
    pub heading_degrees: f32,
}

impl AvatarReadout {
    pub fn from_controller(controller: &avatar::Controller) -> Self {
        let motion = controller.motion();
        Self {
            state: controller.active_state_name().unwrap_or("loading"),
            forward_speed: motion.velocity.z,
            position: motion.position.to_array(),
            heading_degrees: motion.yaw().to_degrees(),
        }
    }
}

fn draw_hud_egui(
    mut contexts: EguiContexts,
    app_state: Res<State<AppState>>,
    mode: Res<ControlMode>,
    mut settings_resource: ResMut<SettingsResource>,
    avatars: Query<&AvatarController>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::Window::new("Avatar")
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(12.0, 12.0))
        .collapsible(true)
        .resizable(false)
        .movable(false)
        .default_width(240.0)
        .show(ctx, |ui| {
            if matches!(app_state.get(), AppState::Loading) {
                ui.label("Loading avatar...");
                return;
            }

            ui.label(format!("Mode: {}", mode.label()));
            for controller in &avatars {
                let readout = AvatarReadout::from_controller(&controller.0);
                ui.separator();
                ui.label(format!("State: {}", readout.state));
                ui.label(format!("Speed: {:.2}", readout.forward_speed));
                ui.label(format!(
                    "Position: {:.1}, {:.1}, {:.1}",
                    readout.position[0], readout.position[1], readout.position[2]
                ));
                ui.label(format!("Heading: {:.0} deg", readout.heading_degrees));
            }

            ui.separator();
            egui::CollapsingHeader::new("Tuning").show(ui, |ui| {
                draw_tuning(ui, &mut settings_resource.current.controller);
                if ui.button("Save").clicked() {
                    if let Err(error) = settings::save_settings(&settings_resource.current) {
                        warn!(
                            "Failed to save settings file '{}': {}",
                            settings::SETTINGS_FILE_PATH,
                            error
                        );
                    }
                }
            });

            ui.separator();
            draw_controls_hint(ui, &settings_resource.current.controls);
        });
}

fn draw_tuning(ui: &mut egui::Ui, config: &mut ControllerConfig) {
    ui.add(
        egui::Slider::new(&mut config.motion.acceleration.z, 0.5..=20.0).text("Forward accel"),
    );
    ui.add(egui::Slider::new(&mut config.motion.acceleration.y, 0.05..=1.0).text("Turn rate"));
    ui.add(egui::Slider::new(&mut config.motion.sprint_multiplier, 1.0..=4.0).text("Sprint"));
    ui.add(
        egui::Slider::new(&mut config.blend.locomotion_fade, 0.05..=2.0).text("Locomotion fade"),
    );
    ui.add(egui::Slider::new(&mut config.blend.dance_fade, 0.05..=2.0).text("Dance fade"));
}

fn draw_controls_hint(ui: &mut egui::Ui, controls: &KeyBindings) {
    let keys = |bound: &[KeyCode]| {
        bound
            .iter()
            .map(|key| format!("{key:?}"))
            .collect::<Vec<_>>()
            .join("/")
    };

    ui.small(format!(
        "Move {} {} | Turn {} {}",
        keys(&controls.forward),
        keys(&controls.backward),
        keys(&controls.left),
        keys(&controls.right)
    ));
    ui.small(format!(
        "Run {} | Dance {} | Camera {:?}",
        keys(&controls.sprint),
        keys(&controls.dance),
        controls.toggle_control_mode
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar::{ClipSet, Controller, InputSnapshot, Mixer};

    #[test]
    fn readout_reports_loading_until_clips_are_ready() {
        let controller = Controller::default();
        let readout = AvatarReadout::from_controller(&controller);
        assert_eq!(readout.state, "loading");
        assert_eq!(readout.forward_speed, 0.0);
    }

    #[test]
    fn readout_follows_controller() {
        let mut mixer = Mixer::new(ClipSet::from_fn(|_| 1.0));
        let mut controller = Controller::default();
        controller.on_clips_ready(&mut mixer);
        controller.tick(0.1, &InputSnapshot::IDLE.with_forward(true), &mut mixer);

        let readout = AvatarReadout::from_controller(&controller);
        assert_eq!(readout.state, "walk");
        assert!((readout.forward_speed - 0.5).abs() < 1e-5);
        assert!((readout.position[2] - 0.05).abs() < 1e-5);
        assert_eq!(readout.heading_degrees, 0.0);
    }
}
