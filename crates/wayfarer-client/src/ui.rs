//! Directions panel: origin/destination form and route status.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use wayfarer_path::ModelState;

use crate::async_runtime::TaskSpawner;
use crate::directions::{DirectionsState, RouteSummary};
use crate::overlay::Overlay;

/// Plugin for the directions panel.
pub struct DirectionsUiPlugin;

impl Plugin for DirectionsUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .add_systems(EguiPrimaryContextPass, directions_panel_system);
    }
}

/// Render the directions panel.
fn directions_panel_system(
    mut contexts: EguiContexts,
    mut directions: ResMut<DirectionsState>,
    overlay: Res<Overlay>,
    window: Single<&Window, With<PrimaryWindow>>,
    spawner: TaskSpawner,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let mut start_request = false;

    egui::Window::new("Directions")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            egui::Grid::new("directions_form")
                .num_columns(2)
                .show(ui, |ui| {
                    ui.label("From:");
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut directions.origin)
                            .desired_width(180.0)
                            .hint_text("Origin"),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        start_request = true;
                    }
                    ui.end_row();

                    ui.label("To:");
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut directions.destination)
                            .desired_width(180.0)
                            .hint_text("Destination"),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        start_request = true;
                    }
                    ui.end_row();
                });

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(directions.can_request(), egui::Button::new("Go"))
                    .clicked()
                {
                    start_request = true;
                }
                if directions.is_loading() {
                    ui.spinner();
                    ui.label("Fetching route...");
                }
            });

            if let Some(ref error) = directions.error {
                ui.colored_label(egui::Color32::RED, error);
            }

            if let Some(ref route) = directions.last_route {
                ui.separator();
                render_route_summary(ui, route);
            }

            ui.separator();
            match overlay.sessions().current() {
                Some(session) => {
                    ui.label(format!(
                        "Route {}: {} waypoints",
                        session.generation(),
                        session.route().len()
                    ));
                    let model = match session.model_state() {
                        ModelState::Animating => "animating",
                        ModelState::Idle if overlay.pending_loads() > 0 => "loading",
                        ModelState::Idle => "idle",
                    };
                    ui.label(format!("Model: {model}"));
                    let geometry = session.geometry();
                    let resolution = geometry.resolution();
                    ui.label(format!("Viewport: {:.0} x {:.0}", resolution.x, resolution.y));
                    ui.label(format_track_width(
                        geometry.style().line_width,
                        geometry.half_width_ndc(),
                    ));
                }
                None => {
                    ui.label("No route");
                    ui.label(format!("Viewport: {:.0} x {:.0}", window.width(), window.height()));
                }
            }
        });

    if start_request {
        directions.start_request(&spawner);
    }

    Ok(())
}

fn render_route_summary(ui: &mut egui::Ui, route: &RouteSummary) {
    ui.label(format!("{} \u{2192} {}", route.origin, route.destination));
    if let Some(ref summary) = route.summary {
        ui.label(format!("via {summary}"));
    }
    ui.label(format!(
        "{}, {}",
        format_distance(route.distance_meters),
        format_duration(route.duration_seconds)
    ));
}

/// Format a distance as meters below 1 km, otherwise kilometers.
fn format_distance(meters: u64) -> String {
    if meters < 1_000 {
        format!("{meters} m")
    } else {
        #[allow(clippy::cast_precision_loss)]
        let km = meters as f64 / 1_000.0;
        format!("{km:.1} km")
    }
}

/// Format a duration as minutes, with hours once it exceeds one.
fn format_duration(seconds: u64) -> String {
    let minutes = seconds.div_ceil(60);
    if minutes < 60 {
        format!("{minutes} min")
    } else {
        format!("{} h {} min", minutes / 60, minutes % 60)
    }
}

/// Format the track width in pixels with its clip-space half-width.
fn format_track_width(line_width: f32, half_width_ndc: Vec2) -> String {
    format!(
        "Track: {line_width:.0} px ({:.4} x {:.4} NDC)",
        half_width_ndc.x, half_width_ndc.y
    )
}
