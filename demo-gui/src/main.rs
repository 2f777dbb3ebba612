//! Bevy-based GUI demo for the spin simulation
//!
//! Renders the Larmor precession and spin-echo demos in 3D with an egui
//! control panel: a B0 slider, the gyromagnetic-ratio checkboxes and the
//! spin-echo sequence status.

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin, EguiPrimaryContextPass};
use spin_sim_core::{
    GeometryError, OrientedSegment, Precession, Rgb, SceneLayout, SimulationConfig, SpinEcho,
    Tesla, Vec3 as SimVec3,
};

/// Upper bound on simulation steps per rendered frame
const MAX_STEPS_PER_FRAME: u32 = 20;
/// Pitch limit for the orbit camera, just short of the poles
const MAX_PITCH: f32 = 1.5;

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
enum DemoKind {
    #[default]
    Precession,
    SpinEcho,
}

impl DemoKind {
    fn name(self) -> &'static str {
        match self {
            DemoKind::Precession => "Larmor Precession",
            DemoKind::SpinEcho => "Spin Echo",
        }
    }

    fn toggled(self) -> Self {
        match self {
            DemoKind::Precession => DemoKind::SpinEcho,
            DemoKind::SpinEcho => DemoKind::Precession,
        }
    }
}

/// Both demos plus the frame pacing state
#[derive(Resource)]
struct DemoState {
    config: SimulationConfig,
    layout: SceneLayout,
    kind: DemoKind,
    precession: Precession,
    echo: SpinEcho,
    paused: bool,
    /// Unconsumed frame time for the fixed-rate precession loop
    time_accumulator: f32,
    /// Time left before the next spin-echo transition
    echo_wait: f32,
    /// Slider value in tesla
    field_slider: f64,
}

impl DemoState {
    fn from_config(config: SimulationConfig) -> Result<Self, GeometryError> {
        let precession = Precession::new(config.precession.clone())?;
        let echo = SpinEcho::new(config.spin_echo.clone());
        let field_slider = *precession.field();
        Ok(Self {
            layout: SceneLayout::bootstrap(&config.scene),
            config,
            kind: DemoKind::default(),
            precession,
            echo,
            paused: false,
            time_accumulator: 0.0,
            echo_wait: 0.0,
            field_slider,
        })
    }

    fn restart(&mut self) -> Result<(), GeometryError> {
        let kind = self.kind;
        *self = Self::from_config(self.config.clone())?;
        self.kind = kind;
        Ok(())
    }
}

/// Orbit camera around a focus point, z up
#[derive(Resource)]
struct OrbitCamera {
    focus: Vec3,
    radius: f32,
    yaw: f32,
    pitch: f32,
}

impl OrbitCamera {
    fn from_position(pos: Vec3, focus: Vec3) -> Self {
        let offset = pos - focus;
        let radius = offset.length().max(0.1);
        Self {
            focus,
            radius,
            yaw: offset.y.atan2(offset.x),
            pitch: (offset.z / radius).clamp(-1.0, 1.0).asin(),
        }
    }

    fn transform(&self) -> Transform {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let offset = Vec3::new(cos_pitch * cos_yaw, cos_pitch * sin_yaw, sin_pitch) * self.radius;
        Transform::from_translation(self.focus + offset).looking_at(self.focus, Vec3::Z)
    }
}

/// Marker component for the camera
#[derive(Component)]
struct MainCamera;

/// Marker for the precession pivot sphere
#[derive(Component)]
struct PivotSphere;

/// Main entry point
fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match SimulationConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path, e);
                return;
            }
        },
        None => SimulationConfig::default(),
    };

    let state = match DemoState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to create demos: {}", e);
            return;
        }
    };

    let title = state
        .layout
        .title
        .clone()
        .unwrap_or_else(|| "Spin Simulation - Bevy Demo".to_string());
    let resolution = (state.layout.width, state.layout.height);
    let camera_pos = to_bevy(&state.layout.camera.pos);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title,
                resolution: resolution.into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin::default())
        .insert_resource(ClearColor(to_color(state.layout.background)))
        .insert_resource(OrbitCamera::from_position(camera_pos, Vec3::ZERO))
        .insert_resource(state)
        .add_systems(Startup, setup_scene)
        .add_systems(
            Update,
            (
                handle_controls,
                update_simulation,
                update_camera_controls,
                sync_pivot_visibility,
                draw_scene,
            )
                .chain(),
        )
        .add_systems(EguiPrimaryContextPass, update_ui)
        .run();
}

fn to_bevy(v: &SimVec3) -> Vec3 {
    Vec3::new(v.x as f32, v.y as f32, v.z as f32)
}

fn to_color(c: Rgb) -> Color {
    Color::srgb(c.r, c.g, c.b)
}

fn to_color32(c: Rgb) -> egui::Color32 {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgb(channel(c.r), channel(c.g), channel(c.b))
}

/// Camera, light and the pivot sphere
fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    state: Res<DemoState>,
    orbit: Res<OrbitCamera>,
) {
    let light = &state.layout.light;
    commands.spawn((
        PointLight {
            color: to_color(light.color),
            intensity: 4_000_000.0,
            range: 60.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(to_bevy(&light.pos)),
    ));

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: std::f32::consts::FRAC_PI_3,
            ..default()
        }),
        orbit.transform(),
        MainCamera,
    ));

    let radius = state.config.precession.pivot_radius as f32;
    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(radius))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: to_color(Precession::PIVOT_COLOR),
            ..default()
        })),
        Transform::from_translation(to_bevy(&state.precession.pivot())),
        PivotSphere,
    ));

    info!(
        "Scene ready: {}x{} canvas, {} axes",
        state.layout.width,
        state.layout.height,
        state.layout.axes.len()
    );
}

/// Advance the active demo at its configured loop rate
fn update_simulation(time: Res<Time>, mut state: ResMut<DemoState>) -> Result {
    if state.paused {
        return Ok(());
    }
    let dt = time.delta_secs();

    match state.kind {
        DemoKind::Precession => {
            let period = (1.0 / state.config.precession.rate_hz) as f32;
            state.time_accumulator += dt;
            let mut budget = MAX_STEPS_PER_FRAME;
            while state.time_accumulator >= period && budget > 0 {
                state.precession.tick()?;
                state.time_accumulator -= period;
                budget -= 1;
            }
            if budget == 0 {
                state.time_accumulator = 0.0;
            }
        }
        DemoKind::SpinEcho => {
            if state.echo.is_done() {
                return Ok(());
            }
            let period = (1.0 / state.config.spin_echo.rate_hz) as f32;
            state.echo_wait -= dt;
            let mut budget = MAX_STEPS_PER_FRAME;
            while state.echo_wait <= 0.0 && !state.echo.is_done() && budget > 0 {
                let step = state.echo.step()?;
                state.echo_wait += step.pause.as_secs_f32() + period;
                budget -= 1;
            }
        }
    }
    Ok(())
}

/// Handle keyboard shortcuts
fn handle_controls(keyboard: Res<ButtonInput<KeyCode>>, mut state: ResMut<DemoState>) -> Result {
    if keyboard.just_pressed(KeyCode::Space) {
        state.paused = !state.paused;
    }
    if keyboard.just_pressed(KeyCode::Tab) {
        state.kind = state.kind.toggled();
        info!("Switched to {}", state.kind.name());
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        state.restart()?;
    }
    Ok(())
}

/// Right drag orbits, right+left drag or the wheel zooms, shift+left drag pans
fn update_camera_controls(
    buttons: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    mut orbit: ResMut<OrbitCamera>,
    mut query: Query<&mut Transform, With<MainCamera>>,
) -> Result {
    let mut transform = query.single_mut()?;
    let delta = motion.delta;
    let right = buttons.pressed(MouseButton::Right);
    let left = buttons.pressed(MouseButton::Left);
    let shift = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);

    if right && left {
        orbit.radius *= 1.0 + delta.y * 0.01;
    } else if right {
        orbit.yaw -= delta.x * 0.005;
        orbit.pitch = (orbit.pitch + delta.y * 0.005).clamp(-MAX_PITCH, MAX_PITCH);
    } else if left && shift {
        let pan_scale = orbit.radius * 0.002;
        let pan = transform.right() * -delta.x * pan_scale + transform.up() * delta.y * pan_scale;
        orbit.focus += pan;
    }

    let lines = match scroll.unit {
        MouseScrollUnit::Line => scroll.delta.y,
        MouseScrollUnit::Pixel => scroll.delta.y / 100.0,
    };
    if lines != 0.0 {
        orbit.radius *= 1.0 - lines * 0.1;
    }
    orbit.radius = orbit.radius.clamp(0.5, 100.0);

    *transform = orbit.transform();
    Ok(())
}

fn sync_pivot_visibility(
    state: Res<DemoState>,
    mut query: Query<&mut Visibility, With<PivotSphere>>,
) {
    let wanted = if state.kind == DemoKind::Precession {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut visibility in &mut query {
        visibility.set_if_neq(wanted);
    }
}

fn draw_segment(gizmos: &mut Gizmos, segment: &OrientedSegment, color: Color) {
    if segment.is_visible() && segment.length() > 0.0 {
        gizmos.arrow(to_bevy(&segment.pos()), to_bevy(&segment.tip()), color);
    }
}

/// Axis triad, vectors and the trail
fn draw_scene(mut gizmos: Gizmos, state: Res<DemoState>) {
    for arrow in &state.layout.axes {
        gizmos.arrow(
            to_bevy(&arrow.pos),
            to_bevy(&(arrow.pos + arrow.axis)),
            to_color(arrow.color),
        );
    }

    match state.kind {
        DemoKind::Precession => {
            draw_segment(
                &mut gizmos,
                state.precession.magnetization(),
                to_color(Precession::MAGNETIZATION_COLOR),
            );
            gizmos.linestrip(
                state.precession.trail().iter().map(to_bevy),
                to_color(Precession::TRAIL_COLOR),
            );
        }
        DemoKind::SpinEcho => {
            draw_segment(
                &mut gizmos,
                state.echo.magnetization(),
                to_color(SpinEcho::MAGNETIZATION_COLOR),
            );
            for spin in state.echo.ensemble().spins() {
                draw_segment(&mut gizmos, &spin.segment, to_color(SpinEcho::SPIN_COLOR));
            }
        }
    }
}

/// Render the control panel, axis labels and caption using egui
fn update_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<DemoState>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let state = &mut *state;

    egui::Window::new(state.kind.name())
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut state.kind, DemoKind::Precession, "Precession");
                ui.selectable_value(&mut state.kind, DemoKind::SpinEcho, "Spin Echo");
            });
            ui.checkbox(&mut state.paused, "Paused");
            ui.separator();

            match state.kind {
                DemoKind::Precession => {
                    let p = &state.config.precession;
                    let slider = egui::Slider::new(&mut state.field_slider, p.field_min..=p.field_max)
                        .step_by(0.01)
                        .text("B0 (T)");
                    if ui.add(slider).changed() {
                        state.precession.set_field(Tesla::new(state.field_slider));
                    }

                    ui.add_space(6.0);
                    ui.colored_label(egui::Color32::LIGHT_GRAY, "Gyromagnetic ratio:");
                    for (nucleus, checked) in state.precession.selection().states() {
                        let mut on = checked;
                        if ui.checkbox(&mut on, nucleus.label()).changed() {
                            state.precession.toggle_nucleus(nucleus, on);
                        }
                    }

                    ui.add_space(6.0);
                    let readout = state.precession.readout();
                    ui.label(readout.field_text.as_str());
                    ui.label(readout.frequency_text.as_str());
                    ui.label(format!(
                        "Trail: {}/{}",
                        state.precession.trail().len(),
                        state.precession.trail().capacity()
                    ));
                }
                DemoKind::SpinEcho => {
                    let counters = state.echo.counters();
                    ui.label(format!("Phase: {}", state.echo.phase()));
                    ui.label(format!("|M|: {:.3}", state.echo.magnetization().length()));
                    ui.label(format!("Coherence: {:.3}", state.echo.ensemble().coherence()));
                    ui.label(format!(
                        "Dephasing: {}/{}",
                        counters.dephase_ticks,
                        state.echo.dephase_steps()
                    ));
                    ui.label(format!(
                        "Pulses: {} × 90°, {} × 180°",
                        counters.pulses_90, counters.pulses_180
                    ));
                    if ui.button("Restart sequence").clicked() {
                        state.echo.reset();
                        state.echo_wait = 0.0;
                    }
                }
            }

            ui.separator();
            ui.colored_label(egui::Color32::LIGHT_GRAY, "SPACE pause, TAB switch demo, R reset");
        });

    if let Ok((camera, camera_transform)) = camera_query.single() {
        for label in &state.layout.labels {
            if let Ok(screen) = camera.world_to_viewport(camera_transform, to_bevy(&label.pos)) {
                egui::Area::new(egui::Id::new(("axis_label", label.text)))
                    .fixed_pos(egui::pos2(screen.x, screen.y))
                    .interactable(false)
                    .show(ctx, |ui| {
                        ui.label(
                            egui::RichText::new(label.text)
                                .size(18.0)
                                .color(to_color32(label.color)),
                        );
                    });
            }
        }
    }

    if let Some(caption) = state.layout.caption {
        egui::Area::new(egui::Id::new("camera_caption"))
            .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(caption.trim_end()).color(egui::Color32::DARK_GRAY));
            });
    }

    Ok(())
}
