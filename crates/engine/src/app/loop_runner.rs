use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::ActionStates;
use super::metrics::MetricsAccumulator;
use super::{InputAction, InputSnapshot, Renderer, Scene, SceneCommand};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Frame (and therefore tick) rate cap. 0 disables pacing.
    pub target_fps: u32,
    pub metrics_log_interval_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Platformer".to_string(),
            window_width: 1280,
            window_height: 720,
            target_fps: 60,
            metrics_log_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("window size {width}x{height} is not drawable")]
    InvalidWindowSize { width: u32, height: u32 },
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives `scene` with one update followed by one render
/// per frame until the window closes or the scene asks to exit.
pub fn run_app(config: LoopConfig, mut scene: Box<dyn Scene>) -> Result<(), AppError> {
    if config.window_width == 0 || config.window_height == 0 {
        return Err(AppError::InvalidWindowSize {
            width: config.window_width,
            height: config.window_height,
        });
    }

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(
        Arc::clone(&window),
        config.window_width,
        config.window_height,
    )
    .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let frame_target = target_frame_duration(config.target_fps);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval_ms, Duration::from_secs(1));
    info!(
        width = config.window_width,
        height = config.window_height,
        target_fps = config.target_fps,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let mut input_collector = InputCollector::default();
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator =
        MetricsAccumulator::new(metrics_log_interval, frame_target, Instant::now());
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let input = input_collector.snapshot_for_tick();
                    let command = scene.update(&input);
                    metrics_accumulator.record_tick();
                    if command == SceneCommand::Exit {
                        info!(reason = "scene_exit", "shutdown_requested");
                        window_target.exit();
                        return;
                    }

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep = compute_cap_sleep(elapsed_since_last_present, frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    if let Err(error) = renderer.render_scene(scene.as_mut()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();
                    metrics_accumulator.record_frame(frame_dt);

                    let next_title = scene.debug_title();
                    if next_title != last_applied_title {
                        window.set_title(next_title.as_deref().unwrap_or(&config.window_title));
                        last_applied_title = next_title;
                    }

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        let summary = scene.debug_summary();
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            worst_frame_time_ms = snapshot.worst_frame_time_ms,
                            late_frames = snapshot.late_frames,
                            summary = summary.as_deref().unwrap_or(""),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Turns raw key events into per-tick snapshots. Jump and menu are press
/// edges, consumed by the next snapshot; movement keys are held state.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    jump_is_down: bool,
    jump_pressed_edge: bool,
    menu_is_down: bool,
    menu_pressed_edge: bool,
    action_states: ActionStates,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        self.handle_physical_key(key_event.physical_key, key_event.state);
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        match key {
            PhysicalKey::Code(KeyCode::Space) => {
                handle_edge_key(state, &mut self.jump_is_down, &mut self.jump_pressed_edge);
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                handle_edge_key(state, &mut self.menu_is_down, &mut self.menu_pressed_edge);
            }
            PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            _ => {}
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.jump_pressed_edge,
            self.menu_pressed_edge,
            self.action_states,
        );
        self.jump_pressed_edge = false;
        self.menu_pressed_edge = false;
        snapshot
    }
}

fn handle_edge_key(state: ElementState, is_down: &mut bool, pressed_edge: &mut bool) {
    match state {
        ElementState::Pressed => {
            if !*is_down {
                *pressed_edge = true;
            }
            *is_down = true;
        }
        ElementState::Released => *is_down = false,
    }
}

fn normalize_non_zero_duration(value_ms: u64, fallback: Duration) -> Duration {
    if value_ms == 0 {
        fallback
    } else {
        Duration::from_millis(value_ms)
    }
}

fn target_frame_duration(target_fps: u32) -> Option<Duration> {
    (target_fps > 0).then(|| Duration::from_secs_f64(1.0 / target_fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(target) => target.saturating_sub(elapsed),
        None => Duration::ZERO,
    }
}
