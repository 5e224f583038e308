use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::{Error as PixelsError, Pixels, SurfaceTexture};
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use super::input::ActionStates;
use super::metrics::MetricsAccumulator;
use super::{
    Canvas, FrameScheduler, FrameStep, InputAction, InputSnapshot, RenderSurface, Rgba, Scene,
    SceneCommand, TextAlign, TextStyle,
};

pub const SLOW_FRAME_ENV_VAR: &str = "PUBIE_SLOW_FRAME_MS";

const PAUSE_BRIGHTNESS: f32 = 1.0 / 3.0;
const PAUSE_LABEL: &str = "PAUSED";
const PAUSE_LABEL_Y: i32 = 225;
const PAUSE_LABEL_SCALE: u32 = 6;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    /// Logical surface size. The window may be resized; the surface is scaled.
    pub surface_width: u32,
    pub surface_height: u32,
    pub target_tps: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub background: Rgba,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "pubie".to_string(),
            surface_width: 640,
            surface_height: 480,
            target_tps: 30,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            background: [0xC0, 0xC0, 0xC0, 0xFF],
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize pixel surface: {0}")]
    CreateSurface(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Owns the window's pixel buffer. The buffer always has the logical surface
/// size; `pixels` scales it to whatever the window currently is.
struct Presenter {
    pixels: Pixels<'static>,
}

impl Presenter {
    fn new(
        window: Arc<Window>,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Self, PixelsError> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(surface_width, surface_height, surface)?;
        Ok(Self { pixels })
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), PixelsError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels
            .resize_surface(width, height)
            .map_err(PixelsError::from)
    }

    fn present(&mut self, canvas: &Canvas) -> Result<(), PixelsError> {
        let frame = self.pixels.frame_mut();
        if frame.len() == canvas.rgba().len() {
            frame.copy_from_slice(canvas.rgba());
        }
        self.pixels.render()
    }
}

pub fn run_app(config: LoopConfig, mut scene: Box<dyn Scene>) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.surface_width as f64,
                config.surface_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut presenter = Presenter::new(window, config.surface_width, config.surface_height)
        .map_err(AppError::CreateSurface)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    let mut scheduler = FrameScheduler::from_tick_rate(config.target_tps);
    let mut canvas = Canvas::new(config.surface_width, config.surface_height, config.background);
    let mut pause_frame: Option<Canvas> = None;
    let mut input_collector = InputCollector::default();

    info!(
        target_tps = config.target_tps.max(1),
        tick_interval_ms = scheduler.interval().as_millis() as u64,
        surface_width = config.surface_width,
        surface_height = config.surface_height,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        "loop_config"
    );

    // Textures are loaded before `run_app`; the surface existing is the last
    // precondition for running ticks.
    scheduler.mark_ready();

    let mut last_frame_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval, last_frame_instant);
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = presenter.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "surface_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::Focused(focused) => {
                        let paused = !focused;
                        if paused == scheduler.is_paused() {
                            return;
                        }
                        scheduler.set_paused(paused);
                        input_collector.clear();
                        scene.pause_changed(paused);
                        if paused {
                            info!(frame = scheduler.frame_counter(), "paused");
                        } else {
                            pause_frame = None;
                            info!(frame = scheduler.frame_counter(), "resumed");
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if scheduler.is_paused() {
                            return;
                        }
                        input_collector.handle_key(event.physical_key, event.state);
                        if input_collector.quit_requested {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if slow_frame_delay > Duration::ZERO {
                            // Explicit debug perturbation to exercise tick skipping.
                            thread::sleep(slow_frame_delay);
                        }

                        let now = Instant::now();
                        let frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;
                        metrics_accumulator.record_frame();

                        let presented = match scheduler.advance(frame_dt) {
                            FrameStep::Idle => None,
                            FrameStep::Tick { skipped } => {
                                if skipped > 0 {
                                    debug!(
                                        skipped,
                                        frame = scheduler.frame_counter(),
                                        "tick_skipped"
                                    );
                                }
                                let input_snapshot = input_collector.snapshot_for_tick();
                                canvas.clear();
                                let command = scene.update(&input_snapshot, &mut canvas);
                                metrics_accumulator.record_tick(skipped);
                                if command == SceneCommand::Quit {
                                    info!(reason = "scene_quit", "shutdown_requested");
                                    window_target.exit();
                                }
                                Some(&canvas)
                            }
                            FrameStep::Paused => {
                                metrics_accumulator.record_paused_frame();
                                Some(&*pause_frame.get_or_insert_with(|| pause_overlay(&canvas)))
                            }
                        };
                        if let Some(frame) = presented {
                            if let Err(error) = presenter.present(frame) {
                                warn!(error = %error, "surface_present_failed");
                                window_target.exit();
                            }
                        }

                        let next_title = scene.debug_title();
                        if next_title != last_applied_title {
                            window_for_loop
                                .set_title(next_title.as_deref().unwrap_or(&config.window_title));
                            last_applied_title = next_title;
                        }

                        if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                            info!(
                                fps = snapshot.fps,
                                tps = snapshot.tps,
                                paused_frames = snapshot.paused_frames,
                                skipped_ticks = snapshot.skipped_ticks,
                                frame = scheduler.frame_counter(),
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                scene.unload();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// The last drawn frame, dimmed, with the pause label on top.
fn pause_overlay(last_frame: &Canvas) -> Canvas {
    let mut overlay = last_frame.clone();
    overlay.dim(PAUSE_BRIGHTNESS);
    let center_x = overlay.width() as i32 / 2;
    overlay.draw_text(
        PAUSE_LABEL,
        center_x,
        PAUSE_LABEL_Y,
        TextStyle {
            scale: PAUSE_LABEL_SCALE,
            color: [0xFF, 0xFF, 0xFF, 0xFF],
            align: TextAlign::Center,
        },
    );
    overlay
}

/// Collects held keys between ticks. Scenes only ever see the snapshot taken
/// at the start of a tick.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
}

impl InputCollector {
    fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        let Some(action) = action_for_key(key) else {
            return;
        };
        self.action_states.set(action, is_pressed);
        if action == InputAction::Quit && is_pressed {
            self.quit_requested = true;
        }
    }

    /// Drops all held state. Keys held across a pause must be pressed again.
    fn clear(&mut self) {
        self.action_states.clear();
    }

    fn snapshot_for_tick(&self) -> InputSnapshot {
        InputSnapshot::from_states(self.action_states)
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::Enter | KeyCode::NumpadEnter => Some(InputAction::Confirm),
        KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::MoveUp),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::MoveDown),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        KeyCode::Escape => Some(InputAction::Quit),
        _ => None,
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    match env::var(SLOW_FRAME_ENV_VAR) {
        Ok(value) => match value.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = value.as_str(),
                    "invalid slow-frame env var value; falling back to config"
                );
                Duration::from_millis(config_slow_frame_ms)
            }
        },
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputCollector, code: KeyCode) {
        input.handle_key(PhysicalKey::Code(code), ElementState::Pressed);
    }

    fn release(input: &mut InputCollector, code: KeyCode) {
        input.handle_key(PhysicalKey::Code(code), ElementState::Released);
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyW);
        press(&mut input, KeyCode::ArrowLeft);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.is_down(InputAction::MoveDown));
    }

    #[test]
    fn enter_maps_to_confirm_and_stays_held() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Enter);

        assert!(input.snapshot_for_tick().is_down(InputAction::Confirm));
        assert!(input.snapshot_for_tick().is_down(InputAction::Confirm));

        release(&mut input, KeyCode::Enter);
        assert!(!input.snapshot_for_tick().is_down(InputAction::Confirm));
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::default();
        assert!(!input.quit_requested);
        press(&mut input, KeyCode::Escape);
        assert!(input.quit_requested);
    }

    #[test]
    fn clear_drops_held_keys() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyD);
        press(&mut input, KeyCode::Enter);

        input.clear();
        assert!(!input.snapshot_for_tick().any_down());
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyQ);
        assert_eq!(input.snapshot_for_tick(), InputSnapshot::empty());
    }

    #[test]
    fn pause_overlay_dims_and_labels_last_frame() {
        let frame = Canvas::new(640, 480, [0xC0, 0xC0, 0xC0, 0xFF]);
        let overlay = pause_overlay(&frame);

        assert_eq!(overlay.pixel(0, 0), Some([0x40, 0x40, 0x40, 0xFF]));
        let label_has_white = (PAUSE_LABEL_Y as u32..PAUSE_LABEL_Y as u32 + 30)
            .flat_map(|y| (0..640).map(move |x| (x, y)))
            .any(|(x, y)| overlay.pixel(x, y) == Some([0xFF, 0xFF, 0xFF, 0xFF]));
        assert!(label_has_white);
    }

    #[test]
    fn zero_metrics_interval_falls_back() {
        assert_eq!(
            normalize_non_zero_duration(Duration::ZERO, Duration::from_secs(1)),
            Duration::from_secs(1)
        );
    }
}
