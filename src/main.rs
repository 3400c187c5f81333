use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use glam::Quat;
use log::{error, info, warn};
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, ElementState, Event, KeyboardInput, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use earth_renderer::app::{
    grab_cursor, map_keycode, map_mouse_button, print_body_summary, release_cursor,
};
use earth_renderer::assets::missing_textures;
use earth_renderer::input::{action_for_key, action_for_mouse};
use earth_renderer::scene::draw_list;
use earth_renderer::{
    Action, AnimationLoop, BodyCatalog, BodySet, CameraRig, FrameStats, LightParams,
    LookController, MetricsDisplay, MetricsSink, Renderer, ViewMode,
};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let catalog = match &options.catalog {
        Some(path) => BodyCatalog::load(path)
            .with_context(|| format!("failed to load catalog {}", path.display()))?,
        None => BodyCatalog::solar_system(),
    };

    println!("Loaded catalog with {} bodies", catalog.len());
    for body in catalog.bodies() {
        println!(
            " - {} (tilt {:.2} deg, period {:.3} d)",
            body.name, body.axial_tilt_degrees, body.rotation_period
        );
    }
    info!("spin scale {}", catalog.spin_scale);

    if let Some(root) = &options.assets {
        let missing = missing_textures(&catalog, root)
            .with_context(|| format!("failed to scan assets in {}", root.display()))?;
        for texture in missing {
            println!("missing texture: {texture}");
        }
    }

    let bodies = match BodySet::for_mode(&catalog, options.mode, options.select.as_deref()) {
        Ok(bodies) => bodies,
        Err(err) => {
            warn!("{err}; keeping the default selection");
            println!("{err}");
            BodySet::for_mode(&catalog, options.mode, None)?
        }
    };

    if options.summary_only {
        run_headless(bodies, options.frames, options.frame_ms);
        Ok(())
    } else {
        let fallback = bodies.clone();
        match run_interactive(bodies, options.mode) {
            Ok(()) => Ok(()),
            Err(err) => {
                if err.downcast_ref::<WindowInitError>().is_some() {
                    eprintln!(
                        "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
                    );
                    run_headless(fallback, options.frames, options.frame_ms);
                    Ok(())
                } else {
                    Err(err)
                }
            }
        }
    }
}

/// Prints every report to stdout.
struct StdoutSink;

impl MetricsSink for StdoutSink {
    fn publish(&mut self, stats: &FrameStats) {
        info!("frame time: {stats}");
        println!("frame time: {stats}");
    }
}

/// Drives the animation loop with synthetic timestamps `i * frame_ms`.
fn run_headless(bodies: BodySet, frames: u32, frame_ms: f64) {
    let mut animation = AnimationLoop::new(bodies).with_sink(StdoutSink);
    for frame in 0..frames {
        animation.frame(f64::from(frame) * frame_ms);
    }
    print_body_summary(animation.bodies());
}

fn run_interactive(bodies: BodySet, mode: ViewMode) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("earth-renderer")
            .with_inner_size(LogicalSize::new(1280.0, 720.0))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let renderer = block_on(Renderer::new(Arc::clone(&window)))?;
    let mut camera = CameraRig::default();
    let size = renderer.size();
    camera.set_viewport(size.width, size.height);

    let display = MetricsDisplay::new();
    let mut app = AppState {
        renderer,
        animation: AnimationLoop::new(bodies).with_sink(display.clone()),
        look: LookController::default(),
        camera,
        light: LightParams::default(),
        display,
        mode,
        started: Instant::now(),
        last_error: None,
    };

    let mut event_loop = event_loop;
    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        if let Err(err) = app.process_event(&event, control_flow) {
            app.last_error = Some(err);
            control_flow.set_exit();
        }
    });

    print_body_summary(app.animation.bodies());

    if let Some(err) = app.last_error {
        return Err(err);
    }

    Ok(())
}

struct AppState {
    renderer: Renderer,
    animation: AnimationLoop,
    look: LookController,
    camera: CameraRig,
    light: LightParams,
    display: MetricsDisplay,
    mode: ViewMode,
    started: Instant,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

impl AppState {
    fn process_event(&mut self, event: &Event<()>, control_flow: &mut ControlFlow) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        control_flow.set_exit();
                    }
                    WindowEvent::Resized(size) => {
                        self.renderer.resize(*size);
                        self.camera.set_viewport(size.width, size.height);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.renderer.resize(**new_inner_size);
                        self.camera
                            .set_viewport(new_inner_size.width, new_inner_size.height);
                    }
                    WindowEvent::Focused(false) => {
                        if self.look.is_captured() {
                            self.look.capture_lost();
                            release_cursor(self.renderer.window());
                        }
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        self.handle_keyboard(input, control_flow);
                    }
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button,
                        ..
                    } => {
                        if let Some(action) = action_for_mouse(map_mouse_button(*button), self.mode)
                        {
                            self.apply(action, control_flow);
                        }
                    }
                    _ => {}
                }
            }
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                self.look.pointer_moved(delta.0 as f32, delta.1 as f32);
            }
            Event::RedrawRequested(window_id) if *window_id == self.renderer.window_id() => {
                self.redraw()?;
            }
            Event::MainEventsCleared => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.animation.frame(now_ms);

        let orientation = match self.mode {
            ViewMode::Single => self.look.orientation(),
            ViewMode::Gallery => Quat::IDENTITY,
        };
        let camera = self.camera.params(orientation);
        self.renderer.update_globals(&camera, &self.light);
        let items = draw_list(&self.animation, self.camera.position);
        if let Err(err) = self.renderer.render(&items) {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = self.renderer.window().inner_size();
                    self.renderer.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    error!("surface timeout; skipping frame");
                }
            }
        }

        if let Some(text) = self.display.take() {
            self.renderer
                .window()
                .set_title(&format!("earth-renderer | {text}"));
        }
        Ok(())
    }

    fn handle_keyboard(&mut self, input: &KeyboardInput, control_flow: &mut ControlFlow) {
        if input.state != ElementState::Pressed {
            return;
        }
        let Some(action) = input
            .virtual_keycode
            .and_then(map_keycode)
            .and_then(|key| action_for_key(key, self.mode))
        else {
            return;
        };
        self.apply(action, control_flow);
    }

    fn apply(&mut self, action: Action, control_flow: &mut ControlFlow) {
        let bodies = self.animation.bodies_mut();
        match action {
            Action::Select(id) => {
                if let Err(err) = bodies.select_id(id) {
                    warn!("{err}");
                }
            }
            Action::SelectNext => {
                bodies.select_next();
            }
            Action::SelectPrevious => {
                bodies.select_previous();
            }
            Action::EngageCapture => {
                if self.look.engage() && !grab_cursor(self.renderer.window()) {
                    self.look.capture_lost();
                }
            }
            Action::ReleaseOrQuit => {
                if self.look.is_captured() {
                    self.look.release();
                    release_cursor(self.renderer.window());
                } else {
                    control_flow.set_exit();
                }
            }
        }
    }
}

struct CliOptions {
    catalog: Option<PathBuf>,
    mode: ViewMode,
    select: Option<String>,
    summary_only: bool,
    frames: u32,
    frame_ms: f64,
    assets: Option<PathBuf>,
}

const USAGE: &str = "Usage: earth-renderer [catalog.xml] [--summary-only] [--mode gallery|single] [--select NAME] [--frames N] [--frame-ms MS] [--assets DIR]";

impl CliOptions {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self> {
        let mut options = Self {
            catalog: None,
            mode: ViewMode::Gallery,
            select: None,
            summary_only: false,
            frames: 120,
            frame_ms: 16.0,
            assets: None,
        };
        let mut args = args;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--summary-only" => options.summary_only = true,
                "--mode" => {
                    let value = flag_value(&mut args, "--mode")?;
                    options.mode = ViewMode::from_name(&value).ok_or_else(|| {
                        anyhow!("Unknown mode: {value}. Expected gallery or single")
                    })?;
                }
                "--select" => options.select = Some(flag_value(&mut args, "--select")?),
                "--frames" => {
                    let value = flag_value(&mut args, "--frames")?;
                    options.frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count {value}"))?;
                }
                "--frame-ms" => {
                    let value = flag_value(&mut args, "--frame-ms")?;
                    let frame_ms: f64 = value
                        .parse()
                        .with_context(|| format!("invalid frame time {value}"))?;
                    if !(frame_ms.is_finite() && frame_ms > 0.0) {
                        return Err(anyhow!("frame time must be positive, got {value}"));
                    }
                    options.frame_ms = frame_ms;
                }
                "--assets" => {
                    options.assets = Some(PathBuf::from(flag_value(&mut args, "--assets")?));
                }
                "--help" | "-h" => return Err(anyhow!(USAGE)),
                other if other.starts_with("--") => {
                    return Err(anyhow!("Unknown argument: {other}\n{USAGE}"));
                }
                path => {
                    if options.catalog.is_some() {
                        return Err(anyhow!("Unexpected argument: {path}\n{USAGE}"));
                    }
                    options.catalog = Some(PathBuf::from(path));
                }
            }
        }
        Ok(options)
    }
}

fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value\n{USAGE}"))
}
