use std::any::Any;
use std::env;
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::info;
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{
    ElementState, Event, KeyboardInput, MouseButton as WinitMouseButton, MouseScrollDelta,
    WindowEvent,
};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use capsule_viewer::{
    load_obj_from_str, CameraConfig, FrameUniforms, InputState, KeyCode, MaterialLibrary,
    NamedKey, ObjMesh, OrbitCamera, Renderer, ResolvedMaterial, ShadingMode,
};

/// Zoom distance per scroll line.
const ZOOM_STEP: f32 = 1.0;

/// Fallback model: a cube with two material groups, so the viewer always has
/// something to draw and the material path is exercised out of the box.
const DEFAULT_MODEL_OBJ: &str = "\
v -1 -1 -1
v 1 -1 -1
v 1 1 -1
v -1 1 -1
v -1 -1 1
v 1 -1 1
v 1 1 1
v -1 1 1
usemtl body
f 1 2 3 4
f 5 8 7 6
f 1 5 6 2
f 3 7 8 4
usemtl trim
f 2 6 7 3
f 1 4 8 5
";

/// Material manifest used when none is given on the command line.
const DEFAULT_MANIFEST: &str = r#"
<materials default="diffuse">
    <material>
        <submesh>body</submesh>
        <mode>textured</mode>
        <tint>235 235 235</tint>
        <texture>checker</texture>
    </material>
    <material>
        <submesh>trim</submesh>
        <mode>reflective</mode>
        <tint>200 220 255</tint>
    </material>
</materials>
"#;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;

    let source = match &options.model {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read model {path}"))?
        }
        None => DEFAULT_MODEL_OBJ.to_string(),
    };
    let mesh = load_obj_from_str(&source).context("failed to parse OBJ model")?;

    let library = match &options.materials {
        Some(path) => {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read material manifest {path}"))?;
            MaterialLibrary::from_xml(&xml).context("failed to parse material manifest")?
        }
        None => MaterialLibrary::from_xml(DEFAULT_MANIFEST)
            .context("built-in material manifest is invalid")?,
    };
    let materials = library.resolve_for_mesh(&mesh);

    println!(
        "Loaded model with {} vertices ({} submeshes)",
        mesh.vertex_count(),
        mesh.submeshes.len()
    );
    for material in &materials {
        let submesh = &mesh.submeshes[material.submesh_index];
        println!(
            " - {} ({})",
            submesh.name,
            material.descriptor.mode.label()
        );
    }

    if options.summary_only {
        print_summary(&mesh, &materials);
        return Ok(());
    }

    match run_interactive(&mesh, &materials) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or install GPU drivers to enable rendering)."
                );
                print_summary(&mesh, &materials);
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

fn print_summary(mesh: &ObjMesh, materials: &[ResolvedMaterial]) {
    println!("Model summary:");
    println!(
        " - {} vertices, {} indices, {} triangles",
        mesh.vertex_count(),
        mesh.indices.len(),
        mesh.indices.len() / 3
    );
    for material in materials {
        let submesh = &mesh.submeshes[material.submesh_index];
        println!(
            " - {} -> {} tint=({:.2}, {:.2}, {:.2})",
            submesh.name,
            material.descriptor.mode.label(),
            material.descriptor.tint.x,
            material.descriptor.tint.y,
            material.descriptor.tint.z
        );
    }
}

fn run_interactive(mesh: &ObjMesh, materials: &[ResolvedMaterial]) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Capsule Viewer")
            .with_inner_size(LogicalSize::new(1280.0, 720.0))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let renderer = block_on(Renderer::new(Arc::clone(&window), mesh, materials))
        .map_err(|err| WindowInitError::from_error("renderer", err))?;
    let camera = OrbitCamera::new(CameraConfig::default())?;

    let mut app = AppState {
        renderer,
        camera,
        input: Arc::new(InputState::new()),
        clock: FrameClock::start(),
        mode_override: None,
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

    if let Some(err) = app.last_error {
        return Err(err);
    }

    Ok(())
}

/// Monotonic clock driving the time-based uniforms.
struct FrameClock {
    started: Instant,
}

impl FrameClock {
    fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    fn elapsed_seconds(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }
}

struct AppState {
    renderer: Renderer,
    camera: OrbitCamera,
    input: Arc<InputState>,
    clock: FrameClock,
    mode_override: Option<ShadingMode>,
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
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.renderer.resize(**new_inner_size);
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        self.handle_keyboard(input, control_flow);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        self.handle_mouse_button(*state, *button);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        self.input
                            .cursor_moved(Vec2::new(position.x as f32, position.y as f32));
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let lines = match delta {
                            MouseScrollDelta::LineDelta(_, y) => *y,
                            MouseScrollDelta::PixelDelta(position) => position.y as f32 / 20.0,
                        };
                        self.input.push_scroll(lines * ZOOM_STEP);
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if *window_id == self.renderer.window_id() => {
                self.advance_frame()?;
            }
            Event::MainEventsCleared => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn advance_frame(&mut self) -> Result<()> {
        let drag = self.input.take_drag_delta();
        if drag != Vec2::ZERO {
            self.camera.accumulate_drag(drag.x, drag.y);
        }
        let scroll = self.input.take_scroll_delta();
        if scroll != 0.0 {
            self.camera.set_zoom(scroll);
        }

        let size = self.renderer.window().inner_size();
        let transforms = self.camera.frame_transforms(
            size.width as f32,
            size.height as f32,
            self.clock.elapsed_seconds(),
        )?;
        self.renderer
            .update_globals(&FrameUniforms::pack(&transforms));

        if let Err(err) = self.renderer.render(self.mode_override) {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = self.renderer.window().inner_size();
                    self.renderer.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    info!("Surface timeout; retrying next frame");
                }
            }
        }
        Ok(())
    }

    fn handle_keyboard(&mut self, input: &KeyboardInput, control_flow: &mut ControlFlow) {
        let Some(keycode) = input.virtual_keycode.and_then(map_keycode) else {
            return;
        };
        match input.state {
            ElementState::Pressed => {
                self.input.set_key_down(keycode);
                self.handle_key_pressed(keycode, control_flow);
            }
            ElementState::Released => self.input.set_key_up(keycode),
        }
    }

    fn handle_key_pressed(&mut self, keycode: KeyCode, control_flow: &mut ControlFlow) {
        match keycode {
            KeyCode::Named(NamedKey::Escape) => control_flow.set_exit(),
            KeyCode::Named(NamedKey::Space) | KeyCode::Digit(0) => {
                if self.mode_override.take().is_some() {
                    info!("shading override cleared");
                }
            }
            KeyCode::Named(NamedKey::Right) => self.cycle_mode(1),
            KeyCode::Named(NamedKey::Left) => self.cycle_mode(-1),
            KeyCode::Digit(digit) => {
                if let Some(mode) = ShadingMode::from_index(digit as usize) {
                    info!("shading override: {}", mode.label());
                    self.mode_override = Some(mode);
                }
            }
            _ => {}
        }
    }

    fn cycle_mode(&mut self, step: isize) {
        let modes = ShadingMode::ALL;
        let current = self
            .mode_override
            .and_then(|mode| modes.iter().position(|m| *m == mode))
            .unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(modes.len() as isize) as usize;
        self.mode_override = Some(modes[next]);
        info!("shading override: {}", modes[next].label());
    }

    fn handle_mouse_button(&self, state: ElementState, button: WinitMouseButton) {
        let index = match button {
            WinitMouseButton::Left => 0,
            WinitMouseButton::Right => 1,
            WinitMouseButton::Middle => 2,
            WinitMouseButton::Other(value) => value,
        } as u8;
        let button = capsule_viewer::MouseButton::new(index);
        match state {
            ElementState::Pressed => self.input.set_mouse_button_down(button),
            ElementState::Released => self.input.set_mouse_button_up(button),
        }
    }
}

fn map_keycode(code: winit::event::VirtualKeyCode) -> Option<KeyCode> {
    use winit::event::VirtualKeyCode as Key;
    Some(match code {
        Key::Space => KeyCode::Named(NamedKey::Space),
        Key::Escape => KeyCode::Named(NamedKey::Escape),
        Key::Left => KeyCode::Named(NamedKey::Left),
        Key::Right => KeyCode::Named(NamedKey::Right),
        Key::Up => KeyCode::Named(NamedKey::Up),
        Key::Down => KeyCode::Named(NamedKey::Down),
        Key::Key0 => KeyCode::Digit(0),
        Key::Key1 => KeyCode::Digit(1),
        Key::Key2 => KeyCode::Digit(2),
        Key::Key3 => KeyCode::Digit(3),
        Key::Key4 => KeyCode::Digit(4),
        Key::Key5 => KeyCode::Digit(5),
        Key::Key6 => KeyCode::Digit(6),
        Key::Key7 => KeyCode::Digit(7),
        Key::Key8 => KeyCode::Digit(8),
        Key::Key9 => KeyCode::Digit(9),
        _ => return None,
    })
}

struct CliOptions {
    model: Option<String>,
    materials: Option<String>,
    summary_only: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut model = None;
        let mut materials = None;
        let mut summary_only = false;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--summary-only" => summary_only = true,
                "--materials" => {
                    materials = Some(args.next().ok_or_else(|| {
                        anyhow!("--materials requires a manifest path argument")
                    })?);
                }
                other if other.starts_with("--") => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Usage: capsule-viewer [model.obj] [--materials <manifest.xml>] [--summary-only]"
                    ));
                }
                other => {
                    if model.replace(other.to_string()).is_some() {
                        return Err(anyhow!("only one model path may be given"));
                    }
                }
            }
        }
        Ok(Self {
            model,
            materials,
            summary_only,
        })
    }
}
