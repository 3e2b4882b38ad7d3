use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Vec3};
use glow::HasContext;
use lumen_core::{Camera, GpuBackend, ModelLoader, TextureKind};

use crate::{
    abs::*,
    config::ViewerConfig,
    input::{Request, ViewerState},
};

mod abs;
mod config;
mod input;
mod logging;

macro_rules! shader_program {
    ($name:ident, $gl:expr) => {
        ShaderProgram::from_sources(
            &$gl,
            include_str!(concat!("render/shaders/", stringify!($name), "/vert.glsl")),
            include_str!(concat!("render/shaders/", stringify!($name), "/frag.glsl")),
        )
    };
}

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

fn main() {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match ViewerConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = logging::init(config.log_level()) {
        eprintln!("Failed to set up logging: {}", err);
    }

    if let Err(err) = run(&config) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run(config: &ViewerConfig) -> Result<(), String> {
    let mut app = App::new(&config.window)?;

    unsafe {
        app.gl.enable(glow::DEPTH_TEST);
    }

    let shader_program = shader_program!(model, app.gl)?;

    let backend: Arc<dyn GpuBackend> = Arc::new(GlBackend::new(&app.gl));
    let model = ModelLoader::new(&backend)
        .with_options(config.model.clone())
        .load_or_empty(&config.model_path);
    let has_texture = |kind| model.textures_loaded().iter().any(|t| t.kind == kind);
    let (has_diffuse, has_specular, has_normal) = (
        has_texture(TextureKind::Diffuse),
        has_texture(TextureKind::Specular),
        has_texture(TextureKind::Normal),
    );

    let mut state = ViewerState::new(Camera::from_config(&config.camera));
    app.set_mouse_grab(state.is_grabbed());
    let (mut width, mut height) = app.size();

    let light = &config.light;
    let [r, g, b, a] = config.clear_color;

    'running: loop {
        state.begin_frame(Instant::now());

        let events: Vec<_> = app.event_pump.poll_iter().collect();
        for event in &events {
            match state.handle_event(event) {
                Some(Request::Quit) => break 'running,
                Some(Request::Resize(w, h)) => {
                    unsafe {
                        app.gl.viewport(0, 0, w, h);
                    }
                    width = w.max(1) as u32;
                    height = h.max(1) as u32;
                }
                Some(Request::SetMouseGrab(grabbed)) => app.set_mouse_grab(grabbed),
                None => {}
            }
        }

        state.apply_movement();

        unsafe {
            app.gl.clear_color(r, g, b, a);
            app.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let camera = &state.camera;
        shader_program.use_program();
        shader_program.set_uniform(
            "projection",
            camera.projection_matrix(width as f32 / height.max(1) as f32, NEAR_PLANE, FAR_PLANE),
        );
        shader_program.set_uniform("view", camera.view_matrix());
        shader_program.set_uniform("model", Mat4::IDENTITY);
        shader_program.set_uniform("viewPos", camera.position());
        shader_program.set_uniform("light.position", Vec3::from_array(light.position));
        shader_program.set_uniform("light.ambient", Vec3::from_array(light.ambient));
        shader_program.set_uniform("light.diffuse", Vec3::from_array(light.diffuse));
        shader_program.set_uniform("light.specular", Vec3::from_array(light.specular));
        shader_program.set_uniform("shininess", light.shininess);
        shader_program.set_uniform("hasDiffuse", has_diffuse);
        shader_program.set_uniform("hasSpecular", has_specular);
        shader_program.set_uniform("hasNormal", has_normal);

        model.draw(&shader_program);
        app.window.gl_swap_window();
    }

    Ok(())
}
