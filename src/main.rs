use log::{error, info, LevelFilter};
use winit::{
  dpi::LogicalSize,
  event::{ElementState, Event, VirtualKeyCode, WindowEvent},
  event_loop::{ControlFlow, EventLoop},
  window::WindowBuilder,
};

use crate::app::App;
use crate::config::Config;
use crate::error::VkQuadResult;
use crate::renderer::FrameOutcome;

mod app;
mod app_timer;
mod config;
mod error;
mod renderer;
mod scene;
mod vk_ctx;
mod vk_utils;

// glslangValidator -V shaders/quad.vert.glsl -o shaders/quad.vert.spv
// glslangValidator -V shaders/quad.frag.glsl -o shaders/quad.frag.spv

fn main() {
  let log_level = if cfg!(debug_assertions) {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  };
  if let Err(err) = simple_logger::SimpleLogger::new()
    .with_level(log_level)
    .init()
  {
    eprintln!("Could not init logger: {}", err);
  }
  info!("-- Start --");

  if let Err(err) = run() {
    error!("{}", err);
    std::process::exit(1);
  }
}

fn run() -> VkQuadResult<()> {
  let config = Config::new();

  // init window
  let event_loop = EventLoop::new();
  let window = WindowBuilder::new()
    .with_title(&config.window_title)
    .with_resizable(true)
    .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
    .build(&event_loop)?;

  // init renderer
  let mut app = Some(App::new(&window, config)?);

  // start event loop
  info!("Starting event loop");
  event_loop.run(move |event, _, control_flow| {
    match event {
      // on clicked 'x'
      Event::WindowEvent {
        event: WindowEvent::CloseRequested,
        ..
      } => {
        *control_flow = ControlFlow::Exit;
      }

      // on keyboard
      Event::WindowEvent {
        event: WindowEvent::KeyboardInput { input, .. },
        ..
      } => {
        if input.state == ElementState::Pressed
          && input.virtual_keycode == Some(VirtualKeyCode::Escape)
        {
          *control_flow = ControlFlow::Exit;
        }
      }

      Event::WindowEvent {
        event: WindowEvent::Resized(_),
        ..
      } => {
        if let Some(app) = &app {
          app.resize_signal().raise();
        }
      }

      Event::MainEventsCleared => {
        if let Some(current) = &mut app {
          match current.draw_frame(&window) {
            // minimized, sleep until the next window event
            Ok(FrameOutcome::Skipped) => *control_flow = ControlFlow::Wait,
            Ok(_) => *control_flow = ControlFlow::Poll,
            Err(err) => {
              error!("Fatal error during frame: {}", err);
              drop(app.take());
              std::process::exit(1);
            }
          }
        }
      }

      // before destroy
      Event::LoopDestroyed => {
        info!("EventLoop is shutting down");
        drop(app.take());
      }

      // default
      _ => (),
    }
  })
}
