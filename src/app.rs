use log::{info, trace};

use ash::vk;
use winit::window::Window;

use crate::app_timer::AppTimer;
use crate::config::Config;
use crate::error::VkQuadResult;
use crate::renderer::{
  FrameOrchestrator, FrameOutcome, PresentationResources, ResizeSignal, VkFrameBackend,
};
use crate::scene::World;
use crate::vk_ctx::{VkCtx, VkCtxSynchronize};

/// Owns all GPU state. Field order is teardown order,
/// `vk_ctx` has to outlive everything created from it.
pub struct App {
  presentation: Option<PresentationResources>,
  synchronize: VkCtxSynchronize,
  world: World,
  orchestrator: FrameOrchestrator,
  timer: AppTimer,
  config: Config,
  vk_ctx: VkCtx,
}

impl App {
  pub fn new(window: &Window, config: Config) -> VkQuadResult<App> {
    let vk_ctx = VkCtx::new(window, &config.device)?;
    info!("Vulkan init went OK!");

    let mut world = World::new(&vk_ctx, &config)?;
    let presentation = PresentationResources::new(&vk_ctx, &world, &config, window_extent(window));
    let synchronize = VkCtxSynchronize::new(vk_ctx.vk_device(), config.frames_in_flight);
    let (presentation, synchronize) = match (presentation, synchronize) {
      (Ok(p), Ok(s)) => (p, s),
      (Err(err), _) => {
        unsafe { world.destroy(vk_ctx.vk_device(), &vk_ctx.allocator) };
        return Err(err);
      }
      (Ok(mut p), Err(err)) => {
        unsafe {
          p.destroy_uniforms(&vk_ctx.allocator);
          world.destroy(vk_ctx.vk_device(), &vk_ctx.allocator);
        }
        return Err(err.into());
      }
    };
    info!(
      "Scene loaded, {} swapchain images, {} frames in flight",
      presentation.image_count(),
      synchronize.frames_in_flight()
    );

    Ok(App {
      presentation: Some(presentation),
      orchestrator: FrameOrchestrator::new(synchronize.frames_in_flight()),
      synchronize,
      world,
      timer: AppTimer::new(config.fps_refresh_period),
      config,
      vk_ctx,
    })
  }

  pub fn resize_signal(&self) -> &ResizeSignal {
    self.orchestrator.resize_signal()
  }

  pub fn draw_frame(&mut self, window: &Window) -> VkQuadResult<FrameOutcome> {
    let mut backend = VkFrameBackend {
      vk_ctx: &self.vk_ctx,
      world: &self.world,
      config: &self.config,
      synchronize: &self.synchronize,
      presentation: &mut self.presentation,
      window_size: window_extent(window),
      time: self.timer.elapsed(),
    };
    let outcome = self.orchestrator.draw_frame(&mut backend)?;

    match outcome {
      FrameOutcome::Presented | FrameOutcome::PresentedAndRebuilt => {
        if let Some(fps) = self.timer.mark_frame() {
          window.set_title(&self.config.window_title_with_fps(fps));
        }
      }
      FrameOutcome::Rebuilt | FrameOutcome::Skipped => {
        trace!("Frame {} not presented: {:?}", self.timer.frame_idx(), outcome)
      }
    }
    Ok(outcome)
  }
}

impl Drop for App {
  fn drop(&mut self) {
    info!("App::drop()");
    // ignore error, we are going down anyway
    let _ = self.vk_ctx.wait_idle();

    let allocator = &self.vk_ctx.allocator;
    unsafe {
      if let Some(presentation) = &mut self.presentation {
        presentation.destroy_uniforms(allocator);
      }
      self.world.destroy(self.vk_ctx.vk_device(), allocator);
    }
  }
}

fn window_extent(window: &Window) -> vk::Extent2D {
  let size = window.inner_size();
  vk::Extent2D {
    width: size.width,
    height: size.height,
  }
}
