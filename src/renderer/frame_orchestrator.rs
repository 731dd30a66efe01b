use log::{debug, info, trace};

use ash::vk;

use super::ResizeSignal;
use crate::error::VkQuadResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
  Acquired { image_idx: u32, suboptimal: bool },
  /// Swapchain no longer matches the surface, nothing was acquired
  OutOfDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
  Presented,
  Suboptimal,
  OutOfDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
  /// Image was presented, swapchain is still good
  Presented,
  /// Image was presented, then swapchain was rebuilt
  PresentedAndRebuilt,
  /// Acquire reported out of date. Nothing was submitted, swapchain was rebuilt
  Rebuilt,
  /// Rebuild is pending but the window has no area (minimized)
  Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSlotState {
  Idle,
  Acquiring,
  Recording,
  Submitted,
  Presenting,
}

impl FrameSlotState {
  pub fn can_transition_to(&self, next: FrameSlotState) -> bool {
    use FrameSlotState::*;
    matches!(
      (*self, next),
      (Idle, Acquiring)
        | (Acquiring, Recording)
        | (Acquiring, Idle) // out of date
        | (Recording, Submitted)
        | (Submitted, Presenting)
        | (Presenting, Idle)
    )
  }
}

/// Everything the per-frame protocol needs from the GPU side.
/// Vulkan implementation lives in `VkFrameBackend`.
pub trait FrameBackend {
  /// Block until the slot's previous submission has finished.
  fn wait_for_slot(&mut self, slot: usize) -> VkQuadResult<()>;
  /// Signals the slot's image-acquired semaphore on success.
  fn acquire_image(&mut self, slot: usize) -> VkQuadResult<AcquireOutcome>;
  /// Write per-frame data for the acquired image.
  fn update_uniforms(&mut self, image_idx: u32) -> VkQuadResult<()>;
  /// Resets the slot's fence, then submits the image's command buffer.
  fn submit(&mut self, slot: usize, image_idx: u32) -> VkQuadResult<()>;
  fn present(&mut self, slot: usize, image_idx: u32) -> VkQuadResult<PresentOutcome>;
  /// Current window framebuffer size. Zero when minimized.
  fn window_extent(&self) -> vk::Extent2D;
  /// Wait for GPU idle, drop every swapchain dependent resource, recreate it for `window_extent`.
  fn rebuild_presentation(&mut self, window_extent: vk::Extent2D) -> VkQuadResult<()>;
}

/// Drives acquire -> update -> submit -> present over `frames_in_flight` slots
/// and decides when the swapchain has to be rebuilt.
pub struct FrameOrchestrator {
  current_slot: usize,
  slot_states: Vec<FrameSlotState>,
  rebuild_pending: bool,
  resize_signal: ResizeSignal,
  presented_frames: u64,
}

impl FrameOrchestrator {
  pub fn new(frames_in_flight: usize) -> Self {
    assert!(frames_in_flight > 0, "Need at least one frame in flight");
    Self {
      current_slot: 0,
      slot_states: vec![FrameSlotState::Idle; frames_in_flight],
      rebuild_pending: false,
      resize_signal: ResizeSignal::new(),
      presented_frames: 0,
    }
  }

  pub fn frames_in_flight(&self) -> usize {
    self.slot_states.len()
  }

  #[cfg(test)]
  pub fn current_slot(&self) -> usize {
    self.current_slot
  }

  #[cfg(test)]
  pub fn slot_state(&self, slot: usize) -> FrameSlotState {
    self.slot_states[slot]
  }

  pub fn resize_signal(&self) -> &ResizeSignal {
    &self.resize_signal
  }

  #[cfg(test)]
  pub fn is_rebuild_pending(&self) -> bool {
    self.rebuild_pending
  }

  #[cfg(test)]
  pub fn presented_frames(&self) -> u64 {
    self.presented_frames
  }

  fn set_state(&mut self, slot: usize, next: FrameSlotState) {
    let prev = self.slot_states[slot];
    debug_assert!(
      prev.can_transition_to(next),
      "Invalid frame slot {} transition {:?} -> {:?}",
      slot,
      prev,
      next
    );
    self.slot_states[slot] = next;
  }

  /// Rebuild if the window has area. Otherwise leave it pending for a later frame.
  fn try_rebuild(&mut self, backend: &mut impl FrameBackend) -> VkQuadResult<bool> {
    let extent = backend.window_extent();
    if extent.width == 0 || extent.height == 0 {
      trace!("Window is minimized, swapchain rebuild postponed");
      return Ok(false);
    }

    info!("Rebuilding swapchain for {}x{}", extent.width, extent.height);
    backend.rebuild_presentation(extent)?;
    self.rebuild_pending = false;
    // new swapchain already matches the window
    self.resize_signal.consume();
    Ok(true)
  }

  pub fn draw_frame(&mut self, backend: &mut impl FrameBackend) -> VkQuadResult<FrameOutcome> {
    if self.rebuild_pending && !self.try_rebuild(backend)? {
      return Ok(FrameOutcome::Skipped);
    }

    let slot = self.current_slot;

    // 1. throttle: at most `frames_in_flight` submissions on the GPU
    backend.wait_for_slot(slot)?;

    // 2. acquire
    self.set_state(slot, FrameSlotState::Acquiring);
    let (image_idx, acquired_suboptimal) = match backend.acquire_image(slot)? {
      AcquireOutcome::Acquired {
        image_idx,
        suboptimal,
      } => (image_idx, suboptimal),
      AcquireOutcome::OutOfDate => {
        debug!("Acquire: swapchain out of date");
        self.set_state(slot, FrameSlotState::Idle);
        self.rebuild_pending = true;
        let outcome = if self.try_rebuild(backend)? {
          FrameOutcome::Rebuilt
        } else {
          FrameOutcome::Skipped
        };
        return Ok(outcome);
      }
    };

    // 3. per-frame data
    self.set_state(slot, FrameSlotState::Recording);
    backend.update_uniforms(image_idx)?;

    // 4. submit
    backend.submit(slot, image_idx)?;
    self.set_state(slot, FrameSlotState::Submitted);

    // 5. present
    self.set_state(slot, FrameSlotState::Presenting);
    let presented = backend.present(slot, image_idx)?;
    self.set_state(slot, FrameSlotState::Idle);
    self.presented_frames += 1;

    // 6. next slot
    self.current_slot = (slot + 1) % self.frames_in_flight();

    let resized = self.resize_signal.consume();
    let stale = presented != PresentOutcome::Presented || acquired_suboptimal;
    if !(stale || resized) {
      return Ok(FrameOutcome::Presented);
    }

    debug!(
      "Swapchain needs rebuild after {} frames (present={:?}, acquire_suboptimal={}, resized={})",
      self.presented_frames, presented, acquired_suboptimal, resized
    );
    self.rebuild_pending = true;
    if self.try_rebuild(backend)? {
      Ok(FrameOutcome::PresentedAndRebuilt)
    } else {
      Ok(FrameOutcome::Presented)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::VkQuadError;
  use std::collections::VecDeque;

  #[derive(Debug, Clone, PartialEq, Eq)]
  enum Call {
    Wait(usize),
    Acquire(usize),
    Update(u32),
    Submit(usize, u32),
    Present(usize, u32),
    Rebuild(u32, u32),
  }

  /// Records calls. Models each slot's fence: submit marks the slot busy,
  /// waiting on it marks it done.
  struct MockBackend {
    calls: Vec<Call>,
    acquire_script: VecDeque<AcquireOutcome>,
    present_script: VecDeque<PresentOutcome>,
    window: vk::Extent2D,
    image_count: u32,
    next_image: u32,
    slot_busy: Vec<bool>,
    max_outstanding: usize,
    fail_submit: bool,
  }

  impl MockBackend {
    fn new(frames_in_flight: usize, image_count: u32) -> Self {
      Self {
        calls: Vec::new(),
        acquire_script: VecDeque::new(),
        present_script: VecDeque::new(),
        window: vk::Extent2D {
          width: 800,
          height: 600,
        },
        image_count,
        next_image: 0,
        slot_busy: vec![false; frames_in_flight],
        max_outstanding: 0,
        fail_submit: false,
      }
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
      self.calls.iter().filter(|c| pred(c)).count()
    }
  }

  impl FrameBackend for MockBackend {
    fn wait_for_slot(&mut self, slot: usize) -> VkQuadResult<()> {
      self.calls.push(Call::Wait(slot));
      self.slot_busy[slot] = false;
      Ok(())
    }

    fn acquire_image(&mut self, slot: usize) -> VkQuadResult<AcquireOutcome> {
      self.calls.push(Call::Acquire(slot));
      if let Some(scripted) = self.acquire_script.pop_front() {
        return Ok(scripted);
      }
      let image_idx = self.next_image;
      self.next_image = (self.next_image + 1) % self.image_count;
      Ok(AcquireOutcome::Acquired {
        image_idx,
        suboptimal: false,
      })
    }

    fn update_uniforms(&mut self, image_idx: u32) -> VkQuadResult<()> {
      self.calls.push(Call::Update(image_idx));
      Ok(())
    }

    fn submit(&mut self, slot: usize, image_idx: u32) -> VkQuadResult<()> {
      if self.fail_submit {
        return Err(VkQuadError::Vulkan(vk::Result::ERROR_DEVICE_LOST));
      }
      assert!(!self.slot_busy[slot], "Slot {} reused before its fence", slot);
      self.calls.push(Call::Submit(slot, image_idx));
      self.slot_busy[slot] = true;
      let outstanding = self.slot_busy.iter().filter(|b| **b).count();
      self.max_outstanding = self.max_outstanding.max(outstanding);
      Ok(())
    }

    fn present(&mut self, slot: usize, image_idx: u32) -> VkQuadResult<PresentOutcome> {
      self.calls.push(Call::Present(slot, image_idx));
      Ok(
        self
          .present_script
          .pop_front()
          .unwrap_or(PresentOutcome::Presented),
      )
    }

    fn window_extent(&self) -> vk::Extent2D {
      self.window
    }

    fn rebuild_presentation(&mut self, window_extent: vk::Extent2D) -> VkQuadResult<()> {
      self
        .calls
        .push(Call::Rebuild(window_extent.width, window_extent.height));
      // GPU is idle after rebuild
      self.slot_busy.iter_mut().for_each(|b| *b = false);
      self.next_image = 0;
      Ok(())
    }
  }

  #[test]
  fn steady_state_follows_protocol_order() {
    let mut orchestrator = FrameOrchestrator::new(2);
    let mut backend = MockBackend::new(2, 3);

    let outcome = orchestrator.draw_frame(&mut backend).unwrap();

    assert_eq!(outcome, FrameOutcome::Presented);
    assert_eq!(
      backend.calls,
      vec![
        Call::Wait(0),
        Call::Acquire(0),
        Call::Update(0),
        Call::Submit(0, 0),
        Call::Present(0, 0),
      ]
    );
    assert_eq!(orchestrator.slot_state(0), FrameSlotState::Idle);
    assert_eq!(orchestrator.current_slot(), 1);
  }

  #[test]
  fn slots_are_used_round_robin() {
    let mut orchestrator = FrameOrchestrator::new(2);
    let mut backend = MockBackend::new(2, 3);

    for _ in 0..5 {
      orchestrator.draw_frame(&mut backend).unwrap();
    }

    let submits: Vec<(usize, u32)> = backend
      .calls
      .iter()
      .filter_map(|c| match c {
        Call::Submit(slot, img) => Some((*slot, *img)),
        _ => None,
      })
      .collect();
    assert_eq!(submits, vec![(0, 0), (1, 1), (0, 2), (1, 0), (0, 1)]);
    assert_eq!(orchestrator.presented_frames(), 5);
  }

  #[test]
  fn outstanding_submissions_never_exceed_frames_in_flight() {
    for frames_in_flight in 1..4 {
      let mut orchestrator = FrameOrchestrator::new(frames_in_flight);
      let mut backend = MockBackend::new(frames_in_flight, 3);

      for _ in 0..20 {
        orchestrator.draw_frame(&mut backend).unwrap();
      }
      assert_eq!(backend.max_outstanding, frames_in_flight);
    }
  }

  #[test]
  fn out_of_date_acquire_skips_submit_and_present() {
    let mut orchestrator = FrameOrchestrator::new(2);
    let mut backend = MockBackend::new(2, 3);
    backend.acquire_script.push_back(AcquireOutcome::OutOfDate);

    let outcome = orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(outcome, FrameOutcome::Rebuilt);
    assert_eq!(
      backend.calls,
      vec![Call::Wait(0), Call::Acquire(0), Call::Rebuild(800, 600)]
    );
    assert!(!orchestrator.is_rebuild_pending());
    // slot was not consumed
    assert_eq!(orchestrator.current_slot(), 0);

    // next frame acquires from the rebuilt swapchain
    backend.calls.clear();
    let outcome = orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(outcome, FrameOutcome::Presented);
    assert_eq!(backend.calls[0], Call::Wait(0));
    assert_eq!(backend.calls[1], Call::Acquire(0));
    assert_eq!(backend.count(|c| matches!(c, Call::Submit(..))), 1);
  }

  #[test]
  fn stale_present_triggers_rebuild() {
    for stale in [PresentOutcome::OutOfDate, PresentOutcome::Suboptimal].iter() {
      let mut orchestrator = FrameOrchestrator::new(2);
      let mut backend = MockBackend::new(2, 3);
      backend.present_script.push_back(*stale);

      let outcome = orchestrator.draw_frame(&mut backend).unwrap();
      assert_eq!(outcome, FrameOutcome::PresentedAndRebuilt);
      assert_eq!(backend.calls.last(), Some(&Call::Rebuild(800, 600)));
      assert_eq!(orchestrator.current_slot(), 1);
    }
  }

  #[test]
  fn suboptimal_acquire_still_renders_then_rebuilds() {
    let mut orchestrator = FrameOrchestrator::new(2);
    let mut backend = MockBackend::new(2, 3);
    backend.acquire_script.push_back(AcquireOutcome::Acquired {
      image_idx: 2,
      suboptimal: true,
    });

    let outcome = orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(outcome, FrameOutcome::PresentedAndRebuilt);
    assert_eq!(
      backend.calls,
      vec![
        Call::Wait(0),
        Call::Acquire(0),
        Call::Update(2),
        Call::Submit(0, 2),
        Call::Present(0, 2),
        Call::Rebuild(800, 600),
      ]
    );
  }

  #[test]
  fn resize_signal_rebuilds_after_present_once() {
    let mut orchestrator = FrameOrchestrator::new(2);
    let mut backend = MockBackend::new(2, 3);

    orchestrator.resize_signal().raise();
    backend.window = vk::Extent2D {
      width: 1024,
      height: 768,
    };

    let outcome = orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(outcome, FrameOutcome::PresentedAndRebuilt);
    assert_eq!(backend.calls.last(), Some(&Call::Rebuild(1024, 768)));
    assert!(!orchestrator.resize_signal().is_raised());

    let outcome = orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(outcome, FrameOutcome::Presented);
    assert_eq!(backend.count(|c| matches!(c, Call::Rebuild(..))), 1);
  }

  #[test]
  fn resize_during_out_of_date_acquire_rebuilds_once() {
    let mut orchestrator = FrameOrchestrator::new(2);
    let mut backend = MockBackend::new(2, 3);

    orchestrator.resize_signal().raise();
    backend.acquire_script.push_back(AcquireOutcome::OutOfDate);

    let outcome = orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(outcome, FrameOutcome::Rebuilt);
    assert!(!orchestrator.resize_signal().is_raised());

    // the resize was handled by that rebuild, no second one after present
    let outcome = orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(outcome, FrameOutcome::Presented);
    assert_eq!(backend.count(|c| matches!(c, Call::Rebuild(..))), 1);
  }

  #[test]
  fn resize_while_minimized_survives_until_restore() {
    let mut orchestrator = FrameOrchestrator::new(2);
    let mut backend = MockBackend::new(2, 3);
    backend.acquire_script.push_back(AcquireOutcome::OutOfDate);
    backend.window = vk::Extent2D {
      width: 0,
      height: 0,
    };

    orchestrator.resize_signal().raise();
    let outcome = orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(outcome, FrameOutcome::Skipped);
    assert!(orchestrator.resize_signal().is_raised());

    backend.window = vk::Extent2D {
      width: 640,
      height: 480,
    };
    let outcome = orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(outcome, FrameOutcome::Presented);
    assert!(!orchestrator.resize_signal().is_raised());
    assert_eq!(backend.count(|c| matches!(c, Call::Rebuild(..))), 1);
  }

  #[test]
  fn minimized_window_defers_rebuild() {
    let mut orchestrator = FrameOrchestrator::new(2);
    let mut backend = MockBackend::new(2, 3);
    backend.present_script.push_back(PresentOutcome::OutOfDate);
    backend.window = vk::Extent2D {
      width: 0,
      height: 0,
    };

    // presented, but cannot rebuild yet
    let outcome = orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(outcome, FrameOutcome::Presented);
    assert!(orchestrator.is_rebuild_pending());

    // nothing touches the GPU while minimized
    backend.calls.clear();
    for _ in 0..3 {
      let outcome = orchestrator.draw_frame(&mut backend).unwrap();
      assert_eq!(outcome, FrameOutcome::Skipped);
    }
    assert!(backend.calls.is_empty());

    // restored
    backend.window = vk::Extent2D {
      width: 640,
      height: 480,
    };
    let outcome = orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(outcome, FrameOutcome::Presented);
    assert_eq!(backend.calls[0], Call::Rebuild(640, 480));
    assert_eq!(backend.calls[1], Call::Wait(1));
    assert!(!orchestrator.is_rebuild_pending());
  }

  #[test]
  fn out_of_date_while_minimized_skips() {
    let mut orchestrator = FrameOrchestrator::new(2);
    let mut backend = MockBackend::new(2, 3);
    backend.acquire_script.push_back(AcquireOutcome::OutOfDate);
    backend.window = vk::Extent2D {
      width: 800,
      height: 0,
    };

    let outcome = orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(outcome, FrameOutcome::Skipped);
    assert!(orchestrator.is_rebuild_pending());
    assert_eq!(backend.count(|c| matches!(c, Call::Rebuild(..))), 0);
  }

  #[test]
  fn submit_failure_is_fatal() {
    let mut orchestrator = FrameOrchestrator::new(2);
    let mut backend = MockBackend::new(2, 3);
    backend.fail_submit = true;

    let result = orchestrator.draw_frame(&mut backend);
    assert!(matches!(
      result,
      Err(VkQuadError::Vulkan(vk::Result::ERROR_DEVICE_LOST))
    ));
    assert_eq!(backend.count(|c| matches!(c, Call::Present(..))), 0);
  }

  #[test]
  fn slot_transitions_follow_lifecycle() {
    use FrameSlotState::*;
    let cycle = [Idle, Acquiring, Recording, Submitted, Presenting, Idle];
    for pair in cycle.windows(2) {
      assert!(pair[0].can_transition_to(pair[1]));
    }
    assert!(Acquiring.can_transition_to(Idle));
    assert!(!Idle.can_transition_to(Submitted));
    assert!(!Submitted.can_transition_to(Idle));
    assert!(!Presenting.can_transition_to(Acquiring));
  }
}
