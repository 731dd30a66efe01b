use std::time::Instant;

pub type FrameIdx = u64;

/// Time since start (fed to the shaders) and a frames-per-second counter
/// refreshed every `fps_refresh_period` seconds.
pub struct AppTimer {
  frame_idx: FrameIdx,
  start: Instant,
  fps_refresh_period: f32,
  fps_window_start: Instant,
  fps_window_frames: u32,
  fps: u32,
}

impl AppTimer {
  pub fn new(fps_refresh_period: f32) -> Self {
    Self::new_at(Instant::now(), fps_refresh_period)
  }

  pub fn new_at(start: Instant, fps_refresh_period: f32) -> Self {
    Self {
      frame_idx: 0,
      start,
      fps_refresh_period,
      fps_window_start: start,
      fps_window_frames: 0,
      fps: 0,
    }
  }

  pub fn frame_idx(&self) -> FrameIdx {
    self.frame_idx
  }

  /// Last computed value, 0 until the first refresh period passes
  #[cfg(test)]
  pub fn fps(&self) -> u32 {
    self.fps
  }

  /// In seconds
  pub fn elapsed(&self) -> f32 {
    self.elapsed_at(Instant::now())
  }

  pub fn elapsed_at(&self, now: Instant) -> f32 {
    now.saturating_duration_since(self.start).as_secs_f32()
  }

  /// Count a presented frame. Returns new fps value when the refresh period has passed.
  pub fn mark_frame(&mut self) -> Option<u32> {
    self.mark_frame_at(Instant::now())
  }

  pub fn mark_frame_at(&mut self, now: Instant) -> Option<u32> {
    self.inc_frame_idx();
    self.fps_window_frames += 1;

    let window_secs = now
      .saturating_duration_since(self.fps_window_start)
      .as_secs_f32();
    if window_secs < self.fps_refresh_period {
      return None;
    }

    self.fps = (self.fps_window_frames as f32 / window_secs).round() as u32;
    self.fps_window_start = now;
    self.fps_window_frames = 0;
    Some(self.fps)
  }

  fn inc_frame_idx(&mut self) {
    match self.frame_idx.checked_add(1) {
      Some(e) => self.frame_idx = e,
      _ => panic!("Integer overflow in AppTimer.inc_frame_idx(). How long did the app run?!"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[test]
  fn fps_is_reported_once_per_period() {
    let start = Instant::now();
    let mut timer = AppTimer::new_at(start, 0.25);

    // 30 frames, 10ms apart
    let mut reported = Vec::new();
    for i in 1..=30 {
      if let Some(fps) = timer.mark_frame_at(start + Duration::from_millis(i * 10)) {
        reported.push((i, fps));
      }
    }

    assert_eq!(reported, vec![(25, 100)]);
    assert_eq!(timer.fps(), 100);
    assert_eq!(timer.frame_idx(), 30);
  }

  #[test]
  fn counter_restarts_after_refresh() {
    let start = Instant::now();
    let mut timer = AppTimer::new_at(start, 0.5);

    assert_eq!(timer.mark_frame_at(start + Duration::from_millis(500)), Some(2));
    assert_eq!(timer.mark_frame_at(start + Duration::from_millis(600)), None);
    assert_eq!(timer.mark_frame_at(start + Duration::from_millis(1000)), Some(4));
  }

  #[test]
  fn elapsed_is_seconds_since_start() {
    let start = Instant::now();
    let timer = AppTimer::new_at(start, 0.3);

    assert_eq!(timer.fps(), 0);
    let elapsed = timer.elapsed_at(start + Duration::from_millis(1500));
    assert!((elapsed - 1.5).abs() < 1e-4);
  }
}
