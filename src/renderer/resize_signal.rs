use std::sync::atomic::{AtomicBool, Ordering};

/// Raised by the window on resize, consumed by the renderer after present.
/// Several raises before a consume collapse into one.
#[derive(Debug, Default)]
pub struct ResizeSignal(AtomicBool);

impl ResizeSignal {
  pub fn new() -> Self {
    Self(AtomicBool::new(false))
  }

  pub fn raise(&self) {
    self.0.store(true, Ordering::Release);
  }

  /// Returns whether the signal was raised, and clears it.
  pub fn consume(&self) -> bool {
    self.0.swap(false, Ordering::AcqRel)
  }

  #[cfg(test)]
  pub fn is_raised(&self) -> bool {
    self.0.load(Ordering::Acquire)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn consume_clears_flag() {
    let signal = ResizeSignal::new();
    assert!(!signal.consume());

    signal.raise();
    signal.raise();
    assert!(signal.is_raised());
    assert!(signal.consume());
    assert!(!signal.consume());
  }
}
