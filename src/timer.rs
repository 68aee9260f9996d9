// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Monotonic timing primitives.

use std::cell::Cell;
use std::time::Instant;

/// Measures elapsed time from a monotonic clock, so wall-clock adjustments
/// never show up in a measurement.
#[derive(Debug, Clone, Copy)]
pub struct ScopedTimer {
  started: Instant,
  stopped: Option<f64>,
}

impl ScopedTimer {
  pub fn start() -> Self {
    Self {
      started: Instant::now(),
      stopped: None,
    }
  }

  /// Fractional seconds since [`start`](Self::start), or the frozen value
  /// once [`stop`](Self::stop) has been called.
  pub fn elapsed(&self) -> f64 {
    self
      .stopped
      .unwrap_or_else(|| self.started.elapsed().as_secs_f64())
  }

  /// Freezes the timer and returns the final reading.
  pub fn stop(&mut self) -> f64 {
    let elapsed = self.elapsed();
    self.stopped = Some(elapsed);
    elapsed
  }

  /// Starts a timer that writes its reading into `slot` when the returned
  /// guard is dropped, including during unwinding.
  pub fn scope(slot: &Cell<Option<f64>>) -> TimerScope<'_> {
    TimerScope {
      timer: ScopedTimer::start(),
      slot,
    }
  }
}

/// Guard returned by [`ScopedTimer::scope`].
#[derive(Debug)]
pub struct TimerScope<'a> {
  timer: ScopedTimer,
  slot: &'a Cell<Option<f64>>,
}

impl TimerScope<'_> {
  pub fn elapsed(&self) -> f64 {
    self.timer.elapsed()
  }
}

impl Drop for TimerScope<'_> {
  fn drop(&mut self) {
    self.slot.set(Some(self.timer.stop()));
  }
}

/// Runs `f` and returns its output with the elapsed seconds. When `f`
/// returns an `Err` the duration is still reported.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, f64) {
  let slot = Cell::new(None);
  let output = {
    let _scope = ScopedTimer::scope(&slot);
    f()
  };
  (output, slot.get().unwrap_or_default())
}
