//! Per-frame driver for the trajectory store
//!
//! A [`FrameStepper`] owns the integration parameters and turns one rendered frame into
//! `steps_per_frame` store steps. It also keeps a frames-per-second estimate that changes once per
//! wall-clock second.

use crate::error::SimulationError;
use crate::physics::math::Scalar;
use crate::physics::trajectory::{DirtyRange, TrajectoryStore};
use bevy::platform::time::Instant;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of whole seconds for the FPS counter.
///
/// Only changes of the value matter, so any fixed origin works. [`SystemClock`] counts from its
/// creation rather than from the Unix epoch, which moves the second boundaries but keeps one
/// boundary per elapsed second.
pub trait Clock: Send + Sync {
    fn now_seconds(&self) -> u64;
}

/// Seconds elapsed since the clock was created
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_seconds(&self) -> u64 {
        self.origin.elapsed().as_secs()
    }
}

/// Externally driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    seconds: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn advance(&self, seconds: u64) {
        self.seconds.fetch_add(seconds, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_seconds(&self) -> u64 {
        self.seconds.load(Ordering::Relaxed)
    }
}

/// Counts ticks per wall-clock second.
///
/// The estimate reported during a second is the count of the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FpsCounter {
    frame: u64,
    second: u64,
    accumulated: u32,
    fps: u32,
}

impl FpsCounter {
    fn starting_at(second: u64) -> Self {
        Self {
            second,
            ..Self::default()
        }
    }

    pub fn record(&mut self, now: u64) {
        self.frame += 1;
        if now != self.second {
            self.fps = self.accumulated;
            self.accumulated = 1;
            self.second = now;
        } else {
            self.accumulated += 1;
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Ticks recorded since creation
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Integration parameters applied on each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    pub step_size: Scalar,
    pub steps_per_frame: usize,
    pub paused: bool,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            step_size: 0.005,
            steps_per_frame: 6,
            paused: false,
        }
    }
}

impl StepParams {
    pub fn validate(&self) -> Result<(), SimulationError> {
        validate_step_size(self.step_size)?;
        if self.steps_per_frame == 0 {
            return Err(SimulationError::ZeroSubSteps);
        }
        Ok(())
    }
}

fn validate_step_size(step_size: Scalar) -> Result<(), SimulationError> {
    if step_size.is_finite() && step_size > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidStepSize(step_size))
    }
}

pub struct FrameStepper<C: Clock = SystemClock> {
    params: StepParams,
    clock: C,
    counter: FpsCounter,
}

impl FrameStepper<SystemClock> {
    pub fn new(params: StepParams) -> Result<Self, SimulationError> {
        Self::with_clock(params, SystemClock::default())
    }
}

impl<C: Clock> FrameStepper<C> {
    pub fn with_clock(params: StepParams, clock: C) -> Result<Self, SimulationError> {
        params.validate()?;
        let counter = FpsCounter::starting_at(clock.now_seconds());
        Ok(Self {
            params,
            clock,
            counter,
        })
    }

    /// Run one frame of integration.
    ///
    /// Returns the slots written this frame, or `None` while paused. The FPS counter advances
    /// either way.
    pub fn tick(
        &mut self,
        store: &mut TrajectoryStore,
    ) -> Result<Option<DirtyRange>, SimulationError> {
        self.counter.record(self.clock.now_seconds());

        if self.params.paused {
            return Ok(None);
        }

        store
            .step_many(self.params.step_size, self.params.steps_per_frame)
            .map(Some)
    }

    pub fn params(&self) -> StepParams {
        self.params
    }

    pub fn step_size(&self) -> Scalar {
        self.params.step_size
    }

    pub fn set_step_size(&mut self, step_size: Scalar) -> Result<(), SimulationError> {
        validate_step_size(step_size)?;
        self.params.step_size = step_size;
        Ok(())
    }

    pub fn steps_per_frame(&self) -> usize {
        self.params.steps_per_frame
    }

    pub fn set_steps_per_frame(&mut self, steps: usize) -> Result<(), SimulationError> {
        if steps == 0 {
            return Err(SimulationError::ZeroSubSteps);
        }
        self.params.steps_per_frame = steps;
        Ok(())
    }

    pub fn paused(&self) -> bool {
        self.params.paused
    }

    pub fn toggle_paused(&mut self) -> bool {
        self.params.paused = !self.params.paused;
        self.params.paused
    }

    pub fn fps(&self) -> u32 {
        self.counter.fps()
    }

    pub fn frame(&self) -> u64 {
        self.counter.frame()
    }
}
