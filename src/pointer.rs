//! Pointer domain types and the pointer capability trait.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Time a button or key is held between press and release.
pub(crate) const HOLD: Duration = Duration::from_millis(10);

/// Cadence of interpolated swipe motion events.
const SWIPE_STEP: Duration = Duration::from_millis(5);

/// A swipe always emits at least this many motion steps.
const MIN_SWIPE_STEPS: usize = 2;

/// Granularity at which cancellable sleeps poll their stop flag.
const STOP_POLL: Duration = Duration::from_millis(25);

/// Mouse buttons addressable by the synthesis API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Button {
    #[default]
    Left,
    Right,
    Middle,
    /// Side button (often "back").
    Side,
    /// Extra button (often "forward").
    Extra,
}

impl Button {
    /// The Linux evdev button code (BTN_LEFT and friends).
    pub fn code(&self) -> u16 {
        match self {
            Button::Left => 0x110,
            Button::Right => 0x111,
            Button::Middle => 0x112,
            Button::Side => 0x113,
            Button::Extra => 0x114,
        }
    }

    /// Resolve a symbolic button name ("left", "right", "middle", "side",
    /// "extra"), case-insensitively.
    pub fn from_name(name: &str) -> Result<Button> {
        match name.to_ascii_lowercase().as_str() {
            "left" => Ok(Button::Left),
            "right" => Ok(Button::Right),
            "middle" => Ok(Button::Middle),
            "side" | "back" => Ok(Button::Side),
            "extra" | "forward" => Ok(Button::Extra),
            _ => Err(Error::UnknownButton(name.to_string())),
        }
    }
}

impl FromStr for Button {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Button::from_name(s)
    }
}

/// How fast a swipe travels between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SwipeSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl SwipeSpeed {
    /// Travel velocity in pixels per second.
    pub fn velocity(&self) -> f64 {
        match self {
            SwipeSpeed::Slow => 400.0,
            SwipeSpeed::Normal => 1200.0,
            SwipeSpeed::Fast => 3000.0,
        }
    }

    /// Resolve a symbolic speed name ("slow", "normal", "fast"),
    /// case-insensitively.
    pub fn from_name(name: &str) -> Result<SwipeSpeed> {
        match name.to_ascii_lowercase().as_str() {
            "slow" => Ok(SwipeSpeed::Slow),
            "normal" => Ok(SwipeSpeed::Normal),
            "fast" => Ok(SwipeSpeed::Fast),
            _ => Err(Error::UnknownSpeed(name.to_string())),
        }
    }
}

impl FromStr for SwipeSpeed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SwipeSpeed::from_name(s)
    }
}

/// Timing plan for repeated clicking at the current cursor position.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickSchedule {
    /// Wait before the first click.
    pub initial_delay: Duration,
    /// Spacing between consecutive clicks.
    pub interval: Duration,
    /// Total clicking window, measured after the initial delay.
    pub duration: Duration,
    /// Button to click.
    pub button: Button,
}

impl Default for ClickSchedule {
    fn default() -> Self {
        ClickSchedule {
            initial_delay: Duration::from_secs(3),
            interval: Duration::from_millis(100),
            duration: Duration::from_secs(10),
            button: Button::Left,
        }
    }
}

impl ClickSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_button(mut self, button: Button) -> Self {
        self.button = button;
        self
    }
}

/// Interpolated motion points for a swipe, excluding the start point and
/// ending exactly at the end point. Step count grows with distance and
/// shrinks with speed; cadence is fixed at [`SWIPE_STEP`].
pub fn plan_swipe(
    start_x: f64,
    start_y: f64,
    end_x: f64,
    end_y: f64,
    speed: SwipeSpeed,
) -> Vec<(f64, f64)> {
    let distance = ((end_x - start_x).powi(2) + (end_y - start_y).powi(2)).sqrt();
    let travel_time = distance / speed.velocity();
    let steps = ((travel_time / SWIPE_STEP.as_secs_f64()).ceil() as usize).max(MIN_SWIPE_STEPS);

    let mut points = Vec::with_capacity(steps);
    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        points.push((start_x + (end_x - start_x) * t, start_y + (end_y - start_y) * t));
    }
    points
}

/// Sleep for `duration`, waking early if `stop` becomes true.
/// Returns false if the sleep was interrupted.
pub(crate) fn sleep_unless_stopped(duration: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(STOP_POLL.min(deadline - now));
    }
}

/// Pointer synthesis capability.
///
/// Backends implement the four primitives; the higher-level gestures are
/// provided as default methods composed from them, so every backend gets
/// identical click/swipe/auto-click behavior.
pub trait PointerInput: Send {
    /// Press a mouse button without releasing it.
    fn press_button(&mut self, button: Button) -> Result<()>;

    /// Release a previously pressed mouse button.
    fn release_button(&mut self, button: Button) -> Result<()>;

    /// Move the cursor to an absolute position in desktop pixels.
    fn move_to(&mut self, x: f64, y: f64) -> Result<()>;

    /// Scroll by whole wheel detents. Positive `dy` scrolls up, positive
    /// `dx` scrolls right.
    fn scroll(&mut self, dx: i32, dy: i32) -> Result<()>;

    /// Move to the given position and click the given button there.
    fn click_at(&mut self, x: f64, y: f64, button: Button) -> Result<()> {
        self.move_to(x, y)?;
        self.press_button(button)?;
        thread::sleep(HOLD);
        self.release_button(button)
    }

    /// Drag from start to end with the left button held, interpolating
    /// motion at the cadence implied by `speed`.
    fn swipe_gesture(
        &mut self,
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
        speed: SwipeSpeed,
    ) -> Result<()> {
        self.move_to(start_x, start_y)?;
        self.press_button(Button::Left)?;
        thread::sleep(HOLD);
        for (x, y) in plan_swipe(start_x, start_y, end_x, end_y, speed) {
            self.move_to(x, y)?;
            thread::sleep(SWIPE_STEP);
        }
        thread::sleep(HOLD);
        self.release_button(Button::Left)
    }

    /// Run a click schedule at the current cursor position until its
    /// duration elapses or `stop` becomes true. A positive duration clicks
    /// at least once unless cancelled during the initial delay.
    /// Cancellation latency is bounded by [`STOP_POLL`].
    fn run_auto_click(&mut self, schedule: &ClickSchedule, stop: &AtomicBool) -> Result<()> {
        log::debug!(
            "auto-click: delay {:?}, interval {:?}, duration {:?}, {:?} button",
            schedule.initial_delay,
            schedule.interval,
            schedule.duration,
            schedule.button
        );
        if !sleep_unless_stopped(schedule.initial_delay, stop) {
            return Ok(());
        }
        if schedule.duration.is_zero() {
            return Ok(());
        }
        let deadline = Instant::now() + schedule.duration;
        loop {
            self.press_button(schedule.button)?;
            thread::sleep(HOLD);
            self.release_button(schedule.button)?;

            if Instant::now() >= deadline {
                return Ok(());
            }
            if !sleep_unless_stopped(schedule.interval, stop) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Ok(());
            }
        }
    }
}
