//! Session facade, background auto-clicker, and one-shot convenience
//! functions.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::backend;
use crate::error::{Error, Result};
use crate::keyboard::KeyboardInput;
use crate::keycode::Key;
use crate::pointer::{Button, ClickSchedule, PointerInput, SwipeSpeed};

/// Library version, matching the package metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Full input backend: pointer and keyboard synthesis through one
/// connection.
///
/// Implemented automatically for any type providing both capabilities, so
/// custom backends only implement [`PointerInput`] and [`KeyboardInput`].
pub trait Backend: PointerInput + KeyboardInput + Send {}

impl<T: PointerInput + KeyboardInput + Send> Backend for T {}

/// A connected input session.
///
/// Holds one backend connection and reuses it for every gesture, so a
/// script pays the connection and device-registration cost once instead of
/// per call. The one-shot functions in this module ([`click`],
/// [`typewrite`], ...) wrap a fresh `Session` each.
///
/// # Example
///
/// ```no_run
/// use waymation::{Button, Key, Session};
///
/// let mut session = Session::new().expect("no input backend");
/// session.click(250.0, 300.0, Button::Left).unwrap();
/// session.typewrite("hello", std::time::Duration::ZERO).unwrap();
/// session.hotkey(&[Key::ControlLeft, Key::KeyS]).unwrap();
/// ```
pub struct Session {
    backend: Box<dyn Backend>,
}

impl Session {
    /// Connect the default backend for this desktop.
    ///
    /// Tries the Wayland virtual input protocols first and falls back to
    /// uinput; set `WAYMATION_BACKEND=wayland|uinput` to force one. See
    /// the crate docs for the permissions each backend needs.
    pub fn new() -> Result<Self> {
        Ok(Session {
            backend: backend::default_backend()?,
        })
    }

    /// Wrap an already-connected backend.
    ///
    /// This is the seam for custom backends and for dry runs against
    /// [`crate::backend::mock::RecordingBackend`].
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Session { backend }
    }

    /// Move to a position and click the given button there.
    pub fn click(&mut self, x: f64, y: f64, button: Button) -> Result<()> {
        self.backend.click_at(x, y, button)
    }

    /// Drag from start to end with the left button held.
    pub fn swipe(
        &mut self,
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
        speed: SwipeSpeed,
    ) -> Result<()> {
        self.backend
            .swipe_gesture(start_x, start_y, end_x, end_y, speed)
    }

    /// Click repeatedly at the current cursor position, blocking until the
    /// schedule's duration elapses. Use [`AutoClicker`] for a cancellable
    /// background run.
    pub fn auto_click(&mut self, schedule: &ClickSchedule) -> Result<()> {
        let stop = AtomicBool::new(false);
        self.backend.run_auto_click(schedule, &stop)
    }

    /// Type a string, sleeping `interval` between characters.
    pub fn typewrite(&mut self, text: &str, interval: Duration) -> Result<()> {
        self.backend.type_text(text, interval)
    }

    /// Press and release one key.
    pub fn press(&mut self, key: Key) -> Result<()> {
        self.backend.tap_key(key)
    }

    /// Press a key combination in order and release it in reverse order.
    pub fn hotkey(&mut self, keys: &[Key]) -> Result<()> {
        self.backend.chord(keys)
    }

    /// Move the cursor without clicking.
    pub fn move_to(&mut self, x: f64, y: f64) -> Result<()> {
        self.backend.move_to(x, y)
    }

    /// Scroll by whole wheel detents.
    pub fn scroll(&mut self, dx: i32, dy: i32) -> Result<()> {
        self.backend.scroll(dx, dy)
    }
}

/// Background auto-clicker.
///
/// Runs a [`ClickSchedule`] on its own thread so the caller keeps control.
/// The run ends when the schedule's duration elapses, when [`stop`] is
/// called, or when the handle is dropped.
///
/// [`stop`]: AutoClicker::stop
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use waymation::{AutoClicker, ClickSchedule};
///
/// let schedule = ClickSchedule::new().with_duration(Duration::from_secs(60));
/// let clicker = AutoClicker::spawn(schedule).expect("no input backend");
///
/// // ... do other work, then cut the run short:
/// clicker.stop().unwrap();
/// ```
pub struct AutoClicker {
    running: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<Result<()>>>,
}

impl AutoClicker {
    /// Connect the default backend and start clicking on a background
    /// thread. Connection errors surface here, before the thread starts.
    pub fn spawn(schedule: ClickSchedule) -> Result<AutoClicker> {
        Ok(Self::spawn_with(Session::new()?, schedule))
    }

    /// Start clicking through an existing session, taking it over for the
    /// duration of the run.
    pub fn spawn_with(session: Session, schedule: ClickSchedule) -> AutoClicker {
        let running = Arc::new(AtomicBool::new(true));
        // The runner treats a true flag as a cancellation request.
        let stop = Arc::new(AtomicBool::new(false));
        let running_clone = running.clone();
        let stop_clone = stop.clone();

        let thread_handle = thread::spawn(move || {
            let mut session = session;
            let result = session.backend.run_auto_click(&schedule, &stop_clone);
            running_clone.store(false, Ordering::SeqCst);
            result
        });

        AutoClicker {
            running,
            stop,
            thread_handle: Some(thread_handle),
        }
    }

    /// Stop clicking and return the run's outcome.
    pub fn stop(mut self) -> Result<()> {
        self.stop.store(true, Ordering::SeqCst);
        self.join_inner()
    }

    /// Block until the schedule's duration elapses, then return the run's
    /// outcome.
    pub fn wait(mut self) -> Result<()> {
        self.join_inner()
    }

    /// Check if the clicker is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn join_inner(&mut self) -> Result<()> {
        match self.thread_handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| Error::ThreadError("failed to join clicker thread".into()))?,
            None => Ok(()),
        }
    }
}

impl Drop for AutoClicker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        let _ = self.join_inner();
    }
}

/// Move to a position and click the left button there.
///
/// Connects a fresh backend for the single gesture; scripts doing many
/// actions should hold a [`Session`] instead.
///
/// # Example
///
/// ```no_run
/// waymation::click(250.0, 300.0).expect("click failed");
/// ```
pub fn click(x: f64, y: f64) -> Result<()> {
    let mut session = Session::new()?;
    session.click(x, y, Button::default())
}

/// Move to a position and click the given button there.
pub fn click_with(x: f64, y: f64, button: Button) -> Result<()> {
    let mut session = Session::new()?;
    session.click(x, y, button)
}

/// Drag from start to end at normal speed with the left button held.
pub fn swipe(start_x: f64, start_y: f64, end_x: f64, end_y: f64) -> Result<()> {
    let mut session = Session::new()?;
    session.swipe(start_x, start_y, end_x, end_y, SwipeSpeed::default())
}

/// Drag from start to end at the given speed with the left button held.
pub fn swipe_with_speed(
    start_x: f64,
    start_y: f64,
    end_x: f64,
    end_y: f64,
    speed: SwipeSpeed,
) -> Result<()> {
    let mut session = Session::new()?;
    session.swipe(start_x, start_y, end_x, end_y, speed)
}

/// Click repeatedly at the current cursor position, blocking until the
/// schedule's duration elapses.
///
/// # Example
///
/// ```no_run
/// use waymation::ClickSchedule;
///
/// // 3 s to position the cursor, then a click every 100 ms for 10 s.
/// waymation::auto_click(&ClickSchedule::default()).expect("auto-click failed");
/// ```
pub fn auto_click(schedule: &ClickSchedule) -> Result<()> {
    let mut session = Session::new()?;
    session.auto_click(schedule)
}

/// Type a string as fast as the backend allows.
///
/// # Example
///
/// ```no_run
/// waymation::typewrite("Hello!").expect("typing failed");
/// ```
pub fn typewrite(text: &str) -> Result<()> {
    let mut session = Session::new()?;
    session.typewrite(text, Duration::ZERO)
}

/// Type a string, sleeping `interval` between characters.
pub fn typewrite_with_interval(text: &str, interval: Duration) -> Result<()> {
    let mut session = Session::new()?;
    session.typewrite(text, interval)
}

/// Press and release one key.
pub fn press(key: Key) -> Result<()> {
    let mut session = Session::new()?;
    session.press(key)
}

/// Press a key combination in order and release it in reverse order.
///
/// # Example
///
/// ```no_run
/// use waymation::Key;
///
/// waymation::hotkey(&[Key::ControlLeft, Key::KeyS]).expect("hotkey failed");
/// ```
pub fn hotkey(keys: &[Key]) -> Result<()> {
    let mut session = Session::new()?;
    session.hotkey(keys)
}

/// Print a short overview of the library surface to stdout.
pub fn print_usage() {
    println!("waymation {VERSION}");
    println!();
    println!("mouse:");
    println!("    click(x, y)                left-click at a position");
    println!("    click_with(x, y, button)   click any button");
    println!("    swipe(sx, sy, ex, ey)      drag with the left button held");
    println!("    auto_click(&schedule)      repeat clicks on a timing schedule");
    println!("    mouse_position()           query the cursor (Hyprland only)");
    println!();
    println!("keyboard:");
    println!("    typewrite(\"text\")          type a string");
    println!("    press(key)                 tap one key");
    println!("    hotkey(&[keys])            press a chord, release in reverse");
    println!();
    println!("Hold a Session to reuse one backend connection across calls.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{Op, RecordingBackend};

    fn recording_session() -> (Session, std::sync::Arc<std::sync::Mutex<Vec<Op>>>) {
        let backend = RecordingBackend::new();
        let log = backend.log();
        (Session::with_backend(Box::new(backend)), log)
    }

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.2.7");
    }

    #[test]
    fn test_click_forwards_button() {
        let (mut session, log) = recording_session();
        session.click(10.0, 20.0, Button::Right).unwrap();

        let ops = log.lock().unwrap();
        assert_eq!(
            *ops,
            vec![
                Op::MoveTo(10.0, 20.0),
                Op::ButtonPress(Button::Right),
                Op::ButtonRelease(Button::Right),
            ]
        );
    }

    #[test]
    fn test_press_taps_once() {
        let (mut session, log) = recording_session();
        session.press(Key::Escape).unwrap();

        let ops = log.lock().unwrap();
        assert_eq!(
            *ops,
            vec![Op::KeyPress(Key::Escape), Op::KeyRelease(Key::Escape)]
        );
    }

    #[test]
    fn test_hotkey_releases_in_reverse() {
        let (mut session, log) = recording_session();
        session.hotkey(&[Key::ControlLeft, Key::KeyC]).unwrap();

        let ops = log.lock().unwrap();
        assert_eq!(
            *ops,
            vec![
                Op::KeyPress(Key::ControlLeft),
                Op::KeyPress(Key::KeyC),
                Op::KeyRelease(Key::KeyC),
                Op::KeyRelease(Key::ControlLeft),
            ]
        );
    }

    #[test]
    fn test_swipe_brackets_motion_with_left_button() {
        let (mut session, log) = recording_session();
        session.swipe(0.0, 0.0, 30.0, 0.0, SwipeSpeed::Fast).unwrap();

        let ops = log.lock().unwrap();
        assert_eq!(ops[0], Op::MoveTo(0.0, 0.0));
        assert_eq!(ops[1], Op::ButtonPress(Button::Left));
        assert_eq!(*ops.last().unwrap(), Op::ButtonRelease(Button::Left));
        assert_eq!(ops[ops.len() - 2], Op::MoveTo(30.0, 0.0));
    }

    #[test]
    fn test_backend_errors_pass_through() {
        let mut backend = RecordingBackend::new();
        backend.set_fail_always(true);
        let mut session = Session::with_backend(Box::new(backend));

        assert!(matches!(
            session.click(1.0, 1.0, Button::Left),
            Err(Error::InjectFailed(_))
        ));
        assert!(matches!(
            session.typewrite("x", Duration::ZERO),
            Err(Error::InjectFailed(_))
        ));
        assert!(matches!(
            session.scroll(0, -1),
            Err(Error::InjectFailed(_))
        ));
    }

    #[test]
    fn test_auto_click_blocking_clicks_within_window() {
        let (mut session, log) = recording_session();
        let schedule = ClickSchedule::new()
            .with_initial_delay(Duration::ZERO)
            .with_interval(Duration::from_millis(5))
            .with_duration(Duration::from_millis(40));
        session.auto_click(&schedule).unwrap();

        let ops = log.lock().unwrap();
        assert!(ops.contains(&Op::ButtonPress(Button::Left)));
        assert!(ops.contains(&Op::ButtonRelease(Button::Left)));
    }

    #[test]
    fn test_auto_clicker_stop_cuts_run_short() {
        let (session, log) = recording_session();
        let schedule = ClickSchedule::new()
            .with_initial_delay(Duration::ZERO)
            .with_interval(Duration::from_millis(1))
            .with_duration(Duration::from_secs(60));

        let clicker = AutoClicker::spawn_with(session, schedule);
        assert!(clicker.is_running());
        thread::sleep(Duration::from_millis(30));
        clicker.stop().unwrap();

        let ops = log.lock().unwrap();
        assert!(
            ops.contains(&Op::ButtonPress(Button::Left)),
            "no clicks before stop; op log = {ops:?}"
        );
    }

    #[test]
    fn test_auto_clicker_wait_runs_to_completion() {
        let (session, log) = recording_session();
        let schedule = ClickSchedule::new()
            .with_initial_delay(Duration::ZERO)
            .with_interval(Duration::from_millis(5))
            .with_duration(Duration::from_millis(30));

        let clicker = AutoClicker::spawn_with(session, schedule);
        clicker.wait().unwrap();

        let ops = log.lock().unwrap();
        assert!(
            ops.contains(&Op::ButtonPress(Button::Left)),
            "background run performed no clicks; op log = {ops:?}"
        );
        assert!(ops.contains(&Op::ButtonRelease(Button::Left)));
    }

    #[test]
    fn test_auto_clicker_surfaces_backend_error() {
        let mut backend = RecordingBackend::new();
        backend.set_fail_always(true);
        let session = Session::with_backend(Box::new(backend));
        let schedule = ClickSchedule::new()
            .with_initial_delay(Duration::ZERO)
            .with_duration(Duration::from_secs(1));

        let clicker = AutoClicker::spawn_with(session, schedule);
        assert!(matches!(clicker.wait(), Err(Error::InjectFailed(_))));
    }
}
