//! Channel-based cursor sampling for non-blocking consumption.
//!
//! The pull-based [`crate::cursor::positions`] iterator blocks its caller
//! between samples. The constructors here move sampling to a background
//! thread feeding a channel, so consumers poll at their own pace.
//!
//! # Example (Sync)
//!
//! ```no_run
//! use std::time::Duration;
//! use waymation::channel::positions_channel;
//!
//! let (handle, rx) = positions_channel(100, Duration::from_millis(50))
//!     .expect("no cursor source");
//!
//! for (x, y) in rx.iter().take(20) {
//!     println!("cursor at {x}, {y}");
//! }
//!
//! handle.stop().unwrap();
//! ```
//!
//! # Example (Async with Tokio)
//!
//! ```ignore
//! use std::time::Duration;
//! use waymation::channel::positions_async_channel;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (handle, mut rx) = positions_async_channel(100, Duration::from_millis(50))
//!         .expect("no cursor source");
//!
//!     while let Some((x, y)) = rx.recv().await {
//!         println!("cursor at {x}, {y}");
//!     }
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::cursor::{self, PositionSource};
use crate::error::{Error, Result};
use crate::pointer::sleep_unless_stopped;

/// Handle to control a background cursor sampler.
///
/// Sampling stops when [`PositionChannelHandle::stop`] is called, when the
/// handle is dropped, when the receiver is dropped, or when the source
/// fails.
pub struct PositionChannelHandle {
    running: Arc<AtomicBool>,
    // The sampler treats a true flag as a stop request.
    stop: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl PositionChannelHandle {
    /// Stop sampling and wait for the background thread to finish.
    pub fn stop(mut self) -> Result<()> {
        self.stop_inner()
    }

    /// Check if the sampler is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn stop_inner(&mut self) -> Result<()> {
        if self.stop.swap(true, Ordering::SeqCst) {
            return Ok(()); // Already stopped
        }

        if let Some(handle) = self.thread_handle.take() {
            handle
                .join()
                .map_err(|_| Error::ThreadError("failed to join sampler thread".into()))?;
        }

        Ok(())
    }
}

impl Drop for PositionChannelHandle {
    fn drop(&mut self) {
        let _ = self.stop_inner();
    }
}

/// Sample the default cursor source into a bounded channel.
///
/// The sampler takes one sample per `interval`. If the buffer is full the
/// sample is dropped rather than blocking the sampler; if the source fails
/// the sampler logs the failure, stops, and the channel closes.
pub fn positions_channel(
    capacity: usize,
    interval: Duration,
) -> Result<(PositionChannelHandle, Receiver<(f64, f64)>)> {
    let source = cursor::default_source()?;
    Ok(positions_channel_with_source(source, capacity, interval))
}

/// Sample a caller-provided source into a bounded channel.
pub fn positions_channel_with_source(
    mut source: Box<dyn PositionSource>,
    capacity: usize,
    interval: Duration,
) -> (PositionChannelHandle, Receiver<(f64, f64)>) {
    let (sender, receiver) = mpsc::sync_channel(capacity);
    let running = Arc::new(AtomicBool::new(true));
    let stop = Arc::new(AtomicBool::new(false));
    let running_clone = running.clone();
    let stop_clone = stop.clone();

    let thread_handle = thread::spawn(move || {
        while !stop_clone.load(Ordering::SeqCst) {
            match source.position() {
                Ok(sample) => match sender.try_send(sample) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        log::debug!("position channel full, dropping sample");
                    }
                    Err(TrySendError::Disconnected(_)) => break,
                },
                Err(err) => {
                    log::warn!("cursor sampling stopped: {err}");
                    break;
                }
            }
            if !sleep_unless_stopped(interval, &stop_clone) {
                break;
            }
        }
        running_clone.store(false, Ordering::SeqCst);
    });

    let handle = PositionChannelHandle {
        running,
        stop,
        thread_handle: Some(thread_handle),
    };

    (handle, receiver)
}

/// Sample the default cursor source into an unbounded channel.
///
/// Use this when every sample matters, but watch memory if the consumer is
/// slower than the sampling interval.
pub fn positions_unbounded_channel(
    interval: Duration,
) -> Result<(PositionChannelHandle, Receiver<(f64, f64)>)> {
    let source = cursor::default_source()?;
    Ok(positions_unbounded_channel_with_source(source, interval))
}

/// Sample a caller-provided source into an unbounded channel.
pub fn positions_unbounded_channel_with_source(
    mut source: Box<dyn PositionSource>,
    interval: Duration,
) -> (PositionChannelHandle, Receiver<(f64, f64)>) {
    let (sender, receiver) = mpsc::channel();
    let running = Arc::new(AtomicBool::new(true));
    let stop = Arc::new(AtomicBool::new(false));
    let running_clone = running.clone();
    let stop_clone = stop.clone();

    let thread_handle = thread::spawn(move || {
        while !stop_clone.load(Ordering::SeqCst) {
            match source.position() {
                Ok(sample) => {
                    if sender.send(sample).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    log::warn!("cursor sampling stopped: {err}");
                    break;
                }
            }
            if !sleep_unless_stopped(interval, &stop_clone) {
                break;
            }
        }
        running_clone.store(false, Ordering::SeqCst);
    });

    let handle = PositionChannelHandle {
        running,
        stop,
        thread_handle: Some(thread_handle),
    };

    (handle, receiver)
}

// ============================================================================
// Tokio async support (behind feature flag)
// ============================================================================

#[cfg(feature = "tokio")]
pub use tokio_channel::*;

#[cfg(feature = "tokio")]
mod tokio_channel {
    use super::*;
    use tokio::sync::mpsc as tokio_mpsc;
    use tokio::sync::mpsc::error::TrySendError as TokioTrySendError;

    /// Sample the default cursor source into a tokio channel.
    ///
    /// Same semantics as [`positions_channel`], with an async receiver.
    pub fn positions_async_channel(
        capacity: usize,
        interval: Duration,
    ) -> Result<(PositionChannelHandle, tokio_mpsc::Receiver<(f64, f64)>)> {
        let source = cursor::default_source()?;
        Ok(positions_async_channel_with_source(source, capacity, interval))
    }

    /// Sample a caller-provided source into a tokio channel.
    pub fn positions_async_channel_with_source(
        mut source: Box<dyn PositionSource>,
        capacity: usize,
        interval: Duration,
    ) -> (PositionChannelHandle, tokio_mpsc::Receiver<(f64, f64)>) {
        let (sender, receiver) = tokio_mpsc::channel(capacity);
        let running = Arc::new(AtomicBool::new(true));
        let stop = Arc::new(AtomicBool::new(false));
        let running_clone = running.clone();
        let stop_clone = stop.clone();

        let thread_handle = thread::spawn(move || {
            while !stop_clone.load(Ordering::SeqCst) {
                match source.position() {
                    Ok(sample) => match sender.try_send(sample) {
                        Ok(()) => {}
                        Err(TokioTrySendError::Full(_)) => {
                            log::debug!("position channel full, dropping sample");
                        }
                        Err(TokioTrySendError::Closed(_)) => break,
                    },
                    Err(err) => {
                        log::warn!("cursor sampling stopped: {err}");
                        break;
                    }
                }
                if !sleep_unless_stopped(interval, &stop_clone) {
                    break;
                }
            }
            running_clone.store(false, Ordering::SeqCst);
        });

        let handle = PositionChannelHandle {
            running,
            stop,
            thread_handle: Some(thread_handle),
        };

        (handle, receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedSource {
        samples: Vec<(f64, f64)>,
    }

    impl ScriptedSource {
        fn new(mut samples: Vec<(f64, f64)>) -> Self {
            samples.reverse();
            ScriptedSource { samples }
        }
    }

    impl PositionSource for ScriptedSource {
        fn position(&mut self) -> Result<(f64, f64)> {
            self.samples
                .pop()
                .ok_or_else(|| Error::CursorUnavailable("script exhausted".into()))
        }
    }

    struct EndlessSource {
        sample: (f64, f64),
    }

    impl PositionSource for EndlessSource {
        fn position(&mut self) -> Result<(f64, f64)> {
            Ok(self.sample)
        }
    }

    #[test]
    fn test_channel_delivers_samples_then_closes_on_source_error() {
        let source = ScriptedSource::new(vec![(1.0, 2.0), (3.0, 4.0)]);
        let (handle, rx) =
            positions_channel_with_source(Box::new(source), 8, Duration::from_millis(1));

        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), (1.0, 2.0));
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), (3.0, 4.0));
        // The exhausted script errors, the sampler stops, the channel closes.
        assert!(rx.recv_timeout(Duration::from_secs(1)).is_err());
        handle.stop().unwrap();
    }

    #[test]
    fn test_sampler_keeps_delivering_until_stopped() {
        let (handle, rx) = positions_channel_with_source(
            Box::new(EndlessSource { sample: (4.0, 2.0) }),
            8,
            Duration::from_millis(1),
        );

        for _ in 0..3 {
            assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), (4.0, 2.0));
        }
        handle.stop().unwrap();
    }

    #[test]
    fn test_unbounded_channel_delivers_every_sample() {
        let source = ScriptedSource::new(vec![(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        let (handle, rx) =
            positions_unbounded_channel_with_source(Box::new(source), Duration::from_millis(1));

        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), (1.0, 1.0));
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), (2.0, 2.0));
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), (3.0, 3.0));
        assert!(rx.recv_timeout(Duration::from_secs(1)).is_err());
        handle.stop().unwrap();
    }

    #[test]
    fn test_stop_terminates_sampler() {
        let (handle, rx) = positions_channel_with_source(
            Box::new(EndlessSource { sample: (7.0, 7.0) }),
            8,
            Duration::from_millis(5),
        );
        assert!(handle.is_running());
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), (7.0, 7.0));
        handle.stop().unwrap();

        for _ in rx.try_iter() {}
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn test_drop_stops_sampler() {
        let (handle, rx) = positions_channel_with_source(
            Box::new(EndlessSource { sample: (0.0, 0.0) }),
            8,
            Duration::from_millis(5),
        );
        drop(handle);
        for _ in rx.try_iter() {}
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn test_async_channel_delivers_samples() {
        let source = ScriptedSource::new(vec![(5.0, 6.0)]);
        let (handle, mut rx) =
            positions_async_channel_with_source(Box::new(source), 8, Duration::from_millis(1));

        assert_eq!(rx.recv().await, Some((5.0, 6.0)));
        assert_eq!(rx.recv().await, None);
        handle.stop().unwrap();
    }
}
