use crate::client::{Client, NpApi};
use crate::types::PoseSample;
use crate::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

/// Tracks the vendor frame counter across polls.
///
/// The library returns the last frame until the camera produces a new one,
/// so polling faster than the camera yields duplicates.
#[derive(Debug, Default)]
pub struct FrameTracker {
    previous: Option<i16>,
    logged: u64,
    missed: u64,
}

impl FrameTracker {
    /// Record `frame`; returns `true` if it differs from the previous frame.
    pub fn observe(&mut self, frame: i16) -> bool {
        if let Some(previous) = self.previous {
            if previous == frame {
                return false;
            }
            // Counter is 16 bits and wraps.
            let gap = frame.wrapping_sub(previous) as u16 as u64;
            self.missed += gap - 1;
        }
        self.previous = Some(frame);
        self.logged += 1;
        true
    }

    pub fn logged(&self) -> u64 {
        self.logged
    }

    pub fn missed(&self) -> u64 {
        self.missed
    }
}

/// Summary of a finished poll loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollStats {
    pub polls: u64,
    pub logged_frames: u64,
    pub missed_frames: u64,
    pub elapsed: Duration,
}

impl PollStats {
    /// Logged frames per second.
    pub fn rate_hz(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.logged_frames as f64 / secs
        } else {
            0.0
        }
    }
}

/// Cloneable handle that ends a running [`PollLoop`] from any thread.
#[derive(Debug, Clone)]
pub struct StopHandle(Sender<()>);

impl StopHandle {
    pub fn stop(&self) {
        // A pending stop is already queued when the channel is full.
        let _ = self.0.try_send(());
    }
}

/// Fixed-interval poller that forwards each new frame to a callback.
pub struct PollLoop {
    interval: Duration,
    max_polls: Option<u64>,
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
}

impl PollLoop {
    pub fn new(interval: Duration) -> PollLoop {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        PollLoop {
            interval,
            max_polls: None,
            stop_tx,
            stop_rx,
        }
    }

    /// End the loop after `polls` calls to `get_data`.
    pub fn with_max_polls(mut self, polls: u64) -> PollLoop {
        self.max_polls = Some(polls);
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.stop_tx.clone())
    }

    /// Poll until stopped, calling `on_frame` with each new sample and the
    /// time since the loop started.
    ///
    /// A failed poll or callback ends the loop with that error.
    pub fn run<A, F>(&self, client: &mut Client<A>, mut on_frame: F) -> Result<PollStats>
    where
        A: NpApi,
        F: FnMut(&PoseSample, Duration) -> Result<()>,
    {
        let start = Instant::now();
        let mut tracker = FrameTracker::default();
        let mut polls = 0u64;

        log::info!("Polling every {:?}", self.interval);

        loop {
            let sample = client.get_data()?;
            polls += 1;

            if tracker.observe(sample.frame) {
                on_frame(&sample, start.elapsed())?;
            } else {
                log::trace!("Frame {} already seen", sample.frame);
            }

            if self.max_polls.is_some_and(|max| polls >= max) {
                break;
            }

            match self.stop_rx.recv_timeout(self.interval) {
                Ok(()) => {
                    log::info!("Poll loop stopped");
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let stats = PollStats {
            polls,
            logged_frames: tracker.logged(),
            missed_frames: tracker.missed(),
            elapsed: start.elapsed(),
        };
        log::info!(
            "Logged {} frames, missed {}, {:.1}s ({:.0} Hz)",
            stats.logged_frames,
            stats.missed_frames,
            stats.elapsed.as_secs_f64(),
            stats.rate_hz()
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::sim::SimulatedNp;
    use crate::config::Config;
    use crate::protocol::NpResult;
    use crate::window::WindowHandle;
    use crate::TrackIrError;

    fn client(sim: SimulatedNp) -> Client<SimulatedNp> {
        let hwnd = WindowHandle::from_raw(0x10).unwrap();
        Client::start(sim, hwnd, &Config::default()).unwrap()
    }

    #[test]
    fn tracker_skips_duplicates_and_counts_gaps() {
        let mut tracker = FrameTracker::default();
        let emitted: Vec<bool> = [5, 5, 6, 9, 9, 10]
            .iter()
            .map(|&f| tracker.observe(f))
            .collect();
        assert_eq!(emitted, vec![true, false, true, true, false, true]);
        assert_eq!(tracker.logged(), 4);
        assert_eq!(tracker.missed(), 2);
    }

    #[test]
    fn tracker_handles_counter_wrap() {
        let mut tracker = FrameTracker::default();
        tracker.observe(i16::MAX - 1);
        tracker.observe(i16::MIN + 1);
        assert_eq!(tracker.missed(), 2);
    }

    #[test]
    fn loop_emits_only_new_frames() {
        let mut client = client(SimulatedNp::with_frames(&[1, 1, 2, 2, 4, 5]));
        let poller = PollLoop::new(Duration::from_millis(1)).with_max_polls(6);

        let mut frames = Vec::new();
        let stats = poller
            .run(&mut client, |sample, _| {
                frames.push(sample.frame);
                Ok(())
            })
            .unwrap();

        assert_eq!(frames, vec![1, 2, 4, 5]);
        assert_eq!(stats.polls, 6);
        assert_eq!(stats.logged_frames, 4);
        assert_eq!(stats.missed_frames, 1);
    }

    #[test]
    fn stop_handle_ends_loop() {
        let mut client = client(SimulatedNp::with_frames(&[1, 2, 3]));
        let poller = PollLoop::new(Duration::from_secs(60));
        poller.stop_handle().stop();

        let stats = poller.run(&mut client, |_, _| Ok(())).unwrap();
        assert_eq!(stats.polls, 1);
    }

    #[test]
    fn stop_from_callback_thread() {
        let mut client = client(SimulatedNp::with_frames(&[1, 2, 3, 4]));
        let poller = PollLoop::new(Duration::from_millis(1));
        let stop = poller.stop_handle();

        let stats = poller
            .run(&mut client, |sample, _| {
                if sample.frame == 3 {
                    let stop = stop.clone();
                    std::thread::spawn(move || stop.stop()).join().unwrap();
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(stats.logged_frames, 3);
    }

    #[test]
    fn poll_failure_ends_loop() {
        let mut client = client(SimulatedNp::default().fail("NP_GetData", NpResult::NoData));
        let poller = PollLoop::new(Duration::from_millis(1));
        let err = poller.run(&mut client, |_, _| Ok(())).unwrap_err();
        assert_eq!(err.np_code(), Some(NpResult::NoData));
    }

    #[test]
    fn callback_failure_ends_loop() {
        let mut client = client(SimulatedNp::with_frames(&[1, 2]));
        let poller = PollLoop::new(Duration::from_millis(1));
        let err = poller
            .run(&mut client, |_, _| Err(TrackIrError::SessionStopped))
            .unwrap_err();
        assert!(matches!(err, TrackIrError::SessionStopped));
    }

    #[test]
    fn rate_is_zero_without_elapsed_time() {
        let stats = PollStats {
            polls: 0,
            logged_frames: 0,
            missed_frames: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(stats.rate_hz(), 0.0);
    }
}
