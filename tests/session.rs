//! End-to-end session against a scripted NP implementation: start, poll to CSV, stop.

use std::time::Duration;
use trackir::csv::CsvWriter;
use trackir::protocol::{NpResult, TirData};
use trackir::{
    Client, Config, DataFields, NpApi, PollLoop, Signature, TimestampMode, TrackIrError,
    WindowHandle,
};

/// Replays a fixed list of frames, then reports NO_DATA.
struct Replay {
    frames: Vec<TirData>,
    cursor: usize,
    transmitting: bool,
    registered: Option<WindowHandle>,
}

impl Replay {
    fn new(frames: &[(i16, f32)]) -> Replay {
        Replay {
            frames: frames
                .iter()
                .map(|&(frame, yaw)| TirData {
                    frame,
                    yaw,
                    ..Default::default()
                })
                .collect(),
            cursor: 0,
            transmitting: false,
            registered: None,
        }
    }
}

fn np_err(call: &'static str, code: NpResult) -> TrackIrError {
    TrackIrError::Np { call, code }
}

impl NpApi for Replay {
    fn get_signature(&mut self) -> trackir::Result<Signature> {
        Ok(Signature {
            dll: "replay".into(),
            app: "replay".into(),
        })
    }

    fn query_version(&mut self) -> trackir::Result<u16> {
        Ok(0x0400)
    }

    fn register_window_handle(&mut self, hwnd: WindowHandle) -> trackir::Result<()> {
        if self.registered.is_some() {
            return Err(np_err("NP_RegisterWindowHandle", NpResult::AlreadyRegistered));
        }
        self.registered = Some(hwnd);
        Ok(())
    }

    fn unregister_window_handle(&mut self) -> trackir::Result<()> {
        self.registered = None;
        Ok(())
    }

    fn register_program_profile_id(&mut self, _id: u16) -> trackir::Result<()> {
        Ok(())
    }

    fn request_data(&mut self, fields: DataFields) -> trackir::Result<()> {
        if fields.is_empty() {
            return Err(np_err("NP_RequestData", NpResult::InvalidArg));
        }
        Ok(())
    }

    fn get_data(&mut self) -> trackir::Result<TirData> {
        if !self.transmitting {
            return Err(np_err("NP_GetData", NpResult::NoData));
        }
        let data = self
            .frames
            .get(self.cursor)
            .copied()
            .ok_or(np_err("NP_GetData", NpResult::NoData))?;
        self.cursor += 1;
        Ok(data)
    }

    fn stop_cursor(&mut self) -> trackir::Result<()> {
        Ok(())
    }

    fn start_cursor(&mut self) -> trackir::Result<()> {
        Ok(())
    }

    fn start_data_transmission(&mut self) -> trackir::Result<()> {
        self.transmitting = true;
        Ok(())
    }

    fn stop_data_transmission(&mut self) -> trackir::Result<()> {
        self.transmitting = false;
        Ok(())
    }

    fn recenter(&mut self) -> trackir::Result<()> {
        Ok(())
    }
}

fn hwnd() -> WindowHandle {
    WindowHandle::parse("0x2f0c").unwrap()
}

#[test]
fn polls_frames_into_csv() {
    let mut replay = Replay::new(&[(10, 0.0), (10, 0.0), (11, -8191.5), (13, 16383.0)]);
    let config = Config {
        timestamp: TimestampMode::ElapsedMillis,
        ..Config::default()
    };

    let mut client = Client::start(&mut replay, hwnd(), &config).unwrap();
    let mut csv = CsvWriter::new(Vec::new(), config.timestamp);
    csv.write_header().unwrap();

    let poller = PollLoop::new(Duration::from_millis(1)).with_max_polls(4);
    let stats = poller
        .run(&mut client, |sample, elapsed| csv.write_sample(sample, elapsed))
        .unwrap();
    client.stop().unwrap();
    drop(client);

    assert_eq!(stats.logged_frames, 3);
    assert_eq!(stats.missed_frames, 1);
    assert!(replay.registered.is_none());
    assert!(!replay.transmitting);

    let text = String::from_utf8(csv.into_inner()).unwrap();
    let rows: Vec<Vec<&str>> = text
        .lines()
        .skip(1)
        .map(|line| line.split(", ").collect())
        .collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][1], "10");
    assert_eq!(rows[1][1], "11");
    assert_eq!(rows[1][4], "90.0");
    assert_eq!(rows[2][4], "-180.0");
}

#[test]
fn exhausted_feed_is_fatal() {
    let mut replay = Replay::new(&[(1, 0.0)]);
    let mut client = Client::start(&mut replay, hwnd(), &Config::default()).unwrap();

    let poller = PollLoop::new(Duration::from_millis(1));
    let err = poller.run(&mut client, |_, _| Ok(())).unwrap_err();
    assert_eq!(err.np_code(), Some(NpResult::NoData));
}

#[test]
fn second_session_needs_first_to_stop() {
    let mut replay = Replay::new(&[]);

    let client = Client::start(&mut replay, hwnd(), &Config::default()).unwrap();
    drop(client);

    // Dropping the first session unregistered the window.
    let client = Client::start(&mut replay, hwnd(), &Config::default());
    assert!(client.is_ok());
}

#[test]
fn empty_field_request_is_rejected_and_cleaned_up() {
    let mut replay = Replay::new(&[]);
    let config = Config {
        data_fields: DataFields::empty(),
        ..Config::default()
    };

    let err = Client::start(&mut replay, hwnd(), &config).err().unwrap();
    assert_eq!(err.np_code(), Some(NpResult::InvalidArg));
    assert!(replay.registered.is_none());
}
