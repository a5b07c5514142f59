use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use surfacekit_communication::{DistanceMode, LinkConfig, MotionLink, MoveTarget, SerialPort};
use surfacekit_core::ProtocolError;

type Responder = Box<dyn FnMut(&str) -> Option<String> + Send>;

struct PortState {
    written: Vec<String>,
    rx: VecDeque<u8>,
    responder: Responder,
    chunk: usize,
}

// Mock controller: every written line is handed to the responder, whose
// reply is queued for reading.
#[derive(Clone)]
struct ScriptedPort {
    state: Arc<Mutex<PortState>>,
}

impl ScriptedPort {
    fn new(responder: impl FnMut(&str) -> Option<String> + Send + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(PortState {
                written: Vec::new(),
                rx: VecDeque::new(),
                responder: Box::new(responder),
                chunk: usize::MAX,
            })),
        }
    }

    fn marlin() -> Self {
        Self::new(|line| {
            if line == "M114" {
                Some("X:10.00 Y:20.00 Z:-0.30 E:0.00 Count X:800 Y:1600 Z:-120\nok\n".to_string())
            } else {
                Some("ok\n".to_string())
            }
        })
    }

    fn with_chunk(self, chunk: usize) -> Self {
        self.state.lock().chunk = chunk;
        self
    }

    fn preload(&self, data: &str) {
        self.state.lock().rx.extend(data.bytes());
    }

    fn written(&self) -> Vec<String> {
        self.state.lock().written.clone()
    }
}

impl SerialPort for ScriptedPort {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        let line = String::from_utf8_lossy(data).trim_end().to_string();
        state.written.push(line.clone());
        if let Some(reply) = (state.responder)(&line) {
            state.rx.extend(reply.bytes());
        }
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        let n = buf.len().min(state.rx.len()).min(state.chunk);
        for slot in buf.iter_mut().take(n) {
            *slot = state.rx.pop_front().unwrap_or_default();
        }
        Ok(n)
    }

    fn bytes_to_read(&mut self) -> io::Result<usize> {
        let state = self.state.lock();
        Ok(state.rx.len().min(state.chunk))
    }

    fn name(&self) -> String {
        "scripted".to_string()
    }
}

fn fast_config() -> LinkConfig {
    LinkConfig {
        ack_timeout: Some(Duration::from_millis(30)),
        poll_interval: Duration::from_millis(1),
        ack_retries: 1,
        retry_backoff: Duration::from_millis(1),
    }
}

#[test]
fn test_home_waits_for_ok() {
    let port = ScriptedPort::marlin();
    let mut link = MotionLink::with_config(port.clone(), fast_config());

    link.home().unwrap();
    assert_eq!(port.written(), vec!["G28"]);
}

#[test]
fn test_relative_move_sends_mode_then_move() {
    let port = ScriptedPort::marlin();
    let mut link = MotionLink::with_config(port.clone(), fast_config());

    link.move_axes(MoveTarget::none().with_z(-0.1), true).unwrap();
    assert_eq!(port.written(), vec!["G91", "G0 Z-0.1"]);
    assert_eq!(link.distance_mode(), Some(DistanceMode::Relative));

    link.move_axes(MoveTarget::none().with_x(5.0).with_z(1.0), false)
        .unwrap();
    assert_eq!(port.written()[2..], ["G90", "G0 X+5 Z+1"]);
    assert_eq!(link.distance_mode(), Some(DistanceMode::Absolute));
}

#[test]
fn test_empty_move_only_switches_mode() {
    let port = ScriptedPort::marlin();
    let mut link = MotionLink::with_config(port.clone(), fast_config());

    link.move_axes(MoveTarget::none(), false).unwrap();
    assert_eq!(port.written(), vec!["G90"]);
}

#[test]
fn test_get_position() {
    let port = ScriptedPort::marlin();
    let mut link = MotionLink::with_config(port.clone(), fast_config());

    assert_eq!(link.get_position().unwrap(), (10.0, 20.0, -0.3));
    assert_eq!(port.written(), vec!["M114"]);
}

#[test]
fn test_position_split_across_reads() {
    let port = ScriptedPort::marlin().with_chunk(3);
    let mut link = MotionLink::with_config(port, fast_config());

    assert_eq!(link.get_position().unwrap(), (10.0, 20.0, -0.3));
}

#[test]
fn test_stale_input_is_discarded() {
    let port = ScriptedPort::marlin();
    port.preload("X:99.00 Y:99.00 Z:99.00\nok\n");
    let mut link = MotionLink::with_config(port, fast_config());

    assert_eq!(link.get_position().unwrap(), (10.0, 20.0, -0.3));
}

#[test]
fn test_set_work_origin_and_go_to_origin() {
    let port = ScriptedPort::marlin();
    let mut link = MotionLink::with_config(port.clone(), fast_config());

    link.set_work_origin().unwrap();
    link.go_to_work_origin().unwrap();
    assert_eq!(port.written(), vec!["G92 X0 Y0 Z0", "G90", "G0 X+0 Y+0 Z+0"]);
}

#[test]
fn test_silent_controller_times_out_after_retries() {
    let port = ScriptedPort::new(|_| None);
    let mut link = MotionLink::with_config(port.clone(), fast_config());

    let err = link.get_position().unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::Timeout { ref command, timeout_ms: 30 } if command == "M114"
    ));
    assert_eq!(port.written(), vec!["M114", "M114"]);
}

#[test]
fn test_relative_move_is_never_resent() {
    let port = ScriptedPort::new(|line| {
        if line.starts_with("G0") {
            None
        } else {
            Some("ok\n".to_string())
        }
    });
    let mut link = MotionLink::with_config(port.clone(), fast_config());

    let err = link
        .move_axes(MoveTarget::none().with_z(-0.1), true)
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Timeout { .. }));
    assert_eq!(port.written(), vec!["G91", "G0 Z-0.1"]);
}

#[test]
fn test_late_ok_is_accepted_on_retry() {
    let mut calls = 0;
    let port = ScriptedPort::new(move |_| {
        calls += 1;
        (calls > 1).then(|| "ok\n".to_string())
    });
    let mut link = MotionLink::with_config(port.clone(), fast_config());

    link.home().unwrap();
    assert_eq!(port.written(), vec!["G28", "G28"]);
}

#[test]
fn test_malformed_position_report() {
    let port = ScriptedPort::new(|_| Some("ok\n".to_string()));
    let mut link = MotionLink::with_config(port, fast_config());

    assert!(matches!(
        link.get_position(),
        Err(ProtocolError::MalformedResponse { .. })
    ));
}
