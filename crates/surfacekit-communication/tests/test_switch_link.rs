use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use surfacekit_communication::{SerialPort, SwitchLink};

// Switch device double: bytes pushed into `rx` appear as pending input.
#[derive(Clone, Default)]
struct SwitchPort {
    rx: Arc<Mutex<Vec<u8>>>,
}

impl SwitchPort {
    fn press(&self) {
        self.rx.lock().extend_from_slice(b"A\n");
    }

    fn pending(&self) -> usize {
        self.rx.lock().len()
    }
}

impl SerialPort for SwitchPort {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut rx = self.rx.lock();
        let n = buf.len().min(rx.len());
        buf[..n].copy_from_slice(&rx[..n]);
        rx.drain(..n);
        Ok(n)
    }

    fn bytes_to_read(&mut self) -> io::Result<usize> {
        Ok(self.rx.lock().len())
    }

    fn name(&self) -> String {
        "switch".to_string()
    }
}

#[test]
fn test_poll_once_consumes_pending_bytes() {
    let port = SwitchPort::default();
    let mut link = SwitchLink::new(port.clone());

    assert!(!link.poll_once().unwrap());

    port.press();
    assert!(link.poll_once().unwrap());
    assert_eq!(port.pending(), 0);
    assert!(!link.poll_once().unwrap());
}

#[test]
fn test_stale_trigger_is_ignored() {
    let port = SwitchPort::default();
    port.press();
    let mut link = SwitchLink::new(port.clone());

    let start = Instant::now();
    assert!(!link.wait_for_trigger(Duration::from_millis(40)).unwrap());
    assert!(start.elapsed() >= Duration::from_millis(40));
    assert_eq!(port.pending(), 0);
}

#[test]
fn test_trigger_during_wait() {
    let port = SwitchPort::default();
    let mut link = SwitchLink::new(port.clone());

    let presser = port.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        presser.press();
    });

    assert!(link.wait_for_trigger(Duration::from_secs(5)).unwrap());
    handle.join().unwrap();
}

#[test]
fn test_zero_timeout_never_triggers() {
    let port = SwitchPort::default();
    let mut link = SwitchLink::new(port);

    assert!(!link.wait_for_trigger(Duration::ZERO).unwrap());
}
