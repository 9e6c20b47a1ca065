//! # Serial Transport
//!
//! Direct delivery to a serial/USB thermal printer through its device
//! node, bypassing any spooler.
//!
//! ## Device Configuration
//!
//! The port is opened write-only and configured for raw binary output at
//! the fixed receipt-printer baud rate (9600):
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR,
//!   IGNCR, ICRNL disabled
//! - **No flow control**: IXON/IXOFF/IXANY disabled — 0x11 (XON) and
//!   0x13 (XOFF) are legal bytes in a print job
//! - **No output processing**: OPOST disabled (no CR/LF translation)
//! - **8N1**: CS8, no parity
//! - **Non-canonical, no echo**
//!
//! ## Exclusive Access
//!
//! `TIOCEXCL` is requested on open so a second process cannot share the
//! port mid-job. If another process already holds the port, `connect()`
//! fails with [`ConnectionError::Busy`]; callers decide whether to retry.
//!
//! ## Chunked Writes
//!
//! Jobs are written in small chunks with a short pause between them so
//! the printer's input buffer is never overrun at 9600 baud.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::{ConnectionState, PrinterTransport};
use crate::error::{ConnectionError, TransmissionError};

/// Chunk size for writes (bytes).
const CHUNK_SIZE: usize = 256;

/// Delay between chunks (milliseconds).
const CHUNK_DELAY_MS: u64 = 5;

/// Transport via direct exclusive access to a serial device.
pub struct SerialTransport {
    device: String,
    state: ConnectionState,
    file: Option<Arc<File>>,
}

impl SerialTransport {
    /// Create an unconnected serial transport. No I/O happens here.
    pub fn new(device: String) -> Self {
        Self {
            device,
            state: ConnectionState::Disconnected,
            file: None,
        }
    }
}

#[async_trait::async_trait]
impl PrinterTransport for SerialTransport {
    fn is_active(&self) -> bool {
        matches!(
            self.state,
            ConnectionState::Connected | ConnectionState::Sending
        ) && self.file.is_some()
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    async fn connect(&mut self) -> Result<(), ConnectionError> {
        if self.state == ConnectionState::Closed {
            return Err(ConnectionError::Closed);
        }
        if self.is_active() {
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        debug!(device = %self.device, "opening serial port");

        let device = self.device.clone();
        let opened = tokio::task::spawn_blocking(move || open_port(&device))
            .await
            .map_err(|e| ConnectionError::Device {
                device: self.device.clone(),
                reason: format!("open task failed: {}", e),
            })
            .and_then(|r| r);

        match opened {
            Ok(file) => {
                self.file = Some(Arc::new(file));
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                Err(e)
            }
        }
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<(), TransmissionError> {
        if self.state == ConnectionState::Closed {
            return Err(ConnectionError::Closed.into());
        }
        if !self.is_active() {
            return Err(ConnectionError::NotConnected.into());
        }

        self.state = ConnectionState::Sending;
        let file = match self.file.clone() {
            Some(f) => f,
            None => return Err(ConnectionError::NotConnected.into()),
        };
        let data = bytes.to_vec();

        let written = tokio::task::spawn_blocking(move || write_chunked(&file, &data))
            .await
            .map_err(|e| TransmissionError::WriteFailed(format!("write task failed: {}", e)))
            .and_then(|r| r.map_err(|e| TransmissionError::WriteFailed(e.to_string())));

        match written {
            Ok(()) => {
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Err(e) => {
                warn!(device = %self.device, error = %e, "serial send failed");
                self.file = None;
                self.state = ConnectionState::Disconnected;
                Err(e)
            }
        }
    }

    async fn close(&mut self) {
        // Dropping the handle releases TIOCEXCL.
        self.file = None;
        self.state = ConnectionState::Closed;
    }

    fn force_disconnect(&mut self) {
        if self.state != ConnectionState::Closed {
            self.file = None;
            self.state = ConnectionState::Disconnected;
        }
    }
}

/// Open the device, claim exclusive access and configure raw 9600-8N1.
fn open_port(device: &str) -> Result<File, ConnectionError> {
    let file = OpenOptions::new().write(true).open(device).map_err(|e| {
        match e.kind() {
            io::ErrorKind::PermissionDenied => ConnectionError::PermissionDenied(device.to_string()),
            _ if e.raw_os_error() == Some(libc::EBUSY) => ConnectionError::Busy(device.to_string()),
            _ => ConnectionError::Device {
                device: device.to_string(),
                reason: e.to_string(),
            },
        }
    })?;

    let fd = file.as_raw_fd();

    // Exclusive access: a second open() by another process gets EBUSY.
    let result = unsafe { libc::ioctl(fd, libc::TIOCEXCL) };
    if result != 0 {
        let e = io::Error::last_os_error();
        return Err(if e.raw_os_error() == Some(libc::EBUSY) {
            ConnectionError::Busy(device.to_string())
        } else {
            ConnectionError::Device {
                device: device.to_string(),
                reason: format!("TIOCEXCL failed: {}", e),
            }
        });
    }

    configure_raw_9600(fd).map_err(|reason| ConnectionError::Device {
        device: device.to_string(),
        reason,
    })?;

    Ok(file)
}

/// Configure a serial fd for raw binary output at 9600 baud.
fn configure_raw_9600(fd: i32) -> Result<(), String> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(format!("tcgetattr failed: {}", io::Error::last_os_error()));
    }
    let mut termios = unsafe { termios.assume_init() };

    // Input flags: no processing, no software flow control.
    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    // Output flags: no post-processing.
    termios.c_oflag &= !libc::OPOST;

    // Local flags: no echo, no canonical mode, no signals.
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    // Control flags: 8 data bits, no parity, receiver on, ignore modem lines.
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8 | libc::CLOCAL | libc::CREAD;

    unsafe {
        libc::cfsetispeed(&mut termios, libc::B9600);
        libc::cfsetospeed(&mut termios, libc::B9600);
    }

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(format!("tcsetattr failed: {}", io::Error::last_os_error()));
    }

    Ok(())
}

/// Write a job in chunks with a pacing delay, then flush.
fn write_chunked(file: &File, data: &[u8]) -> io::Result<()> {
    let mut handle = file;
    for chunk in data.chunks(CHUNK_SIZE) {
        handle.write_all(chunk)?;
        thread::sleep(Duration::from_millis(CHUNK_DELAY_MS));
    }
    handle.flush()
}
