//! # Configuration
//!
//! Everything the pipeline takes from the outside world rather than from
//! code: which printer to talk to, what the receipt says, and how long a
//! send may take. Loaded from a JSON file; every field has a default so a
//! missing or partial config still yields a working setup.
//!
//! Receipt wording is configuration, not logic — the defaults reproduce
//! the shop's bilingual layout, and any deployment can override them
//! without touching the composer.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::protocol::Dialect;

/// Default bridge endpoint: the local print-spool agent's websocket.
pub const DEFAULT_BRIDGE_URL: &str = "ws://127.0.0.1:8182";

/// Serial ports are opened at a fixed baud rate.
pub const SERIAL_BAUD: u32 = 9600;

fn default_bridge_url() -> String {
    DEFAULT_BRIDGE_URL.to_string()
}

/// Which physical printer/port to use, and over which delivery path.
///
/// Supplied by configuration, never derived from a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrinterTarget {
    /// Deliver via the local print-spool agent over a persistent socket.
    Bridge {
        /// Agent endpoint URL.
        #[serde(default = "default_bridge_url")]
        url: String,
        /// Name of the system-registered printer the agent should use.
        printer: String,
    },
    /// Deliver via direct exclusive access to a serial/USB device.
    Serial {
        /// Platform device path or port name (e.g. "/dev/ttyUSB0").
        device: String,
    },
}

impl PrinterTarget {
    /// Short kind tag, for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bridge { .. } => "bridge",
            Self::Serial { .. } => "serial",
        }
    }

    /// The identifier a human would use to pick out the port/printer.
    pub fn identifier(&self) -> &str {
        match self {
            Self::Bridge { printer, .. } => printer,
            Self::Serial { device } => device,
        }
    }
}

impl Default for PrinterTarget {
    fn default() -> Self {
        Self::Bridge {
            url: default_bridge_url(),
            printer: "Thermal Receipt Printer".to_string(),
        }
    }
}

/// Fixed receipt layout text. All strings, no logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptLayout {
    /// Shop name, printed double-size and centered.
    pub shop_name: String,
    /// Lines under the shop name (subtitle, shop phone, ...).
    pub header_lines: Vec<String>,
    /// Label in front of the customer name.
    pub name_label: String,
    /// Label in front of the customer phone number.
    pub phone_label: String,
    /// Label in front of the price.
    pub price_label: String,
    /// Suffix appended to the rendered price (currency marker).
    pub currency_suffix: String,
    /// Centered closing message lines.
    pub closing_lines: Vec<String>,
    /// Width of the divider rule, in characters.
    pub divider_width: usize,
}

impl Default for ReceiptLayout {
    fn default() -> Self {
        Self {
            shop_name: "CMS".to_string(),
            header_lines: vec![
                "Computer & Mobile Service".to_string(),
                "+389 70 402 386".to_string(),
            ],
            name_label: "Emri/Ime".to_string(),
            phone_label: "Tel".to_string(),
            price_label: "Çmimi/Cena".to_string(),
            currency_suffix: " den.".to_string(),
            closing_lines: vec![
                "Për servisimin do informoheni me SMS".to_string(),
                "Za servisot ke bidete izvesteni so SMS".to_string(),
                "Ju Faleminderit / Vi Blagodarime".to_string(),
            ],
            divider_width: 32,
        }
    }
}

impl ReceiptLayout {
    /// The divider rule line.
    pub fn divider(&self) -> String {
        "-".repeat(self.divider_width)
    }
}

/// Top-level configuration for the print pipeline and CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    pub target: PrinterTarget,
    pub layout: ReceiptLayout,
    /// Wire format. ESC/POS is the only canonical dialect.
    pub dialect: Dialect,
    /// Caller-imposed send timeout in milliseconds. `None` waits forever.
    pub send_timeout_ms: Option<u64>,
    /// Where the CLI's JSON-file record store lives.
    pub store_path: PathBuf,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            target: PrinterTarget::default(),
            layout: ReceiptLayout::default(),
            dialect: Dialect::EscPos,
            send_timeout_ms: Some(10_000),
            store_path: PathBuf::from("servis-records.json"),
        }
    }
}

impl PrintConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Load from a file if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
