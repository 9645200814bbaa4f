//! Layered configuration.
//!
//! [`Settings`] are assembled with `figment` from, lowest priority first:
//!
//! 1. built-in defaults,
//! 2. one config file (TOML, YAML or JSON, chosen by extension),
//! 3. environment variables prefixed `KEEPER_`, with `__` separating nested
//!    keys (`KEEPER_ARCHIVE__MAX_WORKERS=8`).
//!
//! When no file is given, `./settings.{toml,yaml,yml,json}` is tried first,
//! then the same names in the platform config directory.
//!
//! ```toml
//! [log]
//! level = "info"
//! format = "json"
//!
//! [archive]
//! max_workers = 4
//!
//! [[archive.jobs]]
//! source_dir = "/var/log/app"
//! dest_dir = "/backup/app"
//! file_patterns = "*.log,*.out"
//! pattern_separator = ","
//! delete_original = true
//!
//! [transfer]
//! registry = "/var/lib/keeper/processed_files.csv"
//!
//! [[transfer.jobs]]
//! file_pattern = "report_YYYYMMDD.csv"
//! transfer_type = "MOVE"
//! source_dir = "/srv/outgoing"
//! dest_dir = "/srv/inbox"
//! process_once = true
//! notify_template = "INSERT INTO uploads (name, size) VALUES ('FILENAME', FILESIZE)"
//!
//! [notify]
//! database = "sqlite:///var/lib/keeper/uploads.db"
//! ```

pub mod error;
mod settings;

pub use crate::settings::{
    ArchiveSettings, ENV_PREFIX, LogFormat, LogSettings, NotifySettings, Settings, TransferSettings,
};
