//! The log4rs backend of [`LogConfiguration`].
//!
//! Records go to stderr so that stdout only carries command results, such as the directories
//! `vgsweep plan` wrote or the figures `vgsweep plot` drew.

use log::Record;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::runtime::ConfigBuilder;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::encode::{Encode, Write};
use log4rs::Config;

use crate::log::{LogConfiguration, ModuleLogConfiguration};

const APPENDER: &str = "stderr";

// ISO 8601 timestamp, color coded level tag, then the emitting module
const LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";

/// Erases the current terminal line, then returns the cursor to its start.
const CLEAR_LINE: &[u8] = b"\x1B[2K\r";

/// Clears the analysis progress bar off the line before a record is written over it.
///
/// The bar is redrawn in place, so a record written while it is shown would otherwise keep the
/// tail of the bar. Outside of a progress run nothing is prepended.
#[derive(Debug)]
struct ProgressLineEncoder {
    inner: Box<dyn Encode>,
    bar_shown: fn() -> bool,
}

impl Encode for ProgressLineEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record) -> anyhow::Result<()> {
        if (self.bar_shown)() {
            w.write_all(CLEAR_LINE)?;
        }
        self.inner.encode(w, record)
    }
}

#[cfg(feature = "progress_bar")]
fn bar_shown() -> bool {
    crate::progress::is_active()
}

#[cfg(not(feature = "progress_bar"))]
fn bar_shown() -> bool {
    false
}

impl From<&ModuleLogConfiguration> for Logger {
    fn from(module_config: &ModuleLogConfiguration) -> Self {
        Logger::builder().build(module_config.module.clone(), module_config.level)
    }
}

impl LogConfiguration {
    /// Installs this configuration as the global log4rs configuration, or replaces the one
    /// installed earlier.
    pub(in crate::log) fn set_config(&mut self) {
        let encoder = ProgressLineEncoder {
            inner: Box::new(PatternEncoder::new(LOG_PATTERN)),
            bar_shown,
        };
        let appender = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(encoder))
            .build();
        let config: ConfigBuilder = self.module_configurations.values().fold(
            Config::builder().appender(Appender::builder().build(APPENDER, Box::new(appender))),
            |config, module_config| config.logger(module_config.into()),
        );

        let root = Root::builder()
            .appender(APPENDER)
            .build(self.global_log_level);
        let config = match config.build(root) {
            Ok(config) => config,
            // The previous configuration, if any, stays in place.
            Err(e) => {
                eprintln!("invalid log configuration: {e}");
                return;
            }
        };

        match self.root_handle {
            Some(ref mut handle) => handle.set_config(config),
            None => match log4rs::init_config(config) {
                Ok(handle) => self.root_handle = Some(handle),
                // Another logger was installed first, e.g. by a test harness.
                Err(e) => eprintln!("failed to install logger: {e}"),
            },
        }
    }
}
