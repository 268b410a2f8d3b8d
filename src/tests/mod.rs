
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, OnceLock};

static LOGGER: OnceLock<CapturingLogger> = OnceLock::new();

// Prints through env_logger and keeps every error line for assertions.
struct CapturingLogger {
    inner: env_logger::Logger,
    errors: Mutex<Vec<String>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Error || self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if record.level() <= Level::Error {
            self.errors.lock().unwrap().push(record.args().to_string());
        }
        self.inner.log(record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

fn init_logger() {
    let logger = LOGGER.get_or_init(|| CapturingLogger {
        inner: env_logger::Builder::from_default_env().is_test(true).build(),
        errors: Mutex::new(Vec::new()),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.inner.filter().max(LevelFilter::Error));
    }
}

fn logged_errors() -> Vec<String> {
    LOGGER
        .get()
        .map(|logger| logger.errors.lock().unwrap().clone())
        .unwrap_or_default()
}
