//! Logging setup.

/// Formats one log line as `[time level target] message`.
fn format_line(
    out: fern::FormatCallback,
    message: &std::fmt::Arguments,
    record: &log::Record,
) {
    out.finish(format_args!(
        "[{} {:<5} {}] {}",
        chrono::Local::now().format("%H:%M:%S%.3f"),
        record.level(),
        record.target(),
        message
    ))
}

/// Sends log records at `level` and above to stderr.
pub fn init(level: log::LevelFilter) -> Result<(), String> {
    fern::Dispatch::new()
        .format(format_line)
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .map_err(|e| e.to_string())
}
