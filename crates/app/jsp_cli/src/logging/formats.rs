use std::io::Write;

use flexi_logger::{DeferredNow, style};
use log::{Level, Record};

/// `level: message`, colored by level. Debug and trace lines also carry the
/// emitting module.
pub fn cli_format(
    w: &mut dyn Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    let level = record.level();
    let label = level.to_string().to_lowercase();
    if level >= Level::Debug {
        write!(
            w,
            "{} [{}] {}",
            style(level).paint(label),
            record.module_path().unwrap_or("<unnamed>"),
            record.args()
        )
    } else {
        write!(w, "{}: {}", style(level).paint(label), record.args())
    }
}
