use chrono::{DateTime, Utc};
use tracing_subscriber::{EnvFilter, fmt};

#[macro_export]
macro_rules! dlog {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*);
    };
}

/// Initialize colorful logging.
///
/// Default level is INFO.
/// - `-v` => DEBUG
/// - `-vv` => TRACE
/// - `-q` => WARN
/// - `-qq` => ERROR
///
/// `RUST_LOG` overrides everything (e.g. `RUST_LOG=trace`).
pub fn init_logging(verbose: u8, quiet: u8) {
    let net = i16::from(verbose) - i16::from(quiet);
    let level = match net {
        i16::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        2..=i16::MAX => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,trailmark={level}")));

    let show_src = matches!(level, "debug" | "trace");

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_file(show_src)
        .with_line_number(show_src)
        .compact()
        .init();
}

/// Number as typed into the form: no trailing `.0`, no padding.
pub fn format_number(v: f64) -> String {
    v.to_string()
}

/// One decimal place, rounding exact ties away from zero (`2.25` -> `"2.3"`)
/// the way a browser's `toFixed(1)` does. `{:.1}` alone rounds them to even.
pub fn format_fixed1(v: f64) -> String {
    let quarters = v * 4.0;
    let exact_tie = quarters.fract() == 0.0 && quarters % 2.0 != 0.0;
    if !exact_tie {
        return format!("{v:.1}");
    }
    let up = (v.abs() * 10.0).ceil() / 10.0;
    if v < 0.0 {
        format!("-{up:.1}")
    } else {
        format!("{up:.1}")
    }
}

/// Time-derived workout id: the last ten digits of the millisecond timestamp.
pub fn time_id(now: DateTime<Utc>) -> u64 {
    now.timestamp_millis().unsigned_abs() % 10_000_000_000
}

/// Parse `"lat,lng"`.
pub fn parse_coords(s: &str) -> Option<(f64, f64)> {
    let (lat, lng) = s.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let lng = lng.trim().parse::<f64>().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)).then_some((lat, lng))
}
