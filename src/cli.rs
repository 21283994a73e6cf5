use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_DB: &str = "trailmark.sqlite";

/// Map center used when there is no workout to center on.
pub const DEFAULT_CENTER: (f64, f64) = (48.1173, -1.6778);

#[derive(Parser, Debug)]
#[command(
    name = "trailmark",
    about = "Log running and cycling workouts pinned to map locations"
)]
pub struct Cli {
    /// SQLite file holding the saved workouts.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DB, global = true)]
    pub db: PathBuf,

    /// Keep workouts in memory only; nothing is read or written on disk.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Initial map center as "lat,lng". Defaults to the latest workout.
    #[arg(long, value_name = "LAT,LNG", value_parser = parse_center, global = true)]
    pub center: Option<(f64, f64)>,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Click the map at LAT/LNG and submit a workout there.
    Add {
        #[command(subcommand)]
        workout: AddWorkout,
    },

    /// Show saved workouts, newest first.
    List,

    /// Center the map on a saved workout.
    Focus {
        /// Workout id as shown by `list`.
        id: String,
    },

    /// Delete every saved workout.
    Reset,

    /// Export workout markers as GPX waypoints.
    Markers {
        /// Output file. Writes to stdout when omitted.
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
}

/// Form fields are taken as text and validated by the tracker, so a bad
/// value is reported the same way the form would report it.
#[derive(Subcommand, Debug)]
pub enum AddWorkout {
    Running {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Kilometres.
        #[arg(long, allow_hyphen_values = true)]
        distance: String,
        /// Minutes.
        #[arg(long, allow_hyphen_values = true)]
        duration: String,
        /// Steps per minute.
        #[arg(long, allow_hyphen_values = true)]
        cadence: String,
    },
    Cycling {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Kilometres.
        #[arg(long, allow_hyphen_values = true)]
        distance: String,
        /// Minutes.
        #[arg(long, allow_hyphen_values = true)]
        duration: String,
        /// Metres climbed.
        #[arg(long, allow_hyphen_values = true)]
        elevation: String,
    },
}

fn parse_center(s: &str) -> Result<(f64, f64), String> {
    crate::utils::parse_coords(s).ok_or_else(|| format!("expected \"lat,lng\", got {s:?}"))
}
