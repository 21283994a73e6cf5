#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use trailmark::cli::{self, AddWorkout, Cli, Cmd};
use trailmark::controller::Controller;
use trailmark::gpx::GpxMap;
use trailmark::input::WorkoutForm;
use trailmark::map::MAP_ZOOM;
use trailmark::storage::{KeyValueStore, MemoryStore, SqliteStore};
use trailmark::types::{Coords, WorkoutKind};
use trailmark::utils;
use trailmark::view::{self, TerminalView};

#[macro_use]
extern crate trailmark;

fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    if cli.ephemeral {
        dlog!("store=memory");
        run(&cli, MemoryStore::new())
    } else {
        dlog!("store=sqlite db={}", cli.db.display());
        let store = SqliteStore::open(&cli.db)?;
        run(&cli, store)
    }
}

fn run<S: KeyValueStore>(cli: &Cli, store: S) -> Result<()> {
    let mut app: Controller<S, GpxMap, _> = Controller::new(store, TerminalView::stdout());
    app.restore();

    let center = cli
        .center
        .map(|(lat, lng)| Coords::new(lat, lng))
        .or_else(|| app.workouts().last().map(|w| w.coords))
        .unwrap_or(Coords::new(cli::DEFAULT_CENTER.0, cli::DEFAULT_CENTER.1));
    app.load_map(GpxMap::new(), center);

    match &cli.cmd {
        Cmd::Add { workout } => {
            let (target, form) = match workout {
                AddWorkout::Running {
                    lat,
                    lng,
                    distance,
                    duration,
                    cadence,
                } => (
                    Coords::new(*lat, *lng),
                    WorkoutForm::new(WorkoutKind::Running, distance, duration, cadence),
                ),
                AddWorkout::Cycling {
                    lat,
                    lng,
                    distance,
                    duration,
                    elevation,
                } => (
                    Coords::new(*lat, *lng),
                    WorkoutForm::new(WorkoutKind::Cycling, distance, duration, elevation),
                ),
            };

            app.on_map_click(target);
            let workout = app.submit(&form)?;
            println!("{}", view::format_row(workout));
        }
        Cmd::List => {
            app.view_mut().flush().context("writing workout list")?;
        }
        Cmd::Focus { id } => match app.focus(id) {
            Some(w) => println!(
                "Centered on {} at {} (zoom {MAP_ZOOM})",
                w.description, w.coords
            ),
            None => println!("No workout with id {id}"),
        },
        Cmd::Reset => {
            app.reset_all()?;
            println!("All workouts removed.");
        }
        Cmd::Markers { out } => {
            let map = app.map().context("map is not loaded")?;
            match out {
                Some(path) => map.save_gpx(path)?,
                None => map.write_gpx(io::stdout().lock())?,
            }
        }
    }

    Ok(())
}
