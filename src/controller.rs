//! Session controller: owns the workout list and mediates between form input,
//! the map, the list view and persistence.
//!
//! Per pending entry the controller moves `Idle -> AwaitingInput` on a map
//! click. A submit either admits the workout (back to `Idle`) or is rejected
//! and leaves the pending location in place. `cancel` returns to `Idle`.

use crate::dlog;
use crate::error::{Result, TrackerError};
use crate::input::{self, ValidEntry, WorkoutForm};
use crate::map::{MAP_ZOOM, MapCapability, PanOptions, PopupStyle};
use crate::storage::{KeyValueStore, WORKOUTS_KEY};
use crate::types::{Coords, RecordDetail, Workout, WorkoutKind, WorkoutRecord};
use crate::utils::time_id;
use crate::view::WorkoutView;
use anyhow::Context;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryState {
    Idle,
    AwaitingInput { target: Coords },
}

pub struct Controller<S, M, V> {
    workouts: Vec<Workout>,
    state: EntryState,
    store: S,
    map: Option<M>,
    view: V,
    clock: fn() -> DateTime<Utc>,
}

impl<S, M, V> Controller<S, M, V>
where
    S: KeyValueStore,
    M: MapCapability,
    V: WorkoutView,
{
    pub fn new(store: S, view: V) -> Self {
        Self {
            workouts: Vec::new(),
            state: EntryState::Idle,
            store,
            map: None,
            view,
            clock: Utc::now,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub const fn state(&self) -> EntryState {
        self.state
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn view(&self) -> &V {
        &self.view
    }

    pub const fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub const fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    /// Attach a map centred on `center` and replay a marker for every
    /// workout already in the list.
    pub fn load_map(&mut self, mut map: M, center: Coords) {
        map.set_view(center, MAP_ZOOM, PanOptions::INSTANT);
        for w in &self.workouts {
            place_marker(&mut map, w);
        }
        tracing::info!(%center, markers = self.workouts.len(), "map loaded");
        self.map = Some(map);
    }

    pub fn on_map_click(&mut self, target: Coords) {
        dlog!("map_click target={target}");
        self.state = EntryState::AwaitingInput { target };
        self.view.show_form();
    }

    pub fn cancel(&mut self) {
        self.state = EntryState::Idle;
        self.view.hide_form();
    }

    /// Admit the form at the location of the last map click.
    pub fn submit(&mut self, form: &WorkoutForm) -> Result<&Workout> {
        let EntryState::AwaitingInput { target } = self.state else {
            return Err(TrackerError::NoPendingLocation);
        };
        self.admit(form.kind, &form.distance, &form.duration, &form.extra, target)
    }

    /// Validate raw form values and, on success, append, persist and render
    /// the new workout. On failure nothing changes.
    pub fn admit(
        &mut self,
        kind: WorkoutKind,
        distance: &str,
        duration: &str,
        extra: &str,
        target: Coords,
    ) -> Result<&Workout> {
        let entry = input::validate(kind, distance, duration, extra).inspect_err(|e| {
            tracing::warn!(%kind, err = %e, "workout rejected");
        })?;

        let now = (self.clock)();
        let id = self.next_id(now);
        self.workouts.push(build(id, now, target, entry));

        if let Err(e) = self.persist() {
            self.workouts.pop();
            return Err(TrackerError::Storage(e.context("persisting workouts")));
        }

        let idx = self.workouts.len() - 1;
        let workout = &self.workouts[idx];
        if let Some(map) = self.map.as_mut() {
            place_marker(map, workout);
        }
        self.view.render_workout(workout);
        self.view.hide_form();
        self.state = EntryState::Idle;

        tracing::info!(
            id = %workout.id,
            %kind,
            distance = workout.distance,
            duration = workout.duration,
            "workout added"
        );
        Ok(workout)
    }

    /// Replace the list with the persisted one. Absent or unreadable data
    /// leaves the list untouched. Returns the number of workouts restored.
    pub fn restore(&mut self) -> usize {
        let raw = match self.store.load(WORKOUTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                dlog!("restore nothing_stored");
                return 0;
            }
            Err(e) => {
                tracing::warn!(err = %format!("{e:#}"), "could not read stored workouts");
                return 0;
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(err = %e, "stored workouts are not a JSON list; ignoring");
                return 0;
            }
        };

        let total = entries.len();
        let mut restored = Vec::with_capacity(total);
        for (idx, entry) in entries.into_iter().enumerate() {
            let rec = match serde_json::from_value::<WorkoutRecord>(entry) {
                Ok(rec) => rec,
                Err(e) => {
                    tracing::warn!(idx, err = %e, "skipping unreadable stored workout");
                    continue;
                }
            };
            if let Err(e) = check_record(&rec) {
                tracing::warn!(id = %rec.id, err = %e, "skipping stored workout");
                continue;
            }
            restored.push(rec.into_workout());
        }

        self.workouts = restored;
        self.view.clear();
        for w in &self.workouts {
            self.view.render_workout(w);
        }
        if let Some(map) = self.map.as_mut() {
            map.clear_markers();
            for w in &self.workouts {
                place_marker(map, w);
            }
        }

        tracing::info!(restored = self.workouts.len(), stored = total, "workouts restored");
        self.workouts.len()
    }

    /// Pan the map to a workout. Unknown ids are a no-op and yield `None`.
    pub fn focus(&mut self, id: &str) -> Option<&Workout> {
        let Some(workout) = self.workouts.iter().find(|w| same_id(&w.id, id)) else {
            dlog!("focus_unknown id={id}");
            return None;
        };

        if let Some(map) = self.map.as_mut() {
            map.set_view(workout.coords, MAP_ZOOM, PanOptions::SMOOTH);
        }
        Some(workout)
    }

    /// Drop the stored list and start over with an empty state.
    pub fn reset_all(&mut self) -> Result<()> {
        self.store
            .remove(WORKOUTS_KEY)
            .context("clearing stored workouts")
            .map_err(TrackerError::Storage)?;

        let dropped = self.workouts.len();
        self.workouts.clear();
        self.state = EntryState::Idle;
        self.view.hide_form();
        self.view.clear();
        if let Some(map) = self.map.as_mut() {
            map.clear_markers();
        }

        tracing::info!(dropped, "all workouts reset");
        Ok(())
    }

    fn persist(&mut self) -> anyhow::Result<()> {
        let records: Vec<WorkoutRecord> = self.workouts.iter().map(WorkoutRecord::from).collect();
        let json = serde_json::to_string(&records).context("serializing workouts")?;
        self.store.save(WORKOUTS_KEY, &json)
    }

    /// Time-derived id, bumped past any id already in the list.
    fn next_id(&self, now: DateTime<Utc>) -> String {
        let mut n = time_id(now);
        loop {
            let id = format!("{n:010}");
            if !self.workouts.iter().any(|w| w.id == id) {
                return id;
            }
            n = (n + 1) % 10_000_000_000;
        }
    }
}

fn build(id: String, now: DateTime<Utc>, at: Coords, e: ValidEntry) -> Workout {
    match e.kind {
        WorkoutKind::Running => Workout::running(id, now, at, e.distance, e.duration, e.extra),
        WorkoutKind::Cycling => Workout::cycling(id, now, at, e.distance, e.duration, e.extra),
    }
}

fn place_marker<M: MapCapability>(map: &mut M, w: &Workout) {
    map.place_marker(
        w.coords,
        &w.popup_content(),
        &PopupStyle::for_kind(w.kind()),
    );
}

fn check_record(rec: &WorkoutRecord) -> Result<ValidEntry> {
    let extra = match rec.detail {
        RecordDetail::Running { cadence, .. } => cadence,
        RecordDetail::Cycling { elevation_gain, .. } => elevation_gain,
    };
    input::validate_values(rec.kind(), rec.distance, rec.duration, extra)
}

/// Ids compare as numbers when both are numeric, so `"0123"` finds `"123"`.
fn same_id(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    if a == b {
        return true;
    }
    matches!((a.parse::<u64>(), b.parse::<u64>()), (Ok(x), Ok(y)) if x == y)
}
