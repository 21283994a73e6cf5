use crate::types::{Activity, Workout};
use crate::utils::{format_fixed1, format_number};
use std::io::{self, Write};

/// List and form rendering driven by the controller.
pub trait WorkoutView {
    fn render_workout(&mut self, workout: &Workout);
    fn show_form(&mut self);
    fn hide_form(&mut self);
    /// Drop every rendered list row.
    fn clear(&mut self);
}

/// Cells of one list row, in display order: `(icon, value, unit)`.
pub fn row_cells(w: &Workout) -> [(&'static str, String, &'static str); 4] {
    let kind = w.kind();
    let metric = w.metric();
    let last = match w.activity {
        Activity::Running { cadence, .. } => ("🦶🏼", format_number(cadence), "spm"),
        Activity::Cycling { elevation_gain, .. } => ("⛰", format_number(elevation_gain), "m"),
    };
    [
        (kind.icon(), format_number(w.distance), "km"),
        ("⏱", format_number(w.duration), "min"),
        ("⚡️", format_fixed1(metric.value), metric.unit),
        last,
    ]
}

pub fn format_row(w: &Workout) -> String {
    let cells = row_cells(w)
        .iter()
        .map(|(icon, value, unit)| format!("{icon} {value} {unit}"))
        .collect::<Vec<_>>()
        .join("  ");
    format!("[{}] {}\n    {cells}", w.id, w.description)
}

/// Prints list rows to a writer, newest first like the browser list.
pub struct TerminalView<W: Write> {
    out: W,
    rows: Vec<String>,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out,
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn flush(&mut self) -> io::Result<()> {
        if self.rows.is_empty() {
            writeln!(self.out, "No workouts yet.")?;
        }
        for row in self.rows.iter().rev() {
            writeln!(self.out, "{row}")?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> WorkoutView for TerminalView<W> {
    fn render_workout(&mut self, workout: &Workout) {
        self.rows.push(format_row(workout));
    }

    fn show_form(&mut self) {
        tracing::trace!("form shown");
    }

    fn hide_form(&mut self) {
        tracing::trace!("form hidden");
    }

    fn clear(&mut self) {
        self.rows.clear();
    }
}
