use crate::types::{Coords, WorkoutKind};

/// Zoom used for the initial view and when focusing a workout.
pub const MAP_ZOOM: u8 = 13;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupStyle {
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
    pub class_name: String,
}

impl PopupStyle {
    /// Sticky popup styled per workout kind.
    pub fn for_kind(kind: WorkoutKind) -> Self {
        Self {
            max_width: 250,
            min_width: 100,
            auto_close: false,
            close_on_click: false,
            class_name: format!("{kind}-popup"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanOptions {
    pub animate: bool,
    pub duration_secs: f64,
}

impl PanOptions {
    pub const INSTANT: Self = Self {
        animate: false,
        duration_secs: 0.0,
    };

    pub const SMOOTH: Self = Self {
        animate: true,
        duration_secs: 1.0,
    };
}

/// Operations the controller needs from an interactive map.
///
/// Clicks flow the other way: the host forwards them to
/// [`crate::controller::Controller::on_map_click`].
pub trait MapCapability {
    fn set_view(&mut self, center: Coords, zoom: u8, pan: PanOptions);

    /// Add a marker with its popup opened.
    fn place_marker(&mut self, at: Coords, popup_content: &str, style: &PopupStyle);

    fn clear_markers(&mut self);
}
