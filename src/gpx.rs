use crate::map::{MapCapability, PanOptions, PopupStyle};
use crate::types::Coords;
use anyhow::{Context, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub at: Coords,
    pub content: String,
    pub style: PopupStyle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub center: Coords,
    pub zoom: u8,
    pub pan: PanOptions,
}

/// Headless map: remembers the view and the markers placed on it, and can
/// export the markers as GPX waypoints.
#[derive(Debug, Default, Clone)]
pub struct GpxMap {
    view: Option<View>,
    markers: Vec<Marker>,
}

impl GpxMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn view(&self) -> Option<View> {
        self.view
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn write_gpx<W: Write>(&self, out: W) -> Result<()> {
        let mut xml = Writer::new_with_indent(out, b' ', 2);

        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("gpx");
        root.push_attribute(("version", "1.1"));
        root.push_attribute(("creator", "trailmark"));
        root.push_attribute(("xmlns", "http://www.topografix.com/GPX/1/1"));
        xml.write_event(Event::Start(root))?;

        for m in &self.markers {
            let lat = m.at.lat.to_string();
            let lon = m.at.lng.to_string();
            let mut wpt = BytesStart::new("wpt");
            wpt.push_attribute(("lat", lat.as_str()));
            wpt.push_attribute(("lon", lon.as_str()));
            xml.write_event(Event::Start(wpt))?;

            xml.write_event(Event::Start(BytesStart::new("name")))?;
            xml.write_event(Event::Text(BytesText::new(&m.content)))?;
            xml.write_event(Event::End(BytesEnd::new("name")))?;

            xml.write_event(Event::Start(BytesStart::new("type")))?;
            xml.write_event(Event::Text(BytesText::new(&m.style.class_name)))?;
            xml.write_event(Event::End(BytesEnd::new("type")))?;

            xml.write_event(Event::End(BytesEnd::new("wpt")))?;
        }

        xml.write_event(Event::End(BytesEnd::new("gpx")))?;
        xml.into_inner().write_all(b"\n")?;
        Ok(())
    }

    pub fn save_gpx(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        self.write_gpx(&mut buf)?;
        fs::write(path, buf).with_context(|| format!("writing GPX: {}", path.display()))?;
        tracing::info!(path = %path.display(), markers = self.markers.len(), "gpx written");
        Ok(())
    }
}

impl MapCapability for GpxMap {
    fn set_view(&mut self, center: Coords, zoom: u8, pan: PanOptions) {
        tracing::debug!(%center, zoom, animate = pan.animate, "set view");
        self.view = Some(View { center, zoom, pan });
    }

    fn place_marker(&mut self, at: Coords, popup_content: &str, style: &PopupStyle) {
        tracing::debug!(%at, class = %style.class_name, "place marker");
        self.markers.push(Marker {
            at,
            content: popup_content.to_string(),
            style: style.clone(),
        });
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WorkoutKind;
    use quick_xml::reader::Reader;

    /// Pull `(lat, lon, name)` back out of exported GPX.
    fn read_waypoints(xml: &str) -> Vec<(f64, f64, String)> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut out = Vec::new();
        let mut cur: Option<(f64, f64)> = None;
        let mut in_name = false;

        loop {
            match reader.read_event().unwrap() {
                Event::Eof => break,
                Event::Start(e) if e.name().as_ref() == b"wpt" => {
                    let mut lat = None;
                    let mut lon = None;
                    for a in e.attributes().flatten() {
                        let v = a.unescape_value().unwrap().parse::<f64>().ok();
                        match a.key.as_ref() {
                            b"lat" => lat = v,
                            b"lon" => lon = v,
                            _ => {}
                        }
                    }
                    cur = lat.zip(lon);
                }
                Event::Start(e) if e.name().as_ref() == b"name" => in_name = true,
                Event::End(e) if e.name().as_ref() == b"name" => in_name = false,
                Event::Text(t) if in_name => {
                    let (lat, lon) = cur.unwrap();
                    out.push((lat, lon, t.decode().unwrap().into_owned()));
                }
                _ => {}
            }
        }
        out
    }

    #[test]
    fn records_view_and_markers() {
        let mut map = GpxMap::new();
        assert!(map.view().is_none());

        map.set_view(Coords::new(1.0, 2.0), 13, PanOptions::SMOOTH);
        map.place_marker(
            Coords::new(1.5, 2.5),
            "x",
            &PopupStyle::for_kind(WorkoutKind::Running),
        );

        let v = map.view().unwrap();
        assert_eq!(v.center, Coords::new(1.0, 2.0));
        assert!(v.pan.animate);
        assert_eq!(map.markers().len(), 1);

        map.clear_markers();
        assert!(map.markers().is_empty());
    }

    #[test]
    fn exports_markers_as_waypoints() {
        let mut map = GpxMap::new();
        map.place_marker(
            Coords::new(39.0, -12.25),
            "🏃 Running on April 14",
            &PopupStyle::for_kind(WorkoutKind::Running),
        );
        map.place_marker(
            Coords::new(39.5, 24.0),
            "Fish & chips <ride>",
            &PopupStyle::for_kind(WorkoutKind::Cycling),
        );

        let mut buf = Vec::new();
        map.write_gpx(&mut buf).unwrap();
        let xml = String::from_utf8(buf).unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<type>cycling-popup</type>"));
        assert!(xml.contains("Fish &amp; chips &lt;ride"));

        let wpts = read_waypoints(&xml);
        assert_eq!(wpts[0], (39.0, -12.25, "🏃 Running on April 14".to_string()));
        assert_eq!((wpts.last().unwrap().0, wpts.last().unwrap().1), (39.5, 24.0));
    }

    #[test]
    fn save_gpx_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markers.gpx");
        GpxMap::new().save_gpx(&path).unwrap();
        let s = fs::read_to_string(&path).unwrap();
        assert!(s.contains("<gpx"));
    }
}
