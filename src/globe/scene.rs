use std::collections::HashMap;

use crate::braille::{draw_line, draw_marker, BrailleCanvas};
use crate::data::StudyRecord;
use crate::geo::{point_in_ring, ring_bbox};
use crate::globe::{GlobeView, Particle};
use crate::story::OverlayMode;

/// Frames between temporal-overlay year advances (~0.4 s at 60 fps)
const YEAR_CADENCE: u64 = 24;

/// Polygon ring with a precomputed bounding box for cheap rejection.
#[derive(Clone, Debug)]
pub struct Ring {
    pub points: Vec<(f64, f64)>,
    pub bbox: (f64, f64, f64, f64),
}

impl Ring {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        let bbox = ring_bbox(&points);
        Self { points, bbox }
    }
}

#[derive(Clone, Debug)]
pub struct Country {
    pub name: String,
    pub rings: Vec<Ring>,
}

impl Country {
    /// Bbox-reject first, then ray-cast against each ring
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.rings.iter().any(|ring| {
            let (min_lon, min_lat, max_lon, max_lat) = ring.bbox;
            lon >= min_lon
                && lon <= max_lon
                && lat >= min_lat
                && lat <= max_lat
                && point_in_ring(lon, lat, &ring.points)
        })
    }
}

/// Draw order for a rendered globe frame, back to front. The terminal
/// layer assigns one color per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Graticule,
    Land,
    /// Choropleth quartile, 0 = lowest
    ScoreBand(u8),
    Borders,
    Studies,
}

pub struct GlobeFrame {
    pub layers: Vec<(LayerKind, BrailleCanvas)>,
    pub labels: Vec<(u16, u16, String)>,
}

/// Everything drawn on the sphere besides its orientation: land
/// particles, country borders, and the two finale overlays.
pub struct GlobeScene {
    pub countries: Vec<Country>,
    scores: HashMap<String, f64>,
    particles: Vec<Particle>,
    /// Study sites sorted ascending by year
    studies: Vec<StudyRecord>,
    years: Vec<i32>,
    overlay: OverlayMode,
    year_cursor: usize,
    frame: u64,
}

impl GlobeScene {
    pub fn new(
        countries: Vec<Country>,
        scores: HashMap<String, f64>,
        mut studies: Vec<StudyRecord>,
    ) -> Self {
        studies.sort_by_key(|s| s.year);
        let mut years: Vec<i32> = studies.iter().map(|s| s.year).collect();
        years.dedup();
        Self {
            countries,
            scores,
            particles: Vec::new(),
            studies,
            years,
            overlay: OverlayMode::None,
            year_cursor: 0,
            frame: 0,
        }
    }

    /// Install precomputed land particles (see `build_land_particles`)
    pub fn set_particles(&mut self, particles: Vec<Particle>) {
        self.particles = particles;
    }

    pub fn overlay(&self) -> OverlayMode {
        self.overlay
    }

    /// Switch overlay mode. Entering the temporal overlay rewinds the
    /// year sweep to the beginning.
    pub fn set_overlay(&mut self, overlay: OverlayMode) {
        if overlay == OverlayMode::Temporal && self.overlay != OverlayMode::Temporal {
            self.year_cursor = 0;
        }
        self.overlay = overlay;
    }

    /// Per-frame update: advance the temporal year sweep on a fixed
    /// cadence. Sweep parks on the final year rather than looping.
    pub fn tick(&mut self) {
        self.frame += 1;
        if self.overlay == OverlayMode::Temporal
            && self.frame % YEAR_CADENCE == 0
            && self.year_cursor + 1 < self.years.len()
        {
            self.year_cursor += 1;
        }
    }

    pub fn current_year(&self) -> Option<i32> {
        self.years.get(self.year_cursor).copied()
    }

    fn visible_studies(&self) -> &[StudyRecord] {
        let Some(year) = self.current_year() else {
            return &[];
        };
        let end = self.studies.partition_point(|s| s.year <= year);
        &self.studies[..end]
    }

    /// Country under a screen pixel, for hover readout
    pub fn country_at(&self, view: &GlobeView, px: i32, py: i32) -> Option<(&str, Option<f64>)> {
        let (lon, lat) = view.unproject(px, py)?;
        let country = self.countries.iter().find(|c| c.contains(lon, lat))?;
        let score = self.scores.get(&country.name).copied();
        Some((&country.name, score))
    }

    fn score_band(&self, country: Option<u16>) -> Option<u8> {
        let idx = country? as usize;
        let name = &self.countries.get(idx)?.name;
        let score = *self.scores.get(name)?;
        Some(((score / 25.0) as u8).min(3))
    }

    /// Render the sphere into per-kind canvases for the current view.
    pub fn render(&self, view: &GlobeView, width: usize, height: usize) -> GlobeFrame {
        let mut layers: Vec<(LayerKind, BrailleCanvas)> = Vec::new();
        let mut labels = Vec::new();

        layers.push((LayerKind::Graticule, self.render_graticule(view, width, height)));

        match self.overlay {
            OverlayMode::None => {
                let mut land = BrailleCanvas::new(width, height);
                for p in &self.particles {
                    if let Some((px, py)) = view.project(p.lon, p.lat) {
                        land.set_pixel_signed(px, py);
                    }
                }
                layers.push((LayerKind::Land, land));
            }
            OverlayMode::Choropleth => {
                // Scored countries split into quartile bands, the rest
                // fall back to the plain land layer
                let mut land = BrailleCanvas::new(width, height);
                let mut bands: [BrailleCanvas; 4] =
                    std::array::from_fn(|_| BrailleCanvas::new(width, height));
                for p in &self.particles {
                    let Some((px, py)) = view.project(p.lon, p.lat) else {
                        continue;
                    };
                    match self.score_band(p.country) {
                        Some(b) => bands[b as usize].set_pixel_signed(px, py),
                        None => land.set_pixel_signed(px, py),
                    }
                }
                layers.push((LayerKind::Land, land));
                for (b, canvas) in bands.into_iter().enumerate() {
                    layers.push((LayerKind::ScoreBand(b as u8), canvas));
                }
                layers.push((LayerKind::Borders, self.render_borders(view, width, height)));
            }
            OverlayMode::Temporal => {
                layers.push((LayerKind::Borders, self.render_borders(view, width, height)));

                let mut points = BrailleCanvas::new(width, height);
                let visible = self.visible_studies();
                for s in visible {
                    if let Some((px, py)) = view.project(s.lon, s.lat) {
                        draw_marker(&mut points, px, py, 1);
                    }
                }
                layers.push((LayerKind::Studies, points));

                if let Some(year) = self.current_year() {
                    labels.push((1, 0, format!("{year}  ({} studies)", visible.len())));
                }
            }
        }

        GlobeFrame { layers, labels }
    }

    fn render_graticule(&self, view: &GlobeView, width: usize, height: usize) -> BrailleCanvas {
        let mut canvas = BrailleCanvas::new(width, height);

        // Meridians every 30 degrees
        for lon_step in 0..12 {
            let lon = -180.0 + lon_step as f64 * 30.0;
            let mut prev: Option<(i32, i32)> = None;
            for lat_step in 0..=40 {
                let lat = -80.0 + lat_step as f64 * 4.0;
                let cur = view.project(lon, lat);
                if let (Some((x0, y0)), Some((x1, y1))) = (prev, cur) {
                    draw_line(&mut canvas, x0, y0, x1, y1);
                }
                prev = cur;
            }
        }

        // Parallels every 30 degrees
        for lat_step in 0..5 {
            let lat = -60.0 + lat_step as f64 * 30.0;
            let mut prev: Option<(i32, i32)> = None;
            for lon_step in 0..=90 {
                let lon = -180.0 + lon_step as f64 * 4.0;
                let cur = view.project(lon, lat);
                if let (Some((x0, y0)), Some((x1, y1))) = (prev, cur) {
                    draw_line(&mut canvas, x0, y0, x1, y1);
                }
                prev = cur;
            }
        }
        canvas
    }

    fn render_borders(&self, view: &GlobeView, width: usize, height: usize) -> BrailleCanvas {
        let mut canvas = BrailleCanvas::new(width, height);
        for country in &self.countries {
            for ring in &country.rings {
                let mut prev: Option<(i32, i32)> = None;
                for &(lon, lat) in &ring.points {
                    let cur = view.project(lon, lat);
                    if let (Some((x0, y0)), Some((x1, y1))) = (prev, cur) {
                        // Skip segments that wrap around the antimeridian
                        if (x0 - x1).abs() < width as i32 {
                            draw_line(&mut canvas, x0, y0, x1, y1);
                        }
                    }
                    prev = cur;
                }
            }
        }
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> GlobeScene {
        let countries = vec![Country {
            name: "Boxland".to_string(),
            rings: vec![Ring::new(vec![
                (0.0, 0.0),
                (20.0, 0.0),
                (20.0, 20.0),
                (0.0, 20.0),
                (0.0, 0.0),
            ])],
        }];
        let mut scores = HashMap::new();
        scores.insert("Boxland".to_string(), 80.0);
        let studies = vec![
            StudyRecord { year: 2010, lon: 5.0, lat: 5.0, country: "Boxland".into(), title: "a".into() },
            StudyRecord { year: 2012, lon: 6.0, lat: 6.0, country: "Boxland".into(), title: "b".into() },
            StudyRecord { year: 2015, lon: 7.0, lat: 7.0, country: "Boxland".into(), title: "c".into() },
        ];
        GlobeScene::new(countries, scores, studies)
    }

    #[test]
    fn test_temporal_overlay_rewinds_year() {
        let mut s = scene();
        s.set_overlay(OverlayMode::Temporal);
        for _ in 0..(YEAR_CADENCE * 2) {
            s.tick();
        }
        assert!(s.current_year().unwrap() > 2010);
        s.set_overlay(OverlayMode::None);
        s.set_overlay(OverlayMode::Temporal);
        assert_eq!(s.current_year(), Some(2010));
    }

    #[test]
    fn test_year_sweep_parks_on_last_year() {
        let mut s = scene();
        s.set_overlay(OverlayMode::Temporal);
        for _ in 0..(YEAR_CADENCE * 50) {
            s.tick();
        }
        assert_eq!(s.current_year(), Some(2015));
    }

    #[test]
    fn test_visible_studies_grow_with_cursor() {
        let mut s = scene();
        s.set_overlay(OverlayMode::Temporal);
        assert_eq!(s.visible_studies().len(), 1);
        for _ in 0..YEAR_CADENCE {
            s.tick();
        }
        assert_eq!(s.visible_studies().len(), 2);
    }

    #[test]
    fn test_score_band_quartiles() {
        let s = scene();
        assert_eq!(s.score_band(Some(0)), Some(3));
        assert_eq!(s.score_band(None), None);
        assert_eq!(s.score_band(Some(99)), None);
    }

    #[test]
    fn test_choropleth_frame_has_band_layers() {
        let mut s = scene();
        s.set_overlay(OverlayMode::Choropleth);
        let view = GlobeView::new(10.0, 10.0, 120, 120);
        let frame = s.render(&view, 60, 30);
        let kinds: Vec<LayerKind> = frame.layers.iter().map(|(k, _)| *k).collect();
        assert!(kinds.contains(&LayerKind::ScoreBand(0)));
        assert!(kinds.contains(&LayerKind::Borders));
    }

    #[test]
    fn test_country_at_hover() {
        let mut s = scene();
        s.set_particles(Vec::new());
        let view = GlobeView::new(10.0, 10.0, 120, 120);
        let (px, py) = view.project(10.0, 10.0).unwrap();
        let (name, score) = s.country_at(&view, px, py).unwrap();
        assert_eq!(name, "Boxland");
        assert_eq!(score, Some(80.0));
    }
}
