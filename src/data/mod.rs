//! Dataset loading and normalization. Every loader is tolerant: a file
//! that is missing or malformed logs a warning and falls back to the
//! built-in dataset, so the narrative always has something to show.

mod builtin;

pub use builtin::{builtin_datasets, builtin_scores, builtin_story, builtin_world};

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geojson::{GeoJson, Value as GeoValue};
use serde::Deserialize;

use crate::charts::ChartKind;
use crate::globe::{Country, Ring};
use crate::story::{OverlayMode, Phase, Step, Story, WidgetDef};

/// One labeled value, used by bar and bubble charts
#[derive(Clone, Debug, Deserialize)]
pub struct CategoryValue {
    pub label: String,
    pub value: f64,
}

/// Five-number summary plus outliers for one box plot
#[derive(Clone, Debug, Deserialize)]
pub struct BoxStats {
    pub label: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    #[serde(default)]
    pub outliers: Vec<f64>,
}

/// One spoke of a radar chart, value on a 0..100 scale
#[derive(Clone, Debug, Deserialize)]
pub struct RadarAxis {
    pub axis: String,
    pub value: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SankeyNode {
    pub name: String,
    /// Horizontal column, 0 = leftmost
    pub layer: u8,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SankeyData {
    #[serde(default)]
    pub nodes: Vec<SankeyNode>,
    #[serde(default)]
    pub links: Vec<SankeyLink>,
}

impl SankeyData {
    fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NetworkNode {
    pub name: String,
    /// 0 = hub, higher = periphery
    pub group: u8,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NetworkData {
    #[serde(default)]
    pub nodes: Vec<NetworkNode>,
    #[serde(default)]
    pub links: Vec<(usize, usize)>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PricePoint {
    pub label: String,
    pub price_usd: f64,
}

/// One geolocated study site for the temporal overlay
#[derive(Clone, Debug)]
pub struct StudyRecord {
    pub year: i32,
    pub lon: f64,
    pub lat: f64,
    pub country: String,
    pub title: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CountryScore {
    pub country: String,
    pub score: f64,
}

/// All chart datasets, one field per widget family.
#[derive(Clone, Debug)]
pub struct Datasets {
    pub approvals: Vec<CategoryValue>,
    pub trials: Vec<CategoryValue>,
    pub edit_outcomes: Vec<BoxStats>,
    pub damage_axes: Vec<RadarAxis>,
    pub sankey: SankeyData,
    pub network: NetworkData,
    pub prices: Vec<PricePoint>,
    pub studies: Vec<StudyRecord>,
    /// Trials per year, derived from the study records
    pub year_counts: Vec<(i32, u32)>,
}

/// Everything the application needs at startup.
pub struct LoadedWorld {
    pub story: Story,
    pub datasets: Datasets,
    pub countries: Vec<Country>,
    pub scores: HashMap<String, f64>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let mut bytes =
        fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    simd_json::serde::from_slice(&mut bytes)
        .with_context(|| format!("parsing {}", path.display()))
}

// Wire format for the story file. Attribute names match the trigger
// markup they came from, hence the dashes.
#[derive(Deserialize)]
struct RawStory {
    widgets: Vec<RawWidget>,
    steps: Vec<RawStep>,
}

#[derive(Deserialize)]
struct RawWidget {
    id: String,
    title: String,
    kind: String,
    #[serde(default)]
    deferred_relayout: bool,
}

#[derive(Deserialize)]
struct RawStep {
    id: String,
    #[serde(rename = "data-widget")]
    widget: Option<String>,
    #[serde(rename = "data-phase")]
    phase: Option<String>,
    #[serde(default)]
    spacer: bool,
    finale: Option<String>,
}

impl RawStep {
    /// Spacer beats finale beats widget when a step sets several
    fn into_step(self) -> Step {
        if self.spacer {
            Step::spacer(&self.id)
        } else if let Some(mode) = &self.finale {
            Step::finale(&self.id, OverlayMode::parse_finale(mode))
        } else if let Some(widget) = &self.widget {
            Step::widget(&self.id, widget, Phase::parse(self.phase.as_deref()))
        } else {
            Step::narrative(&self.id)
        }
    }
}

/// Load the story declaration. Widgets with an unknown chart kind are
/// dropped with a warning; their steps stay and defocus at runtime.
pub fn load_story(path: &Path) -> Result<Story> {
    let raw: RawStory = read_json(path)?;

    let widgets = raw
        .widgets
        .into_iter()
        .filter_map(|w| match ChartKind::parse(&w.kind) {
            Some(kind) => Some(WidgetDef {
                id: w.id,
                title: w.title,
                kind,
                needs_deferred_relayout: w.deferred_relayout,
            }),
            None => {
                log::warn!("widget {:?} has unknown kind {:?}, dropping", w.id, w.kind);
                None
            }
        })
        .collect();

    let steps = raw.steps.into_iter().map(RawStep::into_step).collect();
    Ok(Story { widgets, steps })
}

// Study records arrive with the year as either a number or a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum YearField {
    Num(i32),
    Text(String),
}

#[derive(Deserialize)]
struct RawStudy {
    year: Option<YearField>,
    lon: Option<f64>,
    lat: Option<f64>,
    country: Option<String>,
    title: Option<String>,
}

impl RawStudy {
    fn normalize(self) -> Option<StudyRecord> {
        let year = match self.year? {
            YearField::Num(y) => y,
            YearField::Text(s) => s.trim().parse().ok()?,
        };
        if !(1950..=2035).contains(&year) {
            return None;
        }
        let (lon, lat) = (self.lon?, self.lat?);
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        Some(StudyRecord {
            year,
            lon,
            lat,
            country: self.country.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
        })
    }
}

/// Load study sites, dropping records with missing or out-of-range
/// coordinates or years.
pub fn load_studies(path: &Path) -> Result<Vec<StudyRecord>> {
    let raw: Vec<RawStudy> = read_json(path)?;
    let total = raw.len();
    let studies: Vec<StudyRecord> = raw.into_iter().filter_map(RawStudy::normalize).collect();
    if studies.len() < total {
        log::warn!("dropped {} malformed study records", total - studies.len());
    }
    Ok(studies)
}

pub fn load_scores(path: &Path) -> Result<HashMap<String, f64>> {
    let raw: Vec<CountryScore> = read_json(path)?;
    Ok(raw.into_iter().map(|s| (s.country, s.score)).collect())
}

fn feature_name(feature: &geojson::Feature) -> Option<String> {
    let props = feature.properties.as_ref()?;
    for key in ["name", "NAME", "ADMIN"] {
        if let Some(serde_json::Value::String(s)) = props.get(key) {
            return Some(s.clone());
        }
    }
    None
}

fn exterior_ring(positions: &[Vec<Vec<f64>>]) -> Option<Ring> {
    let outer = positions.first()?;
    let points: Vec<(f64, f64)> = outer
        .iter()
        .filter(|pos| pos.len() >= 2)
        .map(|pos| (pos[0], pos[1]))
        .collect();
    (points.len() >= 3).then(|| Ring::new(points))
}

/// Load country polygons from a GeoJSON FeatureCollection. Only exterior
/// rings are kept. Features without a usable geometry are skipped.
pub fn load_world(path: &Path) -> Result<Vec<Country>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let geojson: GeoJson = text
        .parse()
        .with_context(|| format!("parsing {}", path.display()))?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        anyhow::bail!("{} is not a FeatureCollection", path.display());
    };

    let mut countries = Vec::new();
    for feature in collection.features {
        let name = feature_name(&feature).unwrap_or_else(|| "unnamed".to_string());
        let Some(geometry) = &feature.geometry else {
            log::warn!("feature {name:?} has no geometry, skipping");
            continue;
        };

        let rings: Vec<Ring> = match &geometry.value {
            GeoValue::Polygon(poly) => exterior_ring(poly).into_iter().collect(),
            GeoValue::MultiPolygon(polys) => {
                polys.iter().filter_map(|p| exterior_ring(p)).collect()
            }
            other => {
                log::warn!("feature {name:?} has unsupported geometry {other:?}, skipping");
                continue;
            }
        };

        if rings.is_empty() {
            log::warn!("feature {name:?} has no usable rings, skipping");
            continue;
        }
        countries.push(Country { name, rings });
    }
    Ok(countries)
}

/// Trials-per-year histogram from the study records
pub fn derive_year_counts(studies: &[StudyRecord]) -> Vec<(i32, u32)> {
    let mut counts: HashMap<i32, u32> = HashMap::new();
    for s in studies {
        *counts.entry(s.year).or_insert(0) += 1;
    }
    let mut out: Vec<(i32, u32)> = counts.into_iter().collect();
    out.sort_by_key(|&(year, _)| year);
    out
}

fn load_or<T>(path: &Path, loader: impl Fn(&Path) -> Result<T>, fallback: T) -> T {
    match loader(path) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("{}: {e:#}, using built-in data", path.display());
            fallback
        }
    }
}

/// Load everything from a data directory, substituting built-in
/// datasets file by file when loading fails.
pub fn load_all(dir: &Path) -> LoadedWorld {
    let builtin = builtin_datasets();

    let story = load_or(&dir.join("story.json"), load_story, builtin_story());
    let countries = load_or(&dir.join("world.geojson"), load_world, builtin_world());
    let scores = load_or(&dir.join("scores.json"), load_scores, builtin_scores());
    let studies = load_or(&dir.join("studies.json"), load_studies, builtin.studies.clone());

    let approvals = load_or(&dir.join("approvals.json"), read_json, builtin.approvals);
    let trials = load_or(&dir.join("trials.json"), read_json, builtin.trials);
    let edit_outcomes = load_or(
        &dir.join("edit_outcomes.json"),
        read_json,
        builtin.edit_outcomes,
    );
    let damage_axes = load_or(&dir.join("damage_axes.json"), read_json, builtin.damage_axes);
    let mut sankey: SankeyData = load_or(&dir.join("pipeline.json"), read_json, SankeyData::default());
    if sankey.is_empty() {
        sankey = builtin.sankey;
    }
    let network = load_or(&dir.join("network.json"), read_json, NetworkData::default());
    let network = if network.nodes.is_empty() {
        builtin.network
    } else {
        network
    };
    let prices = load_or(&dir.join("prices.json"), read_json, builtin.prices);

    let year_counts = derive_year_counts(&studies);
    let datasets = Datasets {
        approvals,
        trials,
        edit_outcomes,
        damage_axes,
        sankey,
        network,
        prices,
        studies,
        year_counts,
    };

    LoadedWorld {
        story,
        datasets,
        countries,
        scores,
    }
}
