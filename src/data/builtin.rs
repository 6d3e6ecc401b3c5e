//! Built-in fallback datasets. Coarse but complete: every widget and
//! both globe overlays work with no data directory at all.

use std::collections::HashMap;

use crate::charts::ChartKind;
use crate::data::{
    derive_year_counts, BoxStats, CategoryValue, Datasets, NetworkData, NetworkNode, PricePoint,
    RadarAxis, SankeyData, SankeyLink, SankeyNode, StudyRecord,
};
use crate::globe::{Country, Ring};
use crate::story::{OverlayMode, Phase, Step, Story, WidgetDef};

fn widget(id: &str, title: &str, kind: ChartKind) -> WidgetDef {
    WidgetDef {
        id: id.to_string(),
        title: title.to_string(),
        kind,
        needs_deferred_relayout: false,
    }
}

/// The default gene-editing narrative: eight chart widgets, a spacer
/// before each act, and the two globe finales at the end.
pub fn builtin_story() -> Story {
    let mut widgets = vec![
        widget("disease-bloom", "Approved disease applications", ChartKind::Bloom),
        widget("trial-bubbles", "Active trials by condition", ChartKind::Bubble),
        widget("cas9-network", "Editing machinery", ChartKind::Network),
        widget("growth-timeline", "Cumulative trials", ChartKind::Timeline),
        widget("approval-sankey", "Pipeline attrition", ChartKind::Sankey),
        widget("edit-boxplot", "Editing outcomes by variant", ChartKind::BoxPlot),
        widget("damage-radar", "Risk profile", ChartKind::Radar),
        widget("price-bars", "What a cure costs", ChartKind::Price),
    ];
    // Log-scale bars need a settled container before laying out
    widgets[7].needs_deferred_relayout = true;

    let steps = vec![
        Step::spacer("spacer-intro"),
        Step::narrative("intro"),
        Step::widget("bloom-center", "disease-bloom", Phase::Center),
        Step::widget("bloom-text", "disease-bloom", Phase::Text),
        Step::widget("bubbles-center", "trial-bubbles", Phase::Center),
        Step::widget("bubbles-left", "trial-bubbles", Phase::Left),
        Step::spacer("spacer-mechanism"),
        Step::widget("network-center", "cas9-network", Phase::Center),
        Step::widget("network-text", "cas9-network", Phase::Text),
        Step::widget("timeline-center", "growth-timeline", Phase::Center),
        Step::widget("sankey-center", "approval-sankey", Phase::Center),
        Step::widget("sankey-text", "approval-sankey", Phase::Text),
        Step::spacer("spacer-risk"),
        Step::widget("boxplot-center", "edit-boxplot", Phase::Center),
        Step::widget("radar-center", "damage-radar", Phase::Center),
        Step::widget("radar-left", "damage-radar", Phase::Left),
        Step::spacer("spacer-cost"),
        Step::widget("price-center", "price-bars", Phase::Center),
        Step::widget("price-text", "price-bars", Phase::Text),
        Step::spacer("spacer-finale"),
        Step::finale("final-countries", OverlayMode::Choropleth),
        Step::finale("final-temporal-globe", OverlayMode::Temporal),
    ];

    Story { widgets, steps }
}

pub fn builtin_datasets() -> Datasets {
    let approvals = vec![
        CategoryValue { label: "sickle cell".into(), value: 45.0 },
        CategoryValue { label: "beta-thal".into(), value: 31.0 },
        CategoryValue { label: "cancers".into(), value: 62.0 },
        CategoryValue { label: "blindness".into(), value: 12.0 },
        CategoryValue { label: "HIV".into(), value: 9.0 },
        CategoryValue { label: "amyloidosis".into(), value: 14.0 },
    ];

    let trials = vec![
        CategoryValue { label: "oncology".into(), value: 88.0 },
        CategoryValue { label: "blood disorders".into(), value: 54.0 },
        CategoryValue { label: "ophthalmology".into(), value: 21.0 },
        CategoryValue { label: "metabolic".into(), value: 17.0 },
        CategoryValue { label: "neuromuscular".into(), value: 13.0 },
        CategoryValue { label: "infectious".into(), value: 11.0 },
        CategoryValue { label: "cardiovascular".into(), value: 7.0 },
    ];

    let edit_outcomes = vec![
        BoxStats {
            label: "SpCas9".into(),
            min: 0.4, q1: 1.8, median: 3.1, q3: 5.2, max: 8.9,
            outliers: vec![12.4],
        },
        BoxStats {
            label: "HiFi".into(),
            min: 0.1, q1: 0.4, median: 0.8, q3: 1.5, max: 2.9,
            outliers: vec![],
        },
        BoxStats {
            label: "base".into(),
            min: 0.05, q1: 0.2, median: 0.5, q3: 0.9, max: 1.8,
            outliers: vec![3.6],
        },
        BoxStats {
            label: "prime".into(),
            min: 0.02, q1: 0.1, median: 0.3, q3: 0.6, max: 1.2,
            outliers: vec![],
        },
    ];

    let damage_axes = vec![
        RadarAxis { axis: "off-target".into(), value: 42.0 },
        RadarAxis { axis: "mosaicism".into(), value: 58.0 },
        RadarAxis { axis: "immune".into(), value: 35.0 },
        RadarAxis { axis: "delivery".into(), value: 66.0 },
        RadarAxis { axis: "long-term".into(), value: 74.0 },
    ];

    let sankey = SankeyData {
        nodes: vec![
            SankeyNode { name: "Preclinical".into(), layer: 0 },
            SankeyNode { name: "Phase I".into(), layer: 1 },
            SankeyNode { name: "Phase II".into(), layer: 2 },
            SankeyNode { name: "Phase III".into(), layer: 3 },
            SankeyNode { name: "Approved".into(), layer: 4 },
        ],
        links: vec![
            SankeyLink { source: 0, target: 1, value: 120.0 },
            SankeyLink { source: 1, target: 2, value: 64.0 },
            SankeyLink { source: 2, target: 3, value: 27.0 },
            SankeyLink { source: 3, target: 4, value: 6.0 },
        ],
    };

    let network = NetworkData {
        nodes: vec![
            NetworkNode { name: "Cas9".into(), group: 0 },
            NetworkNode { name: "guide RNA".into(), group: 0 },
            NetworkNode { name: "PAM".into(), group: 1 },
            NetworkNode { name: "tracrRNA".into(), group: 1 },
            NetworkNode { name: "target DNA".into(), group: 1 },
            NetworkNode { name: "double-strand break".into(), group: 2 },
            NetworkNode { name: "NHEJ".into(), group: 2 },
            NetworkNode { name: "HDR".into(), group: 2 },
            NetworkNode { name: "donor template".into(), group: 2 },
        ],
        links: vec![
            (0, 1),
            (0, 2),
            (0, 4),
            (1, 3),
            (1, 4),
            (0, 5),
            (5, 6),
            (5, 7),
            (7, 8),
        ],
    };

    let prices = vec![
        PricePoint { label: "Casgevy".into(), price_usd: 2_200_000.0 },
        PricePoint { label: "Zolgensma".into(), price_usd: 2_100_000.0 },
        PricePoint { label: "Luxturna".into(), price_usd: 850_000.0 },
        PricePoint { label: "CAR-T course".into(), price_usd: 450_000.0 },
        PricePoint { label: "insulin, year".into(), price_usd: 7_200.0 },
        PricePoint { label: "statins, year".into(), price_usd: 600.0 },
        PricePoint { label: "aspirin".into(), price_usd: 8.0 },
    ];

    let studies = builtin_studies();
    let year_counts = derive_year_counts(&studies);

    Datasets {
        approvals,
        trials,
        edit_outcomes,
        damage_axes,
        sankey,
        network,
        prices,
        studies,
        year_counts,
    }
}

fn study(year: i32, lon: f64, lat: f64, country: &str, title: &str) -> StudyRecord {
    StudyRecord {
        year,
        lon,
        lat,
        country: country.to_string(),
        title: title.to_string(),
    }
}

fn builtin_studies() -> Vec<StudyRecord> {
    vec![
        study(2002, -71.1, 42.4, "North America", "zinc finger proof of concept"),
        study(2005, 2.3, 48.9, "Europe", "SCID gene therapy trial"),
        study(2009, -122.4, 37.8, "North America", "TALEN engineering"),
        study(2012, 5.4, 43.3, "Europe", "CRISPR-Cas9 characterization"),
        study(2013, -71.1, 42.4, "North America", "human cell editing"),
        study(2014, 116.4, 39.9, "Asia", "primate embryo editing"),
        study(2015, 113.3, 23.1, "Asia", "non-viable embryo study"),
        study(2016, 104.1, 30.7, "Asia", "first human CRISPR injection"),
        study(2017, -117.2, 32.7, "North America", "embryo repair study"),
        study(2017, 126.9, 37.6, "Asia", "MYBPC3 correction"),
        study(2018, 114.1, 22.5, "Asia", "germline twins announcement"),
        study(2019, -75.2, 40.0, "North America", "sickle cell trial start"),
        study(2019, 8.5, 47.4, "Europe", "beta-thalassemia trial"),
        study(2020, -0.1, 51.5, "Europe", "in vivo eye editing"),
        study(2020, -71.1, 42.4, "North America", "base editing primates"),
        study(2021, 4.9, 52.4, "Europe", "amyloidosis in vivo trial"),
        study(2021, 151.2, -33.9, "Oceania", "hereditary angioedema trial"),
        study(2022, -79.4, 43.7, "North America", "CAR-T knockouts"),
        study(2022, 77.2, 28.6, "Asia", "sickle cell program"),
        study(2023, -0.1, 51.5, "Europe", "Casgevy approval"),
        study(2023, -77.0, 38.9, "North America", "FDA approval"),
        study(2024, 36.8, -1.3, "Africa", "access partnership"),
        study(2024, -46.6, -23.5, "South America", "regional trial network"),
        study(2024, 139.7, 35.7, "Asia", "prime editing trial"),
    ]
}

fn region(name: &str, points: &[(f64, f64)]) -> Country {
    Country {
        name: name.to_string(),
        rings: vec![Ring::new(points.to_vec())],
    }
}

/// Very coarse continent outlines, enough for particle sampling and the
/// choropleth when no GeoJSON is on disk.
pub fn builtin_world() -> Vec<Country> {
    vec![
        region(
            "North America",
            &[
                (-168.0, 66.0), (-160.0, 70.0), (-120.0, 70.0), (-85.0, 70.0),
                (-60.0, 60.0), (-55.0, 48.0), (-75.0, 40.0), (-80.0, 30.0),
                (-95.0, 25.0), (-105.0, 20.0), (-95.0, 16.0), (-85.0, 12.0),
                (-105.0, 22.0), (-118.0, 33.0), (-125.0, 42.0), (-130.0, 55.0),
                (-150.0, 60.0), (-168.0, 66.0),
            ],
        ),
        region(
            "South America",
            &[
                (-80.0, 9.0), (-62.0, 10.0), (-50.0, 0.0), (-35.0, -8.0),
                (-40.0, -20.0), (-48.0, -28.0), (-58.0, -35.0), (-65.0, -45.0),
                (-71.0, -54.0), (-75.0, -45.0), (-72.0, -30.0), (-77.0, -15.0),
                (-81.0, -5.0), (-80.0, 9.0),
            ],
        ),
        region(
            "Europe",
            &[
                (-10.0, 36.0), (-9.0, 43.0), (-5.0, 48.0), (0.0, 51.0),
                (5.0, 53.0), (8.0, 57.0), (18.0, 60.0), (28.0, 62.0),
                (40.0, 60.0), (45.0, 50.0), (40.0, 45.0), (28.0, 41.0),
                (22.0, 37.0), (15.0, 38.0), (10.0, 40.0), (0.0, 39.0),
                (-10.0, 36.0),
            ],
        ),
        region(
            "Africa",
            &[
                (-17.0, 21.0), (-10.0, 32.0), (0.0, 36.0), (10.0, 37.0),
                (22.0, 32.0), (32.0, 31.0), (43.0, 11.0), (51.0, 11.0),
                (40.0, -5.0), (35.0, -20.0), (30.0, -30.0), (20.0, -35.0),
                (12.0, -28.0), (12.0, -15.0), (8.0, -1.0), (-8.0, 4.0),
                (-17.0, 12.0), (-17.0, 21.0),
            ],
        ),
        region(
            "Asia",
            &[
                (45.0, 42.0), (50.0, 50.0), (60.0, 57.0), (80.0, 68.0),
                (110.0, 72.0), (140.0, 70.0), (170.0, 66.0), (160.0, 55.0),
                (142.0, 45.0), (130.0, 35.0), (122.0, 25.0), (108.0, 12.0),
                (98.0, 8.0), (80.0, 8.0), (72.0, 20.0), (60.0, 25.0),
                (55.0, 25.0), (48.0, 30.0), (45.0, 42.0),
            ],
        ),
        region(
            "Oceania",
            &[
                (113.0, -22.0), (122.0, -17.0), (135.0, -12.0), (142.0, -11.0),
                (146.0, -19.0), (153.0, -27.0), (150.0, -37.0), (140.0, -38.0),
                (129.0, -32.0), (115.0, -34.0), (113.0, -22.0),
            ],
        ),
    ]
}

/// Regulatory permissiveness scores, 0..100, for the choropleth finale
pub fn builtin_scores() -> HashMap<String, f64> {
    let mut scores = HashMap::new();
    scores.insert("North America".to_string(), 72.0);
    scores.insert("South America".to_string(), 38.0);
    scores.insert("Europe".to_string(), 64.0);
    scores.insert("Africa".to_string(), 22.0);
    scores.insert("Asia".to_string(), 55.0);
    scores.insert("Oceania".to_string(), 61.0);
    scores
}
