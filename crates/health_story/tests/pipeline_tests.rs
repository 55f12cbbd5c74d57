use health_story::{Config, StoryError, run};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const METRIC: &str = "Low Birth Weight";

fn square(key: &str, lon: f64) -> String {
    let (x0, x1, y0, y1) = (lon, lon + 0.02, 41.80, 41.82);
    format!(
        r#"{{"type":"Feature","properties":{{"area_numbe":"{key}","community":"AREA {key}"}},
        "geometry":{{"type":"Polygon","coordinates":[[[{x0},{y0}],[{x1},{y0}],[{x1},{y1}],[{x0},{y1}],[{x0},{y0}]]]}}}}"#
    )
}

fn geojson(keys: &[&str]) -> String {
    let features: Vec<String> = keys
        .iter()
        .enumerate()
        .map(|(i, k)| square(k, -87.70 + i as f64 * 0.04))
        .collect();
    format!(
        r#"{{"type":"FeatureCollection","features":[{}]}}"#,
        features.join(",")
    )
}

const THREE_AREAS_CSV: &str = "\
Community Area,Community Area Name,Low Birth Weight,Birth Rate
1,AreaOne,10.0,14.2
2,AreaTwo,20.0,15.1
3,AreaThree,,13.0
";

struct Fixture {
    dir: TempDir,
    config: Config,
}

impl Fixture {
    fn new(geojson: &str, csv: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let boundaries = dir.path().join("areas.geojson");
        let indicators = dir.path().join("indicators.csv");
        std::fs::write(&boundaries, geojson).unwrap();
        std::fs::write(&indicators, csv).unwrap();

        let mut config = Config::default();
        config.input.boundaries = boundaries;
        config.input.indicators = indicators;
        config.output.dir = dir.path().join("output");
        config.basemap.enabled = false;
        Self { dir, config }
    }

    fn three_areas() -> Self {
        Self::new(&geojson(&["1", "2", "3"]), THREE_AREAS_CSV)
    }

    fn output_dir(&self) -> PathBuf {
        self.dir.path().join("output")
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn test_three_area_story() {
    let fixture = Fixture::three_areas();
    let paths = run(&fixture.config).unwrap();

    for path in paths.all() {
        assert!(path.is_file(), "missing output {}", path.display());
        assert!(path.starts_with(fixture.output_dir()));
    }

    assert_eq!(image::image_dimensions(&paths.poster).unwrap(), (2400, 3000));
    assert_eq!(image::image_dimensions(&paths.bar).unwrap(), (3000, 1800));
    assert_eq!(image::image_dimensions(&paths.hist).unwrap(), (3000, 1800));

    let story = read(&paths.story);
    assert!(story.contains("<strong>15.00</strong>"));
    assert!(story.contains("<strong>AreaTwo</strong>, reaching <strong>20.00</strong>"));

    let table = read(&paths.table);
    assert_eq!(
        table,
        "Community Area,Community Area Name,Low Birth Weight,Birth Rate\n\
         2,AreaTwo,20.0,15.1\n\
         1,AreaOne,10.0,14.2\n"
    );

    let map = read(&paths.map);
    assert!(map.contains(r#"color: black;\">10.0<\/div>"#));
    assert!(map.contains(r#"color: black;\">20.0<\/div>"#));
    assert_eq!(map.matches("font-weight: bold").count(), 2);
    assert_eq!(map.matches(r#""type":"Feature""#).count(), 3);
}

#[test]
fn test_missing_metric_column_writes_nothing() {
    let mut fixture = Fixture::three_areas();
    fixture.config.metric.name = "Teen Birth Rate".to_string();

    let err = run(&fixture.config).unwrap_err();
    assert!(matches!(err, StoryError::MissingColumn { ref column } if column == "Teen Birth Rate"));
    assert_eq!(err.to_string(), "Column \"Teen Birth Rate\" not found in CSV.");
    assert!(!fixture.output_dir().exists());
}

#[test]
fn test_missing_input_named_and_nothing_written() {
    let mut fixture = Fixture::three_areas();
    let absent = fixture.dir.path().join("nowhere.geojson");
    fixture.config.input.boundaries = absent.clone();

    let err = run(&fixture.config).unwrap_err();
    assert!(err.to_string().contains(&absent.display().to_string()));
    assert!(matches!(err, StoryError::MissingInput { kind: "GeoJSON", .. }));
    assert!(!fixture.output_dir().exists());
}

#[test]
fn test_metric_without_values_writes_nothing() {
    let csv = "Community Area,Community Area Name,Low Birth Weight\n1,AreaOne,\n2,AreaTwo,NA\n";
    let fixture = Fixture::new(&geojson(&["1", "2"]), csv);

    let err = run(&fixture.config).unwrap_err();
    assert!(matches!(err, StoryError::EmptyMetric { .. }));
    assert!(!fixture.output_dir().exists());
}

#[test]
fn test_unparsable_metric_cell_fails() {
    let csv = "Community Area,Community Area Name,Low Birth Weight\n1,AreaOne,10.0\n2,AreaTwo,high\n";
    let fixture = Fixture::new(&geojson(&["1", "2"]), csv);

    let err = run(&fixture.config).unwrap_err();
    match err {
        StoryError::MetricParse { row, value, .. } => {
            assert_eq!(row, 3);
            assert_eq!(value, "high");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!fixture.output_dir().exists());
}

#[test]
fn test_top_table_sorted_and_capped() {
    let mut csv = String::from("Community Area,Community Area Name,Low Birth Weight\n");
    for i in 1..=30 {
        let value = if i % 7 == 0 {
            String::new()
        } else {
            format!("{:.1}", (i * 37 % 23) as f64 + 0.5)
        };
        csv.push_str(&format!("{i},Area{i},{value}\n"));
    }
    let fixture = Fixture::new(&geojson(&["1", "2", "3"]), &csv);
    let paths = run(&fixture.config).unwrap();

    let mut reader = csv::Reader::from_path(&paths.table).unwrap();
    let values: Vec<f64> = reader
        .records()
        .map(|r| r.unwrap()[2].parse::<f64>().unwrap())
        .collect();
    assert_eq!(values.len(), 10);
    assert!(values.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_rerun_is_byte_identical() {
    let fixture = Fixture::three_areas();

    let paths = run(&fixture.config).unwrap();
    let table = std::fs::read(&paths.table).unwrap();
    let story = std::fs::read(&paths.story).unwrap();

    let again = run(&fixture.config).unwrap();
    assert_eq!(std::fs::read(&again.table).unwrap(), table);
    assert_eq!(std::fs::read(&again.story).unwrap(), story);
}

#[test]
fn test_unmatched_boundaries_still_rendered() {
    // boundary 9 has no indicator record
    let fixture = Fixture::new(&geojson(&["1", "2", "9"]), THREE_AREAS_CSV);
    let paths = run(&fixture.config).unwrap();

    let map = read(&paths.map);
    assert_eq!(map.matches(r#""type":"Feature""#).count(), 3);
    assert!(map.contains(r##""fill_color":"#000000""##));
}

#[test]
fn test_shipped_config_parses() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.metric.name, METRIC);
    assert_eq!(config.output.dir, PathBuf::from("output"));
    assert!(config.basemap.enabled);
}

#[test]
fn test_short_indicator_row_treated_as_missing() {
    let csv = "Community Area,Community Area Name,Low Birth Weight,Birth Rate\n\
               1,AreaOne,10.0,14.2\n2,AreaTwo,20.0,15.1\n3,AreaThree\n";
    let fixture = Fixture::new(&geojson(&["1", "2", "3"]), csv);
    let paths = run(&fixture.config).unwrap();

    let story = read(&paths.story);
    assert!(story.contains("<strong>15.00</strong>"));
    assert_eq!(read(&paths.table).lines().count(), 3);
}
