use std::fs;
use std::path::Path;
use subzone_choropleth::config::AppConfig;
use subzone_choropleth::pipeline::{build_scene, write_outputs};
use subzone_choropleth::scale::Fill;
use subzone_choropleth::scene::PointerEvent;

fn description(subzone: &str, area: &str, region: &str) -> String {
    format!(
        "<center><table><tr><th colspan='2' align='center'><em>Attributes</em></th></tr>\
         <tr bgcolor=\\\"#E3E3F3\\\"><th>SUBZONE_N</th><td>{}</td></tr>\
         <tr bgcolor=\\\"\\\"><th>PLN_AREA_N</th><td>{}</td></tr>\
         <tr bgcolor=\\\"#E3E3F3\\\"><th>REGION_N</th><td>{}</td></tr></table></center>",
        subzone, area, region
    )
}

fn feature(desc: &str, lon: f64) -> String {
    format!(
        r#"{{"type":"Feature","properties":{{"Name":"kml","Description":"{}"}},"geometry":{{"type":"Polygon","coordinates":[[[{lon},1.35],[{lon2},1.35],[{lon2},1.40],[{lon},1.40],[{lon},1.35]]]}}}}"#,
        desc,
        lon = lon,
        lon2 = lon + 0.05
    )
}

fn write_fixture(dir: &Path, csv: &str) -> AppConfig {
    let features = [
        feature(&description("ANG MO KIO TOWN CENTRE", "ANG MO KIO", "NORTH-EAST REGION"), 103.84),
        feature(&description("NORTH-EASTERN ISLANDS", "NORTH-EASTERN ISLANDS", "NORTH-EAST REGION"), 103.95),
        feature(&description("TAMPINES EAST", "TAMPINES", "EAST REGION"), 103.90),
    ];
    let collection = format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","));

    fs::write(dir.join("boundaries.json"), collection).expect("write geojson");
    fs::write(dir.join("population.csv"), csv).expect("write csv");

    let config = format!(
        r#"
        [input]
        boundaries = {:?}
        population_csv = {:?}

        [output]
        dir = {:?}
        "#,
        dir.join("boundaries.json"),
        dir.join("population.csv"),
        dir.join("out"),
    );
    AppConfig::from_toml(&config).expect("config")
}

const CSV: &str = "Planning Area,Subzone,Population\n\
                   Ang Mo Kio,Ang Mo Kio Town Centre,5000\n\
                   Tampines,Tampines East,\"12,000\"\n";

#[tokio::test]
async fn joined_subzones_are_coloured_and_unmatched_are_grey() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_fixture(dir.path(), CSV);

    let scene = build_scene(&config).await.expect("pipeline");
    let shapes = scene.shapes();
    let scale = scene.rule().scale();

    assert_eq!(shapes.len(), 3);
    assert_eq!(scale.domain(), [0.0, 12_000.0]);

    assert_eq!(shapes[0].info.subzone_name, "ANG MO KIO TOWN CENTRE");
    assert_eq!(shapes[0].info.planning_area, "Ang Mo Kio");
    assert_eq!(shapes[0].info.region, "North-East Region");
    assert_eq!(shapes[0].info.population, 5000);
    assert_eq!(shapes[0].fill, Fill::Ramp(scale.color(5000.0)));

    assert_eq!(shapes[1].info.population, 0);
    assert_eq!(scene.rule().paint(&shapes[1].fill), "grey");

    assert_eq!(shapes[2].info.population, 12_000);
}

#[tokio::test]
async fn hover_round_trip_restores_fill() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_fixture(dir.path(), CSV);
    let mut scene = build_scene(&config).await.expect("pipeline");

    for index in 0..scene.shapes().len() {
        let before = scene.shapes()[index].fill.clone();
        scene.pointer_enter(index, PointerEvent { page_x: 50.0, page_y: 60.0 });
        assert_eq!(scene.shapes()[index].fill, Fill::Highlight);
        scene.pointer_leave(index);
        assert_eq!(scene.shapes()[index].fill, before);
    }

    scene.pointer_enter(1, PointerEvent { page_x: 50.0, page_y: 60.0 });
    assert!(scene.tooltip().html.ends_with("Population: 0"));
}

#[tokio::test]
async fn outputs_are_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_fixture(dir.path(), CSV);
    let scene = build_scene(&config).await.expect("pipeline");

    write_outputs(&config, &scene).expect("write");

    let svg = fs::read_to_string(config.output.svg_path()).expect("svg");
    let page = fs::read_to_string(config.output.page_path()).expect("page");
    assert_eq!(svg.matches("class=\"subzone\"").count(), 3);
    assert!(svg.contains("data-subzone=\"NORTH-EASTERN ISLANDS\""));
    assert!(page.contains(&svg));
    assert!(page.contains("id=\"tooltip\""));
}

#[tokio::test]
async fn bad_population_table_fails_before_rendering() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_fixture(dir.path(), "Subzone,Population\nTampines East,lots\n");

    assert!(build_scene(&config).await.is_err());
    assert!(!config.output.dir.exists());
}

#[tokio::test]
async fn description_without_required_field_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_fixture(dir.path(), CSV);

    let broken = feature("<table><tr><th>x</th></tr><tr><th>SUBZONE_N</th><td>A</td></tr></table>", 103.8);
    fs::write(
        &config.input.boundaries,
        format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, broken),
    )
    .expect("rewrite geojson");

    let err = build_scene(&config).await.err().expect("should fail");
    assert!(format!("{:#}", err).contains("PLN_AREA_N"));
}
