mod common;

use crime_atlas::visualization::COLOR_LABEL;
use crime_atlas::{render, CrimeTable, MapView, Selection, UnmappedCategories};

use common::wide_frame;

fn table() -> CrimeTable {
    CrimeTable::prepare(wide_frame(), UnmappedCategories::Passthrough).unwrap()
}

#[test]
fn selection_keeps_exactly_matching_rows() {
    let table = table();
    let spec = render(&table, &Selection::new("Violent crime", "2010"), &MapView::default()).unwrap();

    let mut got: Vec<(&str, Option<f64>)> = spec
        .points
        .iter()
        .map(|p| (p.city.as_str(), p.number_crimes))
        .collect();
    got.sort_by(|a, b| a.0.cmp(b.0));
    assert_eq!(got, vec![("Chicago", Some(500.0)), ("Houston", Some(700.0))]);

    let chicago = spec.points.iter().find(|p| p.city == "Chicago").unwrap();
    assert_eq!(chicago.population, Some(2_695_598.0));
    assert_eq!(chicago.lat, Some(41.8781));
    assert_eq!(chicago.lng, Some(-87.6298));
}

#[test]
fn other_year_does_not_leak() {
    let spec = render(&table(), &Selection::new("Violent crime", "2011"), &MapView::default()).unwrap();
    assert_eq!(spec.len(), 1);
    assert_eq!(spec.points[0].city, "Chicago");
    assert_eq!(spec.points[0].number_crimes, Some(480.0));
}

#[test]
fn unlabelled_sentiment_column_is_selectable_by_raw_name() {
    let spec = render(&table(), &Selection::new("twitter_index", "2010"), &MapView::default()).unwrap();
    assert_eq!(spec.len(), 2);
}

#[test]
fn unknown_or_unset_selection_renders_empty() {
    let table = table();
    let view = MapView::default();
    let cases = [
        Selection::new("Jaywalking", "2010"),
        Selection::new("Violent crime", "1999"),
        Selection::new("violentcrime", "2010"),
        Selection::new("Select", "Select"),
        Selection {
            crime: Some("Violent crime".into()),
            year: None,
        },
        Selection::default(),
    ];
    for selection in cases {
        let spec = render(&table, &selection, &view).unwrap();
        assert!(spec.is_empty(), "{selection:?} matched rows");
        assert_eq!(spec.figure()["data"][0]["lat"].as_array().map(Vec::len), Some(0));
    }
}

#[test]
fn render_is_idempotent() {
    let table = table();
    let view = MapView::with_access_token("pk.test");
    let selection = Selection::new("Rape", "2010");
    let first = render(&table, &selection, &view).unwrap();
    let second = render(&table, &selection, &view).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.figure(), second.figure());
    assert_eq!(table.height(), 9);
}

#[test]
fn figure_carries_encodings_and_view() {
    let spec = render(
        &table(),
        &Selection::new("Violent crime", "2010"),
        &MapView::with_access_token("pk.test"),
    )
    .unwrap();
    let fig = spec.figure();

    let trace = &fig["data"][0];
    assert_eq!(trace["type"], "scattermapbox");
    assert_eq!(trace["lat"].as_array().map(Vec::len), Some(2));
    assert_eq!(trace["marker"]["sizemode"], "area");
    assert_eq!(trace["marker"]["coloraxis"], "coloraxis");
    assert!(trace["hovertemplate"].as_str().unwrap().contains("population"));

    let hover: Vec<&str> = trace["hovertext"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    let colors: Vec<f64> = trace["marker"]["color"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_f64())
        .collect();
    for (city, color) in hover.iter().zip(&colors) {
        let point = spec.points.iter().find(|p| p.city == *city).unwrap();
        assert_eq!(point.number_crimes, Some(*color));
    }

    let layout = &fig["layout"];
    assert_eq!(layout["hovermode"], "closest");
    assert_eq!(layout["coloraxis"]["colorbar"]["title"]["text"], COLOR_LABEL);
    assert_eq!(layout["mapbox"]["accesstoken"], "pk.test");
    assert_eq!(layout["mapbox"]["center"]["lat"], 37.0);
    assert_eq!(layout["mapbox"]["center"]["lon"], -100.0);
    assert_eq!(layout["mapbox"]["zoom"], 3.8);
}
