/// Visualization module: geographic scatter of the selected crime figures.
///
/// `render` filters the prepared table down to one crime category and one
/// year and collects the points. `PlotSpec::figure` turns those points into a
/// plotly `scattermapbox` figure; `dashboard_html` emits the page shell whose
/// inline JS (dashboard.js) fetches figures and hands them to plotly.js.
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::DashboardError;
use crate::model::{CrimeTable, Selection};
use crate::schema::{prepared, raw};

const DASHBOARD_JS: &str = include_str!("dashboard.js");
const PLOTLY_JS_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

pub const TITLE: &str = "Crime in the 10 major cities of USA, 2005-2019";
pub const DESCRIPTION: &str = "This dashboard shows the prevalence of crime in the 10 major cities of \
USA from 2005 to 2019. It also shows an index that reflects upon a sentiment analysis from twitter \
during this period.";
pub const CRIME_PLACEHOLDER: &str = "Select a type of crime/Twitter index";
pub const YEAR_PLACEHOLDER: &str = "Select a year";
pub const COLOR_LABEL: &str = "Number of crimes/Twitter index";

/// plotly's cyclical "IceFire" scale.
const ICE_FIRE: [&str; 17] = [
    "#000000", "#001f4d", "#003786", "#0e58a8", "#217eb8", "#30a4ca", "#54c8df", "#9be4ef",
    "#e1e9d1", "#f3d573", "#e7b000", "#da8200", "#c65400", "#ac2301", "#820000", "#4c0000",
    "#000000",
];

// ── Config ──────────────────────────────────────────────────────────────────

/// Fixed view parameters for the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
    /// Tile provider credential. Passed through untouched.
    pub access_token: String,
    /// Marker diameter, in pixels, of the most populous city.
    pub size_max: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center_lat: 37.0,
            center_lon: -100.0,
            zoom: 3.8,
            bearing: 0.0,
            pitch: 0.0,
            access_token: String::new(),
            size_max: 70.0,
        }
    }
}

impl MapView {
    pub fn with_access_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Self::default()
        }
    }
}

// ── Plot spec ───────────────────────────────────────────────────────────────

/// One city on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub city: String,
    pub population: Option<f64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub number_crimes: Option<f64>,
}

/// Everything needed to draw one state of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSpec {
    pub selection: Selection,
    pub points: Vec<MapPoint>,
    pub view: MapView,
}

impl PlotSpec {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Area-mode marker scale so the largest population maps to `size_max`.
    pub fn sizeref(&self) -> f64 {
        let max = self
            .points
            .iter()
            .filter_map(|p| p.population)
            .fold(f64::NEG_INFINITY, f64::max);
        if max.is_finite() && max > 0.0 {
            2.0 * max / (self.view.size_max * self.view.size_max)
        } else {
            1.0
        }
    }

    /// The plotly figure (`{"data": [...], "layout": {...}}`).
    pub fn figure(&self) -> Value {
        let lat: Vec<Option<f64>> = self.points.iter().map(|p| p.lat).collect();
        let lon: Vec<Option<f64>> = self.points.iter().map(|p| p.lng).collect();
        let size: Vec<Option<f64>> = self.points.iter().map(|p| p.population).collect();
        let color: Vec<Option<f64>> = self.points.iter().map(|p| p.number_crimes).collect();
        let hovertext: Vec<&str> = self.points.iter().map(|p| p.city.as_str()).collect();
        let customdata: Vec<[Option<f64>; 1]> =
            self.points.iter().map(|p| [p.population]).collect();

        let mut mapbox = json!({
            "accesstoken": self.view.access_token,
            "bearing": self.view.bearing,
            "center": { "lat": self.view.center_lat, "lon": self.view.center_lon },
            "pitch": self.view.pitch,
            "zoom": self.view.zoom,
        });
        // Mapbox-hosted styles need a token; fall back to OSM tiles without one
        if self.view.access_token.is_empty() {
            mapbox["style"] = json!("open-street-map");
        }

        json!({
            "data": [{
                "type": "scattermapbox",
                "mode": "markers",
                "name": "",
                "showlegend": false,
                "lat": lat,
                "lon": lon,
                "hovertext": hovertext,
                "customdata": customdata,
                "hovertemplate": hover_template(),
                "marker": {
                    "color": color,
                    "coloraxis": "coloraxis",
                    "size": size,
                    "sizemode": "area",
                    "sizeref": self.sizeref(),
                },
            }],
            "layout": {
                "hovermode": "closest",
                "legend": { "itemsizing": "constant", "tracegroupgap": 0 },
                "margin": { "t": 20, "l": 0, "r": 0, "b": 0 },
                "coloraxis": {
                    "colorscale": color_scale(),
                    "colorbar": { "title": { "text": COLOR_LABEL } },
                },
                "mapbox": mapbox,
            },
        })
    }
}

fn hover_template() -> String {
    format!(
        "<b>%{{hovertext}}</b><br><br>{lat}=%{{lat}}<br>{lng}=%{{lon}}<br>\
         {population}=%{{customdata[0]}}<br>{label}=%{{marker.color}}<extra></extra>",
        lat = raw::LAT,
        lng = raw::LNG,
        population = raw::POPULATION,
        label = COLOR_LABEL,
    )
}

fn color_scale() -> Vec<(f64, &'static str)> {
    let last = (ICE_FIRE.len() - 1) as f64;
    ICE_FIRE
        .iter()
        .enumerate()
        .map(|(i, color)| (i as f64 / last, *color))
        .collect()
}

// ── Rendering ───────────────────────────────────────────────────────────────

/// Filter the table to the selection and collect the map points.
///
/// Unset or unknown selections give a spec with no points. The table is only
/// read, so repeated calls with the same arguments return equal specs.
pub fn render(
    table: &CrimeTable,
    selection: &Selection,
    view: &MapView,
) -> Result<PlotSpec, DashboardError> {
    let filtered = table.select(selection)?;
    let points = extract_points(&filtered)?;
    Ok(PlotSpec {
        selection: selection.clone(),
        points,
        view: view.clone(),
    })
}

fn extract_points(df: &polars::prelude::DataFrame) -> Result<Vec<MapPoint>, DashboardError> {
    let cities = df.column(raw::CITY)?.str()?;
    let population = df.column(raw::POPULATION)?.f64()?;
    let lat = df.column(raw::LAT)?.f64()?;
    let lng = df.column(raw::LNG)?.f64()?;
    let number_crimes = df.column(prepared::NUMBER_CRIMES)?.f64()?;

    let points = (0..df.height())
        .map(|i| MapPoint {
            city: cities.get(i).unwrap_or("").to_string(),
            population: population.get(i),
            lat: lat.get(i),
            lng: lng.get(i),
            number_crimes: number_crimes.get(i),
        })
        .collect();
    Ok(points)
}

// ── HTML generation ─────────────────────────────────────────────────────────

/// The dashboard page: heading, description, two dropdowns and the map region.
///
/// Dropdown options are embedded as JSON; dashboard.js fills the selects and
/// requests `/api/figure` on every change.
pub fn dashboard_html(table: &CrimeTable) -> Result<String, DashboardError> {
    let boot = json!({
        "crimeTypes": table.crime_types()?,
        "years": table.years()?,
        "crimePlaceholder": CRIME_PLACEHOLDER,
        "yearPlaceholder": YEAR_PLACEHOLDER,
        "figureUrl": "/api/figure",
    });
    // Keep "</script>" inside a string from closing the tag
    let boot_json = boot.to_string().replace("</", "<\\/");

    let html = format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <script src="{plotly_url}"></script>
</head>
<body style="margin:8px;">
  <h1 style="color:black; font-weight:bold; font-family:Arial; font-size:250%; text-align:center;">{title}</h1>
  <p style="font-size:120%; font-family:Arial;">{description}</p>
  <div style="width:50%; margin-bottom:4px;"><select id="crime_dropdown" style="width:100%;"></select></div>
  <div style="width:40%; margin-bottom:4px;"><select id="year_dropdown" style="width:100%;"></select></div>
  <div id="graph_output" style="padding-bottom:2px; padding-left:2px; height:90vh;"></div>
<script>
const DASHBOARD = {boot_json};
{dashboard_js}
</script>
</body>
</html>
"##,
        title = TITLE,
        plotly_url = PLOTLY_JS_URL,
        description = DESCRIPTION,
        boot_json = boot_json,
        dashboard_js = DASHBOARD_JS,
    );

    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(city: &str, population: Option<f64>) -> MapPoint {
        MapPoint {
            city: city.to_string(),
            population,
            lat: Some(41.8),
            lng: Some(-87.6),
            number_crimes: Some(10.0),
        }
    }

    fn spec(points: Vec<MapPoint>) -> PlotSpec {
        PlotSpec {
            selection: Selection::default(),
            points,
            view: MapView::default(),
        }
    }

    #[test]
    fn sizeref_scales_largest_population_to_size_max() {
        let s = spec(vec![point("A", Some(2_450.0)), point("B", Some(100.0))]);
        assert!((s.sizeref() - 2.0 * 2_450.0 / 4_900.0).abs() < 1e-12);
    }

    #[test]
    fn sizeref_falls_back_without_population() {
        assert_eq!(spec(vec![]).sizeref(), 1.0);
        assert_eq!(spec(vec![point("A", None)]).sizeref(), 1.0);
    }

    #[test]
    fn color_scale_spans_unit_interval() {
        let scale = color_scale();
        assert_eq!(scale.len(), ICE_FIRE.len());
        assert_eq!(scale.first().map(|s| s.0), Some(0.0));
        assert_eq!(scale.last().map(|s| s.0), Some(1.0));
    }

    #[test]
    fn osm_style_only_without_token() {
        let mut s = spec(vec![]);
        assert_eq!(s.figure()["layout"]["mapbox"]["style"], "open-street-map");

        s.view = MapView::with_access_token("pk.abc");
        let fig = s.figure();
        assert!(fig["layout"]["mapbox"].get("style").is_none());
        assert_eq!(fig["layout"]["mapbox"]["accesstoken"], "pk.abc");
    }
}
