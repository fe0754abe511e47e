//! The locator page: distance table, category filter, nearby table
//! and map.

use axum::{extract::State, response::Html};
use axum_extra::extract::Query;
use serde_json::json;
use shelterlens_common::error::ApiError;
use shelterlens_common::{Category, ReferencePoint};
use shelterlens_ingestion::SourceWarning;
use shelterlens_ranker::{RankedShelter, RankedShelters, RankingQuery, METRES_PER_MILE};

use crate::filter::ShelterFilter;
use crate::state::SharedState;

pub const MAP_ZOOM: u8 = 14;
const REFERENCE_COLOR: &str = "purple";
const SHELTER_COLOR: &str = "green";
const RADIUS_COLOR: &str = "blue";
const NO_DATA_MESSAGE: &str = "Shelter data could not be processed.";

/// GET /: Render the locator page
pub async fn dashboard(
    State(state): State<SharedState>,
    Query(filter): Query<ShelterFilter>,
) -> Result<Html<String>, ApiError> {
    let query = filter.to_query(state.config.ranking.threshold_miles)?;
    let snapshot = state.rank(&query).await;
    Ok(Html(render_dashboard(
        state.pipeline.reference(),
        &query,
        &snapshot.ranked,
        &snapshot.warnings,
    )))
}

pub fn render_dashboard(
    reference: &ReferencePoint,
    query: &RankingQuery,
    ranked: &RankedShelters,
    warnings: &[SourceWarning],
) -> String {
    let place = escape_html(&reference.name);
    let radius = query.threshold_miles;

    let mut notices = String::new();
    for w in warnings {
        notices.push_str(&format!(r#"<div class="notice notice-error">{}</div>"#, escape_html(&w.to_string())));
    }
    for d in &ranked.diagnostics {
        notices.push_str(&format!(r#"<div class="notice notice-warn">{}</div>"#, escape_html(&d.to_string())));
    }

    let all_rows: String = if ranked.all.is_empty() {
        r#"<tr><td colspan="3" class="muted">No shelters found.</td></tr>"#.to_string()
    } else {
        ranked.all.iter().map(|r| format!(
            "<tr><td>{}</td><td>{}</td><td class=\"num\">{}</td></tr>",
            escape_html(&r.shelter.name),
            escape_html(r.shelter.category.label()),
            r.distance_label(),
        )).collect()
    };

    let nearby_section = if ranked.is_empty() {
        format!(r#"<div class="notice notice-error">{}</div>"#, NO_DATA_MESSAGE)
    } else {
        let rows: String = ranked.nearby.iter().map(|r| format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"num\">{}</td></tr>",
            escape_html(&r.shelter.name),
            escape_html(r.shelter.category.label()),
            escape_html(&r.shelter.address),
            r.distance_label(),
        )).collect();
        format!(r#"
    <table>
        <thead><tr><th>Name</th><th>Category</th><th>Address</th><th>Distance</th></tr></thead>
        <tbody>{}</tbody>
    </table>
    <div id="map"></div>
    <script>
    (function () {{
        const data = {};
        const map = L.map('map').setView([data.reference.lat, data.reference.lon], data.zoom);
        L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
            maxZoom: 19,
            attribution: '&copy; OpenStreetMap contributors'
        }}).addTo(map);
        L.circle([data.reference.lat, data.reference.lon], {{
            radius: data.radius_m, color: data.colors.radius, fillColor: data.colors.radius, fillOpacity: 0.1
        }}).addTo(map);
        L.circleMarker([data.reference.lat, data.reference.lon], {{
            radius: 9, color: data.colors.reference, fillColor: data.colors.reference, fillOpacity: 0.9
        }}).bindPopup(data.reference.name).addTo(map);
        for (const s of data.shelters) {{
            L.circleMarker([s.lat, s.lon], {{
                radius: 7, color: data.colors.shelter, fillColor: data.colors.shelter, fillOpacity: 0.8
            }}).bindPopup(s.name + ' (' + s.category + ')').addTo(map);
        }}
    }})();
    </script>"#, rows, map_data_json(reference, radius, &ranked.nearby))
    };

    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Homeless Shelter Locator Near {place}</title>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous">
    <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"></script>
    <style>
        body {{ font-family: system-ui, sans-serif; margin: 0 auto; max-width: 1100px; padding: 1.5rem; color: #1f2933; }}
        table {{ border-collapse: collapse; width: 100%; margin-bottom: 1.5rem; }}
        th, td {{ border-bottom: 1px solid #e4e7eb; padding: 0.4rem 0.6rem; text-align: left; }}
        td.num {{ text-align: right; white-space: nowrap; }}
        .muted {{ color: #7b8794; }}
        .notice {{ border-radius: 4px; padding: 0.6rem 0.8rem; margin-bottom: 0.5rem; }}
        .notice-error {{ background: #fde8e8; color: #9b1c1c; }}
        .notice-warn {{ background: #fdf6b2; color: #723b13; }}
        #map {{ height: 520px; border-radius: 6px; }}
        form {{ margin-bottom: 1.5rem; }}
        select {{ min-width: 320px; min-height: 8rem; }}
    </style>
</head>
<body>
    <h1>Homeless Shelter Locator Near {place}</h1>
    {notices}
    <h2>Distances to {place}</h2>
    <table>
        <thead><tr><th>Name</th><th>Category</th><th>Distance</th></tr></thead>
        <tbody>{all_rows}</tbody>
    </table>
    {form}
    <h2>Shelters Within {radius} Miles of {place}</h2>
    {nearby_section}
</body>
</html>"#,
        place = place,
        notices = notices,
        all_rows = all_rows,
        form = render_category_form(&ranked.categories, query),
        radius = radius,
        nearby_section = nearby_section,
    )
}

fn render_category_form(categories: &[Category], query: &RankingQuery) -> String {
    let options: String = categories.iter().map(|c| {
        let selected = match query.categories {
            Some(ref allowed) => allowed.contains(c),
            None => true,
        };
        format!(
            r#"<option value="{0}"{1}>{0}</option>"#,
            escape_html(c.label()),
            if selected { " selected" } else { "" },
        )
    }).collect();

    format!(r#"<form method="get" action="/">
        <label for="category">Select categories to display:</label><br>
        <select id="category" name="category" multiple>{}</select>
        <input type="hidden" name="applied" value="1">
        <input type="hidden" name="radius" value="{}">
        <button type="submit">Apply</button>
    </form>"#, options, query.threshold_miles)
}

/// Map payload for the inline script. `</` is escaped so a shelter name
/// cannot close the script element.
fn map_data_json(reference: &ReferencePoint, radius_miles: f64, shelters: &[RankedShelter]) -> String {
    let markers: Vec<_> = shelters
        .iter()
        .filter(|r| r.shelter.position != reference.position)
        .map(|r| json!({
            "name": r.shelter.name,
            "category": r.shelter.category.label(),
            "lat": r.shelter.position.latitude,
            "lon": r.shelter.position.longitude,
        }))
        .collect();

    let data = json!({
        "reference": {
            "name": reference.name,
            "lat": reference.position.latitude,
            "lon": reference.position.longitude,
        },
        "radius_m": radius_miles * METRES_PER_MILE,
        "zoom": MAP_ZOOM,
        "colors": {
            "reference": REFERENCE_COLOR,
            "shelter": SHELTER_COLOR,
            "radius": RADIUS_COLOR,
        },
        "shelters": markers,
    });
    data.to_string().replace("</", "<\\/")
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
