use super::models;
use ammonia::clean;
use std::fmt::Write;

pub trait Component {
    /// Render the component to a HTML string. By convention, the
    /// implementation should sanitize all string properties at render-time
    fn render(&self) -> String;
}

pub struct Page<'a> {
    pub title: String,
    pub children: Box<dyn Component + 'a>,
}

impl Component for Page<'_> {
    fn render(&self) -> String {
        let styles = include_str!("./styles.css");
        format!(
            r#"
            <html lang="en">
                <head>
                    <meta charset="UTF-8">
                    <meta name="viewport" content="width=device-width, initial-scale=1.0"></meta>
                    <title>{title}</title>
                    <style>
                        {styles}
                    </style>
                </head>
                <body>
                    {body_html}
                </body>
            </html>
            "#,
            styles = styles,
            title = clean(&self.title),
            body_html = self.children.render()
        )
    }
}

/// The landing page: submission form (or outcome of the submission we are
/// responding to) on the left, property listing on the right.
pub struct Home<'a> {
    pub error: Option<String>,
    pub created: Option<&'a models::Property>,
    /// Re-populate the form with the rejected values after a failed submit.
    pub form_name: String,
    pub form_address: String,
    pub properties: &'a [models::PropertySummary],
}

impl Component for Home<'_> {
    fn render(&self) -> String {
        let error_html = match &self.error {
            Some(msg) => ErrorBanner { message: msg }.render(),
            None => "".to_string(),
        };
        let content = if let Some(property) = self.created {
            PropertyDetails { property }.render()
        } else {
            PropertyForm {
                name: &self.form_name,
                address: &self.form_address,
            }
            .render()
        };
        let sidebar = PropertySidebar {
            properties: self.properties,
        }
        .render();
        format!(
            r#"
            <div class="main-content">
                <div class="container">
                    <div class="header">
                        <h1>🏠 Brokerio</h1>
                        <p>Add and enrich property information</p>
                    </div>
                    <div class="content">
                        {error_html}
                        {content}
                    </div>
                </div>
            </div>
            {sidebar}
            "#
        )
    }
}

pub struct ErrorBanner<'a> {
    pub message: &'a str,
}

impl Component for ErrorBanner<'_> {
    fn render(&self) -> String {
        format!(
            r#"<div class="error"><strong>Error:</strong> {}</div>"#,
            clean(self.message)
        )
    }
}

pub struct PropertyForm<'a> {
    pub name: &'a str,
    pub address: &'a str,
}

impl Component for PropertyForm<'_> {
    fn render(&self) -> String {
        format!(
            r#"
            <form method="POST" action="/">
                <div class="form-group">
                    <label for="name">Property Name</label>
                    <input
                        type="text"
                        id="name"
                        name="name"
                        placeholder="e.g., Downtown Office Building"
                        value="{name}"
                        required
                    >
                </div>
                <div class="form-group">
                    <label for="address">Address</label>
                    <input
                        type="text"
                        id="address"
                        name="address"
                        placeholder="e.g., 123 Main St, New York, NY 10001"
                        value="{address}"
                        required
                    >
                </div>
                <button type="submit">Add Property</button>
            </form>
            "#,
            name = clean(self.name),
            address = clean(self.address)
        )
    }
}

pub struct PropertyDetails<'a> {
    pub property: &'a models::Property,
}

impl Component for PropertyDetails<'_> {
    fn render(&self) -> String {
        let p = self.property;
        let mut rows = String::new();
        let mut row = |label: &str, value: &str| {
            write!(
                rows,
                r#"
                <div class="detail-row">
                    <span class="detail-label">{label}:</span>
                    <span class="detail-value">{value}</span>
                </div>
                "#,
                label = label,
                value = clean(value)
            )
            .expect("can write to string");
        };
        row("ID", &p.id.to_string());
        row("Name", &p.name);
        row("Address", &p.address);
        row("Latitude", &p.latitude.to_string());
        row("Longitude", &p.longitude.to_string());
        if let Some(extra) = &p.extra_field {
            let confidence = extra
                .confidence
                .map_or("N/A".to_string(), |c| c.to_string());
            row("Confidence Score", &confidence);
            row("Location Type", extra.r#type.as_deref().unwrap_or("N/A"));
        }
        row("Created", &p.created_at.format("%Y-%m-%d %H:%M:%S").to_string());

        format!(
            r#"
            <div class="success">
                <strong>Success!</strong> Property has been saved successfully.
            </div>
            <div class="property-details">
                <h2>Property Details</h2>
                {rows}
                <a href="/map?id={id}" class="map-link">🗺️ View on Map</a>
                <br>
                <a href="/" class="back-link">← Add Another Property</a>
            </div>
            "#,
            rows = rows,
            id = p.id
        )
    }
}

pub struct PropertySidebar<'a> {
    pub properties: &'a [models::PropertySummary],
}

impl Component for PropertySidebar<'_> {
    fn render(&self) -> String {
        let listing = if self.properties.is_empty() {
            r#"<div class="empty-properties">No properties yet</div>"#
                .to_string()
        } else {
            self.properties
                .iter()
                .map(|p| {
                    format!(
                        r#"
                        <div class="property-item">
                            <a href="/map?id={id}">{name}</a>
                        </div>
                        "#,
                        id = p.id,
                        name = clean(&p.name)
                    )
                })
                .collect::<Vec<String>>()
                .join("")
        };
        format!(
            r#"
            <div class="sidebar">
                <div class="properties-card">
                    <div class="properties-card-header">
                        My Properties
                    </div>
                    <div class="properties-list">
                        {listing}
                    </div>
                </div>
            </div>
            "#
        )
    }
}

/// The map view shell. Everything dynamic on this page (marker, info card,
/// notes) is rendered client-side by `/static/map.js` from the JSON API.
pub struct MapPage;

impl Component for MapPage {
    fn render(&self) -> String {
        let styles = include_str!("./styles.css");
        format!(
            r#"
            <html lang="en">
                <head>
                    <meta charset="UTF-8">
                    <meta name="viewport" content="width=device-width, initial-scale=1.0"></meta>
                    <title>Property Map - Brokerio</title>
                    <link
                        rel="stylesheet"
                        href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"
                    >
                    <style>
                        {styles}
                    </style>
                </head>
                <body>
                    <div class="map-page">
                        <div id="map"></div>
                        <div id="content">Loading property...</div>
                    </div>
                    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
                    <script src="/static/map.js"></script>
                </body>
            </html>
            "#,
            styles = styles
        )
    }
}
