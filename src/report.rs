//! Static snapshots of the dashboard: a JSON data dump and an HTML page.

use std::fmt::Write;

use anyhow::Result;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::models::{Project, ProjectStatus, Settings};
use crate::photos::card_image;

#[derive(Serialize)]
struct Snapshot<'a> {
    projects: &'a [Project],
    settings: &'a Settings,
}

/// Pretty JSON `{ "projects": [...], "settings": {...} }`
pub fn export_json(projects: &[Project], settings: &Settings) -> Result<String> {
    Ok(serde_json::to_string_pretty(&Snapshot { projects, settings })?)
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn status_icon(status: &ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Ongoing => "fa-construction",
        ProjectStatus::Upcoming => "fa-calendar-plus",
        _ => "fa-check-circle",
    }
}

fn render_recent(catalog: &Catalog, status: &ProjectStatus) -> String {
    let label = status.as_str().to_lowercase();
    let icon = status_icon(status);
    let recent = catalog.recent(status);

    let mut html = format!(
        "<section class=\"recent\" id=\"{label}-projects\">\n<h3>{} Projects</h3>\n",
        status.as_str()
    );
    if recent.is_empty() {
        let _ = write!(
            html,
            r#"<div class="recent-item"><div class="recent-icon"><i class="fas {icon}"></i></div><div class="recent-info"><h4>No {label} projects yet</h4><p>Add your first {label} project</p></div></div>"#
        );
        html.push('\n');
    }
    for project in recent {
        let _ = writeln!(
            html,
            r#"<div class="recent-item" data-project-id="{}"><div class="recent-icon"><i class="fas {icon}"></i></div><div class="recent-info"><h4>{}</h4><p>{}</p></div></div>"#,
            escape_html(&project.id),
            escape_html(&project.name),
            escape_html(&project.location),
        );
    }
    html.push_str("</section>\n");
    html
}

fn render_card(project: &Project) -> String {
    let photo_count = project.photos.iter().filter(|p| !p.is_empty()).count();
    let gallery = if photo_count > 1 {
        format!("<span class=\"photo-count\">{} photos</span>", photo_count)
    } else {
        String::new()
    };

    format!(
        r#"<div class="property-card" data-project-id="{id}">
  <div class="property-image">
    <img src="{img}" alt="{name}">{gallery}
    <span class="property-status {class}">{status}</span>
  </div>
  <div class="property-content">
    <h3 class="property-title">{name}</h3>
    <div class="property-location"><i class="fas fa-map-marker-alt"></i> {location}</div>
    <p class="property-description">{description}</p>
  </div>
</div>
"#,
        id = escape_html(&project.id),
        img = escape_html(&card_image(project)),
        name = escape_html(&project.name),
        class = project.status.css_class(),
        status = escape_html(project.status.as_str()),
        location = escape_html(&project.location),
        description = escape_html(&project.description),
    )
}

/// Self-contained HTML page mirroring the dashboard and property list
pub fn render_dashboard_html(catalog: &Catalog, settings: &Settings, date: &str) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<header><h1>{company}</h1><p id="current-date">{date}</p><p class="contact">{email} &middot; {phone} &middot; {address}</p></header>
<div class="stats"><span>Total Projects</span><strong id="total-projects">{total}</strong></div>
"#,
        company = escape_html(&settings.company_name),
        date = escape_html(date),
        email = escape_html(&settings.contact_email),
        phone = escape_html(&settings.phone_number),
        address = escape_html(&settings.address),
        total = catalog.len(),
    );

    for status in ProjectStatus::ALL.iter() {
        body.push_str(&render_recent(catalog, status));
    }

    body.push_str("<div class=\"properties-grid\" id=\"properties-list\">\n");
    if catalog.is_empty() {
        body.push_str("<p id=\"no-properties\">No projects found</p>\n");
    }
    for project in catalog.projects() {
        body.push_str(&render_card(project));
    }
    body.push_str("</div>\n");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - Dashboard</title>
<style>
body {{ font-family: sans-serif; margin: 0 auto; max-width: 1100px; padding: 24px; color: #1f2937; }}
.recent-item, .property-card {{ border: 1px solid #e5e7eb; border-radius: 8px; padding: 12px; margin: 8px 0; }}
.properties-grid {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 16px; }}
.property-image img {{ width: 100%; height: 180px; object-fit: cover; }}
.status-ongoing {{ background: #10b981; color: white; }}
.status-upcoming {{ background: #3b82f6; color: white; }}
.status-finished {{ background: #6b7280; color: white; }}
</style>
</head>
<body>
{body}</body>
</html>
"#,
        title = escape_html(&settings.company_name),
        body = body,
    )
}
