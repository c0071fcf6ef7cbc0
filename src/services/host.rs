use std::sync::Arc;

use chrono::NaiveDate;

use crate::errors::WidgetError;
use crate::services::api::http::HttpBookingApi;
use crate::services::api::BookingApi;
use crate::services::style;
use crate::services::view::escape;
use crate::services::widget::BookingWidget;

#[derive(Debug, Clone)]
struct StyleElement {
    id: String,
    css: String,
}

#[derive(Debug, Clone)]
struct MountPoint {
    id: String,
    contents: String,
}

const PAGE_TITLE: &str = "Book an Appointment";

/// The host page a widget is embedded in: head styles, the elements a
/// widget can mount into, and trailing body scripts.
#[derive(Debug, Clone)]
pub struct HostDocument {
    origin: String,
    styles: Vec<StyleElement>,
    mount_points: Vec<MountPoint>,
    scripts: Vec<String>,
}

impl HostDocument {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            styles: Vec::new(),
            mount_points: Vec::new(),
            scripts: Vec::new(),
        }
    }

    pub fn with_mount_point(mut self, id: impl Into<String>) -> Self {
        self.add_mount_point(id);
        self
    }

    pub fn add_mount_point(&mut self, id: impl Into<String>) {
        let id = id.into();
        if self.mount_point(&id).is_none() {
            self.mount_points.push(MountPoint {
                id,
                contents: String::new(),
            });
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn mount_point(&self, id: &str) -> Option<&str> {
        self.mount_points
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.contents.as_str())
    }

    pub fn replace_contents(&mut self, id: &str, html: String) -> Result<(), WidgetError> {
        let mount = self
            .mount_points
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| WidgetError::MountPointNotFound(id.to_string()))?;
        mount.contents = html;
        Ok(())
    }

    pub fn has_style(&self, id: &str) -> bool {
        self.styles.iter().any(|s| s.id == id)
    }

    pub fn append_style(&mut self, id: &str, css: &str) {
        self.styles.push(StyleElement {
            id: id.to_string(),
            css: css.to_string(),
        });
    }

    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Appends an inline script to the end of the body.
    pub fn append_script(&mut self, js: &str) {
        // keep a literal `</script>` in the source from closing the element
        self.scripts.push(js.replace("</", "<\\/"));
    }

    pub fn to_html(&self) -> String {
        let styles: String = self
            .styles
            .iter()
            .map(|s| format!("<style id=\"{}\">{}</style>\n", escape(&s.id), s.css))
            .collect();
        let body: String = self
            .mount_points
            .iter()
            .map(|m| format!("<div id=\"{}\">{}</div>\n", escape(&m.id), m.contents))
            .collect();
        let scripts: String = self
            .scripts
            .iter()
            .map(|js| format!("<script>{js}</script>\n"))
            .collect();

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{PAGE_TITLE}</title>\n{styles}</head>\n<body>\n{body}{scripts}</body>\n</html>\n"
        )
    }
}

/// Mounts a booking widget into `mount_point_id`, talking to the API at
/// `api_base_url` (the document origin when `None`).
///
/// A missing mount point is logged and leaves the document untouched.
pub fn init(
    document: &mut HostDocument,
    mount_point_id: &str,
    api_base_url: Option<&str>,
) -> Option<BookingWidget> {
    let base_url = api_base_url
        .filter(|u| !u.is_empty())
        .unwrap_or(document.origin())
        .to_string();
    let api: Arc<dyn BookingApi> = Arc::new(HttpBookingApi::new(base_url));
    let today = chrono::Local::now().date_naive();
    init_with_api(document, mount_point_id, api, today)
}

pub fn init_with_api(
    document: &mut HostDocument,
    mount_point_id: &str,
    api: Arc<dyn BookingApi>,
    today: NaiveDate,
) -> Option<BookingWidget> {
    if document.mount_point(mount_point_id).is_none() {
        tracing::error!(
            mount_point = mount_point_id,
            "{}",
            WidgetError::MountPointNotFound(mount_point_id.to_string())
        );
        return None;
    }

    if style::inject(document) {
        tracing::debug!("injected booking widget stylesheet");
    }

    let widget = BookingWidget::new(api, mount_point_id, today);
    if let Err(e) = widget.render_into(document) {
        tracing::error!(error = %e, "failed to render booking widget");
        return None;
    }

    tracing::info!(mount_point = mount_point_id, "booking widget mounted");
    Some(widget)
}
