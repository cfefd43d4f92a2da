//! HTML pages of the browser form
//!
//! Plain string rendering; every dynamic value goes through [`escape`].

use crate::dto::vehicle_dto::VehicleForm;
use crate::models::{Vehicle, VehicleStatus};

/// Percent-encode an id for use as one path segment, then escape it for an attribute
pub fn path_segment(id: &str) -> String {
    escape(&urlencoding::encode(id))
}

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = escape(title),
        body = body,
    )
}

fn error_banner(error: Option<&str>) -> String {
    match error {
        Some(message) => format!("<p class=\"error\" role=\"alert\">{}</p>\n", escape(message)),
        None => String::new(),
    }
}

pub fn index(vehicles: &[Vehicle], filter: Option<&str>) -> String {
    let mut options = String::from("<option value=\"\">all</option>");
    for status in VehicleStatus::ALL {
        let selected = if filter == Some(status.as_str()) { " selected" } else { "" };
        options.push_str(&format!(
            "<option value=\"{0}\"{1}>{0}</option>",
            status.as_str(),
            selected
        ));
    }

    let mut rows = String::new();
    for vehicle in vehicles {
        let id = escape(&vehicle.id);
        let segment = path_segment(&vehicle.id);
        rows.push_str(&format!(
            "<tr><td>{id}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"/edit/{segment}\">edit</a> \
             <form method=\"post\" action=\"/delete/{segment}\" style=\"display:inline\">\
             <button type=\"submit\">delete</button></form></td></tr>\n",
            escape(&vehicle.plate),
            escape(&vehicle.model),
            vehicle.year,
            vehicle.mileage,
            vehicle.status,
            escape(&vehicle.notes),
            vehicle
                .updated_on
                .map(|d| d.to_string())
                .unwrap_or_default(),
        ));
    }

    let table = if vehicles.is_empty() {
        "<p>No vehicles found.</p>".to_string()
    } else {
        format!(
            "<table>\n<tr><th>ID</th><th>Plate</th><th>Model</th><th>Year</th><th>Mileage</th>\
             <th>Status</th><th>Notes</th><th>Updated</th><th></th></tr>\n{rows}</table>"
        )
    };

    page(
        "Fleet",
        &format!(
            "<form method=\"get\" action=\"/\"><select name=\"status\">{options}</select>\
             <button type=\"submit\">filter</button></form>\n\
             <p><a href=\"/add\">Add vehicle</a></p>\n{table}"
        ),
    )
}

/// Add form when `editing` is `None`, edit form for that id otherwise
pub fn vehicle_form(values: &VehicleForm, editing: Option<&str>, error: Option<&str>) -> String {
    let (title, action, id_input) = match editing {
        Some(id) => (
            "Edit vehicle",
            format!("/edit/{}", path_segment(id)),
            format!("<p>ID: {}</p>", escape(id)),
        ),
        None => (
            "Add vehicle",
            "/add".to_string(),
            format!(
                "<label>ID <input name=\"id\" value=\"{}\"></label><br>",
                escape(&values.id)
            ),
        ),
    };

    let current = if values.status.is_empty() {
        VehicleStatus::default().as_str()
    } else {
        values.status.as_str()
    };
    let mut options = String::new();
    for status in VehicleStatus::ALL {
        let selected = if current == status.as_str() { " selected" } else { "" };
        options.push_str(&format!(
            "<option value=\"{0}\"{1}>{0}</option>",
            status.as_str(),
            selected
        ));
    }

    let body = format!(
        "{error}<form method=\"post\" action=\"{action}\">\n{id_input}\n\
         <label>Plate <input name=\"plate\" value=\"{plate}\"></label><br>\n\
         <label>Model <input name=\"model\" value=\"{model}\"></label><br>\n\
         <label>Year <input name=\"year\" value=\"{year}\"></label><br>\n\
         <label>Mileage <input name=\"mileage\" value=\"{mileage}\"></label><br>\n\
         <label>Status <select name=\"status\">{options}</select></label><br>\n\
         <label>Notes <textarea name=\"notes\">{notes}</textarea></label><br>\n\
         <button type=\"submit\">Save</button>\n</form>\n<p><a href=\"/\">Back</a></p>",
        error = error_banner(error),
        plate = escape(&values.plate),
        model = escape(&values.model),
        year = escape(&values.year),
        mileage = escape(&values.mileage),
        notes = escape(&values.notes),
    );

    page(title, &body)
}

pub fn error_page(message: &str) -> String {
    page(
        "Error",
        &format!("{}<p><a href=\"/\">Back</a></p>", error_banner(Some(message))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleDraft;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"R&D\"</b>"), "&lt;b&gt;&quot;R&amp;D&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_reserved_characters_in_ids_are_percent_encoded() {
        assert_eq!(path_segment("FL/01"), "FL%2F01");
        assert_eq!(path_segment("a b?#%"), "a%20b%3F%23%25");

        let vehicle = VehicleDraft::new("FL/01", "ab1", "Panda", 2020, 10)
            .validate()
            .unwrap();
        let html = index(&[vehicle], None);
        assert!(html.contains("href=\"/edit/FL%2F01\""));
        assert!(html.contains("action=\"/delete/FL%2F01\""));
        assert!(html.contains("<td>FL/01</td>"));
    }

    #[test]
    fn test_index_escapes_notes_and_marks_filter() {
        let vehicle = VehicleDraft::new("V1", "ab1", "Panda", 2020, 10)
            .notes("<script>")
            .validate()
            .unwrap();
        let html = index(&[vehicle], Some("retired"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<option value=\"retired\" selected>"));
        assert!(html.contains("action=\"/delete/V1\""));
    }

    #[test]
    fn test_edit_form_keeps_values_and_error() {
        let values = VehicleForm {
            plate: "AB1".into(),
            status: "in_use".into(),
            ..Default::default()
        };
        let html = vehicle_form(&values, Some("V1"), Some("invalid year"));
        assert!(html.contains("action=\"/edit/V1\""));
        assert!(html.contains("value=\"AB1\""));
        assert!(html.contains("<option value=\"in_use\" selected>"));
        assert!(html.contains("invalid year"));
    }
}
