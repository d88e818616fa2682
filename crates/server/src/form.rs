//! The single-page prediction form
//!
//! Rendering is plain string building: one page with the numeric inputs, an
//! optional block of categorical selects toggled by a checkbox, and the output
//! areas for the warning, result and error.

use pricer_lib::models::{
    clamp_cylinders, clamp_mileage, clamp_year, UserInputs, CYLINDERS_RANGE, DEFAULT_CYLINDERS,
    DEFAULT_MILEAGE, DEFAULT_YEAR, MILEAGE_RANGE, YEAR_RANGE,
};
use pricer_lib::reconcile::FeatureReconciler;
use pricer_lib::PriceOutcome;
use std::collections::HashMap;
use std::fmt::Write;
use tracing::warn;

/// Option value meaning "apply nothing for this group"
pub const LEAVE_AS_DEFAULT: &str = "";
const LEAVE_AS_DEFAULT_LABEL: &str = "(leave as default)";

/// Form field prefix for categorical selects
const GROUP_FIELD_PREFIX: &str = "group.";
const SHOW_CATEGORICAL_FIELD: &str = "show_categorical";

/// A parsed form submission
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub inputs: UserInputs,
    pub show_categorical: bool,
}

impl FormSubmission {
    /// Parse raw form fields.
    ///
    /// Out-of-range numbers are clamped; unparseable ones fall back to the
    /// defaults. Categorical selections only count while the checkbox is on.
    pub fn parse(fields: &HashMap<String, String>) -> Self {
        let show_categorical = fields
            .get(SHOW_CATEGORICAL_FIELD)
            .is_some_and(|v| matches!(v.as_str(), "on" | "true" | "1"));

        let mut inputs = UserInputs::new(
            parse_number(fields, "year").map_or(DEFAULT_YEAR, clamp_year),
            parse_number(fields, "mileage").map_or(DEFAULT_MILEAGE, clamp_mileage),
            parse_number(fields, "cylinders").map_or(DEFAULT_CYLINDERS, clamp_cylinders),
        );

        if show_categorical {
            for (field, value) in fields {
                let Some(group) = field.strip_prefix(GROUP_FIELD_PREFIX) else {
                    continue;
                };
                if value != LEAVE_AS_DEFAULT {
                    inputs.selections.insert(group.to_string(), value.clone());
                }
            }
        }

        Self {
            inputs,
            show_categorical,
        }
    }
}

/// Parse a numeric field; rounding and clamping happen afterwards
fn parse_number(fields: &HashMap<String, String>, name: &str) -> Option<f64> {
    let raw = fields.get(name)?.trim();
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            warn!(field = name, value = raw, "Unparseable form value, using default");
            None
        }
    }
}

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
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

/// Render the full page
pub fn render_page(
    reconciler: &FeatureReconciler,
    submission: &FormSubmission,
    outcome: Option<&PriceOutcome>,
) -> String {
    let inputs = &submission.inputs;
    let mut body = String::new();

    body.push_str("<h1>Vehicle Price Prediction</h1>\n");

    if let Some(warning) = reconciler.schema().warning() {
        let _ = writeln!(body, "<div class=\"warning\">{}</div>", escape_html(&warning));
    }

    body.push_str("<form method=\"post\" action=\"/predict\">\n");
    number_input(&mut body, "year", "Year", inputs.year as i64, *YEAR_RANGE.start() as i64, *YEAR_RANGE.end() as i64);
    number_input(&mut body, "mileage", "Mileage", inputs.mileage as i64, *MILEAGE_RANGE.start() as i64, *MILEAGE_RANGE.end() as i64);
    number_input(&mut body, "cylinders", "Cylinders", inputs.cylinders as i64, *CYLINDERS_RANGE.start() as i64, *CYLINDERS_RANGE.end() as i64);

    let groups = reconciler.selectable_groups();
    if !groups.is_empty() {
        let _ = writeln!(
            body,
            "<input type=\"checkbox\" id=\"{SHOW_CATEGORICAL_FIELD}\" name=\"{SHOW_CATEGORICAL_FIELD}\"{}>\
             <label for=\"{SHOW_CATEGORICAL_FIELD}\">Show categorical options</label>",
            if submission.show_categorical { " checked" } else { "" }
        );
        body.push_str("<div class=\"categorical\">\n");
        for group in groups {
            let chosen = inputs.selections.get(&group.key);
            let field = format!("{GROUP_FIELD_PREFIX}{}", group.key);
            let _ = writeln!(
                body,
                "<label>{}<select name=\"{}\">",
                escape_html(&group.key),
                escape_html(&field)
            );
            let _ = writeln!(
                body,
                "<option value=\"{LEAVE_AS_DEFAULT}\">{LEAVE_AS_DEFAULT_LABEL}</option>"
            );
            for (name, _) in &group.members {
                let selected = if chosen == Some(name) { " selected" } else { "" };
                let _ = writeln!(
                    body,
                    "<option value=\"{}\"{selected}>{}</option>",
                    escape_html(name),
                    escape_html(group.label_of(name))
                );
            }
            body.push_str("</select></label>\n");
        }
        body.push_str("</div>\n");
    }

    body.push_str("<button type=\"submit\">Predict Price</button>\n</form>\n");

    match outcome {
        Some(PriceOutcome::Success { display, info, .. }) => {
            let _ = writeln!(body, "<div class=\"success\">{}</div>", escape_html(display));
            let _ = writeln!(body, "<div class=\"info\">{}</div>", escape_html(info));
        }
        Some(PriceOutcome::Failure {
            message,
            remediation,
            ..
        }) => {
            let _ = writeln!(body, "<div class=\"error\">{}</div>", escape_html(message));
            body.push_str("<div class=\"info\">Suggestions:<ul>\n");
            for step in remediation {
                let _ = writeln!(body, "<li>{}</li>", escape_html(step));
            }
            body.push_str("</ul></div>\n");
        }
        None => {}
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Vehicle Price Prediction</title>\n<style>{STYLE}</style>\n</head>\n\
         <body>\n{body}</body>\n</html>\n"
    )
}

fn number_input(out: &mut String, name: &str, label: &str, value: i64, min: i64, max: i64) {
    let _ = writeln!(
        out,
        "<label for=\"{name}\">{label}</label>\
         <input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"1\" value=\"{value}\">"
    );
}

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto}\
label{display:block;margin-top:.75rem}\
input[type=number],select{width:100%}\
#show_categorical:not(:checked)~.categorical{display:none}\
.warning{background:#fff3cd;padding:.5rem}\
.success{background:#d1e7dd;padding:.5rem;margin-top:1rem}\
.info{background:#cff4fc;padding:.5rem;margin-top:.5rem}\
.error{background:#f8d7da;padding:.5rem;margin-top:1rem}\
button{margin-top:1rem}";

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_lib::reconcile::{CountSource, ModelSchema};

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn reconciler(names: &[&str], count_source: CountSource) -> FeatureReconciler {
        FeatureReconciler::new(ModelSchema {
            feature_names: names.iter().map(|n| Some(n.to_string())).collect(),
            expected_count: names.len().max(3),
            count_source,
        })
    }

    #[test]
    fn test_parse_defaults_and_clamping() {
        let parsed = FormSubmission::parse(&fields(&[]));
        assert_eq!(parsed.inputs, UserInputs::default());
        assert!(!parsed.show_categorical);

        let parsed = FormSubmission::parse(&fields(&[
            ("year", "2099"),
            ("mileage", "-5"),
            ("cylinders", "6.0"),
        ]));
        assert_eq!(parsed.inputs.year, 2025);
        assert_eq!(parsed.inputs.mileage, 0);
        assert_eq!(parsed.inputs.cylinders, 6);

        let parsed = FormSubmission::parse(&fields(&[("year", "abc"), ("mileage", "")]));
        assert_eq!(parsed.inputs.year, DEFAULT_YEAR);
        assert_eq!(parsed.inputs.mileage, DEFAULT_MILEAGE);
    }

    #[test]
    fn test_selections_require_checkbox() {
        let raw = [
            ("group.color", "color_blue"),
            ("group.fuel", LEAVE_AS_DEFAULT),
        ];
        let parsed = FormSubmission::parse(&fields(&raw));
        assert!(parsed.inputs.selections.is_empty());

        let mut with_box = raw.to_vec();
        with_box.push((SHOW_CATEGORICAL_FIELD, "on"));
        let parsed = FormSubmission::parse(&fields(&with_box));
        assert_eq!(parsed.inputs.selections.len(), 1);
        assert_eq!(parsed.inputs.selections["color"], "color_blue");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_page_shows_warning_and_inputs() {
        let page = render_page(
            &reconciler(&[], CountSource::Default),
            &FormSubmission::parse(&fields(&[])),
            None,
        );
        assert!(page.contains("Predictions may fail"));
        assert!(page.contains("name=\"year\" min=\"1980\" max=\"2025\" step=\"1\" value=\"2018\""));
        assert!(page.contains("max=\"1000000\""));
        assert!(!page.contains("Show categorical options"));
    }

    #[test]
    fn test_page_lists_categorical_groups() {
        let page = render_page(
            &reconciler(
                &["year", "mileage", "cylinders", "color_red", "color_blue", "year_old"],
                CountSource::ModelFeatureNames,
            ),
            &FormSubmission::parse(&fields(&[
                (SHOW_CATEGORICAL_FIELD, "on"),
                ("group.color", "color_blue"),
            ])),
            None,
        );
        assert!(page.contains("Show categorical options"));
        assert!(page.contains(" checked>"));
        assert!(page.contains("name=\"group.color\""));
        assert!(page.contains("<option value=\"color_blue\" selected>blue</option>"));
        assert!(!page.contains("group.year"));
        assert!(!page.contains("Predictions may fail"));
    }

    #[test]
    fn test_page_renders_failure() {
        let outcome = PriceOutcome::failure("X has 3 features <bad>");
        let page = render_page(
            &reconciler(&[], CountSource::ModelFeatureCount),
            &FormSubmission::parse(&fields(&[])),
            Some(&outcome),
        );
        assert!(page.contains("Prediction failed: X has 3 features &lt;bad&gt;"));
        assert!(page.contains("<li>"));
    }
}
