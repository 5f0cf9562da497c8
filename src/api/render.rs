//! Server-side HTML for the landing page and the prediction form.

use crate::types::NUM_CHANNELS;

const STYLE: &str = "body{font-family:sans-serif;max-width:640px;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-top:.6rem}input{width:100%;padding:.3rem}\
.result{margin-top:1rem;padding:.6rem;background:#eef6ee}\
.error{margin-top:1rem;padding:.6rem;background:#fbeaea;color:#900}";

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape_html(title)
    )
}

pub fn index_page() -> String {
    page(
        "Water Sensor Guard",
        "<h1>Water Sensor Fault Detection</h1>\n\
         <p>Classify a water-quality sensor as good or faulty from ten calibrated readings.</p>\n\
         <p><a href=\"/predictdata\">Open the prediction form</a></p>",
    )
}

/// What to show beneath the form after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMessage {
    Result(String),
    Error(String),
}

/// The ten-field form. `values` pre-fills the inputs after a submission.
pub fn form_page(labels: &[String], values: &[String], message: Option<&FormMessage>) -> String {
    let mut fields = String::new();
    for i in 0..NUM_CHANNELS {
        let name = format!("sensor_{}", i + 1);
        let label = labels.get(i).map_or_else(|| format!("Sensor-{}", i + 1), Clone::clone);
        let value = values.get(i).map(String::as_str).unwrap_or_default();
        fields.push_str(&format!(
            "<label for=\"{name}\">{}</label>\n<input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{}\" required>\n",
            escape_html(&label),
            escape_html(value),
        ));
    }

    let footer = match message {
        Some(FormMessage::Result(text)) => {
            format!("<div class=\"result\"><h2>Prediction: {}</h2></div>", escape_html(text))
        }
        Some(FormMessage::Error(text)) => {
            format!("<div class=\"error\"><strong>Error:</strong> {}</div>", escape_html(text))
        }
        None => String::new(),
    };

    page(
        "Water Sensor Prediction",
        &format!(
            "<h1>Water Sensor Prediction</h1>\n<form action=\"/predictdata\" method=\"post\">\n{fields}\
             <button type=\"submit\">Predict</button>\n</form>\n{footer}"
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_form_has_ten_fields() {
        let html = form_page(&[], &[], None);
        for i in 1..=10 {
            assert!(html.contains(&format!("name=\"sensor_{i}\"")));
            assert!(html.contains(&format!(">Sensor-{i}</label>")));
        }
        assert!(!html.contains("Prediction:"));
    }

    #[test]
    fn test_form_shows_result_and_error() {
        let labels = vec!["pH (0.0 - 14.0)".to_string()];
        let html = form_page(&labels, &[], Some(&FormMessage::Result("Good Water Sensor".into())));
        assert!(html.contains("pH (0.0 - 14.0)"));
        assert!(html.contains("Prediction: Good Water Sensor"));

        let html = form_page(&labels, &[], Some(&FormMessage::Error("<bad>".into())));
        assert!(html.contains("&lt;bad&gt;"));
    }
}
