//! Server-rendered page for the upload form and analysis results.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::models::{AnalysisResponse, Language, Notice};

pub const PAGE_TITLE: &str = "Visual Medical Assistant";
pub const NO_TERMS_MESSAGE: &str = "No complex medical terms found for explanation.";

const FAVICON: &str = "data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='.9em' font-size='90'>🩺</text></svg>";

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; background: #f7f9fc; color: #262730; }
main { max-width: 960px; margin: 0 auto; padding: 32px 24px; }
h1 { margin-bottom: 4px; }
h3 { color: #555; font-weight: 600; }
fieldset { border: none; padding: 0; margin: 16px 0; }
label.upload { display: block; margin: 16px 0; }
figure { margin: 16px 0; }
figure img { width: 250px; border-radius: 6px; }
figcaption { color: #777; font-size: 0.9em; }
button { background: #ff4b4b; color: white; border: none; border-radius: 6px; padding: 8px 18px; font-size: 1em; cursor: pointer; }
.loading { margin: 16px 0; color: #555; }
.spinner { display: inline-block; width: 16px; height: 16px; margin-right: 8px; vertical-align: middle; border: 3px solid #ddd; border-top-color: #ff4b4b; border-radius: 50%; animation: spin 1s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }
.report { white-space: pre-wrap; line-height: 1.6; }
.error { background: #ffecec; color: #9b1c1c; border-radius: 6px; padding: 12px 16px; margin: 12px 0; white-space: pre-wrap; }
.info { background: #e8f1fb; color: #1c4b82; border-radius: 6px; padding: 12px 16px; margin: 12px 0; }
"#;

const SCRIPT: &str = r#"
const form = document.getElementById('analysis-form');
const input = document.getElementById('image-input');
const preview = document.getElementById('preview');
const loading = document.getElementById('loading');
input.addEventListener('change', () => {
  const file = input.files[0];
  if (!file) { return; }
  const reader = new FileReader();
  reader.onload = (e) => {
    preview.querySelector('img').src = e.target.result;
    preview.hidden = false;
  };
  reader.readAsDataURL(file);
  const results = document.getElementById('results');
  if (results) { results.remove(); }
});
form.addEventListener('submit', () => {
  loading.hidden = false;
  form.querySelector('button').disabled = true;
});
"#;

/// Thumbnail of the uploaded image, as a `data:` URI.
pub struct Thumbnail {
    pub data_uri: String,
}

/// What to show under the form.
pub enum PageContent<'a> {
    Idle,
    Completed(&'a AnalysisResponse),
    Failed(&'a str),
}

pub fn render_page(
    language: Language,
    thumbnail: Option<&Thumbnail>,
    content: PageContent<'_>,
) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!("<title>{}</title>\n", PAGE_TITLE));
    html.push_str(&format!(
        "<link rel=\"icon\" href=\"{}\">\n",
        encode_double_quoted_attribute(FAVICON)
    ));
    html.push_str("<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<main>\n");
    html.push_str(&format!("<h1>{} 👨‍⚕️ 🩺 🏥</h1>\n", PAGE_TITLE));
    html.push_str("<h3>An app to help with medical image analysis</h3>\n");

    render_form(&mut html, language, thumbnail);

    html.push_str(
        "<div id=\"loading\" class=\"loading\" hidden><span class=\"spinner\"></span>Analyzing the image...</div>\n",
    );

    match content {
        PageContent::Idle => {}
        PageContent::Completed(response) => render_results(&mut html, response),
        PageContent::Failed(message) => {
            html.push_str("<section id=\"results\">\n");
            push_error(&mut html, &format!("❌ Error occurred: {}", message));
            html.push_str("</section>\n");
        }
    }

    html.push_str("</main>\n<script>");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

fn render_form(html: &mut String, language: Language, thumbnail: Option<&Thumbnail>) {
    html.push_str(
        "<form id=\"analysis-form\" method=\"post\" action=\"/analyze\" enctype=\"multipart/form-data\">\n",
    );
    html.push_str("<fieldset>\n<legend>Choose language for analysis:</legend>\n");
    for option in Language::ALL {
        let checked = if option == language { " checked" } else { "" };
        html.push_str(&format!(
            "<label><input type=\"radio\" name=\"language\" value=\"{0}\"{1}> {0}</label>\n",
            option.as_str(),
            checked
        ));
    }
    html.push_str("</fieldset>\n");
    html.push_str(
        "<label class=\"upload\">Upload the medical image<br>\n<input id=\"image-input\" type=\"file\" name=\"image\" accept=\".png,.jpg,.jpeg,image/png,image/jpeg\" required></label>\n",
    );

    match thumbnail {
        Some(thumbnail) => html.push_str(&format!(
            "<figure id=\"preview\"><img src=\"{}\" alt=\"Uploaded Image\"><figcaption>Uploaded Image</figcaption></figure>\n",
            encode_double_quoted_attribute(&thumbnail.data_uri)
        )),
        None => html.push_str(
            "<figure id=\"preview\" hidden><img alt=\"Uploaded Image\"><figcaption>Uploaded Image</figcaption></figure>\n",
        ),
    }

    html.push_str("<button type=\"submit\">Generate Analysis</button>\n</form>\n");
}

fn render_results(html: &mut String, response: &AnalysisResponse) {
    html.push_str("<section id=\"results\">\n");
    for Notice { message, .. } in &response.notices {
        push_error(html, message);
    }

    html.push_str("<h3>🧾 Analysis Report</h3>\n");
    html.push_str(&format!(
        "<div class=\"report\">{}</div>\n",
        encode_text(&response.report)
    ));
    html.push_str("<hr>\n<h3>🧠 Medical Term Explanations</h3>\n");

    if response.explanations.is_empty() {
        html.push_str(&format!("<div class=\"info\">{}</div>\n", NO_TERMS_MESSAGE));
    } else {
        html.push_str("<ul class=\"terms\">\n");
        for explanation in &response.explanations {
            html.push_str(&format!(
                "<li><strong>{}</strong>: {}</li>\n",
                encode_text(&explanation.display_term()),
                encode_text(&explanation.definition)
            ));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</section>\n");
}

fn push_error(html: &mut String, message: &str) {
    html.push_str(&format!("<div class=\"error\">{}</div>\n", encode_text(message)));
}
