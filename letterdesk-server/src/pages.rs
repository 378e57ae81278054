//! Server-rendered form pages.
//!
//! Plain HTML: one index and one form per letter kind, pre-filled
//! from the fields the session last submitted for that kind, with the
//! page's reference files listed under the form.

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse},
    routing::get,
    Extension, Router,
};
use std::fmt::Write as _;

use letterdesk_core::prompt::{label, INSTRUCTIONS_KEY};
use letterdesk_types::{LetterFields, LetterKind, ReferenceFileInfo};

use crate::middleware::{page_rate_limit, RequestContext};
use crate::state::AppState;

/// Fields edited as free text rather than a single line.
const LONG_FIELDS: [&str; 7] =
    ["achievements", "teaching", "service", "research", "goals", "relationship", INSTRUCTIONS_KEY];

/// File inputs offered on every form.
const UPLOAD_FIELDS: [(&str, &str); 2] = [("cv_file", "CV"), ("supporting_file", "Supporting Document")];

pub fn router(state: AppState) -> Router<AppState> {
    let mut router = Router::new().route("/", get(index));
    for kind in LetterKind::ALL {
        router = router.route(
            &format!("/{}", kind.page_slug()),
            get(move |state: State<AppState>, ctx: Extension<RequestContext>| {
                letter_page(state, ctx, kind)
            }),
        );
    }
    router.route_layer(middleware::from_fn_with_state(state, page_rate_limit))
}

async fn index() -> Html<String> {
    let mut links = String::new();
    for kind in LetterKind::ALL {
        let _ = writeln!(
            links,
            r#"<li><a href="/{}">{}</a></li>"#,
            kind.page_slug(),
            escape_html(kind.title())
        );
    }
    Html(layout("Letterdesk", &format!("<h1>Letterdesk</h1>\n<ul>\n{}</ul>", links)))
}

async fn letter_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    kind: LetterKind,
) -> Html<String> {
    let saved = state.sessions().load_fields(&ctx.session, kind).await;
    let references = state.service().references().list(kind).await;
    Html(render_form(kind, &saved, &references, state.service().llm_available()))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Html(layout(
            "Page Not Found",
            r#"<h1>Page Not Found</h1><p>The page you're looking for doesn't exist.</p><p><a href="/">Home</a></p>"#,
        )),
    )
}

fn render_form(
    kind: LetterKind,
    saved: &LetterFields,
    references: &[ReferenceFileInfo],
    llm_available: bool,
) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", escape_html(kind.title()));
    if !llm_available {
        body.push_str("<p class=\"warning\">Letter generation is not configured on this server; summaries still work.</p>\n");
    }
    let _ = writeln!(
        body,
        r#"<form id="letter-form" data-kind="{}" enctype="multipart/form-data">"#,
        kind.as_str()
    );

    let required = kind.required_fields();
    let keys = required
        .iter()
        .chain(kind.optional_fields())
        .chain(std::iter::once(&INSTRUCTIONS_KEY));
    for key in keys {
        let value = saved.get(*key).map(String::as_str).unwrap_or_default();
        let marker = if required.contains(key) { " required" } else { "" };
        let _ = writeln!(body, r#"<label for="{key}">{}</label>"#, escape_html(&label(key)));
        if LONG_FIELDS.contains(key) {
            let _ = writeln!(
                body,
                r#"<textarea id="{key}" name="{key}" rows="4"{marker}>{}</textarea>"#,
                escape_html(value)
            );
        } else {
            let _ = writeln!(
                body,
                r#"<input id="{key}" name="{key}" value="{}"{marker}>"#,
                escape_html(value)
            );
        }
    }

    for (key, text) in UPLOAD_FIELDS {
        let _ = writeln!(body, r#"<label for="{key}">{text} (.txt, .docx, .pdf)</label>"#);
        let _ = writeln!(body, r#"<input id="{key}" name="{key}" type="file" accept=".txt,.docx,.pdf">"#);
    }

    body.push_str(
        r#"<button type="submit" data-endpoint="generate">Generate</button>
<button type="submit" data-endpoint="summary">Summary only</button>
</form>
<pre id="result"></pre>
"#,
    );
    render_references(&mut body, references);
    body.push_str(FORM_SCRIPT);
    layout(kind.title(), &body)
}

const FORM_SCRIPT: &str = r#"<script>
const form = document.getElementById('letter-form');
form.addEventListener('submit', async (event) => {
  event.preventDefault();
  const endpoint = event.submitter ? event.submitter.dataset.endpoint : 'generate';
  const out = document.getElementById('result');
  out.textContent = 'Working...';
  const res = await fetch(`/api/${endpoint}/${form.dataset.kind}`, {
    method: 'POST',
    body: new FormData(form),
  });
  const data = await res.json();
  out.textContent = data.success ? data.text : `Error: ${data.message}`;
});
</script>
"#;

fn render_references(body: &mut String, references: &[ReferenceFileInfo]) {
    if references.is_empty() {
        return;
    }
    body.push_str("<h2>Reference files</h2>\n<ul>\n");
    for file in references {
        let note = if file.is_supported() { "" } else { " (not used)" };
        let _ = writeln!(
            body,
            "<li>{} <small>{}, {}{}</small></li>",
            escape_html(&file.display_name),
            file.type_label(),
            file.size_label(),
            note
        );
    }
    body.push_str("</ul>\n");
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}
