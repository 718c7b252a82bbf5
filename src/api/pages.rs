//! HTML pages
//!
//! - GET /login - Sign-in form
//! - GET / - Model selector and competitor search

use axum::{
    Router,
    extract::{Query, State},
    response::{Html, IntoResponse},
    routing::get,
};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Deserialize;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::kamiwaza::Model;

/// Create page router
///
/// The login route is registered at the configured login path so the gate
/// and the page always agree.
pub fn pages_router(login_path: &str) -> Router<AppState> {
    Router::new()
        .route("/", get(home_page))
        .route(login_path, get(login_page))
}

// =============================================================================
// Login Page
// =============================================================================

/// GET /login
///
/// Posts the credentials as JSON to /api/auth/login and shows a single
/// generic message on any failure.
async fn login_page(State(state): State<AppState>) -> impl IntoResponse {
    let home = encode_text(&state.config.auth.home_path).to_string();
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Sign In - Kamiwaza Scout</title></head>
<body>
  <main>
    <h1>Sign In</h1>
    <p>Sign in with your Kamiwaza credentials</p>
    <div id="error" role="alert" hidden></div>
    <form id="login-form">
      <label for="username">Username</label>
      <input id="username" name="username" type="text" required />
      <label for="password">Password</label>
      <input id="password" name="password" type="password" required />
      <button type="submit">Sign In</button>
    </form>
  </main>
  <script>
    document.getElementById('login-form').addEventListener('submit', async (event) => {{
      event.preventDefault();
      const form = new FormData(event.currentTarget);
      const error = document.getElementById('error');
      try {{
        const response = await fetch('/api/auth/login', {{
          method: 'POST',
          headers: {{ 'Content-Type': 'application/json' }},
          body: JSON.stringify({{
            username: form.get('username'),
            password: form.get('password'),
          }}),
        }});
        if (!response.ok) throw new Error('Login failed');
        window.location.assign('{home}');
      }} catch (_) {{
        error.textContent = 'Invalid credentials';
        error.hidden = false;
      }}
    }});
  </script>
</body>
</html>
"#
    ))
}

// =============================================================================
// Home Page
// =============================================================================

#[derive(Debug, Deserialize)]
struct HomeQuery {
    /// Preselected model id
    model: Option<String>,
}

/// GET /
///
/// Loads the model catalog on every visit, like the dropdown it renders.
async fn home_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<HomeQuery>,
) -> impl IntoResponse {
    let selector = match state.refresh_models().await {
        Ok(catalog) => {
            let selected = catalog.valid_model_id(query.model.as_deref()).ok();
            render_model_selector(catalog.models(), selected.as_deref())
        }
        Err(error) => {
            tracing::warn!(%error, "Failed to load models");
            format!(
                r#"<div class="error">Error loading models: {}</div>"#,
                encode_text(&error.to_string())
            )
        }
    };

    let login = encode_text(&state.config.auth.login_path).to_string();
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Kamiwaza Scout</title></head>
<body>
  <header>
    <span>Signed in as {username}</span>
    <button id="logout" type="button">Sign out</button>
  </header>
  <main>
    {selector}
    <form id="search-form">
      <label for="websiteurl">Company website</label>
      <input id="websiteurl" name="websiteurl" type="url" required />
      <button type="submit">Find competitors</button>
    </form>
    <ul id="results"></ul>
  </main>
  <script>
    document.getElementById('logout').addEventListener('click', async () => {{
      await fetch('/api/auth/logout', {{ method: 'POST' }});
      window.location.assign('{login}');
    }});
    document.getElementById('search-form').addEventListener('submit', async (event) => {{
      event.preventDefault();
      const list = document.getElementById('results');
      list.replaceChildren();
      const response = await fetch('/api/findcompetitors', {{
        method: 'POST',
        headers: {{ 'Content-Type': 'application/json' }},
        body: JSON.stringify({{ websiteurl: new FormData(event.currentTarget).get('websiteurl') }}),
      }});
      const body = await response.json();
      if (!response.ok) {{
        const item = document.createElement('li');
        item.textContent = body.error;
        list.append(item);
        return;
      }}
      for (const result of body.results) {{
        const item = document.createElement('li');
        const link = document.createElement('a');
        link.href = result.url;
        link.textContent = result.title || result.url;
        item.append(link, document.createTextNode(' ' + (result.summary || '')));
        list.append(item);
      }}
    }});
  </script>
</body>
</html>
"#,
        username = encode_text(&user.username),
    ))
}

/// Render the model dropdown
///
/// Models without a deployment are listed but cannot be chosen.
fn render_model_selector(models: &[Model], selected: Option<&str>) -> String {
    let mut options = String::new();
    for model in models {
        let mut attrs = String::new();
        if selected == Some(model.id.as_str()) {
            attrs.push_str(" selected");
        }
        if !model.is_deployed() {
            attrs.push_str(" disabled");
        }
        let suffix = if model.is_deployed() {
            ""
        } else {
            " (Not Deployed)"
        };
        options.push_str(&format!(
            "<option value=\"{}\"{}>{}{}</option>\n",
            encode_double_quoted_attribute(&model.id),
            attrs,
            encode_text(&model.label),
            suffix
        ));
    }

    let description = selected
        .and_then(|id| models.iter().find(|model| model.id == id))
        .map(|model| {
            format!(
                "<p class=\"model-description\">{}</p>",
                encode_text(&model.description)
            )
        })
        .unwrap_or_default();

    format!(
        "<label for=\"model\">Select Model</label>\n<select id=\"model\" name=\"model\">\n{options}</select>\n{description}"
    )
}
