//! OpenAI-compatible endpoints for deployed models
//!
//! Kamiwaza serves each deployment on its own load-balancer port on the same
//! host as the API, over plain HTTP and without the `/api` prefix.

use serde::Serialize;

use super::models::Model;

/// Base URL of the OpenAI-compatible API for a deployment port
///
/// Keeps the Kamiwaza host, switches to plain HTTP on `port` and replaces
/// the path: `https://host/api` with port 51100 becomes
/// `http://host:51100/v1`.
pub fn provider_base_url(kamiwaza_uri: &str, port: u16) -> String {
    match url::Url::parse(kamiwaza_uri) {
        Ok(mut url) if url.has_host() => {
            // Both schemes are "special", so the switch cannot fail.
            let _ = url.set_scheme("http");
            let _ = url.set_port(Some(port));
            url.set_path("/v1");
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        _ => {
            let trimmed = kamiwaza_uri.trim_end_matches('/');
            let trimmed = trimmed.strip_suffix("/api").unwrap_or(trimmed);
            format!("{}:{}/v1", trimmed.replacen("https://", "http://", 1), port)
        }
    }
}

/// Where to send completions for one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEndpoint {
    /// Model name passed in the request body
    pub model_name: String,
    pub base_url: String,
}

impl ModelEndpoint {
    /// Endpoint for a deployed model; `None` when nothing serves it
    pub fn for_model(kamiwaza_uri: &str, model: &Model) -> Option<Self> {
        let deployment = model.deployment.as_ref()?;
        Some(Self {
            model_name: model.label.clone(),
            base_url: provider_base_url(kamiwaza_uri, deployment.lb_port),
        })
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kamiwaza::models::ModelDeployment;

    #[test]
    fn rewrites_scheme_and_strips_api_prefix() {
        assert_eq!(
            provider_base_url("https://kamiwaza.example.com/api", 51100),
            "http://kamiwaza.example.com:51100/v1"
        );
        assert_eq!(
            provider_base_url("http://localhost/api/", 8000),
            "http://localhost:8000/v1"
        );
        assert_eq!(
            provider_base_url("https://api.example.com/api", 9000),
            "http://api.example.com:9000/v1"
        );
        assert_eq!(
            provider_base_url("http://127.0.0.1:4000/api", 51100),
            "http://127.0.0.1:51100/v1"
        );
    }

    #[test]
    fn endpoint_requires_deployment() {
        let mut model = Model {
            id: "m1".to_string(),
            label: "llama".to_string(),
            api_identifier: "llama".to_string(),
            description: String::new(),
            deployment: None,
        };
        assert!(ModelEndpoint::for_model("https://k.example.com/api", &model).is_none());

        model.deployment = Some(ModelDeployment {
            id: "d1".to_string(),
            lb_port: 51100,
        });
        let endpoint = ModelEndpoint::for_model("https://k.example.com/api", &model).unwrap();
        assert_eq!(endpoint.model_name, "llama");
        assert_eq!(
            endpoint.chat_completions_url(),
            "http://k.example.com:51100/v1/chat/completions"
        );
    }
}
