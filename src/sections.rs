//! Dashboard sections. Each one issues its own request and turns the outcome
//! into widgets; a failure becomes an inline error widget and never leaks
//! into another section.

use crate::backend::{Backend, Endpoint, FetchError};
use crate::logging::log_section_error;
use crate::payload::{format_value, BarData, CraEmail, FieldMap, HeatmapInsight, Matrix, Records};
use crate::session::StudyId;
use crate::widgets::{humanize, Widget};

pub const TITLE: &str = "Clinical Data Quality Monitor";
pub const HIGH_RISK_ROW_LIMIT: usize = 100;

fn error(section: &str, message: String) -> Widget {
    log_section_error(section, &message);
    Widget::Error(message)
}

fn fetch_error(section: &str, err: FetchError) -> Vec<Widget> {
    match err {
        // Status errors show the raw body on its own, the way the email
        // section does, so HTML error pages stay readable.
        FetchError::Status { status, body } => {
            let mut out = vec![error(section, format!("Server Error {}", status))];
            if !body.trim().is_empty() {
                out.push(Widget::Code(body));
            }
            out
        }
        other => vec![error(section, other.to_string())],
    }
}

pub async fn scorecard<B: Backend + ?Sized>(backend: &B) -> Vec<Widget> {
    let mut out = vec![Widget::Header("Portfolio Scorecard".to_string())];
    let value = match backend.get_json(Endpoint::Scorecard).await {
        Ok(v) => v,
        Err(e) => {
            out.extend(fetch_error("scorecard", e));
            return out;
        }
    };
    match FieldMap::from_json(&value, "scorecard") {
        Ok(fields) => out.extend(fields.entries.iter().map(|(k, v)| Widget::Metric {
            label: humanize(k),
            value: format_value(v),
        })),
        Err(msg) => out.push(error("scorecard", msg)),
    }
    out
}

pub async fn study_summary<B: Backend + ?Sized>(backend: &B, study: StudyId) -> Vec<Widget> {
    let mut out = Vec::new();
    let fetched = backend.get_json(Endpoint::Study(study)).await;
    out.push(Widget::Subheader(format!("Study {} Summary", study)));
    let value = match fetched {
        Ok(v) => v,
        Err(e) => {
            out.extend(fetch_error("study", e));
            return out;
        }
    };
    match FieldMap::from_json(&value, "study summary") {
        Ok(fields) => out.extend(fields.entries.iter().map(|(k, v)| Widget::Field {
            key: k.clone(),
            value: format_value(v),
        })),
        Err(msg) => out.push(error("study", msg)),
    }
    out
}

pub async fn high_risk<B: Backend + ?Sized>(backend: &B) -> Vec<Widget> {
    let value = match backend.get_json(Endpoint::HighRisk).await {
        Ok(v) => v,
        Err(e) => return fetch_error("highrisk", e),
    };
    match Records::from_json(&value) {
        Ok(records) => vec![Widget::Table(records.head(HIGH_RISK_ROW_LIMIT))],
        Err(msg) => vec![error("highrisk", msg)],
    }
}

pub async fn benchmarks<B: Backend + ?Sized>(backend: &B) -> Vec<Widget> {
    let value = match backend.get_json(Endpoint::Benchmarks).await {
        Ok(v) => v,
        Err(e) => return fetch_error("benchmarks", e),
    };
    match BarData::from_json(&value) {
        Ok(bars) => vec![Widget::BarChart(bars)],
        Err(msg) => vec![error("benchmarks", msg)],
    }
}

pub async fn heatmap<B: Backend + ?Sized>(backend: &B) -> Vec<Widget> {
    let value = match backend.get_json(Endpoint::Heatmap).await {
        Ok(v) => v,
        Err(e) => return fetch_error("heatmap", e),
    };
    match Matrix::from_json(&value) {
        Ok(matrix) => vec![
            Widget::Subheader("Correlation Matrix".to_string()),
            Widget::Grid(matrix.clone()),
            Widget::Subheader("Heatmap".to_string()),
            Widget::Caption("Darker = stronger relationship".to_string()),
            Widget::Heatmap(matrix),
        ],
        Err(msg) => vec![error("heatmap", msg)],
    }
}

pub async fn heatmap_insight<B: Backend + ?Sized>(backend: &B) -> Vec<Widget> {
    let value = match backend.get_json(Endpoint::HeatmapInsight).await {
        Ok(v) => v,
        // An error reply may still carry `{"error": ...}`; show that text.
        Err(FetchError::Status { status, body }) => {
            return match serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").map(format_value))
            {
                Some(msg) => vec![error("heatmap-ai", msg)],
                None => fetch_error("heatmap-ai", FetchError::Status { status, body }),
            };
        }
        Err(e) => return fetch_error("heatmap-ai", e),
    };
    match HeatmapInsight::from_json(&value) {
        Ok(HeatmapInsight::Analysis(text)) => vec![
            Widget::Subheader("AI Insight".to_string()),
            Widget::Text(text),
        ],
        Ok(HeatmapInsight::Error(msg)) | Err(msg) => vec![error("heatmap-ai", msg)],
    }
}

/// The email section reads the raw response itself: a non-200 body is shown
/// verbatim and never parsed.
pub async fn cra_email<B: Backend + ?Sized>(backend: &B, study: StudyId) -> Vec<Widget> {
    let resp = match backend.get(Endpoint::CraEmail(study)).await {
        Ok(resp) => resp,
        Err(e) => {
            let detail = match e {
                FetchError::Transport(msg) => msg,
                other => other.to_string(),
            };
            return vec![
                error("cra-email", "Failed to reach backend".to_string()),
                Widget::Text(detail),
            ];
        }
    };
    if !resp.is_ok() {
        return vec![
            error("cra-email", format!("Server Error {}", resp.status)),
            Widget::Code(resp.body),
        ];
    }
    let value: serde_json::Value = match serde_json::from_str(&resp.body) {
        Ok(v) => v,
        Err(e) => return fetch_error("cra-email", FetchError::Decode(e.to_string())),
    };
    match CraEmail::from_json(&value) {
        Ok(CraEmail::Drafted { prompt, email }) => vec![
            Widget::Field {
                key: "Prompt".to_string(),
                value: prompt,
            },
            Widget::Divider,
            Widget::Subheader("Generated Email".to_string()),
            Widget::Text(email),
        ],
        Ok(CraEmail::Failed { error: msg, prompt }) => vec![
            error("cra-email", format!("AI failed: {}", msg)),
            Widget::Field {
                key: "Prompt".to_string(),
                value: prompt,
            },
        ],
        Err(msg) => vec![error("cra-email", msg)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RawResponse;
    use async_trait::async_trait;

    struct Fixed {
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl Backend for Fixed {
        async fn get(&self, _endpoint: Endpoint) -> Result<RawResponse, FetchError> {
            Ok(RawResponse {
                status: self.status,
                body: self.body.to_string(),
            })
        }
    }

    struct Unreachable;

    #[async_trait]
    impl Backend for Unreachable {
        async fn get(&self, _endpoint: Endpoint) -> Result<RawResponse, FetchError> {
            Err(FetchError::Transport("connection refused".to_string()))
        }
    }

    fn study(n: u8) -> StudyId {
        StudyId::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_scorecard_humanizes_labels() {
        let backend = Fixed {
            status: 200,
            body: r#"{"total_studies": 25, "avg_dqi": 78.4}"#,
        };
        let widgets = scorecard(&backend).await;
        assert_eq!(
            widgets,
            vec![
                Widget::Header("Portfolio Scorecard".to_string()),
                Widget::Metric {
                    label: "Total Studies".to_string(),
                    value: "25".to_string()
                },
                Widget::Metric {
                    label: "Avg Dqi".to_string(),
                    value: "78.4".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_study_fields_use_raw_keys() {
        let backend = Fixed {
            status: 200,
            body: r#"{"study_id": 4, "dqi": 66.1, "status": "At Risk"}"#,
        };
        let widgets = study_summary(&backend, study(4)).await;
        assert_eq!(widgets[0], Widget::Subheader("Study 4 Summary".to_string()));
        assert_eq!(
            widgets[3],
            Widget::Field {
                key: "status".to_string(),
                value: "At Risk".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_status_error_shows_code_and_body() {
        let backend = Fixed {
            status: 503,
            body: "maintenance",
        };
        let widgets = benchmarks(&backend).await;
        assert_eq!(
            widgets,
            vec![
                Widget::Error("Server Error 503".to_string()),
                Widget::Code("maintenance".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_heatmap_layout() {
        let backend = Fixed {
            status: 200,
            body: r#"{"dqi": {"dqi": 1.0, "queries": -0.7}, "queries": {"dqi": -0.7, "queries": 1.0}}"#,
        };
        let widgets = heatmap(&backend).await;
        assert_eq!(widgets.len(), 5);
        assert!(matches!(widgets[1], Widget::Grid(_)));
        assert_eq!(
            widgets[3],
            Widget::Caption("Darker = stronger relationship".to_string())
        );
        assert!(matches!(widgets[4], Widget::Heatmap(_)));
    }

    #[tokio::test]
    async fn test_insight_error_suppresses_analysis() {
        let backend = Fixed {
            status: 200,
            body: r#"{"error": "LLM quota exceeded"}"#,
        };
        let widgets = heatmap_insight(&backend).await;
        assert_eq!(widgets, vec![Widget::Error("LLM quota exceeded".to_string())]);
    }

    #[tokio::test]
    async fn test_insight_error_status_uses_error_text() {
        let backend = Fixed {
            status: 500,
            body: r#"{"error": "model unavailable"}"#,
        };
        let widgets = heatmap_insight(&backend).await;
        assert_eq!(widgets, vec![Widget::Error("model unavailable".to_string())]);

        let backend = Fixed {
            status: 502,
            body: "bad gateway",
        };
        let widgets = heatmap_insight(&backend).await;
        assert_eq!(
            widgets,
            vec![
                Widget::Error("Server Error 502".to_string()),
                Widget::Code("bad gateway".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_email_non_200_shows_raw_body() {
        let backend = Fixed {
            status: 500,
            body: "<html>Traceback ...</html>",
        };
        let widgets = cra_email(&backend, study(2)).await;
        assert_eq!(
            widgets,
            vec![
                Widget::Error("Server Error 500".to_string()),
                Widget::Code("<html>Traceback ...</html>".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_email_error_field() {
        let backend = Fixed {
            status: 200,
            body: r#"{"error": "timeout", "prompt": "Write to the CRA of study 2"}"#,
        };
        let widgets = cra_email(&backend, study(2)).await;
        assert_eq!(widgets[0], Widget::Error("AI failed: timeout".to_string()));
        assert!(!widgets.iter().any(|w| *w == Widget::Subheader("Generated Email".to_string())));
    }

    #[tokio::test]
    async fn test_email_drafted() {
        let backend = Fixed {
            status: 200,
            body: r#"{"prompt": "p", "email": "Dear CRA, ..."}"#,
        };
        let widgets = cra_email(&backend, study(9)).await;
        assert_eq!(widgets.len(), 4);
        assert_eq!(widgets[1], Widget::Divider);
        assert_eq!(widgets[3], Widget::Text("Dear CRA, ...".to_string()));
    }

    #[tokio::test]
    async fn test_email_transport_failure() {
        let widgets = cra_email(&Unreachable, study(1)).await;
        assert_eq!(
            widgets,
            vec![
                Widget::Error("Failed to reach backend".to_string()),
                Widget::Text("connection refused".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_high_risk_shape_error() {
        let backend = Fixed {
            status: 200,
            body: r#""nothing flagged""#,
        };
        let widgets = high_risk(&backend).await;
        assert_eq!(widgets.len(), 1);
        assert!(widgets[0].is_error());
    }
}
