use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Validate)]
pub(crate) struct SubmitExamRequest {
    pub(crate) access_id: i64,
    #[validate(length(min = 1, message = "repository link is required"))]
    pub(crate) github_link: String,
}

/// Generic `{ status, message }` acknowledgement the portal uses for both
/// submissions and rejections.
#[derive(Debug, Deserialize)]
pub(crate) struct PortalAck {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_request_serializes_portal_field_names() {
        let request = SubmitExamRequest {
            access_id: 42,
            github_link: "https://github.com/ada/final-exam".to_string(),
        };

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["access_id"], 42);
        assert_eq!(value["github_link"], "https://github.com/ada/final-exam");
    }

    #[test]
    fn ack_parses_error_body() {
        let ack: PortalAck = serde_json::from_value(serde_json::json!({
            "status": "error",
            "message": "No se pudo enviar el examen",
        }))
        .expect("ack");
        assert_eq!(ack.status, "error");
        assert!(ack.message.is_some());
    }
}
