use serde::{Deserialize, Serialize};
use validator::Validate;

/// Profile block the portal returns for an eligible student. Field names on
/// the wire follow the portal contract (`nombre`, `tecnicatura`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StudentProfile {
    pub(crate) dni: i64,
    #[serde(rename = "nombre")]
    pub(crate) full_name: String,
    pub(crate) email: String,
    #[serde(rename = "tecnicatura")]
    pub(crate) program: String,
    pub(crate) exam_time_limit: i64,
}

#[derive(Debug, Serialize, Validate)]
pub(crate) struct ValidateDniRequest {
    #[validate(length(min = 7, max = 8, message = "DNI must have 7 or 8 digits"))]
    pub(crate) dni: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidateDniResponse {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) student_info: Option<StudentProfile>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}
