#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use yatra_model::FieldError;

pub const CRATE_NAME: &str = "yatra-api";

/// Closed set of wire error codes. Serialized verbatim, PascalCase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    ValidationFailed,
    SlotNotFound,
    SlotFull,
    StoreUnavailable,
    NotReady,
    ServiceDraining,
    PayloadTooLarge,
    NotFound,
    Internal,
}

/// The error envelope every non-2xx JSON response carries, under an outer
/// `{"error": ...}` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
}

impl ApiError {
    #[must_use]
    pub fn validation_failed(err: &FieldError) -> Self {
        Self {
            code: ApiErrorCode::ValidationFailed,
            message: err.to_string(),
            details: json!({"field": err.field()}),
        }
    }

    #[must_use]
    pub fn slot_not_found(slot: &str) -> Self {
        Self {
            code: ApiErrorCode::SlotNotFound,
            message: format!("unknown slot: {slot}"),
            details: json!({"slot": slot}),
        }
    }

    #[must_use]
    pub fn slot_full(slot: &str, capacity: u32, occupancy: u64) -> Self {
        Self {
            code: ApiErrorCode::SlotFull,
            message: format!("slot {slot} is full"),
            details: json!({"slot": slot, "capacity": capacity, "occupancy": occupancy}),
        }
    }

    #[must_use]
    pub fn store_unavailable(message: &str) -> Self {
        Self {
            code: ApiErrorCode::StoreUnavailable,
            message: "registration could not be saved, please retry".to_string(),
            details: json!({"retryable": true, "cause": message}),
        }
    }

    #[must_use]
    pub fn not_ready() -> Self {
        Self {
            code: ApiErrorCode::NotReady,
            message: "service is not ready".to_string(),
            details: json!({}),
        }
    }

    #[must_use]
    pub fn draining() -> Self {
        Self {
            code: ApiErrorCode::ServiceDraining,
            message: "service is draining, retry against another instance".to_string(),
            details: json!({"retryable": true}),
        }
    }

    #[must_use]
    pub fn payload_too_large(limit: usize) -> Self {
        Self {
            code: ApiErrorCode::PayloadTooLarge,
            message: "request body exceeds the configured limit".to_string(),
            details: json!({"limit_bytes": limit}),
        }
    }

    #[must_use]
    pub fn not_found(path: &str) -> Self {
        Self {
            code: ApiErrorCode::NotFound,
            message: "no such route".to_string(),
            details: json!({"path": path}),
        }
    }

    #[must_use]
    pub fn internal(message: &str) -> Self {
        Self {
            code: ApiErrorCode::Internal,
            message: "internal error".to_string(),
            details: json!({"cause": message}),
        }
    }
}

#[must_use]
pub fn openapi_v1_spec() -> Value {
    json!({
      "openapi": "3.0.3",
      "info": {
        "title": "yatra registration API",
        "version": "v1"
      },
      "paths": {
        "/debug/slots": {
          "get": {
            "responses": {
              "200": {"description": "raw per-slot counts"},
              "404": {"description": "disabled"}
            }
          }
        },
        "/healthz": {"get": {"responses": {"200": {"description": "ok"}}}},
        "/metrics": {"get": {"responses": {"200": {"description": "prometheus metrics"}}}},
        "/readyz": {"get": {"responses": {"200": {"description": "ready"}, "503": {"description": "not ready"}}}},
        "/v1/event": {
          "get": {
            "responses": {
              "200": {"description": "static event information"},
              "304": {"description": "not modified"}
            }
          }
        },
        "/v1/openapi.json": {"get": {"responses": {"200": {"description": "this document"}}}},
        "/v1/registrations": {
          "post": {
            "requestBody": {
              "required": true,
              "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ParticipantDraft"}}}
            },
            "responses": {
              "201": {"description": "registration stored"},
              "400": {"description": "validation failed / unknown slot", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "409": {"description": "slot full", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "413": {"description": "payload too large", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "503": {"description": "store unavailable / draining", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          }
        },
        "/v1/slots": {
          "get": {
            "responses": {
              "200": {"description": "weekend-grouped slot availability"}
            }
          }
        },
        "/v1/slots/{slot_id}/availability": {
          "get": {
            "parameters": [
              {"name": "slot_id", "in": "path", "required": true, "schema": {"type": "string", "description": "slot date, YYYY-MM-DD"}}
            ],
            "responses": {
              "200": {"description": "availability for one slot"},
              "404": {"description": "unknown slot", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          }
        },
        "/v1/version": {"get": {"responses": {"200": {"description": "service version"}}}},
        "/v1/volunteers": {
          "post": {
            "requestBody": {
              "required": true,
              "content": {"application/json": {"schema": {"$ref": "#/components/schemas/VolunteerDraft"}}}
            },
            "responses": {
              "201": {"description": "volunteer registration stored"},
              "400": {"description": "validation failed", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "413": {"description": "payload too large", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "503": {"description": "store unavailable / draining", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          }
        }
      },
      "components": {
        "schemas": {
          "ApiError": {
            "type": "object",
            "required": ["code", "message", "details"],
            "additionalProperties": false,
            "properties": {
              "code": {"$ref": "#/components/schemas/ApiErrorCode"},
              "message": {"type": "string"},
              "details": {"type": "object"}
            }
          },
          "ApiErrorCode": {
            "type": "string",
            "enum": [
              "ValidationFailed",
              "SlotNotFound",
              "SlotFull",
              "StoreUnavailable",
              "NotReady",
              "ServiceDraining",
              "PayloadTooLarge",
              "NotFound",
              "Internal"
            ]
          },
          "ParticipantDraft": {
            "type": "object",
            "required": ["full_name", "phone", "age", "gender", "address", "emergency_contact", "agreedToTerms", "timeSlot"],
            "properties": {
              "full_name": {"type": "string"},
              "phone": {"type": "string"},
              "email": {"type": "string"},
              "age": {"type": "integer", "minimum": 1, "maximum": 120},
              "gender": {"type": "string", "enum": ["male", "female", "other"]},
              "address": {"type": "string"},
              "emergency_contact": {"type": "string"},
              "medical_conditions": {"type": "string"},
              "agreedToTerms": {"type": "boolean"},
              "timeSlot": {"type": "string", "description": "slot date, YYYY-MM-DD"}
            }
          },
          "VolunteerDraft": {
            "type": "object",
            "required": ["full_name", "phone", "email", "preferred_role", "availability", "motivation"],
            "properties": {
              "full_name": {"type": "string"},
              "phone": {"type": "string"},
              "email": {"type": "string"},
              "preferred_role": {"type": "string", "enum": ["crowd_management", "logistics_support", "first_aid", "food_service", "registration_help", "route_guidance", "photography", "general_assistance"]},
              "availability": {"type": "string", "enum": ["full_event", "morning_only", "afternoon_only", "specific_days"]},
              "skills_qualifications": {"type": "string"},
              "previous_experience": {"type": "string"},
              "motivation": {"type": "string"}
            }
          }
        }
      }
    })
}

const _: fn() = || {
    fn assert_traits<T: Serialize + for<'de> Deserialize<'de>>() {}
    assert_traits::<ApiErrorCode>();
    assert_traits::<ApiError>();
};
