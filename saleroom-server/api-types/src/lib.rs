use {
    serde::{
        Deserialize,
        Serialize,
    },
    utoipa::{
        ToResponse,
        ToSchema,
    },
};

pub mod auction;
pub mod bid;
pub mod chat;
pub mod ws;

/// Monetary amounts are integer minor currency units (cents).
pub type Amount = i64;

#[derive(ToResponse, ToSchema, Serialize, Deserialize)]
#[response(description = "An error occurred processing the request")]
pub struct ErrorBodyResponse {
    pub error: String,
}
