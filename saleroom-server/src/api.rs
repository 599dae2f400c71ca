use {
    crate::{
        config::RunOptions,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        state::Store,
    },
    anyhow::Result,
    axum::{
        async_trait,
        extract::FromRequestParts,
        http::{
            request::Parts,
            StatusCode,
        },
        response::{
            IntoResponse,
            Response,
        },
        routing::{
            get,
            post,
        },
        Json,
        Router,
    },
    clap::crate_version,
    saleroom_api_types::{
        auction::{
            AuctionSnapshot,
            AuctionStatus,
            StatusUpdate,
        },
        bid::{
            Bid,
            BidCreate,
            BidKind,
            FloorBidCreate,
        },
        chat::{
            ChatMessage,
            ChatMessageCreate,
        },
        ws::{
            BidUpdate,
            ClientMessage,
            ClientRequest,
            Participant,
            PresenceSnapshot,
            ServerResultMessage,
            ServerResultResponse,
            ServerUpdateResponse,
        },
        Amount,
        ErrorBodyResponse,
    },
    std::sync::{
        atomic::Ordering,
        Arc,
    },
    tower_http::cors::CorsLayer,
    utoipa::OpenApi,
    utoipa_redoc::{
        Redoc,
        Servable,
    },
    uuid::Uuid,
};

async fn root() -> String {
    format!("Saleroom Auction Room Server API {}", crate_version!())
}

pub(crate) mod auction;
pub(crate) mod bid;
pub(crate) mod chat;
pub(crate) mod ws;

#[derive(Clone, Debug, PartialEq)]
pub enum RestError {
    /// The request contained invalid parameters
    BadParameters(String),
    /// The auction id is not known to the registry or to storage
    AuctionNotFound,
    /// The auction is not accepting bids because it is not live
    AuctionNotLive,
    /// The bid amount did not exceed the auction's current price
    BidTooLow { current_price: Amount },
    /// The requested lifecycle transition does not hold for the current status
    TransitionConflict {
        current:   AuctionStatus,
        requested: AuctionStatus,
    },
    /// The caller must be identified for this operation
    Unauthorized,
    /// The caller lacks the operator role required for this operation
    Forbidden,
    /// Internal error occurred during processing the request
    TemporarilyUnavailable,
}

impl RestError {
    pub fn to_status_and_message(&self) -> (StatusCode, String) {
        match self {
            RestError::BadParameters(msg) => {
                (StatusCode::BAD_REQUEST, format!("Bad parameters: {}", msg))
            }
            RestError::AuctionNotFound => (
                StatusCode::NOT_FOUND,
                "Auction with the specified id was not found".to_string(),
            ),
            RestError::AuctionNotLive => {
                (StatusCode::BAD_REQUEST, "Auction is not live".to_string())
            }
            RestError::BidTooLow { current_price } => (
                StatusCode::BAD_REQUEST,
                format!(
                    "Bid must be higher than the current price: {}",
                    current_price
                ),
            ),
            RestError::TransitionConflict { current, requested } => (
                StatusCode::CONFLICT,
                format!("Auction is {}, cannot become {}", current, requested),
            ),
            RestError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "This operation requires an identified caller".to_string(),
            ),
            RestError::Forbidden => (
                StatusCode::FORBIDDEN,
                "This operation requires the operator role".to_string(),
            ),
            RestError::TemporarilyUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "This service is temporarily unavailable".to_string(),
            ),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, msg) = self.to_status_and_message();
        (status, Json(ErrorBodyResponse { error: msg })).into_response()
    }
}

pub async fn live() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// An identified caller, as resolved by the authorization layer in front of
/// this service.
#[derive(Clone, Debug, PartialEq)]
pub struct Principal {
    pub id:       Uuid,
    pub name:     String,
    pub is_admin: bool,
}

/// Credential checks happen before requests reach this service; the gateway in
/// front forwards the resolved caller in the `x-caller-*` headers. Requests
/// without them are anonymous viewers.
#[derive(Clone, Debug, Default)]
pub struct Auth {
    pub principal: Option<Principal>,
}

impl Auth {
    pub fn require_principal(&self) -> Result<&Principal, RestError> {
        self.principal.as_ref().ok_or(RestError::Unauthorized)
    }

    pub fn require_admin(&self) -> Result<&Principal, RestError> {
        let principal = self.require_principal()?;
        if !principal.is_admin {
            return Err(RestError::Forbidden);
        }
        Ok(principal)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(id) = parts.headers.get("x-caller-id") else {
            return Ok(Self::default());
        };
        let id = id
            .to_str()
            .ok()
            .and_then(|value| value.parse().ok())
            .ok_or(StatusCode::BAD_REQUEST)?;
        let name = parts
            .headers
            .get("x-caller-name")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if name.is_empty() {
            return Err(StatusCode::BAD_REQUEST);
        }
        let is_admin = parts
            .headers
            .get("x-caller-role")
            .and_then(|value| value.to_str().ok())
            .map(|role| role == "admin")
            .unwrap_or(false);
        Ok(Self {
            principal: Some(Principal { id, name, is_admin }),
        })
    }
}

pub async fn start_api(run_options: RunOptions, store: Arc<Store>) -> Result<()> {
    // Make sure functions included in the paths section have distinct names, otherwise some api generators will fail
    #[derive(OpenApi)]
    #[openapi(
    paths(
    auction::get_auction,
    auction::get_presence,
    auction::start_auction,
    auction::end_auction,
    bid::post_bid,
    bid::post_floor_bid,
    chat::post_chat,
    ),
    components(
    schemas(
    AuctionSnapshot,
    AuctionStatus,
    StatusUpdate,
    Bid,
    BidKind,
    BidCreate,
    FloorBidCreate,
    BidUpdate,
    ChatMessage,
    ChatMessageCreate,
    ClientRequest,
    ClientMessage,
    Participant,
    PresenceSnapshot,
    ServerResultMessage,
    ServerResultResponse,
    ServerUpdateResponse,
    ErrorBodyResponse,
    ),
    responses(
    ErrorBodyResponse,
    AuctionSnapshot,
    Bid,
    ChatMessage,
    ),
    ),
    tags(
    (name = "Saleroom Auction Room Server", description = "The room engine behind a live item sale: \
    it admits bids against the shared current price and fans out price, presence and chat events \
    to every connection watching the auction.")
    )
    )]
    struct ApiDoc;

    let auction_routes = Router::new()
        .route("/:auction_id", get(auction::get_auction))
        .route("/:auction_id/presence", get(auction::get_presence))
        .route("/:auction_id/start", post(auction::start_auction))
        .route("/:auction_id/end", post(auction::end_auction));
    let bid_routes = Router::new()
        .route("/", post(bid::post_bid))
        .route("/floor", post(bid::post_floor_bid));
    let chat_routes = Router::new().route("/", post(chat::post_chat));

    let v1_routes = Router::new().nest(
        "/v1",
        Router::new()
            .nest("/auctions", auction_routes)
            .nest("/bids", bid_routes)
            .nest("/chat", chat_routes)
            .route("/ws", get(ws::ws_route_handler)),
    );

    let app: Router<()> = Router::new()
        .merge(Redoc::with_url("/docs", ApiDoc::openapi()))
        .merge(v1_routes)
        .route("/", get(root))
        .route("/live", get(live))
        .layer(CorsLayer::permissive())
        .with_state(store);

    let listener = tokio::net::TcpListener::bind(&run_options.server.listen_addr).await?;
    tracing::info!("Listening on {}", run_options.server.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            while !SHOULD_EXIT.load(Ordering::Acquire) {
                tokio::time::sleep(EXIT_CHECK_INTERVAL).await;
            }
            tracing::info!("Shutting down RPC server...");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        axum::http::Request,
    };

    async fn auth_from_headers(headers: &[(&str, &str)]) -> Result<Auth, StatusCode> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Auth::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn missing_headers_mean_an_anonymous_viewer() {
        let auth = auth_from_headers(&[]).await.unwrap();
        assert!(auth.principal.is_none());
        assert_eq!(auth.require_principal(), Err(RestError::Unauthorized));
        assert_eq!(auth.require_admin(), Err(RestError::Unauthorized));
    }

    #[tokio::test]
    async fn forwarded_identity_is_trusted() {
        let auth = auth_from_headers(&[
            ("x-caller-id", "beedbeed-58cc-4372-a567-0e02b2c3d479"),
            ("x-caller-name", "J. Appleseed"),
            ("x-caller-role", "participant"),
        ])
        .await
        .unwrap();
        let principal = auth.require_principal().unwrap();
        assert_eq!(principal.name, "J. Appleseed");
        assert!(!principal.is_admin);
        assert_eq!(auth.require_admin(), Err(RestError::Forbidden));

        let auth = auth_from_headers(&[
            ("x-caller-id", "beedbeed-58cc-4372-a567-0e02b2c3d479"),
            ("x-caller-name", "Operator"),
            ("x-caller-role", "admin"),
        ])
        .await
        .unwrap();
        assert!(auth.require_admin().is_ok());
    }

    #[tokio::test]
    async fn malformed_identity_headers_are_rejected() {
        let result = auth_from_headers(&[("x-caller-id", "not-a-uuid")]).await;
        assert_eq!(result.unwrap_err(), StatusCode::BAD_REQUEST);
    }
}
