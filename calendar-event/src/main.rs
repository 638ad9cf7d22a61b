//! Calendar Event Lambda - creates a Graph calendar event for tenant users.
//!
//! Obtains an access token, lists the users in the tenant, then creates a
//! 30-minute event tomorrow on the target user's calendar (or on every
//! user's calendar when `invite_all` is set). Optionally records the invite
//! as a SharePoint list item.

use chrono::{Duration, Utc};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use shared::{
    classify, BodyContentType, Config, ErrorKind, EventPayload, GraphClient, SecretsTokenProvider,
    TokenProvider, UserRecord,
};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const EVENT_SUBJECT: &str = "Microsoft Graph API discussion";
const EVENT_LOCATION: &str = "Joe's office";
const EVENT_BODY: &str = "Let's discuss this awesome API.";
const EVENT_TIME_ZONE: &str = "Pacific Standard Time";

/// Invocation payload.
#[derive(Debug, Deserialize)]
struct InviteRequest {
    /// Create the event on every tenant user's calendar
    #[serde(default)]
    invite_all: bool,
    /// Override the configured target user
    user_id: Option<String>,
    /// Also record the invite as a SharePoint list item
    #[serde(default)]
    record_item: bool,
}

/// Invocation summary.
#[derive(Debug, Serialize)]
struct InviteResponse {
    users_found: usize,
    events_created: u32,
    errors: Vec<String>,
}

/// Application state
struct AppState {
    config: Config,
    graph: GraphClient,
    tokens: SecretsTokenProvider,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);

        let config = Config::from_env()?;

        let graph = match &config.graph_base_url {
            Some(base) => GraphClient::with_base_url(base),
            None => GraphClient::new(),
        };
        let tokens = SecretsTokenProvider::new(secrets_client, config.token_secret_arn.clone());

        Ok(Self {
            config,
            graph,
            tokens,
        })
    }
}

/// Render a creation failure for the invocation summary, using the error
/// classification to pick the message.
fn describe_failure(display_name: &str, err: &shared::Error) -> String {
    match err {
        shared::Error::Api { error, .. } => match classify(error) {
            ErrorKind::AccountTypeMismatch => format!(
                "Error creating an event for {}. Most likely due to this user having a \
                 personal Microsoft account instead of an organizational one.",
                display_name
            ),
            ErrorKind::Transient => format!(
                "Error creating an event for {}. The account may not have been migrated \
                 to support this flow yet ({}).",
                display_name, error
            ),
            ErrorKind::Unknown => {
                format!("Error creating an event for {}: {}", display_name, error)
            }
        },
        other => format!("Error creating an event for {}: {}", display_name, other),
    }
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<InviteRequest>,
) -> Result<InviteResponse, Error> {
    let request = event.payload;

    let token = state.tokens.get_token().await?;

    let users = state.graph.list_users(&token).await?;
    info!("Found {} users in tenant", users.len());

    let targets: Vec<UserRecord> = if request.invite_all {
        users.clone()
    } else {
        let target_id = request
            .user_id
            .clone()
            .unwrap_or_else(|| state.config.target_user_id.clone());
        let display_name = users
            .iter()
            .find(|u| u.id == target_id)
            .map(|u| u.display_name.clone())
            .unwrap_or_else(|| target_id.clone());
        vec![UserRecord {
            id: target_id,
            display_name,
        }]
    };

    // Tomorrow at the current time, for 30 minutes.
    let start = Utc::now().naive_utc() + Duration::days(1);
    let payload = EventPayload::new(
        EVENT_SUBJECT,
        EVENT_LOCATION,
        start,
        start + Duration::minutes(30),
        EVENT_TIME_ZONE,
        EVENT_BODY,
        BodyContentType::Text,
    )?;

    let mut response = InviteResponse {
        users_found: users.len(),
        events_created: 0,
        errors: Vec::new(),
    };

    // One task per target; one user's failure must not cancel the others.
    let mut tasks = JoinSet::new();
    for user in targets {
        let graph = state.graph.clone();
        let token = token.clone();
        let payload = payload.clone();
        tasks.spawn(async move {
            let result = graph.create_event(&token, &user.id, &payload).await;
            (user, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (user, result) = joined.map_err(|e| format!("event task panicked: {}", e))?;
        match result {
            Ok(()) => {
                info!("Created an event on {}'s calendar", user.display_name);
                response.events_created += 1;
            }
            Err(e) => {
                let message = describe_failure(&user.display_name, &e);
                error!("{}", message);
                response.errors.push(message);
            }
        }
    }

    if request.record_item {
        match (&state.config.site_id, &state.config.list_id) {
            (Some(site_id), Some(list_id)) => {
                let fields = serde_json::json!({ "Title": EVENT_SUBJECT });
                if let Err(e) = state
                    .graph
                    .create_list_item(&token, site_id, list_id, fields)
                    .await
                {
                    let message = format!("Error recording invite list item: {}", e);
                    warn!("{}", message);
                    response.errors.push(message);
                }
            }
            _ => {
                warn!("record_item requested but no SharePoint site/list configured");
            }
        }
    }

    info!(
        "Invite run complete: {} users, {} events created, {} errors",
        response.users_found,
        response.events_created,
        response.errors.len()
    );

    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
