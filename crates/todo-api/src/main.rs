use std::sync::Arc;

use anyhow::Context;
use infrastructure::{DynamoDbClient, DynamoTodoStore};
use lambda_http::{run, service_fn, Error, Request};
use shared::{init_tracing, Config};
use todo_api::{route, AppState, AttachmentLocation, TodoService};

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing()?;

    let config = Config::from_env().context("failed to load configuration")?;
    tracing::info!(
        table = %config.todos_table,
        index = %config.todos_index,
        region = %config.aws_region,
        "Starting todo API"
    );

    let db = DynamoDbClient::new(&config).await;
    let service = TodoService::new(
        DynamoTodoStore::new(db),
        AttachmentLocation::from_config(&config),
    );
    let state = Arc::new(AppState::new(service, config.empty_list_is_error));

    run(service_fn(move |req: Request| {
        let state = Arc::clone(&state);
        async move { route(req, &*state).await }
    }))
    .await
}
