use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::Client;
use shared::Config;
use tracing::info;

/// The process-wide DynamoDB handle. Built once at startup and handed to the
/// repositories that need it.
#[derive(Clone)]
pub struct DynamoDbClient {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DynamoDbClient {
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()));

        if let Some(endpoint) = &config.dynamodb_endpoint {
            info!(endpoint = %endpoint, "Using local DynamoDB endpoint");
            loader = loader
                .endpoint_url(endpoint)
                .credentials_provider(Credentials::new("local", "local", None, None, "local"));
        }

        let aws_config = loader.load().await;

        Self::from_client(
            Client::new(&aws_config),
            config.todos_table.clone(),
            config.todos_index.clone(),
        )
    }

    pub fn from_client(client: Client, table_name: String, index_name: String) -> Self {
        Self {
            client,
            table_name,
            index_name,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }
}
