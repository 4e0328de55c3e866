use clap::{Parser, Subcommand};
use tonic::metadata::AsciiMetadataValue;
use tonic::transport::Channel;
use tonic::Request;
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;

use chomp_gateway::chomp::proto::chomp_service_client::ChompServiceClient;
use chomp_gateway::chomp::proto::{GetFoodRequest, ListFoodsRequest};
use chomp_gateway::chomp::service::API_KEY_HEADER;
use chomp_gateway::chomp::SERVICE_NAME;

#[derive(Parser)]
#[command(name = "chomp-cli")]
#[command(about = "Command-line client for the Chomp RPC gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Chomp API key, forwarded as the `api_key` header
    #[arg(short = 'k', long, env = "CHOMP_API_KEY", default_value = "")]
    api_key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one food by barcode
    Get {
        #[arg(long)]
        code: String,
    },
    /// Search foods by name
    List {
        #[arg(long)]
        name: String,
    },
    /// Query the health endpoint
    Health {
        #[arg(long, default_value = SERVICE_NAME)]
        service: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let channel = Channel::from_shared(cli.url)?.connect().await?;

    match cli.command {
        Commands::Get { code } => {
            let mut client = ChompServiceClient::new(channel);
            let request = with_api_key(GetFoodRequest { code }, &cli.api_key)?;
            let response = client.get_food(request).await?;
            print_json(&response.into_inner())?;
        }
        Commands::List { name } => {
            let mut client = ChompServiceClient::new(channel);
            let request = with_api_key(ListFoodsRequest { name }, &cli.api_key)?;
            let response = client.list_foods(request).await?;
            print_json(&response.into_inner())?;
        }
        Commands::Health { service } => {
            let mut client = HealthClient::new(channel);
            let response = client
                .check(HealthCheckRequest {
                    service: service.clone(),
                })
                .await?;
            let status = ServingStatus::try_from(response.into_inner().status)
                .unwrap_or(ServingStatus::Unknown);
            println!("{service}: {}", status.as_str_name());
        }
    }

    Ok(())
}

fn with_api_key<T>(message: T, api_key: &str) -> Result<Request<T>, Box<dyn std::error::Error>> {
    let mut request = Request::new(message);
    if !api_key.is_empty() {
        let value: AsciiMetadataValue = api_key.parse()?;
        request.metadata_mut().insert(API_KEY_HEADER, value);
    }
    Ok(request)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
