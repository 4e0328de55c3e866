//! `chomp.v1beta1.ChompService` implementation.

use tonic::codec::CompressionEncoding;
use tonic::metadata::{MetadataMap, MetadataValue};
use tonic::{Request, Response, Status};

use crate::chomp::client::ChompClient;
use crate::chomp::convert::{all_foods, first_food};
use crate::chomp::error::ServiceError;
use crate::chomp::proto::chomp_service_server::{ChompService, ChompServiceServer};
use crate::chomp::proto::{GetFoodRequest, GetFoodResponse, ListFoodsRequest, ListFoodsResponse};
use crate::rpc::{HandlerOutput, HandlerProvider};

/// Request header carrying the upstream credential.
pub const API_KEY_HEADER: &str = "api_key";

/// Response header set on every successful call.
pub const API_VERSION_HEADER: &str = "api-version";
pub const API_VERSION: &str = "v1beta1";

/// Responses smaller than this are sent uncompressed.
pub const COMPRESS_MIN_BYTES: usize = 1024;

/// Stateless RPC service backed by one upstream call per request.
#[derive(Debug, Clone)]
pub struct ChompGateway {
    client: ChompClient,
}

impl ChompGateway {
    pub fn new(client: ChompClient) -> Self {
        Self { client }
    }
}

impl HandlerProvider for ChompGateway {
    fn handler(self) -> HandlerOutput {
        let server = ChompServiceServer::new(self)
            .accept_compressed(CompressionEncoding::Gzip)
            .send_compressed(CompressionEncoding::Gzip);
        HandlerOutput::from_service(server)
    }
}

#[tonic::async_trait]
impl ChompService for ChompGateway {
    #[tracing::instrument(skip_all)]
    async fn get_food(
        &self,
        request: Request<GetFoodRequest>,
    ) -> Result<Response<GetFoodResponse>, Status> {
        let api_key = api_key(request.metadata())?;
        let code = request.into_inner().code;

        tracing::info!(barcode = %code, "Retrieving food");

        let payload = self
            .client
            .food_by_barcode(&api_key, &code)
            .await
            .map_err(ServiceError::from)?;
        let food = first_food(payload)?;

        Ok(versioned(GetFoodResponse { food: Some(food) }))
    }

    #[tracing::instrument(skip_all)]
    async fn list_foods(
        &self,
        request: Request<ListFoodsRequest>,
    ) -> Result<Response<ListFoodsResponse>, Status> {
        let api_key = api_key(request.metadata())?;
        let name = request.into_inner().name;

        tracing::info!(query = %name, "Retrieving foods");

        let payload = self
            .client
            .foods_by_name(&api_key, &name)
            .await
            .map_err(ServiceError::from)?;
        let items = all_foods(payload)?;

        Ok(versioned(ListFoodsResponse { items }))
    }
}

/// Extract the upstream credential from the `api_key` header.
///
/// The first value is returned verbatim. A missing header, or one that is not
/// visible ASCII, is a permission error.
pub fn api_key(metadata: &MetadataMap) -> Result<String, ServiceError> {
    metadata
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or(ServiceError::PermissionDenied)
}

fn versioned<T: prost::Message>(message: T) -> Response<T> {
    let small = message.encoded_len() < COMPRESS_MIN_BYTES;
    let mut response = Response::new(message);
    if small {
        response.disable_compression();
    }
    response
        .metadata_mut()
        .insert(API_VERSION_HEADER, MetadataValue::from_static(API_VERSION));
    response
}
