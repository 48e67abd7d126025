use anyhow::Error;
use tonic::transport::{Channel, Endpoint};

pub mod triton {
    tonic::include_proto!("inference");
}

use triton::grpc_inference_service_client::GrpcInferenceServiceClient;
use triton::{
    ModelConfigRequest, ModelConfigResponse, ModelInferRequest, ModelInferResponse,
    ServerLiveRequest,
};

/// Thin wrapper around the generated Triton gRPC client. The channel is built
/// lazily so the pipeline can be constructed before the model server is up.
#[derive(Debug, Clone)]
pub struct TritonInferenceClient {
    inner: GrpcInferenceServiceClient<Channel>,
}

impl TritonInferenceClient {
    /// from_addr builds a client against an endpoint such as `http://127.0.0.1:8001`.
    ///
    /// # Arguments
    /// * `addr` - &str
    ///
    /// # Returns
    /// * `Result<TritonInferenceClient, Error>`
    pub fn from_addr(addr: &str) -> Result<Self, Error> {
        let channel = Endpoint::from_shared(addr.to_string())?.connect_lazy();
        Ok(TritonInferenceClient {
            inner: GrpcInferenceServiceClient::new(channel),
        })
    }

    pub async fn is_server_live(&self) -> Result<bool, Error> {
        let resp = self
            .inner
            .clone()
            .server_live(ServerLiveRequest {})
            .await?
            .into_inner();
        Ok(resp.live)
    }

    pub async fn model_config(&self, request: ModelConfigRequest) -> Result<ModelConfigResponse, Error> {
        let resp = self.inner.clone().model_config(request).await?.into_inner();
        Ok(resp)
    }

    pub async fn model_infer(&self, request: ModelInferRequest) -> Result<ModelInferResponse, Error> {
        let resp = self.inner.clone().model_infer(request).await?.into_inner();
        Ok(resp)
    }
}
