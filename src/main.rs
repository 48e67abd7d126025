use std::sync::Arc;

use anyhow::Result;
use log::info;

use rs_posture_pipeline::config::config::{PoseModelConfig, PostureThresholds, ServerConfig};
use rs_posture_pipeline::pipeline::pipeline::PosturePipeline;
use rs_posture_pipeline::server::server::router;
use rs_posture_pipeline::triton_client::client::TritonInferenceClient;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let server_config = ServerConfig::from_env();
    let triton = TritonInferenceClient::from_addr(&server_config.triton_endpoint)?;
    let pipeline = Arc::new(PosturePipeline::new(
        triton,
        PoseModelConfig::new(),
        PostureThresholds::new(),
    ));

    let app = router(pipeline);
    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr).await?;
    info!(
        "posture analysis server listening on {}, model endpoint {}",
        server_config.bind_addr, server_config.triton_endpoint
    );
    axum::serve(listener, app).await?;

    Ok(())
}
