//! # av-node
//!
//! Demonstration binary: loads configuration from the environment, spawns a
//! four-agent pool, has it verify a freshly signed message by consensus and
//! prints the result as JSON.
//!
//! ```text
//! AV_LOG_LEVEL=debug AV_JSON_LOGS=true av-node
//! ```
//!
//! Built with `--features metrics`, the Prometheus exposition is printed
//! after the result.

use anyhow::{Context, Result};
use av_02_agent_pool::Topology;
use av_runtime::{SystemConfig, VerificationSystem};
use shared_crypto::Identity;
use tracing::info;

const DEMO_POOL_SIZE: usize = 4;
const DEMO_MESSAGE: &[u8] = b"transfer 10 units from alice to bob";

#[tokio::main]
async fn main() -> Result<()> {
    let config = SystemConfig::from_env();
    av_telemetry::init_tracing(&config.telemetry).context("Failed to initialise tracing")?;

    let system = VerificationSystem::new(config).context("Invalid configuration")?;
    let pool = system
        .spawn_pool(DEMO_POOL_SIZE, Topology::Mesh)
        .context("Failed to spawn agent pool")?;

    let signer = Identity::generate().context("Failed to generate signing identity")?;
    let signature = signer.sign(DEMO_MESSAGE).context("Failed to sign demo message")?;
    info!(signer = %signer.did(), "signed demo message");

    let result = system
        .verify_with_consensus(
            DEMO_MESSAGE,
            signature.as_bytes(),
            signer.public_key().as_bytes(),
            pool,
        )
        .await
        .context("Consensus round failed")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("Failed to encode result")?
    );

    if cfg!(feature = "metrics") {
        let exposition = av_telemetry::encode_metrics().context("Failed to encode metrics")?;
        println!("{exposition}");
    }

    system.destroy_pool(pool).context("Failed to destroy pool")?;
    Ok(())
}
