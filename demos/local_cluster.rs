//! Three-node survey demo
//!
//! Run with: cargo run --example local_cluster [ORG_ID]
//!
//! Starts three in-process nodes, each serving a few channels with some
//! local subscribers, then surveys the cluster from the first node:
//!
//! - the managed channel list for the organization (each channel once)
//! - the cluster-wide subscriber count of every listed channel
//!
//! Set `RUST_LOG=live_survey=debug` to see the per-node traffic.

use std::sync::Arc;

use serde_json::json;

use live_survey::{ChannelRegistry, LocalCluster, LocalNode, SurveyCaller, SurveyDispatcher};

/// Channels a node publishes, and how many local subscribers each one has
struct NodeSetup {
    id: &'static str,
    channels: &'static [(&'static str, usize)],
}

const NODES: &[NodeSetup] = &[
    NodeSetup {
        id: "node-a",
        channels: &[("stream/telemetry/cpu", 2), ("stream/telemetry/mem", 1)],
    },
    NodeSetup {
        id: "node-b",
        channels: &[("stream/telemetry/mem", 4), ("stream/alerts", 0)],
    },
    NodeSetup {
        id: "node-c",
        channels: &[("stream/telemetry/cpu", 3)],
    },
];

async fn start_node(
    cluster: &LocalCluster,
    setup: &NodeSetup,
    org_id: i64,
) -> Result<LocalNode, Box<dyn std::error::Error>> {
    let node = cluster.join(setup.id).await;
    let registry = Arc::new(ChannelRegistry::new());

    for (session_id, (channel, subscribers)) in setup.channels.iter().enumerate() {
        registry
            .register_publisher(org_id, channel, session_id as u64)
            .await?;
        registry
            .publish(channel, json!({"node": setup.id, "seq": session_id}))
            .await?;
        for _ in 0..*subscribers {
            registry.subscribe(org_id, channel).await?;
        }
    }

    let caller = SurveyCaller::new(Arc::new(node.clone()));
    caller
        .setup_handlers(Arc::new(SurveyDispatcher::with_lookups(
            Arc::clone(&registry),
            registry,
        )))
        .await;

    Ok(node)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let org_id: i64 = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 1,
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("live_survey=info".parse()?)
                .add_directive("local_cluster=debug".parse()?),
        )
        .init();

    let cluster = LocalCluster::new();
    let mut nodes = Vec::new();
    for setup in NODES {
        nodes.push(start_node(&cluster, setup, org_id).await?);
    }

    let caller = SurveyCaller::new(Arc::new(nodes[0].clone()));

    let channels = caller.call_managed_channels(org_id).await?;
    tracing::info!(org_id = org_id, channels = channels.len(), "Managed channels surveyed");

    for channel in &channels {
        let subscribers = caller.call_num_subscribers(&channel.channel).await?;
        tracing::info!(
            channel = %channel.channel,
            subscribers = subscribers,
            minute_rate = channel.minute_rate,
            data = %channel.data,
            "Channel"
        );
    }

    let stats = caller.stats();
    tracing::info!(
        calls = stats.calls,
        failed = stats.failed_calls,
        replies = stats.replies,
        "Survey stats"
    );

    Ok(())
}
