//! Reading task status through the task resource provider.
//!
//! Seeds an in-memory store with the tasks of two requests, then runs a few
//! reads: a keyed lookup, listings filtered by status class, and a
//! drill-down into a host check's structured output. One task carries a corrupt
//! payload to show it degrading to `null`.
//!
//! Run with `RUST_LOG=debug cargo run --example s01_task_status` to see the
//! provider's logging.

use std::sync::Arc;

use task_resources::constants::*;
use task_resources::{
    HostRoleStatus, InMemoryTaskStore, Predicate, ProviderConfig, ReadRequest, ResourceProvider,
    RoleCommand, SortRequest, TaskRecord, TaskResourceProvider,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const HOST_CHECK: &str = r#"{"host_resolution_check": {"failures": [{"cause": [-2, "Name or service not known"], "host": "foobar", "type": "FORWARD_LOOKUP"}], "message": "There were 1 host(s) that could not resolve to an IP address.", "failed_count": 1, "success_count": 3, "exit_code": 0}}"#;

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// ORs together a status equality for every status `keep` accepts.
fn status_filter(keep: impl Fn(&HostRoleStatus) -> bool) -> Option<Predicate> {
    HostRoleStatus::ALL
        .iter()
        .filter(|&status| keep(status))
        .map(|status| Predicate::property(TASK_STATUS_PROPERTY_ID).equals(status.as_str()))
        .reduce(Predicate::or)
}

fn seed() -> InMemoryTaskStore {
    [
        TaskRecord::new(1, 1, 1, "check_host")
            .with_host_name("c6401.example.com")
            .with_command(RoleCommand::ActionExecute)
            .with_status(HostRoleStatus::Completed)
            .with_exit_code(0)
            .with_times(1_000, Some(4_000))
            .with_structured_out(HOST_CHECK),
        TaskRecord::new(1, 2, 1, "check_host")
            .with_host_name("c6402.example.com")
            .with_command(RoleCommand::ActionExecute)
            .with_status(HostRoleStatus::Failed)
            .with_exit_code(1)
            .with_times(1_200, Some(2_500))
            .with_structured_out("{\"truncated"),
        TaskRecord::new(2, 3, 1, "DATANODE")
            .with_cluster_name("c1")
            .with_host_name("c6401.example.com")
            .with_command(RoleCommand::Start)
            .with_status(HostRoleStatus::InProgress)
            .with_times(5_000, None)
            .with_command_detail("START DATANODE"),
        TaskRecord::new(2, 4, 1, "NAMENODE")
            .with_cluster_name("c1")
            .with_host_name("c6402.example.com")
            .with_command(RoleCommand::Start)
            .with_status(HostRoleStatus::Queued)
            .with_command_detail("START NAMENODE"),
    ]
    .into_iter()
    .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = ProviderConfig::from_toml("max_results = 10\n")?;
    let provider = TaskResourceProvider::new(Arc::new(seed())).with_config(config);

    println!("=== Keyed lookup ===");
    let predicate = Predicate::property(TASK_ID_PROPERTY_ID)
        .equals("3")
        .and(Predicate::property(TASK_REQUEST_ID_PROPERTY_ID).equals("2"));
    let request = ReadRequest::with_properties([
        TASK_ID_PROPERTY_ID,
        TASK_ROLE_PROPERTY_ID,
        TASK_STATUS_PROPERTY_ID,
        TASK_COMMAND_DETAIL_PROPERTY_ID,
    ]);
    for resource in provider.read(&request, Some(&predicate)).await? {
        println!("{}", serde_json::to_string_pretty(resource.properties())?);
    }

    println!("\n=== Unfinished tasks, latest start first ===");
    let unfinished = status_filter(|status| !status.is_completed_state());
    let request = ReadRequest::with_properties([
        TASK_ID_PROPERTY_ID,
        TASK_HOST_NAME_PROPERTY_ID,
        TASK_STATUS_PROPERTY_ID,
        TASK_START_TIME_PROPERTY_ID,
    ])
    .sort_by(SortRequest::descending(TASK_START_TIME_PROPERTY_ID));
    for resource in provider.read(&request, unfinished.as_ref()).await? {
        println!("{}", serde_json::to_string(resource.properties())?);
    }

    println!("\n=== Failed tasks ===");
    let failed = status_filter(HostRoleStatus::is_failed_state);
    let request = ReadRequest::with_properties([TASK_ID_PROPERTY_ID, TASK_EXIT_CODE_PROPERTY_ID]);
    for resource in provider.read(&request, failed.as_ref()).await? {
        println!("{}", serde_json::to_string(resource.properties())?);
    }

    println!("\n=== Host check results ===");
    let predicate = Predicate::property(TASK_REQUEST_ID_PROPERTY_ID).equals("1");
    let request =
        ReadRequest::with_properties([TASK_ID_PROPERTY_ID, TASK_STRUCTURED_OUT_PROPERTY_ID]);
    for resource in provider.read(&request, Some(&predicate)).await? {
        let task_id = resource.get(TASK_ID_PROPERTY_ID).and_then(|v| v.as_i64());
        let failed = resource
            .get(TASK_STRUCTURED_OUT_PROPERTY_ID)
            .and_then(|v| v.pointer("/host_resolution_check/failed_count"))
            .map(ToString::to_string)
            .unwrap_or_else(|| "n/a".to_string());
        println!("task {task_id:?}: failed_count = {failed}");
    }

    println!("\n=== Mutations are refused ===");
    if let Err(err) = provider.delete(Some(&predicate)).await {
        println!("{err}");
    }

    Ok(())
}
