//! Task record -- the persisted status row of one dispatched task.
//!
//! Records are created and mutated only by the orchestration engine. This
//! crate reads them; nothing here writes a record back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of a task on its host.
///
/// # Examples
///
/// ```
/// use task_resources::domain::HostRoleStatus;
///
/// let status: HostRoleStatus = "in_progress".parse().unwrap();
/// assert_eq!(status, HostRoleStatus::InProgress);
/// assert_eq!(status.to_string(), "IN_PROGRESS");
/// assert!(!status.is_completed_state());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostRoleStatus {
    /// Created, not yet queued for the agent.
    Pending,
    /// Queued, waiting for the agent to pick it up.
    Queued,
    /// Running on the host.
    InProgress,
    /// Waiting for manual intervention.
    Holding,
    /// Finished successfully.
    Completed,
    /// Finished with a failure.
    Failed,
    /// Failed and waiting for manual intervention.
    HoldingFailed,
    /// Did not report back in time.
    Timedout,
    /// Timed out and waiting for manual intervention.
    HoldingTimedout,
    /// Aborted before completion.
    Aborted,
    /// Failed, but the failure was skipped.
    SkippedFailed,
}

impl HostRoleStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 11] = [
        Self::Pending,
        Self::Queued,
        Self::InProgress,
        Self::Holding,
        Self::Completed,
        Self::Failed,
        Self::HoldingFailed,
        Self::Timedout,
        Self::HoldingTimedout,
        Self::Aborted,
        Self::SkippedFailed,
    ];

    /// Upper-snake name used on the wire and in filter literals.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Queued => "QUEUED",
            Self::InProgress => "IN_PROGRESS",
            Self::Holding => "HOLDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::HoldingFailed => "HOLDING_FAILED",
            Self::Timedout => "TIMEDOUT",
            Self::HoldingTimedout => "HOLDING_TIMEDOUT",
            Self::Aborted => "ABORTED",
            Self::SkippedFailed => "SKIPPED_FAILED",
        }
    }

    /// Returns `true` once the task will make no further progress.
    pub fn is_completed_state(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Timedout | Self::Aborted | Self::SkippedFailed
        )
    }

    /// Returns `true` for every failure flavour, including held ones.
    pub fn is_failed_state(&self) -> bool {
        matches!(
            self,
            Self::Failed
                | Self::HoldingFailed
                | Self::Timedout
                | Self::HoldingTimedout
                | Self::Aborted
                | Self::SkippedFailed
        )
    }
}

impl fmt::Display for HostRoleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostRoleStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant::new("status", s))
    }
}

/// Kind of command a task runs against its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleCommand {
    /// Install the component.
    Install,
    /// Uninstall the component.
    Uninstall,
    /// Start the component.
    Start,
    /// Restart the component.
    Restart,
    /// Stop the component.
    Stop,
    /// Execute an arbitrary command.
    Execute,
    /// Abort a running command.
    Abort,
    /// Upgrade the component.
    Upgrade,
    /// Run the service check.
    ServiceCheck,
    /// Run a named custom command.
    CustomCommand,
    /// Run an action definition.
    #[serde(rename = "ACTIONEXECUTE")]
    ActionExecute,
}

impl RoleCommand {
    const ALL: [Self; 11] = [
        Self::Install,
        Self::Uninstall,
        Self::Start,
        Self::Restart,
        Self::Stop,
        Self::Execute,
        Self::Abort,
        Self::Upgrade,
        Self::ServiceCheck,
        Self::CustomCommand,
        Self::ActionExecute,
    ];

    /// Upper-snake name used on the wire and in filter literals.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "INSTALL",
            Self::Uninstall => "UNINSTALL",
            Self::Start => "START",
            Self::Restart => "RESTART",
            Self::Stop => "STOP",
            Self::Execute => "EXECUTE",
            Self::Abort => "ABORT",
            Self::Upgrade => "UPGRADE",
            Self::ServiceCheck => "SERVICE_CHECK",
            Self::CustomCommand => "CUSTOM_COMMAND",
            Self::ActionExecute => "ACTIONEXECUTE",
        }
    }
}

impl fmt::Display for RoleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleCommand {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant::new("command", s))
    }
}

/// A string did not name any variant of a task enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Persisted status of one task.
///
/// `(request_id, task_id)` is unique across all records. Optional fields
/// stay `None` until the orchestration engine has something to report.
///
/// # Construction
///
/// ```
/// use task_resources::domain::{HostRoleStatus, TaskRecord};
///
/// let record = TaskRecord::new(100, 100, 100, "DATANODE")
///     .with_custom_command_name("customCommandName")
///     .with_command_detail("commandDetail");
/// assert_eq!(record.key(), (100, 100));
/// assert_eq!(record.status, HostRoleStatus::Pending);
/// assert!(record.structured_out.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Request this task belongs to.
    pub request_id: i64,
    /// Task id, unique within the request.
    pub task_id: i64,
    /// Stage of the request that scheduled the task.
    pub stage_id: i64,
    /// Cluster the request targets, if any.
    pub cluster_name: Option<String>,
    /// Host the task was dispatched to.
    pub host_name: Option<String>,
    /// Component role, e.g. `DATANODE`.
    pub role: String,
    /// Command run against the role.
    pub command: Option<RoleCommand>,
    /// Lifecycle status.
    pub status: HostRoleStatus,
    /// Exit code reported by the agent.
    pub exit_code: Option<i64>,
    /// Captured standard error.
    pub stderr: Option<String>,
    /// Captured standard output.
    pub stdout: Option<String>,
    /// Agent-side output log path.
    pub output_log: Option<String>,
    /// Agent-side error log path.
    pub error_log: Option<String>,
    /// JSON-encoded diagnostic payload, decoded on read.
    pub structured_out: Option<String>,
    /// Start time in epoch milliseconds.
    pub start_time: Option<i64>,
    /// End time in epoch milliseconds.
    pub end_time: Option<i64>,
    /// Number of dispatch attempts so far.
    pub attempt_count: i64,
    /// Free-text command detail.
    pub command_detail: Option<String>,
    /// Name of the custom command, for `CUSTOM_COMMAND` tasks.
    pub custom_command_name: Option<String>,
    /// Human readable operation name.
    pub ops_display_name: Option<String>,
}

impl TaskRecord {
    /// Creates a pending record with no output and no attempts.
    pub fn new(request_id: i64, task_id: i64, stage_id: i64, role: impl Into<String>) -> Self {
        Self {
            request_id,
            task_id,
            stage_id,
            cluster_name: None,
            host_name: None,
            role: role.into(),
            command: None,
            status: HostRoleStatus::Pending,
            exit_code: None,
            stderr: None,
            stdout: None,
            output_log: None,
            error_log: None,
            structured_out: None,
            start_time: None,
            end_time: None,
            attempt_count: 0,
            command_detail: None,
            custom_command_name: None,
            ops_display_name: None,
        }
    }

    /// The record's unique `(request_id, task_id)` key.
    pub fn key(&self) -> (i64, i64) {
        (self.request_id, self.task_id)
    }

    /// Sets the cluster name.
    pub fn with_cluster_name(mut self, cluster_name: impl Into<String>) -> Self {
        self.cluster_name = Some(cluster_name.into());
        self
    }

    /// Sets the host name.
    pub fn with_host_name(mut self, host_name: impl Into<String>) -> Self {
        self.host_name = Some(host_name.into());
        self
    }

    /// Sets the command.
    pub fn with_command(mut self, command: RoleCommand) -> Self {
        self.command = Some(command);
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: HostRoleStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the exit code.
    pub fn with_exit_code(mut self, exit_code: i64) -> Self {
        self.exit_code = Some(exit_code);
        self
    }

    /// Sets captured stdout and stderr.
    pub fn with_output(mut self, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.stdout = Some(stdout.into());
        self.stderr = Some(stderr.into());
        self
    }

    /// Sets the agent-side log paths.
    pub fn with_logs(
        mut self,
        output_log: impl Into<String>,
        error_log: impl Into<String>,
    ) -> Self {
        self.output_log = Some(output_log.into());
        self.error_log = Some(error_log.into());
        self
    }

    /// Sets the raw structured output payload.
    pub fn with_structured_out(mut self, structured_out: impl Into<String>) -> Self {
        self.structured_out = Some(structured_out.into());
        self
    }

    /// Sets start and end times, epoch milliseconds.
    pub fn with_times(mut self, start_time: i64, end_time: Option<i64>) -> Self {
        self.start_time = Some(start_time);
        self.end_time = end_time;
        self
    }

    /// Sets the attempt count.
    pub fn with_attempt_count(mut self, attempt_count: i64) -> Self {
        self.attempt_count = attempt_count;
        self
    }

    /// Sets the command detail.
    pub fn with_command_detail(mut self, command_detail: impl Into<String>) -> Self {
        self.command_detail = Some(command_detail.into());
        self
    }

    /// Sets the custom command name.
    pub fn with_custom_command_name(mut self, name: impl Into<String>) -> Self {
        self.custom_command_name = Some(name.into());
        self
    }

    /// Sets the operation display name.
    pub fn with_ops_display_name(mut self, name: impl Into<String>) -> Self {
        self.ops_display_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            "COMPLETED".parse::<HostRoleStatus>(),
            Ok(HostRoleStatus::Completed)
        );
        assert_eq!(
            "holding_timedout".parse::<HostRoleStatus>(),
            Ok(HostRoleStatus::HoldingTimedout)
        );
        let err = "DONE".parse::<HostRoleStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown status: DONE");
    }

    #[test]
    fn status_serde_matches_display() {
        for status in HostRoleStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.as_str());
        }
    }

    #[test]
    fn completed_states() {
        assert!(HostRoleStatus::Completed.is_completed_state());
        assert!(HostRoleStatus::Aborted.is_completed_state());
        assert!(!HostRoleStatus::HoldingFailed.is_completed_state());
        assert!(HostRoleStatus::HoldingFailed.is_failed_state());
        assert!(!HostRoleStatus::Completed.is_failed_state());
    }

    #[test]
    fn command_names_round_trip() {
        for command in RoleCommand::ALL {
            assert_eq!(command.as_str().parse::<RoleCommand>(), Ok(command));
            assert_eq!(serde_json::to_value(command).unwrap(), command.as_str());
        }
        assert_eq!(
            "actionexecute".parse::<RoleCommand>(),
            Ok(RoleCommand::ActionExecute)
        );
    }

    #[test]
    fn new_record_defaults() {
        let record = TaskRecord::new(1, 2, 3, "NAMENODE");
        assert_eq!(record.key(), (1, 2));
        assert_eq!(record.stage_id, 3);
        assert_eq!(record.role, "NAMENODE");
        assert_eq!(record.status, HostRoleStatus::Pending);
        assert_eq!(record.attempt_count, 0);
        assert!(record.command.is_none());
        assert!(record.exit_code.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let record = TaskRecord::new(1, 2, 3, "DATANODE")
            .with_command(RoleCommand::Start)
            .with_status(HostRoleStatus::Completed)
            .with_exit_code(0)
            .with_times(1_000, Some(2_000))
            .with_attempt_count(1);
        assert_eq!(record.command, Some(RoleCommand::Start));
        assert_eq!(record.status, HostRoleStatus::Completed);
        assert_eq!(record.exit_code, Some(0));
        assert_eq!(record.start_time, Some(1_000));
        assert_eq!(record.end_time, Some(2_000));
        assert_eq!(record.attempt_count, 1);
    }
}
