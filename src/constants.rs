//! Property identifiers for the task resource type.
//!
//! Every identifier lives under the [`TASKS_CATEGORY`] category. Requesting
//! the bare category selects every property in it.

/// Category shared by all task property identifiers.
pub const TASKS_CATEGORY: &str = "Tasks";

/// Name of the cluster the task's request belongs to.
pub const TASK_CLUSTER_NAME_PROPERTY_ID: &str = "Tasks/cluster_name";
/// Owning request id (key property).
pub const TASK_REQUEST_ID_PROPERTY_ID: &str = "Tasks/request_id";
/// Unique task id (key property).
pub const TASK_ID_PROPERTY_ID: &str = "Tasks/id";
/// Owning stage id.
pub const TASK_STAGE_ID_PROPERTY_ID: &str = "Tasks/stage_id";
/// Host the task was dispatched to.
pub const TASK_HOST_NAME_PROPERTY_ID: &str = "Tasks/host_name";
/// Role (component) the task acts on, e.g. `DATANODE`.
pub const TASK_ROLE_PROPERTY_ID: &str = "Tasks/role";
/// Command type, e.g. `START` or `CUSTOM_COMMAND`.
pub const TASK_COMMAND_PROPERTY_ID: &str = "Tasks/command";
/// Lifecycle status.
pub const TASK_STATUS_PROPERTY_ID: &str = "Tasks/status";
/// Process exit code reported by the agent.
pub const TASK_EXIT_CODE_PROPERTY_ID: &str = "Tasks/exit_code";
/// Captured standard error.
pub const TASK_STDERR_PROPERTY_ID: &str = "Tasks/stderr";
/// Captured standard output.
pub const TASK_STDOUT_PROPERTY_ID: &str = "Tasks/stdout";
/// Path of the agent-side output log.
pub const TASK_OUTPUT_LOG_PROPERTY_ID: &str = "Tasks/output_log";
/// Path of the agent-side error log.
pub const TASK_ERROR_LOG_PROPERTY_ID: &str = "Tasks/error_log";
/// Decoded structured output.
pub const TASK_STRUCTURED_OUT_PROPERTY_ID: &str = "Tasks/structured_out";
/// Start time, epoch milliseconds.
pub const TASK_START_TIME_PROPERTY_ID: &str = "Tasks/start_time";
/// End time, epoch milliseconds.
pub const TASK_END_TIME_PROPERTY_ID: &str = "Tasks/end_time";
/// Number of dispatch attempts.
pub const TASK_ATTEMPT_COUNT_PROPERTY_ID: &str = "Tasks/attempt_cnt";
/// Free-text command detail.
pub const TASK_COMMAND_DETAIL_PROPERTY_ID: &str = "Tasks/command_detail";
/// Custom command name, set for `CUSTOM_COMMAND` tasks.
pub const TASK_CUSTOM_COMMAND_NAME_PROPERTY_ID: &str = "Tasks/custom_command_name";
/// Human readable operation name.
pub const TASK_OPS_DISPLAY_NAME_PROPERTY_ID: &str = "Tasks/ops_display_name";
