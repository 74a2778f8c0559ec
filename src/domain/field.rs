//! Storage-native field names and values of a [`TaskRecord`].

use std::cmp::Ordering;
use std::fmt;

use crate::domain::record::{HostRoleStatus, RoleCommand, TaskRecord};

/// A column of the persisted task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    ClusterName,
    RequestId,
    TaskId,
    StageId,
    HostName,
    Role,
    Command,
    Status,
    ExitCode,
    Stderr,
    Stdout,
    OutputLog,
    ErrorLog,
    StructuredOut,
    StartTime,
    EndTime,
    AttemptCount,
    CommandDetail,
    CustomCommandName,
    OpsDisplayName,
}

impl TaskField {
    /// Column name as the store knows it.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::ClusterName => "cluster_name",
            Self::RequestId => "request_id",
            Self::TaskId => "task_id",
            Self::StageId => "stage_id",
            Self::HostName => "host_name",
            Self::Role => "role",
            Self::Command => "role_command",
            Self::Status => "status",
            Self::ExitCode => "exit_code",
            Self::Stderr => "std_error",
            Self::Stdout => "std_out",
            Self::OutputLog => "output_log",
            Self::ErrorLog => "error_log",
            Self::StructuredOut => "structured_out",
            Self::StartTime => "start_time",
            Self::EndTime => "end_time",
            Self::AttemptCount => "attempt_count",
            Self::CommandDetail => "command_detail",
            Self::CustomCommandName => "custom_command_name",
            Self::OpsDisplayName => "ops_display_name",
        }
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// A typed column value, as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
    Status(HostRoleStatus),
    Command(RoleCommand),
}

impl FieldValue {
    fn rank(&self) -> u8 {
        match self {
            Self::Integer(_) => 0,
            Self::Text(_) => 1,
            Self::Status(_) => 2,
            Self::Command(_) => 3,
        }
    }

    /// Ordering between two values of the same kind.
    ///
    /// Returns `None` when the kinds differ. Statuses and commands are
    /// ordered by name.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Status(a), Self::Status(b)) => Some(a.as_str().cmp(b.as_str())),
            (Self::Command(a), Self::Command(b)) => Some(a.as_str().cmp(b.as_str())),
            _ => None,
        }
    }

    /// Total order used for sorting: same-kind values by [`compare`](Self::compare),
    /// mixed kinds by kind.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
            .unwrap_or_else(|| self.rank().cmp(&other.rank()))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
            Self::Status(v) => write!(f, "{v}"),
            Self::Command(v) => write!(f, "{v}"),
        }
    }
}

impl TaskRecord {
    /// Reads one column. `None` when the column is unset.
    ///
    /// The structured output column is returned as its raw text.
    pub fn field(&self, field: TaskField) -> Option<FieldValue> {
        let text = |v: &Option<String>| v.clone().map(FieldValue::Text);
        match field {
            TaskField::ClusterName => text(&self.cluster_name),
            TaskField::RequestId => Some(FieldValue::Integer(self.request_id)),
            TaskField::TaskId => Some(FieldValue::Integer(self.task_id)),
            TaskField::StageId => Some(FieldValue::Integer(self.stage_id)),
            TaskField::HostName => text(&self.host_name),
            TaskField::Role => Some(FieldValue::Text(self.role.clone())),
            TaskField::Command => self.command.map(FieldValue::Command),
            TaskField::Status => Some(FieldValue::Status(self.status)),
            TaskField::ExitCode => self.exit_code.map(FieldValue::Integer),
            TaskField::Stderr => text(&self.stderr),
            TaskField::Stdout => text(&self.stdout),
            TaskField::OutputLog => text(&self.output_log),
            TaskField::ErrorLog => text(&self.error_log),
            TaskField::StructuredOut => text(&self.structured_out),
            TaskField::StartTime => self.start_time.map(FieldValue::Integer),
            TaskField::EndTime => self.end_time.map(FieldValue::Integer),
            TaskField::AttemptCount => Some(FieldValue::Integer(self.attempt_count)),
            TaskField::CommandDetail => text(&self.command_detail),
            TaskField::CustomCommandName => text(&self.custom_command_name),
            TaskField::OpsDisplayName => text(&self.ops_display_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_reads_columns() {
        let record = TaskRecord::new(7, 8, 9, "DATANODE")
            .with_status(HostRoleStatus::Failed)
            .with_command_detail("detail");
        assert_eq!(record.field(TaskField::RequestId), Some(FieldValue::Integer(7)));
        assert_eq!(record.field(TaskField::TaskId), Some(FieldValue::Integer(8)));
        assert_eq!(record.field(TaskField::StageId), Some(FieldValue::Integer(9)));
        assert_eq!(
            record.field(TaskField::Role),
            Some(FieldValue::Text("DATANODE".to_string()))
        );
        assert_eq!(
            record.field(TaskField::Status),
            Some(FieldValue::Status(HostRoleStatus::Failed))
        );
        assert_eq!(
            record.field(TaskField::CommandDetail),
            Some(FieldValue::Text("detail".to_string()))
        );
        assert_eq!(record.field(TaskField::ExitCode), None);
        assert_eq!(record.field(TaskField::Command), None);
    }

    #[test]
    fn compare_same_kind_only() {
        let a = FieldValue::Integer(1);
        let b = FieldValue::Integer(2);
        assert_eq!(a.compare(&b), Some(Ordering::Less));
        assert_eq!(a.compare(&FieldValue::Text("1".to_string())), None);
        assert_eq!(
            FieldValue::Status(HostRoleStatus::Completed)
                .compare(&FieldValue::Status(HostRoleStatus::Aborted)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn sort_cmp_is_total_across_kinds() {
        let int = FieldValue::Integer(100);
        let text = FieldValue::Text("a".to_string());
        assert_eq!(int.sort_cmp(&text), Ordering::Less);
        assert_eq!(text.sort_cmp(&int), Ordering::Greater);
    }
}
