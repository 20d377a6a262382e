//! Inventory records
//!
//! Raw provider records arrive as JSON objects in the service's wire naming.
//! They are converted here, once, into typed rows; absent optional fields
//! become empty text or an empty numeric cell.

use crate::resource::{i64_at, str_at};
use serde_json::Value;

/// One spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(i64),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    fn number(value: Option<i64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Empty)
    }
}

/// A flat record that becomes one report row
pub trait InventoryRecord {
    /// Sheet the records are written to
    const SHEET_NAME: &'static str;
    /// Header row, in column order
    const COLUMNS: &'static [&'static str];

    fn region(&self) -> &str;

    /// Cells in `COLUMNS` order
    fn cells(&self) -> Vec<Cell>;
}

fn text_at(raw: &Value, path: &str) -> String {
    str_at(raw, path).unwrap_or_default().to_string()
}

/// CloudWatch metric namespace seen in a region
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceRecord {
    pub region: String,
    pub namespace: String,
}

impl NamespaceRecord {
    pub fn new(region: &str, namespace: &str) -> Self {
        Self {
            region: region.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

impl InventoryRecord for NamespaceRecord {
    const SHEET_NAME: &'static str = "Namespaces";
    const COLUMNS: &'static [&'static str] = &["Region", "Namespace"];

    fn region(&self) -> &str {
        &self.region
    }

    fn cells(&self) -> Vec<Cell> {
        vec![Cell::text(&self.region), Cell::text(&self.namespace)]
    }
}

/// EC2 instance
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceRecord {
    pub region: String,
    pub instance_id: String,
    pub name: String,
    pub instance_type: String,
    pub state: String,
    pub private_ip: String,
    pub public_ip: String,
    pub vpc_id: String,
    pub launch_time: String,
}

impl InstanceRecord {
    pub fn from_raw(region: &str, raw: &Value) -> Self {
        Self {
            region: region.to_string(),
            instance_id: text_at(raw, "InstanceId"),
            name: name_tag(raw).unwrap_or_default().to_string(),
            instance_type: text_at(raw, "InstanceType"),
            state: text_at(raw, "State.Name"),
            private_ip: text_at(raw, "PrivateIpAddress"),
            public_ip: text_at(raw, "PublicIpAddress"),
            vpc_id: text_at(raw, "VpcId"),
            launch_time: text_at(raw, "LaunchTime"),
        }
    }
}

/// Value of the first tag keyed exactly `Name`
fn name_tag(raw: &Value) -> Option<&str> {
    raw.get("Tags")?
        .as_array()?
        .iter()
        .find(|tag| str_at(tag, "Key") == Some("Name"))
        .and_then(|tag| str_at(tag, "Value"))
}

impl InventoryRecord for InstanceRecord {
    const SHEET_NAME: &'static str = "EC2";
    const COLUMNS: &'static [&'static str] = &[
        "Region",
        "InstanceId",
        "Name",
        "Type",
        "State",
        "PrivateIP",
        "PublicIP",
        "VpcId",
        "LaunchTime",
    ];

    fn region(&self) -> &str {
        &self.region
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.region),
            Cell::text(&self.instance_id),
            Cell::text(&self.name),
            Cell::text(&self.instance_type),
            Cell::text(&self.state),
            Cell::text(&self.private_ip),
            Cell::text(&self.public_ip),
            Cell::text(&self.vpc_id),
            Cell::text(&self.launch_time),
        ]
    }
}

/// RDS database instance
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseRecord {
    pub region: String,
    pub identifier: String,
    pub engine: String,
    pub instance_class: String,
    pub status: String,
    pub storage_gb: Option<i64>,
    pub endpoint: String,
}

impl DatabaseRecord {
    pub fn from_raw(region: &str, raw: &Value) -> Self {
        Self {
            region: region.to_string(),
            identifier: text_at(raw, "DBInstanceIdentifier"),
            engine: text_at(raw, "Engine"),
            instance_class: text_at(raw, "DBInstanceClass"),
            status: text_at(raw, "DBInstanceStatus"),
            storage_gb: i64_at(raw, "AllocatedStorage"),
            endpoint: text_at(raw, "Endpoint.Address"),
        }
    }
}

impl InventoryRecord for DatabaseRecord {
    const SHEET_NAME: &'static str = "RDS";
    const COLUMNS: &'static [&'static str] = &[
        "Region",
        "DBIdentifier",
        "Engine",
        "Class",
        "Status",
        "Storage(GB)",
        "Endpoint",
    ];

    fn region(&self) -> &str {
        &self.region
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.region),
            Cell::text(&self.identifier),
            Cell::text(&self.engine),
            Cell::text(&self.instance_class),
            Cell::text(&self.status),
            Cell::number(self.storage_gb),
            Cell::text(&self.endpoint),
        ]
    }
}

/// ECS cluster
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterRecord {
    pub region: String,
    pub cluster_name: String,
    pub status: String,
    pub active_services: Option<i64>,
    pub running_tasks: Option<i64>,
    pub pending_tasks: Option<i64>,
    pub container_instances: Option<i64>,
}

impl ClusterRecord {
    pub fn from_raw(region: &str, raw: &Value) -> Self {
        Self {
            region: region.to_string(),
            cluster_name: text_at(raw, "clusterName"),
            status: text_at(raw, "status"),
            active_services: i64_at(raw, "activeServicesCount"),
            running_tasks: i64_at(raw, "runningTasksCount"),
            pending_tasks: i64_at(raw, "pendingTasksCount"),
            container_instances: i64_at(raw, "registeredContainerInstancesCount"),
        }
    }
}

impl InventoryRecord for ClusterRecord {
    const SHEET_NAME: &'static str = "ECS";
    const COLUMNS: &'static [&'static str] = &[
        "Region",
        "ClusterName",
        "Status",
        "ActiveServices",
        "RunningTasks",
        "PendingTasks",
        "ContainerInstances",
    ];

    fn region(&self) -> &str {
        &self.region
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.region),
            Cell::text(&self.cluster_name),
            Cell::text(&self.status),
            Cell::number(self.active_services),
            Cell::number(self.running_tasks),
            Cell::number(self.pending_tasks),
            Cell::number(self.container_instances),
        ]
    }
}

/// Lambda function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionRecord {
    pub region: String,
    pub function_name: String,
    pub runtime: String,
    pub memory_mb: Option<i64>,
    pub timeout_s: Option<i64>,
    pub last_modified: String,
}

impl FunctionRecord {
    pub fn from_raw(region: &str, raw: &Value) -> Self {
        Self {
            region: region.to_string(),
            function_name: text_at(raw, "FunctionName"),
            runtime: text_at(raw, "Runtime"),
            memory_mb: i64_at(raw, "MemorySize"),
            timeout_s: i64_at(raw, "Timeout"),
            last_modified: text_at(raw, "LastModified"),
        }
    }
}

impl InventoryRecord for FunctionRecord {
    const SHEET_NAME: &'static str = "Lambda";
    const COLUMNS: &'static [&'static str] = &[
        "Region",
        "FunctionName",
        "Runtime",
        "Memory(MB)",
        "Timeout(s)",
        "LastModified",
    ];

    fn region(&self) -> &str {
        &self.region
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.region),
            Cell::text(&self.function_name),
            Cell::text(&self.runtime),
            Cell::number(self.memory_mb),
            Cell::number(self.timeout_s),
            Cell::text(&self.last_modified),
        ]
    }
}
