//! aws-inventory: cross-region AWS resource inventory
//!
//! Lists CloudWatch namespaces, EC2 instances, RDS instances, ECS clusters
//! and Lambda functions in every enabled region and writes them to one
//! spreadsheet, one sheet per resource kind.

pub mod app;
pub mod aws;
pub mod config;
pub mod error;
pub mod inventory;
pub mod report;
pub mod resource;
