//! Custom Resource Definitions (CRDs) for quorum-operator.
//!
//! - `DataCluster`: a managed quorum-based data cluster and its node sets

mod data_cluster;

pub use data_cluster::*;
