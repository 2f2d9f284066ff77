//! Subsets of the AWS API responses the resolvers read.
//!
//! Services disagree on key casing: ElastiCache, EC2, RDS, SSM, Application
//! Auto Scaling and Cloud Map answer in PascalCase, while CloudWatch Logs,
//! ECR and ECS use camelCase.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeCacheClustersOutput {
    #[serde(default)]
    pub cache_clusters: Vec<CacheCluster>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheCluster {
    pub cache_cluster_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeLogGroupsOutput {
    #[serde(default)]
    pub log_groups: Vec<LogGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogGroup {
    pub log_group_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeRepositoriesOutput {
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub repository_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetParameterOutput {
    pub parameter: Parameter,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSecurityGroupsOutput {
    #[serde(default)]
    pub security_groups: Vec<SecurityGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroup {
    pub group_name: Option<String>,
    pub group_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeServicesOutput {
    #[serde(default)]
    pub services: Vec<EcsService>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcsService {
    pub service_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DescribeDbInstancesOutput {
    #[serde(rename = "DBInstances", default)]
    pub db_instances: Vec<DbInstance>,
}

#[derive(Debug, Deserialize)]
pub struct DbInstance {
    #[serde(rename = "DBInstanceIdentifier")]
    pub db_instance_identifier: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeScalingPoliciesOutput {
    #[serde(default)]
    pub scaling_policies: Vec<ScalingPolicy>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScalingPolicy {
    pub policy_name: Option<String>,
}

/// `iam get-role` is only checked for success; the body is not inspected
#[derive(Debug, Deserialize)]
pub struct GetRoleOutput {}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListServicesOutput {
    #[serde(default)]
    pub services: Vec<DiscoveryService>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiscoveryService {
    pub id: Option<String>,
    pub name: Option<String>,
}
