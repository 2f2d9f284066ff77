//! Per resource type resolvers for the AWS importer.
//!
//! Every resolver validates the attributes it needs, issues a single
//! read-only query and matches the answer against the declared name. A few
//! resolvers report a failed query as an empty result instead of an error;
//! they are marked `swallows_api_errors` in [`dispatch_table`] so callers can
//! tell a silent miss from a real one.

use super::responses::{
    DescribeCacheClustersOutput, DescribeDbInstancesOutput, DescribeLogGroupsOutput,
    DescribeRepositoriesOutput, DescribeScalingPoliciesOutput, DescribeSecurityGroupsOutput,
    DescribeServicesOutput, GetParameterOutput, GetRoleOutput, ListServicesOutput,
};
use super::session::AwsSession;
use crate::importer::attributes::AttributeView;
use crate::importer::context::ResolveContext;
use crate::importer::error::{ResolveError, ResolveResult};
use std::collections::HashMap;

pub const ELASTICACHE_CLUSTER: &str = "aws_elasticache_cluster";
pub const CLOUDWATCH_LOG_GROUP: &str = "aws_cloudwatch_log_group";
pub const ECR_REPOSITORY: &str = "aws_ecr_repository";
pub const SSM_PARAMETER: &str = "aws_ssm_parameter";
pub const SECURITY_GROUP: &str = "aws_security_group";
pub const ECS_SERVICE: &str = "aws_ecs_service";
pub const DB_INSTANCE: &str = "aws_db_instance";
pub const APPAUTOSCALING_POLICY: &str = "aws_appautoscaling_policy";
pub const IAM_ROLE: &str = "aws_iam_role";
pub const SERVICE_DISCOVERY_SERVICE: &str = "aws_service_discovery_service";

/// Signature shared by every resolver in the dispatch table
pub type Resolver =
    fn(&AwsSession, &ResolveContext, &str, &AttributeView) -> ResolveResult<Option<String>>;

/// A dispatch table entry
#[derive(Clone, Copy)]
pub struct ResolverEntry {
    pub resolve: Resolver,
    pub swallows_api_errors: bool,
}

/// Build the resource type → resolver table
pub fn dispatch_table() -> HashMap<&'static str, ResolverEntry> {
    let entries: [(&'static str, Resolver, bool); 10] = [
        (ELASTICACHE_CLUSTER, elasticache_cluster, false),
        (CLOUDWATCH_LOG_GROUP, cloudwatch_log_group, true),
        (ECR_REPOSITORY, ecr_repository, true),
        (SSM_PARAMETER, ssm_parameter, true),
        (SECURITY_GROUP, security_group, false),
        (ECS_SERVICE, ecs_service, true),
        (DB_INSTANCE, db_instance, false),
        (APPAUTOSCALING_POLICY, appautoscaling_policy, false),
        (IAM_ROLE, iam_role, true),
        (SERVICE_DISCOVERY_SERVICE, service_discovery_service, false),
    ];

    entries
        .into_iter()
        .map(|(resource_type, resolve, swallows_api_errors)| {
            (
                resource_type,
                ResolverEntry {
                    resolve,
                    swallows_api_errors,
                },
            )
        })
        .collect()
}

/// Report a failed API call as "nothing to report". Interruptions still propagate.
fn swallow_api_error<T>(result: ResolveResult<T>) -> ResolveResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ResolveError::Api { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

fn elasticache_cluster(
    session: &AwsSession,
    ctx: &ResolveContext,
    name: &str,
    attributes: &AttributeView,
) -> ResolveResult<Option<String>> {
    let cluster_id = attributes.require_string(name, "cluster_id")?;

    let output: DescribeCacheClustersOutput = session.call(
        ctx,
        "elasticache",
        "describe-cache-clusters",
        &["--cache-cluster-id", cluster_id],
    )?;

    if output
        .cache_clusters
        .iter()
        .any(|cluster| cluster.cache_cluster_id.as_deref() == Some(cluster_id))
    {
        return Ok(Some(cluster_id.to_string()));
    }

    Err(ResolveError::not_found(ELASTICACHE_CLUSTER, cluster_id))
}

fn cloudwatch_log_group(
    session: &AwsSession,
    ctx: &ResolveContext,
    name: &str,
    _attributes: &AttributeView,
) -> ResolveResult<Option<String>> {
    let Some(output) = swallow_api_error(session.call::<DescribeLogGroupsOutput>(
        ctx,
        "logs",
        "describe-log-groups",
        &["--log-group-name-prefix", name],
    ))?
    else {
        return Ok(None);
    };

    if output
        .log_groups
        .iter()
        .any(|group| group.log_group_name.as_deref() == Some(name))
    {
        return Ok(Some(name.to_string()));
    }

    Err(ResolveError::not_found(CLOUDWATCH_LOG_GROUP, name))
}

fn ecr_repository(
    session: &AwsSession,
    ctx: &ResolveContext,
    name: &str,
    _attributes: &AttributeView,
) -> ResolveResult<Option<String>> {
    let Some(output) = swallow_api_error(session.call::<DescribeRepositoriesOutput>(
        ctx,
        "ecr",
        "describe-repositories",
        &["--repository-names", name],
    ))?
    else {
        return Ok(None);
    };

    if output
        .repositories
        .iter()
        .any(|repository| repository.repository_name.as_deref() == Some(name))
    {
        return Ok(Some(name.to_string()));
    }

    Err(ResolveError::not_found(ECR_REPOSITORY, name))
}

fn ssm_parameter(
    session: &AwsSession,
    ctx: &ResolveContext,
    name: &str,
    _attributes: &AttributeView,
) -> ResolveResult<Option<String>> {
    let output = swallow_api_error(session.call::<GetParameterOutput>(
        ctx,
        "ssm",
        "get-parameter",
        &["--name", name],
    ))?;

    Ok(output.map(|output| output.parameter.name))
}

fn security_group(
    session: &AwsSession,
    ctx: &ResolveContext,
    name: &str,
    attributes: &AttributeView,
) -> ResolveResult<Option<String>> {
    let vpc_id = attributes.require_string(name, "vpc_id")?;

    let filters = serde_json::json!([
        { "Name": "vpc-id", "Values": [vpc_id] },
        { "Name": "group-name", "Values": [name] },
    ])
    .to_string();

    let output: DescribeSecurityGroupsOutput = session.call(
        ctx,
        "ec2",
        "describe-security-groups",
        &["--filters", filters.as_str()],
    )?;

    output
        .security_groups
        .into_iter()
        .find(|group| group.group_name.as_deref() == Some(name))
        .and_then(|group| group.group_id)
        .map(Some)
        .ok_or_else(|| ResolveError::not_found(SECURITY_GROUP, name))
}

fn ecs_service(
    session: &AwsSession,
    ctx: &ResolveContext,
    name: &str,
    attributes: &AttributeView,
) -> ResolveResult<Option<String>> {
    let cluster = attributes.require_string(name, "cluster")?;

    let Some(output) = swallow_api_error(session.call::<DescribeServicesOutput>(
        ctx,
        "ecs",
        "describe-services",
        &["--cluster", cluster, "--services", name],
    ))?
    else {
        return Ok(None);
    };

    if output
        .services
        .iter()
        .any(|service| service.service_name.as_deref() == Some(name))
    {
        return Ok(Some(format!("{}/{}", cluster_short_name(cluster), name)));
    }

    Err(ResolveError::not_found(ECS_SERVICE, name))
}

/// Last path segment of a cluster ARN, or the input when it has none
fn cluster_short_name(cluster: &str) -> &str {
    cluster.rsplit('/').next().unwrap_or(cluster)
}

fn db_instance(
    session: &AwsSession,
    ctx: &ResolveContext,
    name: &str,
    attributes: &AttributeView,
) -> ResolveResult<Option<String>> {
    let identifier = attributes.require_string(name, "identifier")?;

    let output: DescribeDbInstancesOutput = session.call(
        ctx,
        "rds",
        "describe-db-instances",
        &["--db-instance-identifier", identifier],
    )?;

    if output
        .db_instances
        .iter()
        .any(|instance| instance.db_instance_identifier.as_deref() == Some(identifier))
    {
        return Ok(Some(identifier.to_string()));
    }

    Err(ResolveError::not_found(DB_INSTANCE, name))
}

fn appautoscaling_policy(
    session: &AwsSession,
    ctx: &ResolveContext,
    name: &str,
    attributes: &AttributeView,
) -> ResolveResult<Option<String>> {
    // The declared identifier carries the service namespace (e.g., "ecs")
    let namespace = attributes.require_string(name, "identifier")?;

    let output: DescribeScalingPoliciesOutput = session.call(
        ctx,
        "application-autoscaling",
        "describe-scaling-policies",
        &["--policy-names", name, "--service-namespace", namespace],
    )?;

    if output
        .scaling_policies
        .iter()
        .any(|policy| policy.policy_name.as_deref() == Some(name))
    {
        return Ok(Some(name.to_string()));
    }

    Err(ResolveError::not_found(APPAUTOSCALING_POLICY, name))
}

fn iam_role(
    session: &AwsSession,
    ctx: &ResolveContext,
    name: &str,
    _attributes: &AttributeView,
) -> ResolveResult<Option<String>> {
    let found = swallow_api_error(session.call::<GetRoleOutput>(
        ctx,
        "iam",
        "get-role",
        &["--role-name", name],
    ))?;

    Ok(found.map(|_| name.to_string()))
}

fn service_discovery_service(
    session: &AwsSession,
    ctx: &ResolveContext,
    name: &str,
    _attributes: &AttributeView,
) -> ResolveResult<Option<String>> {
    let output: ListServicesOutput = session.call(ctx, "servicediscovery", "list-services", &[])?;

    output
        .services
        .into_iter()
        .find(|service| service.name.as_deref() == Some(name))
        .and_then(|service| service.id)
        .map(Some)
        .ok_or_else(|| ResolveError::not_found(SERVICE_DISCOVERY_SERVICE, name))
}
