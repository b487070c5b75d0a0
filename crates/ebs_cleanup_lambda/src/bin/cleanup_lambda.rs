use chrono::Utc;
use ebs_cleanup_core::policy::{RetentionPolicy, DEFAULT_RETENTION_DAYS};
use ebs_cleanup_lambda::adapters::ec2::Ec2Inventory;
use ebs_cleanup_lambda::handlers::cleanup::{handle_cleanup_event, CleanupResponse};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

fn retention_policy_from_env() -> RetentionPolicy {
    let Ok(raw) = std::env::var("RETENTION_DAYS") else {
        return RetentionPolicy::default();
    };
    match raw.trim().parse::<i64>() {
        Ok(days) if days > 0 => RetentionPolicy::new(days),
        _ => {
            eprintln!(
                "ignoring invalid RETENTION_DAYS '{raw}', falling back to {DEFAULT_RETENTION_DAYS}"
            );
            RetentionPolicy::default()
        }
    }
}

// The trigger payload carries no parameters; the schedule only decides when
// the batch runs.
async fn handle_request(_event: LambdaEvent<Value>) -> Result<CleanupResponse, Error> {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let inventory = Ec2Inventory::new(aws_sdk_ec2::Client::new(&config));
    let policy = retention_policy_from_env();

    handle_cleanup_event(&policy, Utc::now(), &inventory).map_err(|error| Error::from(error.message))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
