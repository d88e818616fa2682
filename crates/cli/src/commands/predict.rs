//! Price prediction against a running server

use anyhow::{bail, Context, Result};
use colored::Colorize;
use pricer_lib::models::UserInputs;
use pricer_lib::PriceOutcome;

use crate::client::ApiClient;
use crate::output::{print_error, print_info, print_json, print_success, OutputFormat};

/// Parse `group=feature` selection arguments
pub fn parse_selections(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|entry| {
            let (group, feature) = entry
                .split_once('=')
                .with_context(|| format!("Invalid selection '{}', expected group=feature", entry))?;
            if group.is_empty() || feature.is_empty() {
                bail!("Invalid selection '{}', expected group=feature", entry);
            }
            Ok((group.to_string(), feature.to_string()))
        })
        .collect()
}

/// Request a price for the given inputs and print the outcome
pub async fn predict(
    client: &ApiClient,
    inputs: UserInputs,
    verbose: bool,
    format: OutputFormat,
) -> Result<()> {
    let outcome = client.predict(&inputs.clamped()).await?;

    match format {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Table => match &outcome {
            PriceOutcome::Success {
                display,
                info,
                vector,
                ..
            } => {
                print_success(display);
                print_info(info);
                if verbose {
                    println!("{} {:?}", "Feature vector:".dimmed(), vector);
                }
            }
            PriceOutcome::Failure {
                message,
                remediation,
                ..
            } => {
                print_error(message);
                println!("\n{}", "Suggestions:".bold());
                for (i, step) in remediation.iter().enumerate() {
                    println!("  {}. {}", i + 1, step);
                }
            }
        },
    }

    if !outcome.is_success() {
        bail!("prediction failed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selections() {
        let parsed = parse_selections(&["color=color_blue".to_string()]).unwrap();
        assert_eq!(parsed, vec![("color".to_string(), "color_blue".to_string())]);

        assert!(parse_selections(&["color".to_string()]).is_err());
        assert!(parse_selections(&["=color_blue".to_string()]).is_err());
        assert!(parse_selections(&[]).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_outcome_exits_with_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/predict")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"failure","error":"e","message":"Prediction failed: e","remediation":[]}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let result = predict(&client, UserInputs::default(), false, OutputFormat::Json).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_successful_outcome() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/predict")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"success","price":18500.25,
                    "display":"Predicted Vehicle Price: $18,500.25",
                    "info":"Model expects 3 features","vector":[2020.0,30000.0,6.0]}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let inputs = UserInputs::new(2020, 30000, 6);
        predict(&client, inputs, true, OutputFormat::Table)
            .await
            .unwrap();
    }
}
