//! Timeout wrapper for page operations

use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Apply `tokio::time::timeout` to a page operation
///
/// Distinguishes a timeout from an operation failure in the error message.
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout: Duration,
    operation_name: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{operation_name} timeout after {:.1} seconds",
            timeout.as_secs_f64()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_timeouts_by_name() {
        let err = with_page_timeout(
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
            Duration::from_millis(10),
            "Page navigation",
        )
        .await
        .unwrap_err();
        assert!(err.to_string().starts_with("Page navigation timeout"));
    }

    #[tokio::test]
    async fn passes_through_results() {
        let value = with_page_timeout(async { Ok(7) }, Duration::from_secs(1), "noop")
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
