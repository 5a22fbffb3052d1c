use std::future::Future;
use std::time::Duration;

/// Runs a board command, failing with a descriptive cause when `timeout` elapses
/// first. Without a timeout the command is awaited for as long as it takes.
pub(crate) async fn with_timeout<T, F>(
    timeout: Option<Duration>,
    command: &str,
    fut: F,
) -> Result<T, String>
where
    F: Future<Output = Result<T, String>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| format!("{command} timed out after {} ms", limit.as_millis()))?,
        None => fut.await,
    }
}

/// Joins several failure causes into a single message.
pub(crate) fn join_causes(causes: &[String]) -> String {
    causes.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let ok: Result<u8, String> = with_timeout(None, "noop", async { Ok(1) }).await;
        assert_eq!(ok, Ok(1));

        let err: Result<u8, String> =
            with_timeout(Some(Duration::from_secs(1)), "noop", async { Err("boom".to_string()) })
                .await;
        assert_eq!(err, Err("boom".to_string()));
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result: Result<(), String> =
            with_timeout(Some(Duration::from_millis(10)), "accelerometer start", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert_eq!(
            result,
            Err("accelerometer start timed out after 10 ms".to_string())
        );
    }

    #[test]
    fn test_join_causes() {
        assert_eq!(
            join_causes(&["a failed".to_string(), "b failed".to_string()]),
            "a failed; b failed"
        );
    }
}
