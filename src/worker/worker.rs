use tokio::time::{sleep, Duration};
use std::sync::Arc;
use tokio::sync::Semaphore;
use crate::services::{Mailer, RedisService};

// Drains the notification queue and delivers through the mail API.
// Delivery is best-effort: a failed send is re-queued until max_attempts,
// then dropped with an error log. Nothing here touches the ledger, so a
// lost email never affects assignment or balance state.
pub async fn notification_worker(
    redis_service: RedisService,
    mailer: Mailer,
    semaphore: Arc<Semaphore>,
    max_attempts: u32,
) {
    tracing::info!("Notification worker started");

    loop {
        // First acquire the semaphore before popping a notification
        let _permit = match semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                tracing::error!("Failed to acquire semaphore: {}", e);
                sleep(Duration::from_secs(1)).await;
                continue;
            }
        };

        match redis_service.pop_notification().await {
            Ok(Some(mut notification)) => {
                tracing::debug!(
                    "Delivering \"{}\" to {} (attempt {})",
                    notification.subject,
                    notification.to,
                    notification.attempts + 1
                );

                match mailer.send(&notification).await {
                    Ok(()) => {
                        tracing::info!(
                            "Delivered \"{}\" to {}",
                            notification.subject,
                            notification.to
                        );
                    }
                    Err(e) => {
                        notification.attempts += 1;
                        if notification.attempts < max_attempts {
                            tracing::warn!(
                                "Delivery to {} failed ({}), re-queueing",
                                notification.to,
                                e
                            );
                            if let Err(requeue_err) =
                                redis_service.enqueue_notification(&notification).await
                            {
                                tracing::error!(
                                    "Failed to re-queue notification for {}: {}",
                                    notification.to,
                                    requeue_err
                                );
                            }
                        } else {
                            tracing::error!(
                                "Dropping notification to {} after {} attempts: {}",
                                notification.to,
                                notification.attempts,
                                e
                            );
                        }
                    }
                }
            }
            Ok(None) => {
                // Queue is empty, drop the permit and wait before checking again
                drop(_permit);
                sleep(Duration::from_secs(1)).await;
            }
            Err(e) => {
                tracing::error!("Failed to pop notification from queue: {}", e);
                drop(_permit);
                sleep(Duration::from_secs(1)).await;
            }
        }
    }
}
