use std::time::Duration;

use tokio::sync::mpsc;

use crate::delivery::directive::ScheduledAction;
use crate::utils::logging::log_stale_schedule;

/// Deferred actions: each one sleeps in its own task and is then handed to
/// the single consumer loop, which re-fetches live state before acting.
#[derive(Clone)]
pub struct Scheduler {
    tx: mpsc::UnboundedSender<ScheduledAction>,
}

impl Scheduler {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ScheduledAction>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn schedule(&self, delay: Duration, action: ScheduledAction) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = tx.send(action) {
                log_stale_schedule(e.0.name(), "scheduler loop is gone");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::UserId;

    #[tokio::test]
    async fn test_action_arrives_after_delay() {
        let (scheduler, mut rx) = Scheduler::channel();
        let action = ScheduledAction::SprintOver {
            user: UserId(7),
            session: "a1b2c3d4".parse().unwrap(),
        };
        scheduler.schedule(Duration::from_millis(10), action.clone());
        let received = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap();
        assert_eq!(received, Some(action));
    }
}
