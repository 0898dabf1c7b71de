use tokio::sync::broadcast::{self, Receiver, Sender};

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Notification {
    Error(String),
    Warning(String),
    Success(String),
    Info(String),
}

#[derive(Debug)]
pub struct NotificationBroadcast {
    tx: Sender<Notification>,
    rx: Receiver<Notification>,
}

impl NotificationBroadcast {
    pub fn new() -> Self {
        let (tx, rx) = broadcast::channel(20);
        Self { tx, rx }
    }

    pub fn send(&self, notification: Notification) {
        self.tx.send(notification).expect("infallible");
    }

    pub fn send_error(&self, message: String) {
        self.send(Notification::Error(message));
    }

    pub fn send_warning(&self, message: String) {
        self.send(Notification::Warning(message));
    }

    pub fn send_info(&self, message: String) {
        self.send(Notification::Info(message));
    }

    pub fn subscribe(&self) -> Receiver<Notification> {
        self.rx.resubscribe()
    }
}

impl Default for NotificationBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Notification, NotificationBroadcast};

    #[test]
    fn sending_without_listeners_is_fine() {
        let broadcast = NotificationBroadcast::new();
        broadcast.send_info("nobody listens".to_string());
    }

    #[test]
    fn listeners_receive_messages_in_order() {
        let broadcast = NotificationBroadcast::new();
        let mut rx = broadcast.subscribe();

        broadcast.send_error("a".to_string());
        broadcast.send_warning("b".to_string());
        broadcast.send_info("c".to_string());

        assert_eq!(rx.try_recv(), Ok(Notification::Error("a".to_string())));
        assert_eq!(rx.try_recv(), Ok(Notification::Warning("b".to_string())));
        assert_eq!(rx.try_recv(), Ok(Notification::Info("c".to_string())));
    }
}
