mod worker;

pub use worker::notification_worker;
