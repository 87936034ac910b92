mod users;
mod tasks;
mod admin;

pub use users::{service_status, add_user, login, verify, get_user_profile, list_users};
pub use tasks::{
    list_tasks, available_tasks, take_task, submit_task, list_assignments, download_task_file,
};
pub use admin::{add_task, mark_subscribed, export_subscribed, purge_subscribed};
