use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

// Login creates the user on first contact, so it carries the same fields.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct TakeTaskForm {
    pub email: String,
    pub task_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkSubscribedForm {
    pub email: String,
    pub subscribed: bool,
}

#[derive(Debug, Deserialize)]
pub struct PurgeForm {
    #[serde(default)]
    pub confirm: bool,
}
