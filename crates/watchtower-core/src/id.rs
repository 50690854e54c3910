/// Task ID format: `task_<ulid>`
pub fn new_task_id() -> String {
    format!("task_{}", ulid::Ulid::new().to_string().to_lowercase())
}

/// Session ID format: `ses_<ulid>`
pub fn new_session_id() -> String {
    format!("ses_{}", ulid::Ulid::new().to_string().to_lowercase())
}
