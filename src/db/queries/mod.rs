pub mod activity_logs;
pub mod analyses;
pub mod categories;
pub mod households;
pub mod invitations;
pub mod items;
pub mod users;
