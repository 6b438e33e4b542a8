pub mod admin;
pub mod auth;
pub mod blog;
pub mod cart;
pub mod certificates;
pub mod cms;
pub mod courses;
pub mod dashboard;
pub mod discussions;
pub mod enquiries;
pub mod enrollments;
pub mod gamification;
pub mod health;
pub mod learning_paths;
pub mod notifications;
pub mod orders;
pub mod recommendations;
pub mod schedules;
pub mod seo;
pub mod skills;
pub mod study_groups;
