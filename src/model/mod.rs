pub mod attendance;
pub mod employee;
pub mod invoice;
pub mod leave_request;
pub mod role;
pub mod setting;
pub mod user;
