pub mod course;
pub mod notification;
pub mod professor;
pub mod review;
pub mod subscription;
pub mod vote;
