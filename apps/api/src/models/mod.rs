pub mod about_us;
pub mod application;

pub use about_us::AboutUs;
pub use application::{Application, ApplicationSummary, NewApplication, ResumeUpload};
