pub mod activity;
pub mod company;
pub mod contact;
pub mod deal;
pub mod organization;
pub mod user;

pub use activity::Activity;
pub use company::Company;
pub use contact::Contact;
pub use deal::{Deal, DealStage};
pub use organization::Organization;
pub use user::{Role, SafeUser, User};
