pub mod interest;
pub mod post;
pub mod saved_business;
pub mod user;

pub use interest::InterestStatus;
pub use post::PostStatus;
pub use user::Role;

pub use interest::Entity as Interest;
pub use post::Entity as Post;
pub use saved_business::Entity as SavedBusiness;
pub use user::Entity as User;
