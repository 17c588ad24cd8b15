//! User resource: model, storage seam and the service the routes call.

mod model;
mod service;
mod store;

pub use model::{NewUser, User, UserDocument, UserPatch};
pub use service::UserService;
pub use store::{MemoryUserStore, UserStore};
