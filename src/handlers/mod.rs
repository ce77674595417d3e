pub mod resource;
pub mod root;

pub use resource::ResourceRouter;
pub use root::ServiceState;
