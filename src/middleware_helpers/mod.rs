pub mod maintenance;
pub mod request_id;

pub use maintenance::maintenance_middleware;
pub use request_id::request_id_middleware;
