pub mod build_info;
pub mod clock;
pub mod errors;
pub mod services;
pub mod utils;
