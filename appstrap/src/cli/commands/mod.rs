pub mod connect;
pub mod new;
