pub mod backend;
pub mod capability;
pub mod dispatcher;
pub mod error;
pub mod local;
pub mod remote;
pub mod request;
