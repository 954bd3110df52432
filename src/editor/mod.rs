pub mod bindings;
pub mod controller;
pub mod fingerprint;
pub mod session;
pub mod viewport;
