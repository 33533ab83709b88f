pub mod app;
pub mod auth;
pub mod report;
pub mod utils;

pub mod schema {
    pub mod api;
    pub mod incident;
    pub mod remote;
    pub mod session;
}

pub mod store {
    pub mod incidents;
    pub mod sessions;
}

pub mod api {
    pub mod backend;
    pub mod endpoints;
    pub mod remote;
}
