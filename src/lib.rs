pub mod classify;
pub mod cli;
pub mod error;
pub mod ext;
pub mod github;
pub mod issues;
pub mod model;
pub mod params;
pub mod pipeline;
pub mod render;
pub mod review;
pub mod util;
pub mod window;
