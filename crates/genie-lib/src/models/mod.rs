// Data Models
// Serializable types shared by the services layer and the front-end

pub mod canvas;
pub mod chat;
pub mod dashboard;

pub use canvas::*;
pub use chat::*;
pub use dashboard::*;
