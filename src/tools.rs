pub mod traits;
pub mod error;
pub mod schema;
pub mod registry;
pub mod weather;
pub mod web_search;
pub mod image_description;
pub mod flickr;
pub mod image_viewer;
