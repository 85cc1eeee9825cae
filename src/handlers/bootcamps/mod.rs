// handlers/bootcamps/mod.rs - Bootcamp endpoints
//
// GET    /api/v1/bootcamps                     list with filters
// GET    /api/v1/bootcamps/:id                 single bootcamp
// GET    /api/v1/bootcamps/:zipcode/:distance  radius search in miles
// POST   /api/v1/bootcamps                     publisher/admin
// PUT    /api/v1/bootcamps/:id                 owner or admin
// DELETE /api/v1/bootcamps/:id                 owner or admin, cascades
// PUT    /api/v1/bootcamps/:id/photo           owner or admin, multipart `file`
pub mod photo;
pub mod read;
pub mod write;

pub use photo::upload_photo;
pub use read::{get_bootcamp, list_bootcamps, bootcamps_within_radius};
pub use write::{create_bootcamp, delete_bootcamp, update_bootcamp};
