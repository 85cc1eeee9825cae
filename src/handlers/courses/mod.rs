// handlers/courses/mod.rs - Course endpoints
//
// GET    /api/v1/courses                      all courses, parent name/description populated
// GET    /api/v1/bootcamps/:id/courses        courses of one bootcamp
// GET    /api/v1/courses/:id
// POST   /api/v1/bootcamps/:id/courses        owner of the bootcamp or admin
// PUT    /api/v1/courses/:id                  owner or admin
// DELETE /api/v1/courses/:id                  owner or admin
//
// Every write schedules the parent's average cost to be recomputed.
pub mod read;
pub mod write;

pub use read::{bootcamp_courses, get_course, list_courses};
pub use write::{create_course, delete_course, update_course};
