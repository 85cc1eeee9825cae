// handlers/reviews/mod.rs - Review endpoints
//
// GET    /api/v1/reviews                      all reviews, parent name/description populated
// GET    /api/v1/bootcamps/:id/reviews        reviews of one bootcamp
// GET    /api/v1/reviews/:id
// POST   /api/v1/bootcamps/:id/reviews        role user/admin, one per bootcamp
// PUT    /api/v1/reviews/:id                  role user/admin, author or admin
// DELETE /api/v1/reviews/:id                  role user/admin, author or admin
//
// Every write schedules the parent's average rating to be recomputed.
pub mod read;
pub mod write;

pub use read::{bootcamp_reviews, get_review, list_reviews};
pub use write::{create_review, delete_review, update_review};
