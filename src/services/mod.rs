pub mod aggregates;
pub mod geocoder;
pub mod mailer;
pub mod slug;
pub mod uploads;

pub use geocoder::{GeocodeError, Geocoder, MapQuestGeocoder};
pub use mailer::{Email, LogMailer, MailError, Mailer};
pub use slug::slugify;
pub use uploads::{UploadError, UploadedFile};
