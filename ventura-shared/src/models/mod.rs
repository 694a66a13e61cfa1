pub mod availability;
pub mod booking;
pub mod price;
pub mod question;
