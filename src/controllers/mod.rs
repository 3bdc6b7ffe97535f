pub mod auth_controller;
pub mod kyc_controller;
pub mod loyalty_controller;
pub mod payment_controller;
pub mod rental_controller;
pub mod station_controller;
pub mod vehicle_controller;
