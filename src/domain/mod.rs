pub mod checkout;
pub mod promo;
pub mod status;
