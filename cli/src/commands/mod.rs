pub mod ask;
pub mod card;
pub mod health;
