pub mod campaigns;
pub mod follow_ups;
pub mod health;
pub mod root;
