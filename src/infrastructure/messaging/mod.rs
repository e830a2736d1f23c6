pub mod jetstream;
pub mod telegram;
pub mod whatsapp;
