pub mod chatbot;
pub mod docs;
pub mod health;
