//! FreeCell game state, rules and persistence shared by the solver and the CLI.

pub mod action;
pub mod board;
pub mod card;
pub mod error;
pub mod game;
pub mod persist;
pub mod rules;
