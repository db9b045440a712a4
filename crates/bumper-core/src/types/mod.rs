pub mod edits;
pub mod outcome;
pub mod upgrade;
