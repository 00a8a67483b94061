//! Local knowledge base: procedure storage, search, and the reply policy.

mod respond;
mod search;
mod store;

pub use respond::{KbResponder, format_details};
pub use search::{clean_query, find_matches};
pub use store::{Contact, Procedure, ProcedureStore, parse_procedure};
