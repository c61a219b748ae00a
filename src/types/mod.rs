pub mod error;
pub mod ticket;

pub use error::{Result, ResultExt, TicketError};
pub use ticket::{
    Category, Classification, MAX_TITLE_LEN, NewTicket, Priority, Status, Ticket, TicketPatch,
};
