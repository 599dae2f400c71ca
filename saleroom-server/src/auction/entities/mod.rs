mod auction;
mod bid;
mod chat;

pub use {
    auction::*,
    bid::*,
    chat::*,
};
