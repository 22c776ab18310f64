mod ebay;
mod tcgplayer;

pub use ebay::{EbaySoldProvider, EBAY_SAMPLE_LATENCY};
pub use tcgplayer::{TcgplayerProvider, TCGPLAYER_SAMPLE_LATENCY};
