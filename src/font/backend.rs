/// Oracle implementation over the `ttf-parser` crate.
pub mod ttf_parser;
