pub mod apply;
pub mod edit;
pub mod error;
pub mod flush;
pub mod line_index;
pub mod literal;
pub mod locate;
pub mod registry;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
