pub(crate) mod context;
pub(crate) mod cursor;
pub(crate) mod engine;
pub(crate) mod flow;
pub(crate) mod leaf;
pub(crate) mod list;
pub(crate) mod params;
pub(crate) mod status;
