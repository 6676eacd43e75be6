pub(crate) mod paginator;
pub(crate) mod sink;
