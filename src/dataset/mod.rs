pub(crate) mod model;
pub(crate) mod slice;
pub(crate) mod view;
