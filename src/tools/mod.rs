pub(crate) mod invoke;
pub(crate) mod temp;
